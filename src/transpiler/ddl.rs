use super::Generator;
use super::traits::TypeContext;
use crate::ast::*;
use crate::dialect::{Dialect, Family};
use crate::error::TranspileResult;

impl Generator {
    pub(super) fn insert(&mut self, insert: &Insert) -> TranspileResult<String> {
        let mut sql = if insert.overwrite {
            if !self.dialect.supports_insert_overwrite() {
                return Err(self.dialect.unsupported("INSERT OVERWRITE"));
            }
            format!("INSERT OVERWRITE TABLE {}", self.object_name(&insert.table))
        } else {
            format!("INSERT INTO {}", self.object_name(&insert.table))
        };

        if !insert.partition.is_empty() {
            let specs = insert
                .partition
                .iter()
                .map(|spec| -> TranspileResult<String> {
                    let column = self.ident(&spec.column);
                    Ok(match &spec.value {
                        Some(value) => format!("{} = {}", column, self.expr(value)?),
                        None => column,
                    })
                })
                .collect::<TranspileResult<Vec<_>>>()?;
            sql.push_str(&format!(" PARTITION ({})", specs.join(", ")));
        }
        if !insert.columns.is_empty() {
            sql.push_str(&format!(" ({})", self.idents(&insert.columns)));
        }

        sql.push_str(&self.clause_sep());
        sql.push_str(&self.query(&insert.source)?);
        Ok(sql)
    }

    pub(super) fn create_table(&mut self, table: &CreateTable) -> TranspileResult<String> {
        let mut sql = format!(
            "CREATE {}TABLE {}{}",
            if table.external { "EXTERNAL " } else { "" },
            if table.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.object_name(&table.name)
        );
        if !table.columns.is_empty() {
            let columns = self.indented(|g| {
                table
                    .columns
                    .iter()
                    .map(|c| g.column_def(c))
                    .collect::<TranspileResult<Vec<_>>>()
            })?;
            if self.pretty {
                let pad = format!("\n{}", self.pad(self.indent_level + 1));
                sql.push_str(&format!(
                    " ({}{}\n{})",
                    pad,
                    columns.join(&format!(",{}", pad)),
                    self.pad(self.indent_level)
                ));
            } else {
                sql.push_str(&format!(" ({})", columns.join(", ")));
            }
        }

        let mut clauses = match self.dialect.dialect().family() {
            Family::Hive => self.hive_table_clauses(table)?,
            Family::MySql => self.mysql_table_clauses(table)?,
        };
        if let Some(query) = &table.as_query {
            clauses.push(format!("AS{}{}", self.clause_sep(), self.query(query)?));
        }
        for clause in clauses {
            sql.push_str(&self.clause_sep());
            sql.push_str(&clause);
        }
        Ok(sql)
    }

    fn column_def(&mut self, column: &ColumnDef) -> TranspileResult<String> {
        let mut sql = format!(
            "{} {}",
            self.ident(&column.name),
            self.dialect.data_type(&column.data_type, TypeContext::Column)?
        );
        if column.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(comment) = &column.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&self.dialect.string_literal(comment));
        }
        Ok(sql)
    }

    fn hive_table_clauses(&mut self, table: &CreateTable) -> TranspileResult<Vec<String>> {
        if table.key.is_some() || table.distribution.is_some() {
            return Err(self.dialect.unsupported("Doris KEY / DISTRIBUTED BY clauses"));
        }

        let mut clauses = Vec::new();
        let format = table.file_format.as_deref().map(|f| self.dialect.file_format(f));
        // Spark wants USING right after the columns, Hive wants STORED AS near the end
        let spark = self.dialect.dialect() == Dialect::Spark;
        if spark && let Some(format) = &format {
            clauses.push(format.clone());
        }
        if let Some(comment) = &table.comment {
            clauses.push(format!("COMMENT {}", self.dialect.string_literal(comment)));
        }
        if !table.partitioned_by.is_empty() {
            let columns = table
                .partitioned_by
                .iter()
                .map(|c| -> TranspileResult<String> {
                    Ok(match &c.data_type {
                        Some(data_type) => format!(
                            "{} {}",
                            self.ident(&c.name),
                            self.dialect.data_type(data_type, TypeContext::Column)?
                        ),
                        None => self.ident(&c.name),
                    })
                })
                .collect::<TranspileResult<Vec<_>>>()?;
            clauses.push(format!("PARTITIONED BY ({})", columns.join(", ")));
        }
        if !spark && let Some(format) = format {
            clauses.push(format);
        }
        if let Some(location) = &table.location {
            clauses.push(format!("LOCATION {}", self.dialect.string_literal(location)));
        }
        if !table.properties.is_empty() {
            let properties = table
                .properties
                .iter()
                .map(|(k, v)| format!("{} = {}", self.dialect.string_literal(k), self.dialect.string_literal(v)))
                .collect::<Vec<_>>();
            clauses.push(format!("TBLPROPERTIES ({})", properties.join(", ")));
        }
        Ok(clauses)
    }

    fn mysql_table_clauses(&mut self, table: &CreateTable) -> TranspileResult<Vec<String>> {
        if table.external {
            return Err(self.dialect.unsupported("EXTERNAL tables"));
        }
        if table.file_format.is_some() || table.location.is_some() || !table.partitioned_by.is_empty() {
            return Err(self.dialect.unsupported("file format, LOCATION and PARTITIONED BY clauses"));
        }
        let doris = self.dialect.dialect() == Dialect::Doris;
        if !doris && (table.key.is_some() || table.distribution.is_some() || !table.properties.is_empty()) {
            return Err(self.dialect.unsupported("Doris table model clauses"));
        }

        let mut clauses = Vec::new();
        if let Some(key) = &table.key {
            clauses.push(format!("{} KEY({})", key.kind.keyword(), self.idents(&key.columns)));
        }
        if let Some(comment) = &table.comment {
            clauses.push(format!("COMMENT {}", self.dialect.string_literal(comment)));
        }
        if let Some(distribution) = &table.distribution {
            let buckets = match distribution.buckets {
                Some(n) => n.to_string(),
                None => "AUTO".to_string(),
            };
            clauses.push(format!(
                "DISTRIBUTED BY HASH({}) BUCKETS {}",
                self.idents(&distribution.columns),
                buckets
            ));
        }
        if !table.properties.is_empty() {
            let properties = table
                .properties
                .iter()
                .map(|(k, v)| format!("{} = {}", double_quoted(k), double_quoted(v)))
                .collect::<Vec<_>>();
            clauses.push(format!("PROPERTIES ({})", properties.join(", ")));
        }
        Ok(clauses)
    }
}

/// Doris writes property keys and values in double quotes.
fn double_quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
