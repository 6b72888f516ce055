//! INSERT partitions and CREATE TABLE options.

use super::{hive_to_mysql, mysql_to_hive};
use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::traits::{RewriteContext, RewriteRule};

/// Largest Doris VARCHAR, used when a STRING column becomes a key.
const MAX_VARCHAR: u32 = 65533;

/// Moves `PARTITION (k = v)` values of an insert into the source rows.
pub struct StaticPartitionInsert;

impl RewriteRule for StaticPartitionInsert {
    fn id(&self) -> &'static str {
        "static-partition-insert"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_statement(&self, statement: Statement, ctx: &mut RewriteContext) -> TranspileResult<Statement> {
        let mut insert = match statement {
            Statement::Insert(insert) if !insert.partition.is_empty() => insert,
            other => return Ok(other),
        };
        let partition = std::mem::take(&mut insert.partition);

        if !insert.columns.is_empty() {
            insert.columns.extend(partition.iter().map(|p| p.column.clone()));
        }
        if partition.iter().all(|p| p.value.is_none()) {
            ctx.note("dynamic PARTITION clause dropped");
            return Ok(Statement::Insert(insert));
        }

        let dynamic = partition.iter().filter(|p| p.value.is_none()).count();
        if !matches!(insert.source.body, SetExpr::Select(_) | SetExpr::Values(_)) {
            if dynamic > 0 {
                return Err(ctx.unsupported("mixed static and dynamic partitions over a set operation"));
            }
            let inner = std::mem::replace(insert.source.as_mut(), Query::from_body(SetExpr::Values(Vec::new())));
            *insert.source = wrap_with_static_values(inner, &partition);
        } else if let SetExpr::Select(select) = &mut insert.source.body {
            let items = std::mem::take(&mut select.projection);
            select.projection = splice_partition(items, &partition, dynamic, |expr| SelectItem::Expr {
                expr,
                alias: None,
            })
            .ok_or_else(|| ctx.unsupported("static partition values with a wildcard before dynamic columns"))?;
        } else if let SetExpr::Values(rows) = &mut insert.source.body {
            for row in rows.iter_mut() {
                let values = std::mem::take(row);
                *row = splice_partition(values, &partition, dynamic, |expr| expr)
                    .ok_or_else(|| ctx.unsupported("VALUES row shorter than its partition columns"))?;
            }
        }

        ctx.note("static PARTITION values moved into the inserted rows");
        Ok(Statement::Insert(insert))
    }
}

/// `SELECT *, <values> FROM (<inner>) partition_source`
fn wrap_with_static_values(inner: Query, partition: &[PartitionSpec]) -> Query {
    let mut projection = vec![SelectItem::Wildcard];
    projection.extend(
        partition
            .iter()
            .filter_map(|p| p.value.clone().map(|expr| SelectItem::Expr { expr, alias: None })),
    );
    Query::from_body(SetExpr::Select(Box::new(Select {
        distinct: false,
        projection,
        from: vec![TableWithJoins {
            relation: TableFactor::Derived {
                subquery: Box::new(inner),
                alias: Some(TableAlias {
                    name: Ident::new("partition_source"),
                    columns: Vec::new(),
                }),
            },
            joins: Vec::new(),
        }],
        lateral_views: Vec::new(),
        selection: None,
        group_by: Vec::new(),
        having: None,
    })))
}

/// The trailing `dynamic` items are the dynamic partition values in spec
/// order; static values are interleaved between them.
fn splice_partition<T>(
    mut items: Vec<T>,
    partition: &[PartitionSpec],
    dynamic: usize,
    wrap: impl Fn(Expr) -> T,
) -> Option<Vec<T>> {
    if items.len() < dynamic {
        return None;
    }
    let mut dynamic_items = items.split_off(items.len() - dynamic).into_iter();
    for spec in partition {
        match &spec.value {
            Some(value) => items.push(wrap(value.clone())),
            None => items.push(dynamic_items.next()?),
        }
    }
    Some(items)
}

/// Turns a Spark/Hive table definition into a Doris (or MySQL) one.
pub struct DorisTableDefaults;

impl RewriteRule for DorisTableDefaults {
    fn id(&self) -> &'static str {
        "doris-table-defaults"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_statement(&self, statement: Statement, ctx: &mut RewriteContext) -> TranspileResult<Statement> {
        let mut table = match statement {
            Statement::CreateTable(table) => table,
            other => return Ok(other),
        };

        if table.external {
            return Err(ctx.unsupported("EXTERNAL tables"));
        }
        if table.location.is_some() {
            return Err(ctx.unsupported("LOCATION"));
        }
        if let Some(format) = table.file_format.take() {
            ctx.note(format!("file format {} dropped", format.to_ascii_uppercase()));
        }
        if !table.properties.is_empty() {
            table.properties.clear();
            ctx.note("TBLPROPERTIES dropped");
        }
        if !table.partitioned_by.is_empty() {
            for column in std::mem::take(&mut table.partitioned_by) {
                if let Some(data_type) = column.data_type {
                    table.columns.push(ColumnDef {
                        name: column.name,
                        data_type,
                        not_null: false,
                        comment: None,
                    });
                }
            }
            ctx.note("PARTITIONED BY dropped; partition columns kept as regular columns");
        }

        if ctx.write == Dialect::Doris {
            apply_doris_defaults(&mut table, ctx)?;
        }
        Ok(Statement::CreateTable(table))
    }
}

fn apply_doris_defaults(table: &mut CreateTable, ctx: &mut RewriteContext) -> TranspileResult<()> {
    let replication = ctx.options.doris.replication_num.to_string();

    if table.as_query.is_none() && !table.columns.is_empty() {
        if table.key.is_none() {
            let first = &mut table.columns[0];
            if first.data_type.is_floating() || first.data_type.is_complex() {
                let kind = if first.data_type.is_floating() {
                    "floating-point"
                } else {
                    "complex-typed"
                };
                return Err(ctx.unsupported(format!("{} key column '{}'", kind, first.name.value)));
            }
            if first.data_type == DataType::String {
                first.data_type = DataType::Varchar(Some(MAX_VARCHAR));
                ctx.note(format!(
                    "key column '{}' changed from STRING to VARCHAR({})",
                    first.name.value, MAX_VARCHAR
                ));
            }
            table.key = Some(TableKey {
                kind: KeyKind::Duplicate,
                columns: vec![first.name.clone()],
            });
        }
        if table.distribution.is_none() {
            let columns = table.key.as_ref().map(|k| k.columns.clone()).unwrap_or_default();
            table.distribution = Some(Distribution {
                columns,
                buckets: ctx.options.doris.buckets,
            });
        }
    }

    table.properties = vec![("replication_num".to_string(), replication)];
    Ok(())
}

/// Doris table model clauses mean nothing to Spark/Hive.
pub struct ReverseDorisTableOptions;

impl RewriteRule for ReverseDorisTableOptions {
    fn id(&self) -> &'static str {
        "reverse-doris-table-options"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_statement(&self, statement: Statement, ctx: &mut RewriteContext) -> TranspileResult<Statement> {
        let mut table = match statement {
            Statement::CreateTable(table) => table,
            other => return Ok(other),
        };
        if let Some(key) = table.key.take() {
            ctx.note(format!("{} KEY dropped", key.kind.keyword()));
        }
        if table.distribution.take().is_some() {
            ctx.note("DISTRIBUTED BY dropped");
        }
        if !table.properties.is_empty() {
            table.properties.clear();
            ctx.note("PROPERTIES dropped");
        }
        Ok(Statement::CreateTable(table))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{doris_to_spark, one, spark_to_doris, unsupported};
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(column: &str, value: Option<&str>) -> PartitionSpec {
        PartitionSpec {
            column: Ident::new(column),
            value: value.map(Expr::string),
        }
    }

    #[test]
    fn test_splice_static_only() {
        let items = vec![Expr::column("a")];
        let out = splice_partition(items, &[spec("dt", Some("x"))], 0, |e| e).unwrap();
        assert_eq!(out, vec![Expr::column("a"), Expr::string("x")]);
    }

    #[test]
    fn test_splice_mixed() {
        let items = vec![Expr::column("a"), Expr::column("hr")];
        let partition = [spec("dt", Some("x")), spec("hr", None)];
        let out = splice_partition(items, &partition, 1, |e| e).unwrap();
        assert_eq!(out, vec![Expr::column("a"), Expr::string("x"), Expr::column("hr")]);
    }

    #[test]
    fn test_splice_too_short() {
        let partition = [spec("dt", None), spec("hr", None)];
        assert!(splice_partition(vec![Expr::column("a")], &partition, 2, |e| e).is_none());
    }

    #[test]
    fn test_string_key_becomes_varchar() {
        let out = one(
            Dialect::Hive,
            Dialect::Doris,
            "CREATE TABLE t (name STRING, n INT) STORED AS ORC TBLPROPERTIES ('owner' = 'etl')",
        );
        assert_eq!(
            out.sql,
            "CREATE TABLE t (name VARCHAR(65533), n INT) DUPLICATE KEY(name) \
             DISTRIBUTED BY HASH(name) BUCKETS AUTO PROPERTIES (\"replication_num\" = \"1\")"
        );
        assert_eq!(
            out.notes,
            vec![
                "file format ORC dropped",
                "TBLPROPERTIES dropped",
                "key column 'name' changed from STRING to VARCHAR(65533)",
            ]
        );
    }

    #[test]
    fn test_doris_rejects_hive_only_tables() {
        assert_eq!(
            unsupported(Dialect::Spark, Dialect::Doris, "CREATE TABLE t (score DOUBLE, id INT)"),
            "floating-point key column 'score'"
        );
        assert_eq!(
            unsupported(Dialect::Spark, Dialect::Doris, "CREATE TABLE t (tags ARRAY<STRING>, id INT)"),
            "complex-typed key column 'tags'"
        );
        assert_eq!(
            unsupported(
                Dialect::Hive,
                Dialect::Doris,
                "CREATE EXTERNAL TABLE t (id INT) LOCATION '/warehouse/t'"
            ),
            "EXTERNAL tables"
        );
        assert_eq!(
            unsupported(Dialect::Spark, Dialect::Doris, "CREATE TABLE t (id INT) LOCATION '/warehouse/t'"),
            "LOCATION"
        );
    }

    #[test]
    fn test_static_partition_values_move_into_select() {
        let out = spark_to_doris("INSERT INTO t PARTITION (dt = '2024-01-01', hr) SELECT a, hr FROM s");
        assert_eq!(out.sql, "INSERT INTO t SELECT a, '2024-01-01', hr FROM s");
        assert_eq!(out.notes, vec!["static PARTITION values moved into the inserted rows"]);
    }

    #[test]
    fn test_reverse_drops_doris_options() {
        let out = doris_to_spark(
            "CREATE TABLE t (id INT, v VARCHAR(10)) ENGINE=OLAP DUPLICATE KEY(id) \
             DISTRIBUTED BY HASH(id) BUCKETS 8 PROPERTIES (\"replication_num\" = \"1\")",
        );
        assert_eq!(out.sql, "CREATE TABLE t (id INT, v VARCHAR(10))");
        assert_eq!(
            out.notes,
            vec!["DUPLICATE KEY dropped", "DISTRIBUTED BY dropped", "PROPERTIES dropped"]
        );
    }
}
