//! INSERT, CREATE TABLE and DROP TABLE.

use super::Parser;
use crate::ast::*;
use crate::error::TranspileResult;
use crate::tokenizer::{Symbol, Token};

impl Parser {
    /// After `INSERT`.
    pub(crate) fn parse_insert(&mut self) -> TranspileResult<Insert> {
        let overwrite = if self.parse_keyword("overwrite") {
            true
        } else {
            self.expect_keyword("into")?;
            false
        };
        self.parse_keyword("table");
        let table = self.parse_object_name()?;

        let mut partition = Vec::new();
        if self.parse_keyword("partition") {
            partition = self.parse_partition_spec()?;
        }

        let columns = if self.peek_symbol(Symbol::LParen) && !self.peek_query_start(0) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };

        if partition.is_empty() && self.parse_keyword("partition") {
            partition = self.parse_partition_spec()?;
        }

        let source = self.parse_query()?;
        Ok(Insert {
            overwrite,
            table,
            columns,
            partition,
            source: Box::new(source),
        })
    }

    fn parse_partition_spec(&mut self) -> TranspileResult<Vec<PartitionSpec>> {
        self.expect_symbol(Symbol::LParen)?;
        let mut specs = Vec::new();
        loop {
            let column = self.parse_identifier()?;
            let value = if self.consume_symbol(Symbol::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            specs.push(PartitionSpec { column, value });
            if !self.consume_symbol(Symbol::Comma) {
                break;
            }
        }
        self.expect_symbol(Symbol::RParen)?;
        Ok(specs)
    }

    /// After `CREATE`.
    pub(crate) fn parse_create_table(&mut self) -> TranspileResult<CreateTable> {
        let external = self.parse_keyword("external");
        self.expect_keyword("table")?;
        let if_not_exists = self.parse_keywords(&["if", "not", "exists"]);
        let name = self.parse_object_name()?;

        let mut table = CreateTable::new(name);
        table.external = external;
        table.if_not_exists = if_not_exists;

        if self.peek_symbol(Symbol::LParen) {
            table.columns = self.parse_column_defs()?;
        }

        loop {
            if self.parse_keyword("using") {
                table.file_format = Some(self.parse_identifier()?.value);
            } else if self.parse_keywords(&["stored", "as"]) {
                table.file_format = Some(self.parse_identifier()?.value);
            } else if self.parse_keywords(&["partitioned", "by"]) {
                table.partitioned_by = self.parse_partition_columns()?;
            } else if self.parse_keyword("comment") {
                table.comment = Some(self.parse_string_literal()?);
            } else if self.parse_keyword("location") {
                table.location = Some(self.parse_string_literal()?);
            } else if self.parse_keyword("tblproperties") || self.parse_keyword("properties") {
                table.properties = self.parse_properties()?;
            } else if let Some(kind) = self.parse_key_kind() {
                let columns = self.parse_identifier_list()?;
                table.key = Some(TableKey { kind, columns });
            } else if self.parse_keywords(&["distributed", "by"]) {
                table.distribution = Some(self.parse_distribution()?);
            } else if self.parse_keyword("engine") {
                self.consume_symbol(Symbol::Eq);
                self.parse_identifier()?;
            } else {
                break;
            }
        }

        if self.parse_keyword("as") {
            table.as_query = Some(Box::new(self.parse_query()?));
        }
        Ok(table)
    }

    fn parse_column_defs(&mut self) -> TranspileResult<Vec<ColumnDef>> {
        self.expect_symbol(Symbol::LParen)?;
        let mut columns = Vec::new();
        loop {
            let name = self.parse_identifier()?;
            let data_type = self.parse_data_type()?;
            let mut not_null = false;
            let mut comment = None;
            loop {
                if self.parse_keywords(&["not", "null"]) {
                    not_null = true;
                } else if self.parse_keyword("null") {
                    not_null = false;
                } else if self.parse_keyword("comment") {
                    comment = Some(self.parse_string_literal()?);
                } else {
                    break;
                }
            }
            columns.push(ColumnDef {
                name,
                data_type,
                not_null,
                comment,
            });
            if !self.consume_symbol(Symbol::Comma) {
                break;
            }
        }
        self.expect_symbol(Symbol::RParen)?;
        Ok(columns)
    }

    fn parse_partition_columns(&mut self) -> TranspileResult<Vec<PartitionColumn>> {
        self.expect_symbol(Symbol::LParen)?;
        let mut columns = Vec::new();
        loop {
            let name = self.parse_identifier()?;
            let data_type = if self.peek_symbol(Symbol::Comma) || self.peek_symbol(Symbol::RParen) {
                None
            } else {
                Some(self.parse_data_type()?)
            };
            if self.parse_keyword("comment") {
                self.parse_string_literal()?;
            }
            columns.push(PartitionColumn { name, data_type });
            if !self.consume_symbol(Symbol::Comma) {
                break;
            }
        }
        self.expect_symbol(Symbol::RParen)?;
        Ok(columns)
    }

    /// `('k' = 'v', ...)`; keys may also be bare dotted names.
    fn parse_properties(&mut self) -> TranspileResult<Vec<(String, String)>> {
        self.expect_symbol(Symbol::LParen)?;
        let mut properties = Vec::new();
        loop {
            let key = match self.peek() {
                Some(Token::String(_)) => self.parse_string_literal()?,
                _ => self
                    .parse_object_name()?
                    .0
                    .into_iter()
                    .map(|i| i.value)
                    .collect::<Vec<_>>()
                    .join("."),
            };
            self.expect_symbol(Symbol::Eq)?;
            let value = match self.advance() {
                Some(Token::String(s)) | Some(Token::Word(s)) => s,
                Some(Token::Number { text, .. }) => text,
                _ => return Err(self.expected("property value")),
            };
            properties.push((key, value));
            if !self.consume_symbol(Symbol::Comma) {
                break;
            }
        }
        self.expect_symbol(Symbol::RParen)?;
        Ok(properties)
    }

    fn parse_key_kind(&mut self) -> Option<KeyKind> {
        [
            ("duplicate", KeyKind::Duplicate),
            ("unique", KeyKind::Unique),
            ("aggregate", KeyKind::Aggregate),
        ]
        .into_iter()
        .find(|(word, _)| self.parse_keywords(&[*word, "key"]))
        .map(|(_, kind)| kind)
    }

    /// After `DISTRIBUTED BY`: `HASH(cols) [BUCKETS n|AUTO]`.
    fn parse_distribution(&mut self) -> TranspileResult<Distribution> {
        self.expect_keyword("hash")?;
        let columns = self.parse_identifier_list()?;
        let mut buckets = None;
        if self.parse_keyword("buckets") && !self.parse_keyword("auto") {
            buckets = Some(self.parse_u32()?);
        }
        Ok(Distribution { columns, buckets })
    }

    /// After `DROP`.
    pub(crate) fn parse_drop_table(&mut self) -> TranspileResult<Statement> {
        self.expect_keyword("table")?;
        let if_exists = self.parse_keywords(&["if", "exists"]);
        let name = self.parse_object_name()?;
        Ok(Statement::DropTable { name, if_exists })
    }
}
