//! Transpiler traits and utilities.

use crate::ast::{DataType, Ident, JoinKind};
use crate::dialect::Dialect;
use crate::error::{TranspileError, TranspileResult};

/// Words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "all", "and", "array", "as", "between", "by", "case", "cast", "create", "cross", "cube",
    "current", "database", "delete", "desc", "describe", "distinct", "distribute", "drop", "else",
    "end", "except", "exists", "false", "for", "from", "full", "function", "grant", "group",
    "having", "if", "in", "inner", "insert", "intersect", "interval", "into", "is", "join", "key",
    "lateral", "left", "like", "limit", "map", "minus", "not", "null", "of", "on", "or", "order",
    "outer", "over", "partition", "range", "regexp", "right", "rlike", "rollup", "row", "rows",
    "select", "set", "sort", "table", "then", "to", "true", "union", "update", "user", "using",
    "values", "when", "where", "window", "with",
];

/// Where a data type is being printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeContext {
    /// Column definition in CREATE TABLE.
    Column,
    /// Target of CAST.
    Cast,
}

/// Quote an identifier with backticks if it's reserved, was quoted in the
/// source, or contains special characters.
pub fn escape_identifier(ident: &Ident) -> String {
    let name = &ident.value;
    let lower = name.to_ascii_lowercase();
    let needs_quoting = ident.quoted
        || RESERVED_WORDS.contains(&lower.as_str())
        || name.is_empty()
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().is_some_and(|c| c.is_ascii_digit());

    if needs_quoting {
        format!("`{}`", name.replace('`', "``"))
    } else {
        name.clone()
    }
}

/// Backslash-escaped single-quoted string, readable by all four dialects.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Trait for dialect-specific SQL generation.
///
/// The dialect-independent [`Generator`](super::Generator) handles layout
/// and precedence; this trait only answers spelling questions.
pub trait SqlGenerator: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Quote an identifier (table, column or alias).
    fn quote_identifier(&self, ident: &Ident) -> String {
        escape_identifier(ident)
    }

    /// Render a string literal.
    fn string_literal(&self, value: &str) -> String {
        escape_string(value)
    }

    /// Spell a data type.
    fn data_type(&self, data_type: &DataType, context: TypeContext) -> TranspileResult<String> {
        hive_type(self, data_type, context)
    }

    /// Keyword for regex matching (`RLIKE` / `REGEXP`).
    fn regexp_operator(&self) -> &'static str {
        "RLIKE"
    }

    fn supports_try_cast(&self) -> bool {
        false
    }

    fn supports_ilike(&self) -> bool {
        false
    }

    /// Render `DATE '...'` / `TIMESTAMP '...'`.
    fn typed_string(&self, data_type: &DataType, value: &str) -> TranspileResult<String> {
        Ok(format!(
            "{} {}",
            self.data_type(data_type, TypeContext::Cast)?,
            self.string_literal(value)
        ))
    }

    /// The infix string concatenation operator, if any. Without one the
    /// generator falls back to `CONCAT(...)`.
    fn concat_operator(&self) -> Option<&'static str> {
        None
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        let _ = kind;
        true
    }

    fn supports_lateral_view(&self) -> bool {
        true
    }

    fn supports_insert_overwrite(&self) -> bool {
        true
    }

    /// Storage format clause of CREATE TABLE.
    fn file_format(&self, format: &str) -> String {
        format!("STORED AS {}", format.to_ascii_uppercase())
    }

    /// `NULLS FIRST` / `NULLS LAST` in ORDER BY.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Row limiting clause, given already generated operands.
    fn limit_offset(&self, limit: Option<&str>, offset: Option<&str>) -> TranspileResult<Option<String>> {
        Ok(match (limit, offset) {
            (Some(limit), Some(offset)) => Some(format!("LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => Some(format!("LIMIT {}", limit)),
            (None, Some(offset)) => Some(format!("OFFSET {}", offset)),
            (None, None) => None,
        })
    }

    /// Error for something this dialect cannot express.
    fn unsupported(&self, feature: &str) -> TranspileError {
        TranspileError::unsupported(self.dialect(), feature)
    }
}

/// Spark/Hive type names, recursing through `generator` for nested types.
pub fn hive_type<G: SqlGenerator + ?Sized>(
    generator: &G,
    data_type: &DataType,
    context: TypeContext,
) -> TranspileResult<String> {
    Ok(match data_type {
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::TinyInt => "TINYINT".to_string(),
        DataType::SmallInt => "SMALLINT".to_string(),
        DataType::Int => "INT".to_string(),
        DataType::BigInt => "BIGINT".to_string(),
        DataType::Float => "FLOAT".to_string(),
        DataType::Double => "DOUBLE".to_string(),
        DataType::Decimal { precision, scale } => decimal(*precision, *scale),
        DataType::String => "STRING".to_string(),
        DataType::Varchar(len) => with_length("VARCHAR", *len),
        DataType::Char(len) => with_length("CHAR", *len),
        DataType::Date => "DATE".to_string(),
        DataType::Timestamp => "TIMESTAMP".to_string(),
        DataType::Binary => "BINARY".to_string(),
        DataType::Array(inner) => format!("ARRAY<{}>", generator.data_type(inner, context)?),
        DataType::Map(key, value) => format!(
            "MAP<{}, {}>",
            generator.data_type(key, context)?,
            generator.data_type(value, context)?
        ),
        DataType::Struct(fields) => {
            let fields = fields
                .iter()
                .map(|f| -> TranspileResult<String> {
                    Ok(format!(
                        "{}: {}",
                        generator.quote_identifier(&f.name),
                        generator.data_type(&f.data_type, context)?
                    ))
                })
                .collect::<TranspileResult<Vec<_>>>()?;
            format!("STRUCT<{}>", fields.join(", "))
        }
        DataType::Custom(name) => name.clone(),
    })
}

/// MySQL and Doris only accept OFFSET together with LIMIT.
pub fn mysql_limit<G: SqlGenerator + ?Sized>(
    generator: &G,
    limit: Option<&str>,
    offset: Option<&str>,
) -> TranspileResult<Option<String>> {
    match (limit, offset) {
        (Some(limit), Some(offset)) => Ok(Some(format!("LIMIT {} OFFSET {}", limit, offset))),
        (Some(limit), None) => Ok(Some(format!("LIMIT {}", limit))),
        (None, Some(_)) => Err(generator.unsupported("OFFSET without LIMIT")),
        (None, None) => Ok(None),
    }
}

pub fn decimal(precision: Option<u32>, scale: Option<u32>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) => format!("DECIMAL({}, {})", p, s),
        (Some(p), None) => format!("DECIMAL({})", p),
        _ => "DECIMAL".to_string(),
    }
}

pub fn with_length(name: &str, len: Option<u32>) -> String {
    match len {
        Some(n) => format!("{}({})", name, n),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier(&Ident::new("users")), "users");
        assert_eq!(escape_identifier(&Ident::new("order")), "`order`");
        assert_eq!(escape_identifier(&Ident::new("Order")), "`Order`");
        assert_eq!(escape_identifier(&Ident::new("my col")), "`my col`");
        assert_eq!(escape_identifier(&Ident::new("1st")), "`1st`");
        assert_eq!(escape_identifier(&Ident::quoted("Name")), "`Name`");
        assert_eq!(escape_identifier(&Ident::quoted("a`b")), "`a``b`");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("abc"), "'abc'");
        assert_eq!(escape_string("it's"), "'it\\'s'");
        assert_eq!(escape_string("a\\b"), "'a\\\\b'");
        assert_eq!(escape_string("line\nbreak"), "'line\\nbreak'");
    }

    #[test]
    fn test_decimal_spelling() {
        assert_eq!(decimal(Some(10), Some(2)), "DECIMAL(10, 2)");
        assert_eq!(decimal(Some(5), None), "DECIMAL(5)");
        assert_eq!(decimal(None, None), "DECIMAL");
    }
}
