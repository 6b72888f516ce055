use crate::ast::{DataType, JoinKind};
use crate::dialect::Dialect;
use crate::error::{TranspileError, TranspileResult};
use crate::transpiler::traits::{SqlGenerator, TypeContext, decimal, mysql_limit, with_length};

/// MySQL 8.0.
pub struct MySqlGenerator;

/// Length MySQL needs for a VARCHAR column written without one.
const DEFAULT_VARCHAR: u32 = 255;

impl SqlGenerator for MySqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn data_type(&self, data_type: &DataType, context: TypeContext) -> TranspileResult<String> {
        Ok(match context {
            TypeContext::Column => match data_type {
                DataType::String => "TEXT".to_string(),
                DataType::Varchar(len) => format!("VARCHAR({})", len.unwrap_or(DEFAULT_VARCHAR)),
                DataType::Timestamp => "DATETIME".to_string(),
                DataType::Binary => "BLOB".to_string(),
                DataType::Boolean => "BOOLEAN".to_string(),
                DataType::TinyInt => "TINYINT".to_string(),
                DataType::SmallInt => "SMALLINT".to_string(),
                DataType::Int => "INT".to_string(),
                DataType::BigInt => "BIGINT".to_string(),
                DataType::Float => "FLOAT".to_string(),
                DataType::Double => "DOUBLE".to_string(),
                DataType::Decimal { precision, scale } => decimal(*precision, *scale),
                DataType::Char(len) => with_length("CHAR", *len),
                DataType::Date => "DATE".to_string(),
                DataType::Custom(name) => name.clone(),
                DataType::Array(_) | DataType::Map(..) | DataType::Struct(_) => return Err(complex(self)),
            },
            TypeContext::Cast => match data_type {
                DataType::Boolean
                | DataType::TinyInt
                | DataType::SmallInt
                | DataType::Int
                | DataType::BigInt => "SIGNED".to_string(),
                DataType::String | DataType::Char(None) | DataType::Varchar(None) => "CHAR".to_string(),
                DataType::Char(len) | DataType::Varchar(len) => with_length("CHAR", *len),
                DataType::Float => "FLOAT".to_string(),
                DataType::Double => "DOUBLE".to_string(),
                DataType::Decimal { precision, scale } => decimal(*precision, *scale),
                DataType::Date => "DATE".to_string(),
                DataType::Timestamp => "DATETIME".to_string(),
                DataType::Binary => "BINARY".to_string(),
                DataType::Custom(name) => name.clone(),
                DataType::Array(_) | DataType::Map(..) | DataType::Struct(_) => return Err(complex(self)),
            },
        })
    }

    fn regexp_operator(&self) -> &'static str {
        "REGEXP"
    }

    fn limit_offset(&self, limit: Option<&str>, offset: Option<&str>) -> TranspileResult<Option<String>> {
        mysql_limit(self, limit, offset)
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        !matches!(kind, JoinKind::FullOuter | JoinKind::LeftSemi | JoinKind::LeftAnti)
    }

    fn supports_lateral_view(&self) -> bool {
        false
    }

    fn supports_insert_overwrite(&self) -> bool {
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }
}

fn complex(g: &MySqlGenerator) -> TranspileError {
    g.unsupported("ARRAY, MAP and STRUCT types")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_cast_types() {
        let g = MySqlGenerator;
        let cast = |t: DataType| g.data_type(&t, TypeContext::Cast).unwrap();
        assert_eq!(cast(DataType::BigInt), "SIGNED");
        assert_eq!(cast(DataType::String), "CHAR");
        assert_eq!(cast(DataType::Varchar(Some(10))), "CHAR(10)");
        assert_eq!(cast(DataType::Timestamp), "DATETIME");
        assert_eq!(
            cast(DataType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }),
            "DECIMAL(10, 2)"
        );
    }

    #[test]
    fn test_mysql_column_types() {
        let g = MySqlGenerator;
        let col = |t: DataType| g.data_type(&t, TypeContext::Column).unwrap();
        assert_eq!(col(DataType::String), "TEXT");
        assert_eq!(col(DataType::Varchar(None)), "VARCHAR(255)");
        assert_eq!(col(DataType::Timestamp), "DATETIME");
    }

    #[test]
    fn test_mysql_complex_unsupported() {
        let err = MySqlGenerator
            .data_type(&DataType::Array(Box::new(DataType::Int)), TypeContext::Column)
            .unwrap_err();
        assert!(matches!(err, TranspileError::Unsupported { .. }));
    }
}
