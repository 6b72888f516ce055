use crate::ast::DataType;
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::transpiler::traits::{SqlGenerator, TypeContext, hive_type, mysql_limit};

/// Apache Doris 2.x.
pub struct DorisGenerator;

impl SqlGenerator for DorisGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Doris
    }

    fn data_type(&self, data_type: &DataType, context: TypeContext) -> TranspileResult<String> {
        match data_type {
            DataType::Timestamp => Ok("DATETIME".to_string()),
            DataType::Binary => Ok("STRING".to_string()),
            other => hive_type(self, other, context),
        }
    }

    fn regexp_operator(&self) -> &'static str {
        "REGEXP"
    }

    fn limit_offset(&self, limit: Option<&str>, offset: Option<&str>) -> TranspileResult<Option<String>> {
        mysql_limit(self, limit, offset)
    }

    /// Doris has no typed string literals.
    fn typed_string(&self, data_type: &DataType, value: &str) -> TranspileResult<String> {
        Ok(format!(
            "CAST({} AS {})",
            self.string_literal(value),
            self.data_type(data_type, TypeContext::Cast)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doris_types() {
        let g = DorisGenerator;
        let ty = |t: DataType| g.data_type(&t, TypeContext::Column).unwrap();
        assert_eq!(ty(DataType::Timestamp), "DATETIME");
        assert_eq!(ty(DataType::Binary), "STRING");
        assert_eq!(ty(DataType::Array(Box::new(DataType::Timestamp))), "ARRAY<DATETIME>");
        assert_eq!(
            ty(DataType::Map(Box::new(DataType::String), Box::new(DataType::BigInt))),
            "MAP<STRING, BIGINT>"
        );
    }

    #[test]
    fn test_doris_typed_string() {
        let g = DorisGenerator;
        assert_eq!(
            g.typed_string(&DataType::Date, "2024-01-01").unwrap(),
            "CAST('2024-01-01' AS DATE)"
        );
        assert_eq!(
            g.typed_string(&DataType::Timestamp, "2024-01-01 00:00:00").unwrap(),
            "CAST('2024-01-01 00:00:00' AS DATETIME)"
        );
    }
}
