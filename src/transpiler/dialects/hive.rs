use crate::ast::JoinKind;
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::transpiler::traits::SqlGenerator;

/// HiveQL. Same lexical rules as Spark, fewer features.
pub struct HiveGenerator;

impl SqlGenerator for HiveGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Hive
    }

    fn concat_operator(&self) -> Option<&'static str> {
        Some("||")
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        kind != JoinKind::LeftAnti
    }

    /// Hive has no OFFSET keyword, only `LIMIT offset, rows`.
    fn limit_offset(&self, limit: Option<&str>, offset: Option<&str>) -> TranspileResult<Option<String>> {
        match (limit, offset) {
            (Some(limit), Some(offset)) => Ok(Some(format!("LIMIT {}, {}", offset, limit))),
            (Some(limit), None) => Ok(Some(format!("LIMIT {}", limit))),
            (None, Some(_)) => Err(self.unsupported("OFFSET without LIMIT")),
            (None, None) => Ok(None),
        }
    }
}
