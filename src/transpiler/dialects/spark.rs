use crate::ast::JoinKind;
use crate::dialect::Dialect;
use crate::transpiler::traits::SqlGenerator;

/// Spark SQL 3.x.
pub struct SparkGenerator;

impl SqlGenerator for SparkGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Spark
    }

    fn supports_try_cast(&self) -> bool {
        true
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn concat_operator(&self) -> Option<&'static str> {
        Some("||")
    }

    fn supports_join(&self, _kind: JoinKind) -> bool {
        true
    }

    fn file_format(&self, format: &str) -> String {
        format!("USING {}", format.to_ascii_lowercase())
    }
}
