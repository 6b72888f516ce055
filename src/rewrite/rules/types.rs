//! Data type defaults.

use super::hive_to_mysql;
use crate::ast::DataType;
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::traits::{RewriteContext, RewriteRule};

/// Spark reads a bare `DECIMAL` as `DECIMAL(10, 0)`; Doris defaults differ.
pub struct DecimalDefaults;

impl RewriteRule for DecimalDefaults {
    fn id(&self) -> &'static str {
        "decimal-defaults"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_type(&self, data_type: DataType, _ctx: &mut RewriteContext) -> TranspileResult<DataType> {
        Ok(match data_type {
            DataType::Decimal {
                precision: None,
                scale: None,
            } => DataType::Decimal {
                precision: Some(10),
                scale: Some(0),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{one, spark_to_doris};
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_decimal_gets_spark_default() {
        assert_eq!(
            spark_to_doris("SELECT CAST(a AS DECIMAL), CAST(b AS DECIMAL(18, 2)) FROM t").sql,
            "SELECT CAST(a AS DECIMAL(10, 0)), CAST(b AS DECIMAL(18, 2)) FROM t"
        );
        assert_eq!(
            spark_to_doris("CREATE TABLE t (id BIGINT, amount DECIMAL)").sql,
            "CREATE TABLE t (id BIGINT, amount DECIMAL(10, 0)) DUPLICATE KEY(id) \
             DISTRIBUTED BY HASH(id) BUCKETS AUTO PROPERTIES (\"replication_num\" = \"1\")"
        );
    }

    #[test]
    fn test_decimal_untouched_within_hive_family() {
        assert_eq!(
            one(Dialect::Hive, Dialect::Spark, "SELECT CAST(a AS DECIMAL) FROM t").sql,
            "SELECT CAST(a AS DECIMAL) FROM t"
        );
    }
}
