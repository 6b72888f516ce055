//! Parse, rewrite, generate.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ast::Statement;
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::parser::parse;
use crate::rewrite::{RewriteContext, RuleRegistry};
use crate::transpiler::Generator;

/// Knobs that change the output without changing the dialect pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileOptions {
    /// Multi-line output.
    pub pretty: bool,
    /// User function renames, source name to target name.
    pub functions: BTreeMap<String, String>,
    pub doris: DorisOptions,
}

impl TranspileOptions {
    /// Case-insensitive lookup in [`Self::functions`].
    pub fn function_override(&self, name: &str) -> Option<&str> {
        self.functions
            .iter()
            .find(|(from, _)| from.eq_ignore_ascii_case(name))
            .map(|(_, to)| to.as_str())
    }
}

/// Defaults injected into generated Doris tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DorisOptions {
    /// `None` is `BUCKETS AUTO`.
    #[serde(serialize_with = "serialize_buckets", deserialize_with = "deserialize_buckets")]
    pub buckets: Option<u32>,
    pub replication_num: u32,
}

impl Default for DorisOptions {
    fn default() -> Self {
        Self {
            buckets: None,
            replication_num: 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Buckets {
    Count(u32),
    Word(String),
}

fn deserialize_buckets<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match Buckets::deserialize(deserializer)? {
        Buckets::Count(n) => Ok(Some(n)),
        Buckets::Word(word) if word.eq_ignore_ascii_case("auto") => Ok(None),
        Buckets::Word(word) => word
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("buckets must be \"auto\" or an integer, got '{}'", word))),
    }
}

fn serialize_buckets<S: Serializer>(buckets: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match buckets {
        Some(n) => serializer.serialize_u32(*n),
        None => serializer.serialize_str("auto"),
    }
}

/// One transpiled statement and the notes about lossy rewrites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transpiled {
    pub sql: String,
    pub notes: Vec<String>,
}

/// Transpiles SQL text from one dialect to another.
pub struct Transpiler {
    read: Dialect,
    write: Dialect,
    options: TranspileOptions,
    registry: RuleRegistry,
}

impl Transpiler {
    pub fn new(read: Dialect, write: Dialect) -> Self {
        Self::with_options(read, write, TranspileOptions::default())
    }

    pub fn with_options(read: Dialect, write: Dialect, options: TranspileOptions) -> Self {
        Self {
            read,
            write,
            options,
            registry: RuleRegistry::new(),
        }
    }

    pub fn read(&self) -> Dialect {
        self.read
    }

    pub fn write(&self) -> Dialect {
        self.write
    }

    pub fn options(&self) -> &TranspileOptions {
        &self.options
    }

    /// Replace the rule set, e.g. to add project-specific rules.
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// One output statement per input statement.
    pub fn transpile(&self, sql: &str) -> TranspileResult<Vec<String>> {
        Ok(self.transpile_detailed(sql)?.into_iter().map(|t| t.sql).collect())
    }

    pub fn transpile_detailed(&self, sql: &str) -> TranspileResult<Vec<Transpiled>> {
        parse(sql, self.read)?
            .into_iter()
            .map(|statement| self.transpile_statement(statement))
            .collect()
    }

    /// Rewrite and print an already parsed statement.
    pub fn transpile_statement(&self, statement: Statement) -> TranspileResult<Transpiled> {
        let mut ctx = RewriteContext::new(self.read, self.write, &self.options);
        let statement = self.registry.rewrite(statement, &mut ctx)?;
        let sql = Generator::new(self.write)
            .pretty(self.options.pretty)
            .statement(&statement)?;
        Ok(Transpiled {
            sql,
            notes: ctx.take_notes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranspileError;
    use pretty_assertions::assert_eq;

    fn spark_to_doris(sql: &str) -> String {
        let mut out = Transpiler::new(Dialect::Spark, Dialect::Doris).transpile(sql).unwrap();
        assert_eq!(out.len(), 1);
        out.remove(0)
    }

    fn doris_to_spark(sql: &str) -> String {
        let mut out = Transpiler::new(Dialect::Doris, Dialect::Spark).transpile(sql).unwrap();
        assert_eq!(out.len(), 1);
        out.remove(0)
    }

    #[test]
    fn test_spark_functions_to_doris() {
        assert_eq!(
            spark_to_doris("select nvl(a, 0), date_add(dt, 7), date_format(ts, 'yyyy-MM-dd') from t"),
            "SELECT IFNULL(a, 0), DATE_ADD(dt, INTERVAL 7 DAY), DATE_FORMAT(ts, '%Y-%m-%d') FROM t"
        );
        assert_eq!(spark_to_doris("select a || b from t"), "SELECT CONCAT(a, b) FROM t");
    }

    #[test]
    fn test_lateral_view_split_to_doris() {
        assert_eq!(
            spark_to_doris("select id, x from t lateral view explode(split(s, ',')) tmp as x"),
            "SELECT id, x FROM t LATERAL VIEW EXPLODE_SPLIT(s, ',') tmp AS x"
        );
    }

    #[test]
    fn test_static_partition_insert_to_doris() {
        let transpiler = Transpiler::new(Dialect::Spark, Dialect::Doris);
        let out = transpiler
            .transpile_detailed("INSERT OVERWRITE TABLE t PARTITION (dt = '2024-01-01') SELECT a, b FROM s")
            .unwrap();
        assert_eq!(out[0].sql, "INSERT OVERWRITE TABLE t SELECT a, b, '2024-01-01' FROM s");
        assert_eq!(out[0].notes.len(), 1);
    }

    #[test]
    fn test_create_table_to_doris() {
        let transpiler = Transpiler::new(Dialect::Spark, Dialect::Doris);
        let out = transpiler
            .transpile_detailed("CREATE TABLE t (id BIGINT, name STRING) USING parquet PARTITIONED BY (dt STRING)")
            .unwrap();
        assert_eq!(
            out[0].sql,
            "CREATE TABLE t (id BIGINT, name STRING, dt STRING) DUPLICATE KEY(id) \
             DISTRIBUTED BY HASH(id) BUCKETS AUTO PROPERTIES (\"replication_num\" = \"1\")"
        );
        assert_eq!(out[0].notes.len(), 2);
    }

    #[test]
    fn test_doris_options() {
        let options = TranspileOptions {
            doris: DorisOptions {
                buckets: Some(8),
                replication_num: 3,
            },
            ..Default::default()
        };
        let out = Transpiler::with_options(Dialect::Spark, Dialect::Doris, options)
            .transpile("CREATE TABLE t (id BIGINT)")
            .unwrap();
        assert_eq!(
            out[0],
            "CREATE TABLE t (id BIGINT) DUPLICATE KEY(id) DISTRIBUTED BY HASH(id) BUCKETS 8 \
             PROPERTIES (\"replication_num\" = \"3\")"
        );
    }

    #[test]
    fn test_doris_to_spark() {
        assert_eq!(
            doris_to_spark(
                "SELECT IFNULL(a, 0), DATE_ADD(d, INTERVAL 3 DAY), DATE_ADD(d, INTERVAL 2 HOUR), ARRAY_SIZE(arr) FROM t"
            ),
            "SELECT IFNULL(a, 0), DATE_ADD(d, 3), d + INTERVAL 2 HOUR, SIZE(arr) FROM t"
        );
        assert_eq!(
            doris_to_spark("select a from t where b regexp 'x' limit 5"),
            "SELECT a FROM t WHERE b RLIKE 'x' LIMIT 5"
        );
    }

    #[test]
    fn test_user_function_override() {
        let mut options = TranspileOptions::default();
        options.functions.insert("My_Udf".to_string(), "doris_udf".to_string());
        assert_eq!(options.function_override("my_udf"), Some("doris_udf"));

        let out = Transpiler::with_options(Dialect::Spark, Dialect::Doris, options)
            .transpile("SELECT my_udf(a) FROM t")
            .unwrap();
        assert_eq!(out, vec!["SELECT DORIS_UDF(a) FROM t"]);
    }

    #[test]
    fn test_unsupported_is_reported() {
        let err = Transpiler::new(Dialect::Spark, Dialect::Doris)
            .transpile("SELECT split(s, '[,;]') FROM t")
            .unwrap_err();
        assert!(matches!(err, TranspileError::Unsupported { dialect: Dialect::Doris, .. }));
    }

    #[test]
    fn test_same_dialect_normalizes() {
        let out = Transpiler::new(Dialect::Spark, Dialect::Spark)
            .transpile("select a from t; select  b\nfrom u")
            .unwrap();
        assert_eq!(out, vec!["SELECT a FROM t", "SELECT b FROM u"]);
    }

    #[test]
    fn test_pretty_option() {
        let options = TranspileOptions {
            pretty: true,
            ..Default::default()
        };
        let out = Transpiler::with_options(Dialect::Spark, Dialect::Doris, options)
            .transpile("select nvl(a, 0) from t")
            .unwrap();
        assert_eq!(out[0], "SELECT\n  IFNULL(a, 0)\nFROM t");
    }

    #[test]
    fn test_decimal_literal_keeps_fraction() {
        assert_eq!(spark_to_doris("SELECT 1.5BD"), "SELECT CAST(1.5 AS DECIMAL(2, 1))");
        let out = Transpiler::new(Dialect::Spark, Dialect::MySql)
            .transpile("SELECT 1.5BD, CAST(a AS DECIMAL)")
            .unwrap();
        assert_eq!(out, vec!["SELECT CAST(1.5 AS DECIMAL(2, 1)), CAST(a AS DECIMAL(10, 0))"]);
    }

    #[test]
    fn test_buckets_deserialize() {
        let auto: DorisOptions = toml::from_str("buckets = \"auto\"").unwrap();
        assert_eq!(auto.buckets, None);
        assert_eq!(auto.replication_num, 1);

        let fixed: DorisOptions = toml::from_str("buckets = 16\nreplication_num = 3").unwrap();
        assert_eq!(fixed.buckets, Some(16));
        assert_eq!(fixed.replication_num, 3);

        assert!(toml::from_str::<DorisOptions>("buckets = \"many\"").is_err());
    }
}
