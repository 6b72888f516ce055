//! SQL dialects understood by sqlshift.
//!
//! Dialects are grouped into families that share lexical rules. Rewrite rules
//! are keyed on the family pair; the generator hooks are keyed on the dialect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TranspileError;

/// A named SQL variant.
///
/// Serializes as its canonical name and deserializes through [`FromStr`], so
/// config files accept the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dialect {
    Spark,
    Hive,
    Doris,
    #[serde(rename = "mysql")]
    MySql,
}

/// Dialects sharing lexical conventions and most function names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// SparkSQL and HiveQL.
    Hive,
    /// Apache Doris and MySQL.
    MySql,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Dialect::Spark, Dialect::Hive, Dialect::Doris, Dialect::MySql];

    pub fn family(self) -> Family {
        match self {
            Dialect::Spark | Dialect::Hive => Family::Hive,
            Dialect::Doris | Dialect::MySql => Family::MySql,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Spark => "spark",
            Dialect::Hive => "hive",
            Dialect::Doris => "doris",
            Dialect::MySql => "mysql",
        }
    }

    /// Spark/Hive typed numeric literals such as `10L` or `1.5BD`.
    pub fn numeric_suffixes(self) -> bool {
        self.family() == Family::Hive
    }

    /// MySQL-style `# comment` lines.
    pub fn hash_comments(self) -> bool {
        self.family() == Family::MySql
    }

    /// `||` is string concatenation (Hive family) or logical OR (MySQL family).
    pub fn pipes_as_concat(self) -> bool {
        self.family() == Family::Hive
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = TranspileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spark" | "sparksql" | "spark2" => Ok(Dialect::Spark),
            "hive" => Ok(Dialect::Hive),
            "doris" => Ok(Dialect::Doris),
            "mysql" => Ok(Dialect::MySql),
            other => Err(TranspileError::Config(format!(
                "unknown dialect '{}'. Expected one of: spark, hive, doris, mysql",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = TranspileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("SparkSQL".parse::<Dialect>().unwrap(), Dialect::Spark);
        assert_eq!("spark2".parse::<Dialect>().unwrap(), Dialect::Spark);
        assert_eq!(" Doris ".parse::<Dialect>().unwrap(), Dialect::Doris);
        assert_eq!("MYSQL".parse::<Dialect>().unwrap(), Dialect::MySql);
    }

    #[test]
    fn test_unknown_dialect() {
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(err.to_string().contains("unknown dialect 'oracle'"));
    }

    #[test]
    fn test_families() {
        assert_eq!(Dialect::Hive.family(), Family::Hive);
        assert_eq!(Dialect::Doris.family(), Family::MySql);
        assert!(Dialect::Spark.pipes_as_concat());
        assert!(!Dialect::Doris.pipes_as_concat());
        assert!(Dialect::MySql.hash_comments());
    }

    #[test]
    fn test_deserialize_uses_from_str() {
        #[derive(Deserialize)]
        struct Pair {
            read: Dialect,
            write: Dialect,
        }
        let pair: Pair = toml::from_str("read = \"SparkSQL\"\nwrite = \"Doris\"").unwrap();
        assert_eq!(pair.read, Dialect::Spark);
        assert_eq!(pair.write, Dialect::Doris);
        assert!(toml::from_str::<Pair>("read = \"oracle\"\nwrite = \"doris\"").is_err());
        assert_eq!(serde_json::to_string(&Dialect::MySql).unwrap(), "\"mysql\"");
    }

    #[test]
    fn test_display_round_trip() {
        for d in Dialect::ALL {
            assert_eq!(d.to_string().parse::<Dialect>().unwrap(), d);
        }
    }
}
