//! # sqlshift
//!
//! SQL dialect transpiler for moving SparkSQL and Hive jobs onto Apache Doris
//! (and back).
//!
//! ```text
//! SQL text ─► tokenizer ─► parser ─► AST ─► rewrite rules ─► generator ─► SQL text
//! ```
//!
//! ## Quick Example
//!
//! ```
//! use sqlshift::Dialect;
//!
//! let out = sqlshift::transpile(
//!     "select nvl(a, 0), a || b from t",
//!     Dialect::Spark,
//!     Dialect::Doris,
//!     false,
//! )
//! .unwrap();
//! assert_eq!(out, vec!["SELECT IFNULL(a, 0), CONCAT(a, b) FROM t"]);
//! ```
//!
//! ## Dialects
//!
//! | Dialect | Family | Notes                                  |
//! |---------|--------|----------------------------------------|
//! | `spark` | Hive   | SparkSQL, `USING` table formats        |
//! | `hive`  | Hive   | HiveQL, `STORED AS`                    |
//! | `doris` | MySQL  | Apache Doris, key and bucket models    |
//! | `mysql` | MySQL  | plain MySQL 8                          |

pub mod ast;
pub mod batch;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod guide;
pub mod parser;
pub mod pipeline;
pub mod rewrite;
pub mod tokenizer;
pub mod transpiler;

pub use dialect::{Dialect, Family};
pub use error::{TranspileError, TranspileResult};
pub use parser::parse;
pub use pipeline::{DorisOptions, TranspileOptions, Transpiled, Transpiler};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::dialect::{Dialect, Family};
    pub use crate::engine::DorisVerifier;
    pub use crate::error::*;
    pub use crate::parser::parse;
    pub use crate::pipeline::{TranspileOptions, Transpiler};
    pub use crate::rewrite::{RewriteContext, RewriteRule, RuleRegistry};
    pub use crate::transpiler::ToSql;
}

/// Transpile `sql` from `read` to `write`, one string per statement.
///
/// # Example
///
/// ```
/// use sqlshift::Dialect;
///
/// let out = sqlshift::transpile("SELECT IFNULL(a, 0) FROM t", Dialect::Doris, Dialect::Spark, false).unwrap();
/// assert_eq!(out, vec!["SELECT IFNULL(a, 0) FROM t"]);
/// ```
pub fn transpile(sql: &str, read: Dialect, write: Dialect, pretty: bool) -> TranspileResult<Vec<String>> {
    let options = TranspileOptions {
        pretty,
        ..Default::default()
    };
    Transpiler::with_options(read, write, options).transpile(sql)
}
