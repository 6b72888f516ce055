//! Built-in rewrite rules.

mod arrays;
mod clauses;
mod dates;
mod ddl;
mod functions;
mod operators;
mod types;

pub use arrays::{HigherOrderFunctions, ReverseHigherOrderFunctions};
pub use clauses::{GeneratorInSelect, HiveClauses, LateralViews, ReverseLateralViews};
pub use dates::{DateArithmetic, DateTrunc, ReverseDateArithmetic, ReverseDateTrunc, ReverseTimeFormats, TimeFormats};
pub use ddl::{DorisTableDefaults, ReverseDorisTableOptions, StaticPartitionInsert};
pub use functions::{FunctionRenames, RegexpDefaults, ReverseFunctionRenames, ReverseSplit, Split, UserFunctions};
pub use operators::{ConcatOperator, ILikeToLower};
pub use types::DecimalDefaults;

use super::traits::RewriteRule;
use crate::ast::{Expr, Function, Literal};
use crate::dialect::{Dialect, Family};

/// Every built-in rule, unsorted.
pub fn builtin() -> Vec<Box<dyn RewriteRule>> {
    vec![
        Box::new(UserFunctions),
        Box::new(DateArithmetic),
        Box::new(TimeFormats),
        Box::new(DateTrunc),
        Box::new(HigherOrderFunctions),
        Box::new(RegexpDefaults),
        Box::new(Split),
        Box::new(FunctionRenames),
        Box::new(ConcatOperator),
        Box::new(ILikeToLower),
        Box::new(HiveClauses),
        Box::new(LateralViews),
        Box::new(GeneratorInSelect),
        Box::new(DecimalDefaults),
        Box::new(StaticPartitionInsert),
        Box::new(DorisTableDefaults),
        Box::new(ReverseDateArithmetic),
        Box::new(ReverseTimeFormats),
        Box::new(ReverseDateTrunc),
        Box::new(ReverseHigherOrderFunctions),
        Box::new(ReverseFunctionRenames),
        Box::new(ReverseSplit),
        Box::new(ReverseLateralViews),
        Box::new(ReverseDorisTableOptions),
    ]
}

/// Spark/Hive into Doris/MySQL.
fn hive_to_mysql(read: Dialect, write: Dialect) -> bool {
    read.family() == Family::Hive && write.family() == Family::MySql
}

/// Doris/MySQL into Spark/Hive.
fn mysql_to_hive(read: Dialect, write: Dialect) -> bool {
    read.family() == Family::MySql && write.family() == Family::Hive
}

/// Borrow the call when `expr` is a function named `name`.
fn call_named<'e>(expr: &'e Expr, name: &str) -> Option<&'e Function> {
    match expr {
        Expr::Function(f) if f.over.is_none() && f.key() == name => Some(f),
        _ => None,
    }
}

fn string_arg(f: &Function, index: usize) -> Option<&str> {
    f.args.get(index).and_then(Expr::as_str_literal)
}

fn bool_literal(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Literal(Literal::Boolean(b)) => Some(*b),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::dialect::Dialect;
    use crate::error::TranspileError;
    use crate::pipeline::{Transpiled, Transpiler};

    /// Transpile input holding exactly one statement.
    pub fn one(read: Dialect, write: Dialect, sql: &str) -> Transpiled {
        let mut out = Transpiler::new(read, write).transpile_detailed(sql).unwrap();
        assert_eq!(out.len(), 1, "expected one statement from {:?}", sql);
        out.remove(0)
    }

    pub fn spark_to_doris(sql: &str) -> Transpiled {
        one(Dialect::Spark, Dialect::Doris, sql)
    }

    pub fn doris_to_spark(sql: &str) -> Transpiled {
        one(Dialect::Doris, Dialect::Spark, sql)
    }

    /// The feature named by the `Unsupported` error `sql` fails with.
    pub fn unsupported(read: Dialect, write: Dialect, sql: &str) -> String {
        match Transpiler::new(read, write).transpile(sql) {
            Err(TranspileError::Unsupported { feature, .. }) => feature,
            other => panic!("expected an Unsupported error for {:?}, got {:?}", sql, other),
        }
    }
}
