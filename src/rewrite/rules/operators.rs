//! Operators without a direct Doris spelling.

use super::{call_named, hive_to_mysql};
use crate::ast::{BinaryOp, Expr, LikeKind};
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::traits::{RewriteContext, RewriteRule};

/// `a || b || c` to `CONCAT(a, b, c)`.
pub struct ConcatOperator;

impl RewriteRule for ConcatOperator {
    fn id(&self) -> &'static str {
        "concat-operator"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let (left, right) = match expr {
            Expr::Binary {
                left,
                op: BinaryOp::Concat,
                right,
            } => (left, right),
            other => return Ok(other),
        };

        // the left operand was already rewritten, so a chain arrives as CONCAT(...)
        let mut args = match call_named(&left, "concat") {
            Some(inner) if !inner.distinct => inner.args.clone(),
            _ => vec![*left],
        };
        args.push(*right);
        Ok(Expr::call("CONCAT", args))
    }
}

/// `a ILIKE p` to `LOWER(a) LIKE LOWER(p)`.
pub struct ILikeToLower;

impl RewriteRule for ILikeToLower {
    fn id(&self) -> &'static str {
        "ilike-to-lower"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        match expr {
            Expr::Like {
                expr,
                pattern,
                negated,
                kind: LikeKind::ILike,
            } => Ok(Expr::Like {
                expr: Box::new(Expr::call("LOWER", vec![*expr])),
                pattern: Box::new(Expr::call("LOWER", vec![*pattern])),
                negated,
                kind: LikeKind::Like,
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{one, spark_to_doris};
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_concat_chain_flattens() {
        assert_eq!(
            spark_to_doris("SELECT a || b || c FROM t").sql,
            "SELECT CONCAT(a, b, c) FROM t"
        );
        assert_eq!(
            spark_to_doris("SELECT concat(a, b) || '-' || c FROM t").sql,
            "SELECT CONCAT(a, b, '-', c) FROM t"
        );
    }

    #[test]
    fn test_ilike_lowers_both_sides() {
        assert_eq!(
            spark_to_doris("SELECT a FROM t WHERE name ILIKE 'ab%'").sql,
            "SELECT a FROM t WHERE LOWER(name) LIKE LOWER('ab%')"
        );
        assert_eq!(
            one(Dialect::Hive, Dialect::MySql, "SELECT a FROM t WHERE name NOT ILIKE 'x'").sql,
            "SELECT a FROM t WHERE LOWER(name) NOT LIKE LOWER('x')"
        );
    }

    #[test]
    fn test_operators_kept_between_spark_and_hive() {
        assert_eq!(
            one(Dialect::Spark, Dialect::Spark, "SELECT a || b FROM t WHERE c ILIKE 'x'").sql,
            "SELECT a || b FROM t WHERE c ILIKE 'x'"
        );
    }
}
