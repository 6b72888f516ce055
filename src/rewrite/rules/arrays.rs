//! Higher-order array functions.
//!
//! Spark puts the array first and the lambda last; Doris takes the lambda
//! first.

use super::{bool_literal, hive_to_mysql, mysql_to_hive};
use crate::ast::{BinaryOp, Expr, Function, Literal};
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::traits::{RewriteContext, RewriteRule};

fn swap_args(f: Function, name: &str) -> Expr {
    let mut args = f.args;
    args.reverse();
    Expr::call(name, args)
}

fn lambda_arity(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Lambda { params, .. } => Some(params.len()),
        _ => None,
    }
}

pub struct HigherOrderFunctions;

impl RewriteRule for HigherOrderFunctions {
    fn id(&self) -> &'static str {
        "higher-order-functions"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let f = match expr {
            Expr::Function(f) if f.over.is_none() => f,
            other => return Ok(other),
        };
        let key = f.key();

        let target = match key.as_str() {
            "transform" => "ARRAY_MAP",
            "filter" => "ARRAY_FILTER",
            "exists" => "ARRAY_COUNT",
            "sort_array" => {
                return match f.args.get(1).map(bool_literal) {
                    None => Ok(Expr::call("ARRAY_SORT", f.args)),
                    Some(Some(true)) => Ok(Expr::call("ARRAY_SORT", vec![f.args[0].clone()])),
                    Some(Some(false)) => Ok(Expr::call("ARRAY_REVERSE_SORT", vec![f.args[0].clone()])),
                    Some(None) => Err(ctx.unsupported("sort_array with a non-literal direction")),
                };
            }
            _ => return Ok(Expr::Function(f)),
        };

        if f.args.len() != 2 {
            return Ok(Expr::Function(f));
        }
        match lambda_arity(&f.args[1]) {
            Some(1) => {}
            Some(_) => return Err(ctx.unsupported(format!("{} with an index lambda", key))),
            None => return Ok(Expr::Function(f)),
        }

        let call = swap_args(f, target);
        if key == "exists" {
            return Ok(Expr::binary(call, BinaryOp::Gt, Expr::number(0)));
        }
        Ok(call)
    }
}

pub struct ReverseHigherOrderFunctions;

impl RewriteRule for ReverseHigherOrderFunctions {
    fn id(&self) -> &'static str {
        "reverse-higher-order-functions"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let f = match expr {
            Expr::Function(f) if f.over.is_none() => f,
            other => return Ok(other),
        };

        Ok(match (f.key().as_str(), f.args.len()) {
            ("array_map", 2) if lambda_arity(&f.args[0]).is_some() => swap_args(f, "transform"),
            ("array_filter", 2) if lambda_arity(&f.args[0]).is_some() => swap_args(f, "filter"),
            ("array_sort", 1) => Expr::call("sort_array", f.args),
            ("array_reverse_sort", 1) => {
                let mut args = f.args;
                args.push(Expr::Literal(Literal::Boolean(false)));
                Expr::call("sort_array", args)
            }
            _ => Expr::Function(f),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{doris_to_spark, spark_to_doris, unsupported};
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lambda_moves_first() {
        let out = spark_to_doris("SELECT transform(xs, x -> x + 1), filter(xs, x -> x > 0) FROM t");
        assert_eq!(out.sql, "SELECT ARRAY_MAP(x -> x + 1, xs), ARRAY_FILTER(x -> x > 0, xs) FROM t");
        assert!(out.notes.is_empty());
    }

    #[test]
    fn test_exists_counts_matches() {
        assert_eq!(
            spark_to_doris("SELECT exists(xs, x -> x = 2) FROM t").sql,
            "SELECT ARRAY_COUNT(x -> x = 2, xs) > 0 FROM t"
        );
    }

    #[test]
    fn test_sort_array_direction() {
        assert_eq!(
            spark_to_doris("SELECT sort_array(xs), sort_array(xs, true), sort_array(xs, false) FROM t").sql,
            "SELECT ARRAY_SORT(xs), ARRAY_SORT(xs), ARRAY_REVERSE_SORT(xs) FROM t"
        );
        let feature = unsupported(Dialect::Spark, Dialect::Doris, "SELECT sort_array(xs, flag) FROM t");
        assert!(feature.contains("non-literal direction"), "{}", feature);
    }

    #[test]
    fn test_index_lambda_rejected() {
        let feature = unsupported(Dialect::Spark, Dialect::Doris, "SELECT transform(xs, (x, i) -> x + i) FROM t");
        assert_eq!(feature, "transform with an index lambda");
        let feature = unsupported(Dialect::Spark, Dialect::Doris, "SELECT filter(xs, (x, i) -> i > 0) FROM t");
        assert_eq!(feature, "filter with an index lambda");
    }

    #[test]
    fn test_reverse_puts_array_first() {
        assert_eq!(
            doris_to_spark("SELECT ARRAY_MAP(x -> x + 1, xs), ARRAY_FILTER(x -> x > 0, xs) FROM t").sql,
            "SELECT TRANSFORM(xs, x -> x + 1), FILTER(xs, x -> x > 0) FROM t"
        );
        assert_eq!(
            doris_to_spark("SELECT ARRAY_SORT(xs), ARRAY_REVERSE_SORT(xs) FROM t").sql,
            "SELECT SORT_ARRAY(xs), SORT_ARRAY(xs, FALSE) FROM t"
        );
    }
}
