//! Hive-only query clauses and lateral views.

use super::functions::split_from_literal;
use super::{call_named, hive_to_mysql, mysql_to_hive};
use crate::ast::{Expr, Function, Ident, LateralView, OrderByExpr, Query, Select, SelectItem};
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::traits::{RewriteContext, RewriteRule};

/// Functions that return rows rather than a value.
const GENERATORS: &[&str] = &[
    "explode",
    "explode_outer",
    "posexplode",
    "posexplode_outer",
    "inline",
    "inline_outer",
    "stack",
];

/// `SORT BY` / `CLUSTER BY` / `DISTRIBUTE BY` have no Doris equivalent.
pub struct HiveClauses;

impl RewriteRule for HiveClauses {
    fn id(&self) -> &'static str {
        "hive-clauses"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_query(&self, mut query: Query, ctx: &mut RewriteContext) -> TranspileResult<Query> {
        if !query.cluster_by.is_empty() {
            let cluster_by = std::mem::take(&mut query.cluster_by);
            if query.order_by.is_empty() {
                query.order_by = cluster_by
                    .into_iter()
                    .map(|expr| OrderByExpr {
                        expr,
                        asc: None,
                        nulls_first: None,
                    })
                    .collect();
            }
            ctx.note("CLUSTER BY rewritten as a global ORDER BY");
        }
        if !query.sort_by.is_empty() {
            let sort_by = std::mem::take(&mut query.sort_by);
            if query.order_by.is_empty() {
                query.order_by = sort_by;
            }
            ctx.note("SORT BY rewritten as a global ORDER BY");
        }
        if !query.distribute_by.is_empty() {
            query.distribute_by.clear();
            ctx.note("DISTRIBUTE BY dropped");
        }
        Ok(query)
    }
}

/// Doris spells outer and split explodes as separate functions and needs
/// both aliases.
pub struct LateralViews;

impl RewriteRule for LateralViews {
    fn id(&self) -> &'static str {
        "lateral-views"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write) && write == Dialect::Doris
    }

    fn rewrite_select(&self, mut select: Select, _ctx: &mut RewriteContext) -> TranspileResult<Select> {
        for (i, lv) in select.lateral_views.iter_mut().enumerate() {
            let key = lv.function.key();

            if key == "explode" && lv.function.args.len() == 1 {
                if let Some(split) = call_named(&lv.function.args[0], "split_by_string") {
                    lv.function = Function::new("EXPLODE_SPLIT", split.args.clone());
                }
            }
            if lv.outer {
                let name = format!("{}_OUTER", lv.function.key().to_ascii_uppercase());
                lv.function.rename(&name);
                lv.outer = false;
            }

            if lv.table_alias.is_none() {
                lv.table_alias = Some(Ident::new(format!("lv{}", i + 1)));
            }
            if lv.column_aliases.is_empty() {
                lv.column_aliases = default_columns(&key);
            }
        }
        Ok(select)
    }
}

/// Spark's implicit output column names for a generator.
fn default_columns(function: &str) -> Vec<Ident> {
    let names: &[&str] = if function.starts_with("posexplode") {
        &["pos", "col"]
    } else {
        &["col"]
    };
    names.iter().map(|n| Ident::new(*n)).collect()
}

/// Generators in the SELECT list only exist in Spark/Hive.
pub struct GeneratorInSelect;

impl RewriteRule for GeneratorInSelect {
    fn id(&self) -> &'static str {
        "generator-in-select"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_select(&self, select: Select, ctx: &mut RewriteContext) -> TranspileResult<Select> {
        for item in &select.projection {
            if let SelectItem::Expr {
                expr: Expr::Function(f),
                ..
            } = item
            {
                let key = f.key();
                if GENERATORS.contains(&key.as_str()) {
                    return Err(ctx.unsupported(format!(
                        "table-generating function {} in the SELECT list (use LATERAL VIEW)",
                        key.to_ascii_uppercase()
                    )));
                }
            }
        }
        Ok(select)
    }
}

pub struct ReverseLateralViews;

impl RewriteRule for ReverseLateralViews {
    fn id(&self) -> &'static str {
        "reverse-lateral-views"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_select(&self, mut select: Select, ctx: &mut RewriteContext) -> TranspileResult<Select> {
        for lv in &mut select.lateral_views {
            reverse_lateral_view(lv, ctx)?;
        }
        Ok(select)
    }
}

fn reverse_lateral_view(lv: &mut LateralView, ctx: &RewriteContext) -> TranspileResult<()> {
    let mut key = lv.function.key();
    if let Some(base) = key.strip_suffix("_outer") {
        let base = base.to_string();
        lv.function.rename(&base);
        lv.outer = true;
        key = base;
    }
    if key == "explode_split" {
        let split = split_from_literal(&lv.function, ctx)?;
        lv.function = Function::new("explode", vec![Expr::Function(split)]);
    }
    Ok(())
}
