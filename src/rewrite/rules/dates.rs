//! Date arithmetic, format patterns and truncation.

use super::{call_named, hive_to_mysql, mysql_to_hive, string_arg};
use crate::ast::{BinaryOp, DataType, Expr, Function, IntervalUnit};
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::timefmt::{Converted, java_to_mysql, mysql_to_java};
use crate::rewrite::traits::{RewriteContext, RewriteRule};

fn interval(value: Expr, unit: IntervalUnit) -> Expr {
    Expr::Interval {
        value: Box::new(value),
        unit,
    }
}

/// A unit argument written as a bare word (`DAY`) or a string (`'day'`).
fn unit_arg(expr: &Expr) -> Option<IntervalUnit> {
    match expr {
        Expr::Column(parts) if parts.len() == 1 => IntervalUnit::from_keyword(&parts[0].value),
        _ => expr.as_str_literal().and_then(IntervalUnit::from_keyword),
    }
}

fn take_call(expr: Expr) -> Result<Function, Expr> {
    match expr {
        Expr::Function(f) if f.over.is_none() => Ok(f),
        other => Err(other),
    }
}

/// `date_add(d, n)` counts days; Doris wants an explicit interval.
pub struct DateArithmetic;

impl RewriteRule for DateArithmetic {
    fn id(&self) -> &'static str {
        "date-arithmetic"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let f = match take_call(expr) {
            Ok(f) => f,
            Err(other) => return Ok(other),
        };
        let key = f.key();

        match (key.as_str(), f.args.len()) {
            ("date_add" | "date_sub", 2) => {
                let mut args = f.args;
                let amount = args.remove(1);
                let amount = match amount {
                    Expr::Interval { .. } => amount,
                    days => interval(days, IntervalUnit::Day),
                };
                args.push(amount);
                Ok(Expr::call(&key.to_ascii_uppercase(), args))
            }
            ("date_add" | "dateadd" | "timestampadd", 3) => {
                let Some(unit) = unit_arg(&f.args[0]) else {
                    return Err(ctx.unsupported(format!("{} with a non-literal unit", key)));
                };
                let mut args = f.args.into_iter().skip(1);
                match (args.next(), args.next()) {
                    (Some(amount), Some(ts)) => Ok(Expr::call("DATE_ADD", vec![ts, interval(amount, unit)])),
                    _ => Err(ctx.unsupported(key.as_str())),
                }
            }
            ("datediff" | "timestampdiff", 3) => {
                if unit_arg(&f.args[0]).is_none() {
                    return Err(ctx.unsupported(format!("{} with a non-literal unit", key)));
                }
                Ok(Expr::call("TIMESTAMPDIFF", f.args))
            }
            _ => Ok(Expr::Function(f)),
        }
    }
}

pub struct ReverseDateArithmetic;

impl RewriteRule for ReverseDateArithmetic {
    fn id(&self) -> &'static str {
        "reverse-date-arithmetic"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let f = match take_call(expr) {
            Ok(f) => f,
            Err(other) => return Ok(other),
        };
        let (spark_name, op) = match f.key().as_str() {
            "date_add" | "adddate" | "days_add" => ("date_add", BinaryOp::Plus),
            "date_sub" | "subdate" | "days_sub" => ("date_sub", BinaryOp::Minus),
            _ => return Ok(Expr::Function(f)),
        };
        let Ok([date, amount]) = <[Expr; 2]>::try_from(f.args.clone()) else {
            return Ok(Expr::Function(f));
        };

        Ok(match amount {
            Expr::Interval {
                value,
                unit: IntervalUnit::Day,
            } => Expr::call(spark_name, vec![date, *value]),
            Expr::Interval { value, unit } => Expr::binary(date, op, interval(*value, unit)),
            days => Expr::call(spark_name, vec![date, days]),
        })
    }
}

/// Converts the format argument at `index` in place.
fn convert_format(
    f: &mut Function,
    index: usize,
    convert: fn(&str) -> Result<Converted, String>,
    ctx: &mut RewriteContext,
) -> TranspileResult<()> {
    let Some(arg) = f.args.get_mut(index) else {
        return Ok(());
    };
    let Some(pattern) = arg.as_str_literal() else {
        return Err(ctx.unsupported(format!("{} with a non-literal format", f.name.last())));
    };
    match convert(pattern) {
        Ok(converted) => {
            for approximation in &converted.approximations {
                ctx.note(format!("{} in '{}'", approximation, pattern));
            }
            *arg = Expr::string(converted.pattern);
            Ok(())
        }
        Err(token) => Err(ctx.unsupported(format!(
            "date format pattern '{}' in '{}'",
            token, pattern
        ))),
    }
}

/// Java pattern letters to `%` specifiers.
pub struct TimeFormats;

impl RewriteRule for TimeFormats {
    fn id(&self) -> &'static str {
        "time-formats"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let mut f = match take_call(expr) {
            Ok(f) => f,
            Err(other) => return Ok(other),
        };

        match (f.key().as_str(), f.args.len()) {
            ("date_format" | "from_unixtime" | "unix_timestamp" | "to_unix_timestamp", _) => {
                convert_format(&mut f, 1, java_to_mysql, ctx)?;
                Ok(Expr::Function(f))
            }
            ("to_date", 2) => {
                convert_format(&mut f, 1, java_to_mysql, ctx)?;
                f.rename("STR_TO_DATE");
                Ok(Expr::cast(Expr::Function(f), DataType::Date))
            }
            ("to_timestamp", 1) => Ok(Expr::cast(f.args.remove(0), DataType::Timestamp)),
            ("to_timestamp", 2) => {
                convert_format(&mut f, 1, java_to_mysql, ctx)?;
                f.rename("STR_TO_DATE");
                Ok(Expr::Function(f))
            }
            _ => Ok(Expr::Function(f)),
        }
    }
}

pub struct ReverseTimeFormats;

impl RewriteRule for ReverseTimeFormats {
    fn id(&self) -> &'static str {
        "reverse-time-formats"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let mut f = match take_call(expr) {
            Ok(f) => f,
            Err(other) => return Ok(other),
        };

        match f.key().as_str() {
            "date_format" | "from_unixtime" | "unix_timestamp" => {
                convert_format(&mut f, 1, mysql_to_java, ctx)?;
            }
            "str_to_date" => {
                convert_format(&mut f, 1, mysql_to_java, ctx)?;
                f.rename("to_timestamp");
            }
            _ => {}
        }
        Ok(Expr::Function(f))
    }
}

/// Canonical Doris unit for a Spark truncation format.
fn trunc_unit(format: &str) -> Option<&'static str> {
    Some(match format.to_ascii_lowercase().as_str() {
        "year" | "yyyy" | "yy" => "year",
        "quarter" => "quarter",
        "month" | "mon" | "mm" => "month",
        "week" => "week",
        "day" | "dd" => "day",
        "hour" => "hour",
        "minute" => "minute",
        "second" => "second",
        _ => return None,
    })
}

/// `date_trunc(fmt, ts)` and `trunc(d, fmt)` to `DATE_TRUNC(ts, 'unit')`.
pub struct DateTrunc;

impl RewriteRule for DateTrunc {
    fn id(&self) -> &'static str {
        "date-trunc"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let (f, unit_index, ts_index) = if let Some(f) = call_named(&expr, "date_trunc") {
            (f, 0, 1)
        } else if let Some(f) = call_named(&expr, "trunc") {
            (f, 1, 0)
        } else {
            return Ok(expr);
        };
        if f.args.len() != 2 {
            return Ok(expr);
        }

        let Some(format) = string_arg(f, unit_index) else {
            return Err(ctx.unsupported(format!("{} with a non-literal unit", f.name.last())));
        };
        let Some(unit) = trunc_unit(format) else {
            return Err(ctx.unsupported(format!("truncation unit '{}'", format)));
        };
        Ok(Expr::call(
            "DATE_TRUNC",
            vec![f.args[ts_index].clone(), Expr::string(unit)],
        ))
    }
}

pub struct ReverseDateTrunc;

impl RewriteRule for ReverseDateTrunc {
    fn id(&self) -> &'static str {
        "reverse-date-trunc"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let Some(f) = call_named(&expr, "date_trunc") else {
            return Ok(expr);
        };
        if f.args.len() != 2 {
            return Ok(expr);
        }
        // Doris accepts both argument orders.
        let (unit, ts) = match (string_arg(f, 0), string_arg(f, 1)) {
            (Some(unit), _) => (unit, &f.args[1]),
            (None, Some(unit)) => (unit, &f.args[0]),
            (None, None) => return Ok(expr),
        };
        Ok(Expr::call(
            "date_trunc",
            vec![Expr::string(unit.to_ascii_uppercase()), ts.clone()],
        ))
    }
}
