//! Function renames and argument fix-ups.

use super::{call_named, hive_to_mysql, mysql_to_hive, string_arg};
use crate::ast::{Expr, Function};
use crate::dialect::Dialect;
use crate::error::TranspileResult;
use crate::rewrite::traits::{RewriteContext, RewriteRule};

/// Same-meaning functions spelled differently in Doris.
const RENAMES: &[(&str, &str)] = &[
    ("nvl", "IFNULL"),
    ("size", "ARRAY_SIZE"),
    ("cardinality", "ARRAY_SIZE"),
    ("get_json_object", "GET_JSON_STRING"),
    ("length", "CHAR_LENGTH"),
    ("lcase", "LOWER"),
    ("ucase", "UPPER"),
    ("base64", "TO_BASE64"),
    ("unbase64", "FROM_BASE64"),
    ("shiftleft", "BIT_SHIFT_LEFT"),
    ("shiftright", "BIT_SHIFT_RIGHT"),
    ("slice", "ARRAY_SLICE"),
    ("add_months", "MONTHS_ADD"),
    ("ceiling", "CEIL"),
    ("random", "RAND"),
    ("first", "ANY_VALUE"),
    ("to_unix_timestamp", "UNIX_TIMESTAMP"),
];

/// The invertible subset of [`RENAMES`], Doris name first.
const REVERSE_RENAMES: &[(&str, &str)] = &[
    ("array_size", "size"),
    ("get_json_string", "get_json_object"),
    ("to_base64", "base64"),
    ("from_base64", "unbase64"),
    ("bit_shift_left", "shiftleft"),
    ("bit_shift_right", "shiftright"),
    ("array_slice", "slice"),
    ("months_add", "add_months"),
];

const REGEX_META: &[char] = &['.', '[', ']', '{', '}', '(', ')', '*', '+', '?', '^', '$', '|', '\\'];

fn lookup<'t>(table: &'t [(&str, &'t str)], key: &str) -> Option<&'t str> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Renames from the `[functions]` config table. Runs before everything else
/// and in every direction.
pub struct UserFunctions;

impl RewriteRule for UserFunctions {
    fn id(&self) -> &'static str {
        "user-functions"
    }

    fn priority(&self) -> u32 {
        300
    }

    fn applies(&self, _read: Dialect, _write: Dialect) -> bool {
        true
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        match expr {
            Expr::Function(mut f) => {
                if let Some(target) = ctx.options.function_override(&f.key()) {
                    tracing::debug!(from = %f.key(), to = %target, "user function override");
                    f.rename(target);
                }
                Ok(Expr::Function(f))
            }
            other => Ok(other),
        }
    }
}

pub struct FunctionRenames;

impl RewriteRule for FunctionRenames {
    fn id(&self) -> &'static str {
        "function-renames"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let mut f = match expr {
            Expr::Function(f) => f,
            other => return Ok(other),
        };
        let key = f.key();

        if key == "nvl2" && f.over.is_none() {
            match <[Expr; 3]>::try_from(f.args) {
                Ok([test, then, otherwise]) => {
                    let not_null = Expr::IsNull {
                        expr: Box::new(test),
                        negated: true,
                    };
                    return Ok(Expr::call("IF", vec![not_null, then, otherwise]));
                }
                Err(args) => f.args = args,
            }
        }

        if key == "first" && f.over.is_some() {
            f.rename("FIRST_VALUE");
        } else if let Some(target) = lookup(RENAMES, &key) {
            f.rename(target);
        }
        Ok(Expr::Function(f))
    }
}

pub struct ReverseFunctionRenames;

impl RewriteRule for ReverseFunctionRenames {
    fn id(&self) -> &'static str {
        "reverse-function-renames"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        match expr {
            Expr::Function(mut f) => {
                if let Some(target) = lookup(REVERSE_RENAMES, &f.key()) {
                    f.rename(target);
                }
                Ok(Expr::Function(f))
            }
            other => Ok(other),
        }
    }
}

/// Doris requires the group index of `regexp_extract`.
pub struct RegexpDefaults;

impl RewriteRule for RegexpDefaults {
    fn id(&self) -> &'static str {
        "regexp-defaults"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        match expr {
            Expr::Function(mut f) if f.key() == "regexp_extract" && f.args.len() == 2 => {
                f.args.push(Expr::number(1));
                Ok(Expr::Function(f))
            }
            other => Ok(other),
        }
    }
}

/// `split` takes a regex in Spark; Doris only splits on a literal.
pub struct Split;

impl RewriteRule for Split {
    fn id(&self) -> &'static str {
        "split"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        hive_to_mysql(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let Some(f) = call_named(&expr, "split") else {
            return Ok(expr);
        };
        if f.args.len() != 2 {
            return Err(ctx.unsupported("split with a limit argument"));
        }
        let Some(pattern) = string_arg(f, 1) else {
            return Err(ctx.unsupported("split on a non-literal pattern"));
        };
        let Some(delimiter) = regex_literal(pattern) else {
            return Err(ctx.unsupported(format!("split on regex '{}'", pattern)));
        };
        Ok(Expr::call(
            "SPLIT_BY_STRING",
            vec![f.args[0].clone(), Expr::string(delimiter)],
        ))
    }
}

pub struct ReverseSplit;

impl RewriteRule for ReverseSplit {
    fn id(&self) -> &'static str {
        "reverse-split"
    }

    fn applies(&self, read: Dialect, write: Dialect) -> bool {
        mysql_to_hive(read, write)
    }

    fn rewrite_expr(&self, expr: Expr, ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        let Some(f) = call_named(&expr, "split_by_string") else {
            return Ok(expr);
        };
        Ok(Expr::Function(split_from_literal(f, ctx)?))
    }
}

/// `SPLIT_BY_STRING(s, d)` as a Spark `split(s, regex)` call.
pub(crate) fn split_from_literal(f: &Function, ctx: &RewriteContext) -> TranspileResult<Function> {
    match (f.args.first(), string_arg(f, 1)) {
        (Some(subject), Some(delimiter)) if f.args.len() == 2 => Ok(Function::new(
            "split",
            vec![subject.clone(), Expr::string(regex_escape(delimiter))],
        )),
        _ => Err(ctx.unsupported("SPLIT_BY_STRING on a non-literal delimiter")),
    }
}

/// The literal text matched by `pattern`, if it has no regex operators.
pub(crate) fn regex_literal(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let next = chars.next()?;
            if !REGEX_META.contains(&next) && next != '-' && next != '/' {
                return None;
            }
            out.push(next);
        } else if REGEX_META.contains(&c) {
            return None;
        } else {
            out.push(c);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

pub(crate) fn regex_escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 4);
    for c in literal.chars() {
        if REGEX_META.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
