use super::Generator;
use super::traits::TypeContext;
use crate::ast::*;
use crate::error::TranspileResult;

/// Binds tighter than anything; never needs parentheses.
const ATOM: u8 = u8::MAX;

impl Generator {
    pub fn expr(&mut self, expr: &Expr) -> TranspileResult<String> {
        Ok(match expr {
            Expr::Column(parts) => parts.iter().map(|p| self.ident(p)).collect::<Vec<_>>().join("."),
            Expr::Literal(literal) => self.literal(literal),
            Expr::TypedString { data_type, value } => self.dialect.typed_string(data_type, value)?,
            Expr::Interval { value, unit } => {
                format!("INTERVAL {} {}", self.operand(value, UNARY_PRECEDENCE)?, unit.keyword())
            }
            Expr::Unary { op, expr } => self.unary(*op, expr)?,
            Expr::Binary { left, op, right } => self.binary(left, *op, right)?,
            Expr::Function(function) => self.function(function)?,
            Expr::Cast { expr, data_type, safe } => {
                let keyword = if *safe && self.dialect.supports_try_cast() {
                    "TRY_CAST"
                } else {
                    "CAST"
                };
                format!(
                    "{}({} AS {})",
                    keyword,
                    self.expr(expr)?,
                    self.dialect.data_type(data_type, TypeContext::Cast)?
                )
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                let mut sql = String::from("CASE");
                if let Some(operand) = operand {
                    sql.push(' ');
                    sql.push_str(&self.expr(operand)?);
                }
                for (when, then) in branches {
                    sql.push_str(&format!(" WHEN {} THEN {}", self.expr(when)?, self.expr(then)?));
                }
                if let Some(else_result) = else_result {
                    sql.push_str(&format!(" ELSE {}", self.expr(else_result)?));
                }
                sql.push_str(" END");
                sql
            }
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => format!(
                "{} {}BETWEEN {} AND {}",
                self.operand(expr, PREDICATE_PRECEDENCE)?,
                not(*negated),
                self.operand(low, PREDICATE_PRECEDENCE + 1)?,
                self.operand(high, PREDICATE_PRECEDENCE + 1)?
            ),
            Expr::InList { expr, list, negated } => format!(
                "{} {}IN ({})",
                self.operand(expr, PREDICATE_PRECEDENCE)?,
                not(*negated),
                self.expr_list(list)?
            ),
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => format!(
                "{} {}IN {}",
                self.operand(expr, PREDICATE_PRECEDENCE)?,
                not(*negated),
                self.subquery(subquery)?
            ),
            Expr::IsNull { expr, negated } => format!(
                "{} IS {}NULL",
                self.operand(expr, PREDICATE_PRECEDENCE)?,
                not(*negated)
            ),
            Expr::Like {
                expr,
                pattern,
                negated,
                kind,
            } => self.like(expr, pattern, *negated, *kind)?,
            Expr::Exists { subquery, negated } => format!("{}EXISTS {}", not(*negated), self.subquery(subquery)?),
            Expr::Subquery(query) => self.subquery(query)?,
            Expr::Nested(inner) => format!("({})", self.expr(inner)?),
            Expr::Subscript { expr, index } => {
                format!("{}[{}]", self.operand(expr, UNARY_PRECEDENCE + 1)?, self.expr(index)?)
            }
            Expr::Field { expr, field } => {
                format!("{}.{}", self.operand(expr, UNARY_PRECEDENCE + 1)?, self.ident(field))
            }
            Expr::Lambda { params, body } => {
                let params = match params.as_slice() {
                    [single] => self.ident(single),
                    many => format!("({})", self.idents(many)),
                };
                format!("{} -> {}", params, self.expr(body)?)
            }
            Expr::Wildcard => "*".to_string(),
        })
    }

    pub(super) fn expr_list(&mut self, exprs: &[Expr]) -> TranspileResult<String> {
        Ok(exprs
            .iter()
            .map(|e| self.expr(e))
            .collect::<TranspileResult<Vec<_>>>()?
            .join(", "))
    }

    fn literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::Number(n) => n.clone(),
            Literal::String(s) => self.dialect.string_literal(s),
            Literal::Boolean(true) => "TRUE".to_string(),
            Literal::Boolean(false) => "FALSE".to_string(),
            Literal::Null => "NULL".to_string(),
        }
    }

    /// How tightly `expr` binds once printed.
    fn precedence(&self, expr: &Expr) -> u8 {
        match expr {
            Expr::Binary {
                op: BinaryOp::Concat, ..
            } if self.dialect.concat_operator().is_none() => ATOM,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { op: UnaryOp::Not, .. } => NOT_PRECEDENCE,
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            Expr::Exists { negated: true, .. } => NOT_PRECEDENCE,
            Expr::Between { .. }
            | Expr::InList { .. }
            | Expr::InSubquery { .. }
            | Expr::IsNull { .. }
            | Expr::Like { .. } => PREDICATE_PRECEDENCE,
            Expr::Lambda { .. } => 0,
            _ => ATOM,
        }
    }

    /// Render `expr`, parenthesized if it binds looser than `min`.
    fn operand(&mut self, expr: &Expr, min: u8) -> TranspileResult<String> {
        let sql = self.expr(expr)?;
        if self.precedence(expr) < min {
            Ok(format!("({})", sql))
        } else {
            Ok(sql)
        }
    }

    fn unary(&mut self, op: UnaryOp, expr: &Expr) -> TranspileResult<String> {
        if op == UnaryOp::Not {
            return Ok(format!("NOT {}", self.operand(expr, NOT_PRECEDENCE)?));
        }
        let symbol = match op {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            _ => "~",
        };
        let operand = self.operand(expr, UNARY_PRECEDENCE)?;
        // `--` would start a comment
        if operand.starts_with(symbol) {
            Ok(format!("{} {}", symbol, operand))
        } else {
            Ok(format!("{}{}", symbol, operand))
        }
    }

    fn binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> TranspileResult<String> {
        if op == BinaryOp::Concat && self.dialect.concat_operator().is_none() {
            let mut parts = Vec::new();
            flatten_concat(left, &mut parts);
            flatten_concat(right, &mut parts);
            let args = parts
                .into_iter()
                .map(|e| self.expr(e))
                .collect::<TranspileResult<Vec<_>>>()?;
            return Ok(format!("CONCAT({})", args.join(", ")));
        }

        let precedence = op.precedence();
        let left = self.operand(left, precedence)?;
        let right = self.operand(right, precedence + 1)?;
        Ok(format!("{} {} {}", left, self.binary_op(op), right))
    }

    fn binary_op(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
            BinaryOp::Eq => "=",
            BinaryOp::NullSafeEq => "<=>",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Concat => self.dialect.concat_operator().unwrap_or("||"),
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::IntDiv => "DIV",
        }
    }

    fn like(&mut self, expr: &Expr, pattern: &Expr, negated: bool, kind: LikeKind) -> TranspileResult<String> {
        if kind == LikeKind::ILike && !self.dialect.supports_ilike() {
            return Ok(format!(
                "LOWER({}) {}LIKE LOWER({})",
                self.expr(expr)?,
                not(negated),
                self.expr(pattern)?
            ));
        }
        let keyword = match kind {
            LikeKind::Like => "LIKE",
            LikeKind::ILike => "ILIKE",
            LikeKind::RLike => self.dialect.regexp_operator(),
        };
        Ok(format!(
            "{} {}{} {}",
            self.operand(expr, PREDICATE_PRECEDENCE)?,
            not(negated),
            keyword,
            self.operand(pattern, PREDICATE_PRECEDENCE + 1)?
        ))
    }

    pub(super) fn function(&mut self, function: &Function) -> TranspileResult<String> {
        let name = match function.name.0.split_last() {
            Some((last, qualifiers)) if !qualifiers.is_empty() => {
                let mut parts: Vec<String> = qualifiers.iter().map(|q| self.ident(q)).collect();
                parts.push(last.value.to_ascii_uppercase());
                parts.join(".")
            }
            _ => function.name.last().to_ascii_uppercase(),
        };

        let mut sql = format!(
            "{}({}{})",
            name,
            if function.distinct { "DISTINCT " } else { "" },
            self.expr_list(&function.args)?
        );
        if let Some(window) = &function.over {
            sql.push_str(&format!(" OVER ({})", self.window(window)?));
        }
        Ok(sql)
    }

    fn window(&mut self, window: &WindowSpec) -> TranspileResult<String> {
        let mut parts = Vec::new();
        if !window.partition_by.is_empty() {
            parts.push(format!("PARTITION BY {}", self.expr_list(&window.partition_by)?));
        }
        if !window.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_list(&window.order_by)?));
        }
        if let Some(frame) = &window.frame {
            let units = match frame.units {
                FrameUnits::Rows => "ROWS",
                FrameUnits::Range => "RANGE",
            };
            let start = self.frame_bound(&frame.start)?;
            parts.push(match &frame.end {
                Some(end) => format!("{} BETWEEN {} AND {}", units, start, self.frame_bound(end)?),
                None => format!("{} {}", units, start),
            });
        }
        Ok(parts.join(" "))
    }

    fn frame_bound(&mut self, bound: &FrameBound) -> TranspileResult<String> {
        Ok(match bound {
            FrameBound::UnboundedPreceding => "UNBOUNDED PRECEDING".to_string(),
            FrameBound::Preceding(n) => format!("{} PRECEDING", self.expr(n)?),
            FrameBound::CurrentRow => "CURRENT ROW".to_string(),
            FrameBound::Following(n) => format!("{} FOLLOWING", self.expr(n)?),
            FrameBound::UnboundedFollowing => "UNBOUNDED FOLLOWING".to_string(),
        })
    }

    pub(super) fn order_by_expr(&mut self, item: &OrderByExpr) -> TranspileResult<String> {
        let mut sql = self.expr(&item.expr)?;
        match item.asc {
            Some(true) => sql.push_str(" ASC"),
            Some(false) => sql.push_str(" DESC"),
            None => {}
        }
        if let Some(nulls_first) = item.nulls_first {
            if !self.dialect.supports_nulls_ordering() {
                return Err(self.dialect.unsupported("NULLS FIRST / NULLS LAST"));
            }
            sql.push_str(if nulls_first { " NULLS FIRST" } else { " NULLS LAST" });
        }
        Ok(sql)
    }

    pub(super) fn order_by_list(&mut self, items: &[OrderByExpr]) -> TranspileResult<String> {
        Ok(items
            .iter()
            .map(|item| self.order_by_expr(item))
            .collect::<TranspileResult<Vec<_>>>()?
            .join(", "))
    }
}

fn not(negated: bool) -> &'static str {
    if negated { "NOT " } else { "" }
}

/// Operands of a `||` chain, left to right.
fn flatten_concat<'e>(expr: &'e Expr, out: &mut Vec<&'e Expr>) {
    match expr {
        Expr::Binary {
            left,
            op: BinaryOp::Concat,
            right,
        } => {
            flatten_concat(left, out);
            flatten_concat(right, out);
        }
        other => out.push(other),
    }
}
