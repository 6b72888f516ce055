//! Expression and data type parsing.
//!
//! Precedence, lowest to highest:
//! - OR, AND, prefix NOT
//! - comparisons, IS, IN, BETWEEN, LIKE/RLIKE
//! - | ^ &
//! - + - || (concat)
//! - * / % DIV
//! - unary - + ~, then subscripts

use super::{is_reserved, Parser};
use crate::ast::*;
use crate::error::TranspileResult;
use crate::tokenizer::{NumberSuffix, Symbol, Token};

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> TranspileResult<Expr> {
        self.parse_subexpr(0)
    }

    fn parse_subexpr(&mut self, min_precedence: u8) -> TranspileResult<Expr> {
        self.nested(|p| p.parse_subexpr_inner(min_precedence))
    }

    fn parse_subexpr_inner(&mut self, min_precedence: u8) -> TranspileResult<Expr> {
        let mut left = self.parse_prefix()?;
        loop {
            let precedence = self.next_precedence();
            if precedence == 0 || precedence <= min_precedence {
                break;
            }
            left = self.parse_infix(left, precedence)?;
        }
        Ok(left)
    }

    fn next_precedence(&self) -> u8 {
        match self.peek() {
            Some(Token::Word(w)) => match w.to_ascii_lowercase().as_str() {
                "or" => BinaryOp::Or.precedence(),
                "and" => BinaryOp::And.precedence(),
                "not" => {
                    let negatable = ["in", "between", "like", "ilike", "rlike", "regexp"];
                    if negatable.iter().any(|kw| self.peek_keyword_at(1, kw)) {
                        PREDICATE_PRECEDENCE
                    } else {
                        0
                    }
                }
                "is" | "in" | "between" | "like" | "ilike" | "rlike" | "regexp" => {
                    PREDICATE_PRECEDENCE
                }
                "div" => BinaryOp::IntDiv.precedence(),
                _ => 0,
            },
            Some(Token::Symbol(s)) => match self.binary_op(*s) {
                Some(op) => op.precedence(),
                None => 0,
            },
            _ => 0,
        }
    }

    fn binary_op(&self, symbol: Symbol) -> Option<BinaryOp> {
        Some(match symbol {
            Symbol::Eq | Symbol::DoubleEq => BinaryOp::Eq,
            Symbol::NullSafeEq => BinaryOp::NullSafeEq,
            Symbol::NotEq | Symbol::LtGt => BinaryOp::NotEq,
            Symbol::Lt => BinaryOp::Lt,
            Symbol::LtEq => BinaryOp::LtEq,
            Symbol::Gt => BinaryOp::Gt,
            Symbol::GtEq => BinaryOp::GtEq,
            Symbol::Pipe => BinaryOp::BitOr,
            Symbol::Caret => BinaryOp::BitXor,
            Symbol::Amp => BinaryOp::BitAnd,
            Symbol::Plus => BinaryOp::Plus,
            Symbol::Minus => BinaryOp::Minus,
            Symbol::Concat if self.dialect.pipes_as_concat() => BinaryOp::Concat,
            Symbol::Concat => BinaryOp::Or,
            Symbol::Star => BinaryOp::Multiply,
            Symbol::Slash => BinaryOp::Divide,
            Symbol::Percent => BinaryOp::Modulo,
            _ => return None,
        })
    }

    fn parse_infix(&mut self, left: Expr, precedence: u8) -> TranspileResult<Expr> {
        if let Some(Token::Symbol(s)) = self.peek() {
            let symbol = *s;
            if let Some(op) = self.binary_op(symbol) {
                self.index += 1;
                let right = self.parse_subexpr(precedence)?;
                return Ok(Expr::binary(left, op, right));
            }
        }

        if self.parse_keyword("or") {
            let right = self.parse_subexpr(precedence)?;
            return Ok(Expr::binary(left, BinaryOp::Or, right));
        }
        if self.parse_keyword("and") {
            let right = self.parse_subexpr(precedence)?;
            return Ok(Expr::binary(left, BinaryOp::And, right));
        }
        if self.parse_keyword("div") {
            let right = self.parse_subexpr(precedence)?;
            return Ok(Expr::binary(left, BinaryOp::IntDiv, right));
        }
        if self.parse_keyword("is") {
            let negated = self.parse_keyword("not");
            self.expect_keyword("null")?;
            return Ok(Expr::IsNull {
                expr: Box::new(left),
                negated,
            });
        }

        let negated = self.parse_keyword("not");
        if self.parse_keyword("in") {
            return self.parse_in(left, negated);
        }
        if self.parse_keyword("between") {
            let low = self.parse_subexpr(PREDICATE_PRECEDENCE)?;
            self.expect_keyword("and")?;
            let high = self.parse_subexpr(PREDICATE_PRECEDENCE)?;
            return Ok(Expr::Between {
                expr: Box::new(left),
                negated,
                low: Box::new(low),
                high: Box::new(high),
            });
        }
        let kind = if self.parse_keyword("like") {
            LikeKind::Like
        } else if self.parse_keyword("ilike") {
            LikeKind::ILike
        } else if self.parse_keyword("rlike") || self.parse_keyword("regexp") {
            LikeKind::RLike
        } else {
            return Err(self.expected("operator"));
        };
        let pattern = self.parse_subexpr(PREDICATE_PRECEDENCE)?;
        Ok(Expr::Like {
            expr: Box::new(left),
            pattern: Box::new(pattern),
            negated,
            kind,
        })
    }

    fn parse_in(&mut self, left: Expr, negated: bool) -> TranspileResult<Expr> {
        self.expect_symbol(Symbol::LParen)?;
        if self.peek_query_start(0) {
            let subquery = self.parse_query()?;
            self.expect_symbol(Symbol::RParen)?;
            return Ok(Expr::InSubquery {
                expr: Box::new(left),
                subquery: Box::new(subquery),
                negated,
            });
        }
        let list = self.parse_comma_separated_exprs()?;
        self.expect_symbol(Symbol::RParen)?;
        Ok(Expr::InList {
            expr: Box::new(left),
            list,
            negated,
        })
    }

    pub(crate) fn parse_comma_separated_exprs(&mut self) -> TranspileResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.consume_symbol(Symbol::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_prefix(&mut self) -> TranspileResult<Expr> {
        if self.peek_keyword("not") && !self.peek_keyword_at(1, "exists") {
            self.index += 1;
            let expr = self.parse_subexpr(NOT_PRECEDENCE)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            });
        }

        let unary = match self.peek() {
            Some(Token::Symbol(Symbol::Minus)) => Some(UnaryOp::Minus),
            Some(Token::Symbol(Symbol::Plus)) => Some(UnaryOp::Plus),
            Some(Token::Symbol(Symbol::Tilde)) => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = unary {
            self.index += 1;
            let expr = self.parse_subexpr(UNARY_PRECEDENCE)?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> TranspileResult<Expr> {
        loop {
            if self.consume_symbol(Symbol::LBracket) {
                let index = self.parse_expr()?;
                self.expect_symbol(Symbol::RBracket)?;
                expr = Expr::Subscript {
                    expr: Box::new(expr),
                    index: Box::new(index),
                };
            } else if !matches!(expr, Expr::Column(_)) && self.peek_symbol(Symbol::Dot) {
                self.index += 1;
                let field = self.parse_identifier()?;
                expr = Expr::Field {
                    expr: Box::new(expr),
                    field,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> TranspileResult<Expr> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.expected("expression"));
        };

        match token {
            Token::Number { text, suffix } => {
                self.index += 1;
                let literal = Expr::Literal(Literal::Number(text));
                Ok(match suffix {
                    None => literal,
                    Some(suffix) => {
                        let data_type = suffix_type(suffix, literal_text(&literal));
                        Expr::cast(literal, data_type)
                    }
                })
            }
            Token::String(s) => {
                self.index += 1;
                Ok(Expr::string(s))
            }
            Token::Symbol(Symbol::LParen) => self.parse_parenthesized(),
            Token::Word(w) => self.parse_word_expr(&w),
            Token::QuotedIdent(_) => self.parse_column_or_call(),
            Token::Symbol(_) => Err(self.expected("expression")),
        }
    }

    fn parse_parenthesized(&mut self) -> TranspileResult<Expr> {
        if self.peek_query_start(1) {
            self.index += 1;
            let query = self.parse_query()?;
            self.expect_symbol(Symbol::RParen)?;
            return Ok(Expr::Subquery(Box::new(query)));
        }
        if let Some(params) = self.lambda_params_ahead() {
            return self.parse_lambda(params);
        }
        self.index += 1;
        let inner = self.parse_expr()?;
        self.expect_symbol(Symbol::RParen)?;
        Ok(Expr::Nested(Box::new(inner)))
    }

    /// Look for `(a, b) ->` at the cursor and return the parameter count.
    fn lambda_params_ahead(&self) -> Option<usize> {
        let mut n = 1;
        let mut params = 0;
        loop {
            match self.peek_nth(n) {
                Some(Token::Word(_)) | Some(Token::QuotedIdent(_)) => params += 1,
                _ => return None,
            }
            n += 1;
            if self.peek_symbol_at(n, Symbol::Comma) {
                n += 1;
                continue;
            }
            if self.peek_symbol_at(n, Symbol::RParen) && self.peek_symbol_at(n + 1, Symbol::Arrow) {
                return Some(params);
            }
            return None;
        }
    }

    fn parse_lambda(&mut self, params: usize) -> TranspileResult<Expr> {
        let names = if params == 0 {
            vec![self.parse_identifier()?]
        } else {
            self.parse_identifier_list()?
        };
        self.expect_symbol(Symbol::Arrow)?;
        let body = self.parse_expr()?;
        Ok(Expr::Lambda {
            params: names,
            body: Box::new(body),
        })
    }

    fn parse_word_expr(&mut self, word: &str) -> TranspileResult<Expr> {
        let lower = word.to_ascii_lowercase();
        let next_is_paren = self.peek_symbol_at(1, Symbol::LParen);

        match lower.as_str() {
            "true" | "false" => {
                self.index += 1;
                Ok(Expr::Literal(Literal::Boolean(lower == "true")))
            }
            "null" => {
                self.index += 1;
                Ok(Expr::Literal(Literal::Null))
            }
            "case" => {
                self.index += 1;
                self.parse_case()
            }
            "cast" | "try_cast" if next_is_paren => {
                self.index += 1;
                self.parse_cast(lower == "try_cast")
            }
            "exists" if next_is_paren && self.peek_query_start(1) => {
                self.index += 1;
                self.parse_exists(false)
            }
            "not" if self.peek_keyword_at(1, "exists") => {
                self.index += 2;
                self.parse_exists(true)
            }
            "interval" => {
                self.index += 1;
                self.parse_interval()
            }
            "date" | "timestamp" if matches!(self.peek_nth(1), Some(Token::String(_))) => {
                self.index += 1;
                let value = self.parse_string_literal()?;
                let data_type = if lower == "date" {
                    DataType::Date
                } else {
                    DataType::Timestamp
                };
                Ok(Expr::TypedString { data_type, value })
            }
            "current_date" | "current_timestamp" if !next_is_paren => {
                self.index += 1;
                Ok(Expr::Function(Function::new(&lower, Vec::new())))
            }
            _ if self.peek_symbol_at(1, Symbol::Arrow) => self.parse_lambda(0),
            _ => self.parse_column_or_call(),
        }
    }

    fn parse_column_or_call(&mut self) -> TranspileResult<Expr> {
        let mut parts = vec![self.parse_identifier()?];
        while self.peek_symbol(Symbol::Dot)
            && matches!(self.peek_nth(1), Some(Token::Word(_)) | Some(Token::QuotedIdent(_)))
        {
            self.index += 1;
            parts.push(self.parse_identifier()?);
        }

        if self.peek_symbol(Symbol::LParen) {
            let function = self.parse_function(ObjectName(parts))?;
            return Ok(Expr::Function(function));
        }
        Ok(Expr::Column(parts))
    }

    pub(crate) fn parse_function(&mut self, name: ObjectName) -> TranspileResult<Function> {
        self.expect_symbol(Symbol::LParen)?;
        let distinct = self.parse_keyword("distinct");
        if !distinct {
            self.parse_keyword("all");
        }

        let mut args = Vec::new();
        if !self.peek_symbol(Symbol::RParen) {
            loop {
                if self.peek_symbol(Symbol::Star) {
                    self.index += 1;
                    args.push(Expr::Wildcard);
                } else {
                    args.push(self.parse_expr()?);
                }
                if !self.consume_symbol(Symbol::Comma) {
                    break;
                }
            }
        }
        self.expect_symbol(Symbol::RParen)?;

        let over = if self.parse_keyword("over") {
            Some(self.parse_window_spec()?)
        } else {
            None
        };

        Ok(Function {
            name,
            args,
            distinct,
            over,
        })
    }

    fn parse_window_spec(&mut self) -> TranspileResult<WindowSpec> {
        self.expect_symbol(Symbol::LParen)?;
        let partition_by = if self.parse_keywords(&["partition", "by"]) {
            self.parse_comma_separated_exprs()?
        } else {
            Vec::new()
        };
        let order_by = if self.parse_keywords(&["order", "by"]) {
            self.parse_order_by_list()?
        } else {
            Vec::new()
        };

        let units = if self.parse_keyword("rows") {
            Some(FrameUnits::Rows)
        } else if self.parse_keyword("range") {
            Some(FrameUnits::Range)
        } else {
            None
        };
        let frame = match units {
            Some(units) => Some(self.parse_window_frame(units)?),
            None => None,
        };

        self.expect_symbol(Symbol::RParen)?;
        Ok(WindowSpec {
            partition_by,
            order_by,
            frame,
        })
    }

    fn parse_window_frame(&mut self, units: FrameUnits) -> TranspileResult<WindowFrame> {
        if self.parse_keyword("between") {
            let start = self.parse_frame_bound()?;
            self.expect_keyword("and")?;
            let end = self.parse_frame_bound()?;
            return Ok(WindowFrame {
                units,
                start,
                end: Some(end),
            });
        }
        Ok(WindowFrame {
            units,
            start: self.parse_frame_bound()?,
            end: None,
        })
    }

    fn parse_frame_bound(&mut self) -> TranspileResult<FrameBound> {
        if self.parse_keywords(&["current", "row"]) {
            return Ok(FrameBound::CurrentRow);
        }
        if self.parse_keyword("unbounded") {
            if self.parse_keyword("preceding") {
                return Ok(FrameBound::UnboundedPreceding);
            }
            self.expect_keyword("following")?;
            return Ok(FrameBound::UnboundedFollowing);
        }
        let offset = Box::new(self.parse_subexpr(PREDICATE_PRECEDENCE)?);
        if self.parse_keyword("preceding") {
            return Ok(FrameBound::Preceding(offset));
        }
        self.expect_keyword("following")?;
        Ok(FrameBound::Following(offset))
    }

    pub(crate) fn parse_order_by_list(&mut self) -> TranspileResult<Vec<OrderByExpr>> {
        let mut items = vec![self.parse_order_by_expr()?];
        while self.consume_symbol(Symbol::Comma) {
            items.push(self.parse_order_by_expr()?);
        }
        Ok(items)
    }

    fn parse_order_by_expr(&mut self) -> TranspileResult<OrderByExpr> {
        let expr = self.parse_expr()?;
        let asc = if self.parse_keyword("asc") {
            Some(true)
        } else if self.parse_keyword("desc") {
            Some(false)
        } else {
            None
        };
        let nulls_first = if self.parse_keywords(&["nulls", "first"]) {
            Some(true)
        } else if self.parse_keywords(&["nulls", "last"]) {
            Some(false)
        } else {
            None
        };
        Ok(OrderByExpr {
            expr,
            asc,
            nulls_first,
        })
    }

    fn parse_case(&mut self) -> TranspileResult<Expr> {
        let operand = if self.peek_keyword("when") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut branches = Vec::new();
        while self.parse_keyword("when") {
            let condition = self.parse_expr()?;
            self.expect_keyword("then")?;
            let result = self.parse_expr()?;
            branches.push((condition, result));
        }
        if branches.is_empty() {
            return Err(self.expected("WHEN"));
        }

        let else_result = if self.parse_keyword("else") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword("end")?;

        Ok(Expr::Case {
            operand,
            branches,
            else_result,
        })
    }

    fn parse_cast(&mut self, safe: bool) -> TranspileResult<Expr> {
        self.expect_symbol(Symbol::LParen)?;
        let expr = self.parse_expr()?;
        self.expect_keyword("as")?;
        let data_type = self.parse_data_type()?;
        self.expect_symbol(Symbol::RParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
            safe,
        })
    }

    fn parse_exists(&mut self, negated: bool) -> TranspileResult<Expr> {
        self.expect_symbol(Symbol::LParen)?;
        let subquery = self.parse_query()?;
        self.expect_symbol(Symbol::RParen)?;
        Ok(Expr::Exists {
            subquery: Box::new(subquery),
            negated,
        })
    }

    /// `INTERVAL 1 DAY`, `INTERVAL '1' DAY`, `INTERVAL '1 day'`, `INTERVAL 2 DAYS`.
    fn parse_interval(&mut self) -> TranspileResult<Expr> {
        if let Some(Token::String(s)) = self.peek().cloned() {
            let mut parts = s.split_whitespace();
            if let (Some(amount), Some(unit), None) = (parts.next(), parts.next(), parts.next()) {
                let Some(unit) = IntervalUnit::from_keyword(unit) else {
                    return Err(self.error(format!("unknown interval unit '{}'", unit)));
                };
                self.index += 1;
                return Ok(Expr::Interval {
                    value: Box::new(interval_amount(amount)),
                    unit,
                });
            }
            self.index += 1;
            let value = interval_amount(s.trim());
            let unit = self.parse_interval_unit()?;
            return Ok(Expr::Interval {
                value: Box::new(value),
                unit,
            });
        }

        let value = self.parse_subexpr(UNARY_PRECEDENCE)?;
        let unit = self.parse_interval_unit()?;
        Ok(Expr::Interval {
            value: Box::new(value),
            unit,
        })
    }

    fn parse_interval_unit(&mut self) -> TranspileResult<IntervalUnit> {
        let unit = self.word_at(0).and_then(IntervalUnit::from_keyword);
        match unit {
            Some(unit) => {
                self.index += 1;
                Ok(unit)
            }
            None => Err(self.expected("interval unit")),
        }
    }

    pub(crate) fn parse_data_type(&mut self) -> TranspileResult<DataType> {
        self.nested(Self::parse_data_type_inner)
    }

    fn parse_data_type_inner(&mut self) -> TranspileResult<DataType> {
        let Some(word) = self.word_at(0).map(str::to_ascii_lowercase) else {
            return Err(self.expected("data type"));
        };
        self.index += 1;

        let data_type = match word.as_str() {
            "boolean" | "bool" => DataType::Boolean,
            "tinyint" | "byte" => DataType::TinyInt,
            "smallint" | "short" => DataType::SmallInt,
            "int" | "integer" => DataType::Int,
            "bigint" | "long" => DataType::BigInt,
            "float" | "real" => DataType::Float,
            "double" => {
                self.parse_keyword("precision");
                DataType::Double
            }
            "decimal" | "dec" | "numeric" => {
                let (precision, scale) = self.parse_precision_scale()?;
                DataType::Decimal { precision, scale }
            }
            "string" | "text" => DataType::String,
            "varchar" => DataType::Varchar(self.parse_optional_length()?),
            "char" => DataType::Char(self.parse_optional_length()?),
            "date" => DataType::Date,
            "timestamp" | "datetime" | "timestamp_ntz" | "timestamp_ltz" => {
                // fractional-second precision is not carried across dialects
                self.parse_optional_length()?;
                DataType::Timestamp
            }
            "binary" => DataType::Binary,
            "array" => {
                self.expect_symbol(Symbol::Lt)?;
                let element = self.parse_data_type()?;
                self.expect_symbol(Symbol::Gt)?;
                DataType::Array(Box::new(element))
            }
            "map" => {
                self.expect_symbol(Symbol::Lt)?;
                let key = self.parse_data_type()?;
                self.expect_symbol(Symbol::Comma)?;
                let value = self.parse_data_type()?;
                self.expect_symbol(Symbol::Gt)?;
                DataType::Map(Box::new(key), Box::new(value))
            }
            "struct" => {
                self.expect_symbol(Symbol::Lt)?;
                let mut fields = Vec::new();
                loop {
                    let name = self.parse_identifier()?;
                    self.consume_symbol(Symbol::Colon);
                    let data_type = self.parse_data_type()?;
                    fields.push(StructField { name, data_type });
                    if !self.consume_symbol(Symbol::Comma) {
                        break;
                    }
                }
                self.expect_symbol(Symbol::Gt)?;
                DataType::Struct(fields)
            }
            other => DataType::Custom(other.to_ascii_uppercase()),
        };
        Ok(data_type)
    }

    fn parse_optional_length(&mut self) -> TranspileResult<Option<u32>> {
        if !self.consume_symbol(Symbol::LParen) {
            return Ok(None);
        }
        let n = self.parse_u32()?;
        self.expect_symbol(Symbol::RParen)?;
        Ok(Some(n))
    }

    fn parse_precision_scale(&mut self) -> TranspileResult<(Option<u32>, Option<u32>)> {
        if !self.consume_symbol(Symbol::LParen) {
            return Ok((None, None));
        }
        let precision = self.parse_u32()?;
        let scale = if self.consume_symbol(Symbol::Comma) {
            Some(self.parse_u32()?)
        } else {
            None
        };
        self.expect_symbol(Symbol::RParen)?;
        Ok((Some(precision), scale))
    }

    /// Whether the current word may start an implicit alias.
    pub(crate) fn peek_implicit_alias(&self) -> bool {
        match self.peek() {
            Some(Token::QuotedIdent(_)) => true,
            Some(Token::Word(w)) => !is_reserved(w),
            _ => false,
        }
    }
}

fn literal_text(expr: &Expr) -> &str {
    match expr {
        Expr::Literal(Literal::Number(text)) => text,
        _ => "",
    }
}

fn suffix_type(suffix: NumberSuffix, text: &str) -> DataType {
    match suffix {
        NumberSuffix::Long => DataType::BigInt,
        NumberSuffix::Short => DataType::SmallInt,
        NumberSuffix::Tiny => DataType::TinyInt,
        NumberSuffix::Double => DataType::Double,
        NumberSuffix::Float => DataType::Float,
        NumberSuffix::Decimal => decimal_literal_type(text),
    }
}

/// The exact type Spark gives a `BD` literal: `1.5BD` is `DECIMAL(2, 1)`,
/// `1e3BD` is `DECIMAL(4, 0)`.
fn decimal_literal_type(text: &str) -> DataType {
    let text = text.trim_start_matches(['-', '+']);
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => (&text[..i], text[i + 1..].parse::<i64>().unwrap_or(0)),
        None => (text, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = int
        .chars()
        .chain(frac.chars())
        .skip_while(|c| *c == '0')
        .count()
        .max(1) as i64;
    let scale = frac.len() as i64 - exponent;
    let (precision, scale) = if scale < 0 {
        (digits - scale, 0)
    } else {
        (digits.max(scale), scale)
    };
    DataType::Decimal {
        precision: Some(precision as u32),
        scale: Some(scale as u32),
    }
}

fn interval_amount(text: &str) -> Expr {
    if !text.is_empty() && text.trim_start_matches('-').chars().all(|c| c.is_ascii_digit() || c == '.') {
        Expr::number(text)
    } else {
        Expr::string(text)
    }
}
