//! Query parsing: WITH, set operations, SELECT, FROM/JOIN, LATERAL VIEW and
//! the trailing ORDER BY / Hive clauses / LIMIT.

use super::Parser;
use crate::ast::*;
use crate::error::TranspileResult;
use crate::tokenizer::{Symbol, Token};

impl Parser {
    pub(crate) fn parse_query(&mut self) -> TranspileResult<Query> {
        self.nested(Self::parse_query_inner)
    }

    fn parse_query_inner(&mut self) -> TranspileResult<Query> {
        let with = if self.parse_keyword("with") {
            self.parse_keyword("recursive");
            self.parse_ctes()?
        } else {
            Vec::new()
        };

        let body = self.parse_set_expr(0)?;
        let mut query = Query::from_body(body);
        query.with = with;

        loop {
            if self.parse_keywords(&["order", "by"]) {
                query.order_by = self.parse_order_by_list()?;
            } else if self.parse_keywords(&["cluster", "by"]) {
                query.cluster_by = self.parse_comma_separated_exprs()?;
            } else if self.parse_keywords(&["distribute", "by"]) {
                query.distribute_by = self.parse_comma_separated_exprs()?;
            } else if self.parse_keywords(&["sort", "by"]) {
                query.sort_by = self.parse_order_by_list()?;
            } else {
                break;
            }
        }

        if self.parse_keyword("limit") {
            let first = self.parse_expr()?;
            // MySQL / Doris `LIMIT offset, count`
            if self.consume_symbol(Symbol::Comma) {
                query.offset = Some(first);
                query.limit = Some(self.parse_expr()?);
            } else {
                query.limit = Some(first);
            }
        }
        if self.parse_keyword("offset") {
            query.offset = Some(self.parse_expr()?);
        }

        Ok(query)
    }

    fn parse_ctes(&mut self) -> TranspileResult<Vec<Cte>> {
        let mut ctes = Vec::new();
        loop {
            let alias = self.parse_identifier()?;
            let columns = if self.peek_symbol(Symbol::LParen) {
                self.parse_identifier_list()?
            } else {
                Vec::new()
            };
            self.expect_keyword("as")?;
            self.expect_symbol(Symbol::LParen)?;
            let query = self.parse_query()?;
            self.expect_symbol(Symbol::RParen)?;
            ctes.push(Cte {
                alias,
                columns,
                query: Box::new(query),
            });
            if !self.consume_symbol(Symbol::Comma) {
                return Ok(ctes);
            }
        }
    }

    /// UNION and EXCEPT bind at 1, INTERSECT at 2.
    fn parse_set_expr(&mut self, min_precedence: u8) -> TranspileResult<SetExpr> {
        let mut left = self.parse_set_operand()?;
        loop {
            let (op, precedence) = if self.peek_keyword("union") {
                (SetOperator::Union, 1)
            } else if self.peek_keyword("except") || self.peek_keyword("minus") {
                (SetOperator::Except, 1)
            } else if self.peek_keyword("intersect") {
                (SetOperator::Intersect, 2)
            } else {
                break;
            };
            if precedence <= min_precedence {
                break;
            }
            self.index += 1;

            let quantifier = if self.parse_keyword("all") {
                SetQuantifier::All
            } else if self.parse_keyword("distinct") {
                SetQuantifier::Distinct
            } else {
                SetQuantifier::None
            };
            let right = self.parse_set_expr(precedence)?;
            left = SetExpr::SetOperation {
                op,
                quantifier,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_set_operand(&mut self) -> TranspileResult<SetExpr> {
        if self.parse_keyword("select") {
            return Ok(SetExpr::Select(Box::new(self.parse_select()?)));
        }
        if self.parse_keyword("values") {
            return self.parse_values();
        }
        if self.consume_symbol(Symbol::LParen) {
            let query = self.parse_query()?;
            self.expect_symbol(Symbol::RParen)?;
            return Ok(SetExpr::Query(Box::new(query)));
        }
        Err(self.expected("SELECT, VALUES or '('"))
    }

    fn parse_values(&mut self) -> TranspileResult<SetExpr> {
        let mut rows = Vec::new();
        loop {
            self.expect_symbol(Symbol::LParen)?;
            rows.push(self.parse_comma_separated_exprs()?);
            self.expect_symbol(Symbol::RParen)?;
            if !self.consume_symbol(Symbol::Comma) {
                return Ok(SetExpr::Values(rows));
            }
        }
    }

    fn parse_select(&mut self) -> TranspileResult<Select> {
        let distinct = self.parse_keyword("distinct");
        if !distinct {
            self.parse_keyword("all");
        }

        let mut projection = vec![self.parse_select_item()?];
        while self.consume_symbol(Symbol::Comma) {
            projection.push(self.parse_select_item()?);
        }

        let mut from = Vec::new();
        if self.parse_keyword("from") {
            from.push(self.parse_table_with_joins()?);
            while self.consume_symbol(Symbol::Comma) {
                from.push(self.parse_table_with_joins()?);
            }
        }

        let mut lateral_views = Vec::new();
        while self.parse_keywords(&["lateral", "view"]) {
            lateral_views.push(self.parse_lateral_view()?);
        }

        let selection = if self.parse_keyword("where") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let group_by = if self.parse_keywords(&["group", "by"]) {
            self.parse_comma_separated_exprs()?
        } else {
            Vec::new()
        };
        let having = if self.parse_keyword("having") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Select {
            distinct,
            projection,
            from,
            lateral_views,
            selection,
            group_by,
            having,
        })
    }

    fn parse_select_item(&mut self) -> TranspileResult<SelectItem> {
        if self.consume_symbol(Symbol::Star) {
            return Ok(SelectItem::Wildcard);
        }
        if let Some(len) = self.qualified_wildcard_ahead() {
            let mut parts = Vec::with_capacity(len);
            for _ in 0..len {
                parts.push(self.parse_identifier()?);
                self.index += 1; // '.'
            }
            self.index += 1; // '*'
            return Ok(SelectItem::QualifiedWildcard(ObjectName(parts)));
        }

        let expr = self.parse_expr()?;
        let alias = self.parse_optional_alias()?;
        Ok(SelectItem::Expr { expr, alias })
    }

    /// `a.b.*` at the cursor: number of name parts before `.*`.
    fn qualified_wildcard_ahead(&self) -> Option<usize> {
        let mut n = 0;
        let mut parts = 0;
        loop {
            match self.peek_nth(n) {
                Some(Token::Word(_)) | Some(Token::QuotedIdent(_)) => parts += 1,
                _ => return None,
            }
            if !self.peek_symbol_at(n + 1, Symbol::Dot) {
                return None;
            }
            if self.peek_symbol_at(n + 2, Symbol::Star) {
                return Some(parts);
            }
            n += 2;
        }
    }

    fn parse_table_with_joins(&mut self) -> TranspileResult<TableWithJoins> {
        let relation = self.parse_table_factor()?;
        let mut joins = Vec::new();

        while let Some(kind) = self.parse_join_kind() {
            let relation = self.parse_table_factor()?;
            let constraint = if self.parse_keyword("on") {
                JoinConstraint::On(self.parse_expr()?)
            } else if self.parse_keyword("using") {
                JoinConstraint::Using(self.parse_identifier_list()?)
            } else {
                JoinConstraint::None
            };
            joins.push(Join {
                relation,
                kind,
                constraint,
            });
        }

        Ok(TableWithJoins { relation, joins })
    }

    fn parse_join_kind(&mut self) -> Option<JoinKind> {
        let patterns: &[(&[&str], JoinKind)] = &[
            (&["join"], JoinKind::Inner),
            (&["inner", "join"], JoinKind::Inner),
            (&["left", "semi", "join"], JoinKind::LeftSemi),
            (&["left", "anti", "join"], JoinKind::LeftAnti),
            (&["semi", "join"], JoinKind::LeftSemi),
            (&["anti", "join"], JoinKind::LeftAnti),
            (&["left", "outer", "join"], JoinKind::LeftOuter),
            (&["left", "join"], JoinKind::LeftOuter),
            (&["right", "outer", "join"], JoinKind::RightOuter),
            (&["right", "join"], JoinKind::RightOuter),
            (&["full", "outer", "join"], JoinKind::FullOuter),
            (&["full", "join"], JoinKind::FullOuter),
            (&["cross", "join"], JoinKind::Cross),
        ];
        patterns
            .iter()
            .find(|(words, _)| self.parse_keywords(words))
            .map(|(_, kind)| *kind)
    }

    fn parse_table_factor(&mut self) -> TranspileResult<TableFactor> {
        if self.peek_symbol(Symbol::LParen) {
            if !self.peek_query_start(1) {
                return Err(self.error("parenthesized joins are not supported"));
            }
            self.index += 1;
            let subquery = self.parse_query()?;
            self.expect_symbol(Symbol::RParen)?;
            let alias = self.parse_table_alias()?;
            return Ok(TableFactor::Derived {
                subquery: Box::new(subquery),
                alias,
            });
        }

        let name = self.parse_object_name()?;
        let alias = self.parse_table_alias()?;
        Ok(TableFactor::Table { name, alias })
    }

    fn parse_table_alias(&mut self) -> TranspileResult<Option<TableAlias>> {
        let explicit = self.parse_keyword("as");
        if !explicit && !self.peek_implicit_alias() {
            return Ok(None);
        }
        let name = self.parse_identifier()?;
        let columns = if self.peek_symbol(Symbol::LParen) {
            self.parse_identifier_list()?
        } else {
            Vec::new()
        };
        Ok(Some(TableAlias { name, columns }))
    }

    /// After `LATERAL VIEW`: `[OUTER] func(args) [tbl] [AS] col, ...`.
    fn parse_lateral_view(&mut self) -> TranspileResult<LateralView> {
        let outer = self.parse_keyword("outer");
        let name = self.parse_object_name()?;
        let function = self.parse_function(name)?;

        let table_alias = if self.peek_implicit_alias() {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let mut column_aliases = Vec::new();
        if self.parse_keyword("as") {
            column_aliases.push(self.parse_identifier()?);
            while self.consume_symbol(Symbol::Comma) {
                column_aliases.push(self.parse_identifier()?);
            }
        }

        Ok(LateralView {
            outer,
            function,
            table_alias,
            column_aliases,
        })
    }
}
