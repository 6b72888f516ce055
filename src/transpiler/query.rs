use super::Generator;
use crate::ast::*;
use crate::dialect::Family;
use crate::error::TranspileResult;

impl Generator {
    pub fn query(&mut self, query: &Query) -> TranspileResult<String> {
        let mut clauses = Vec::new();

        if !query.with.is_empty() {
            let ctes = query
                .with
                .iter()
                .map(|cte| self.cte(cte))
                .collect::<TranspileResult<Vec<_>>>()?;
            let sep = format!(",{}", self.clause_sep());
            clauses.push(format!("WITH {}", ctes.join(&sep)));
        }

        clauses.push(self.set_expr(&query.body)?);

        if !query.order_by.is_empty() {
            clauses.push(self.list_clause("ORDER BY", &query.order_by, |g, o| g.order_by_expr(o))?);
        }

        let hive_only = !query.cluster_by.is_empty() || !query.distribute_by.is_empty() || !query.sort_by.is_empty();
        if hive_only && self.dialect.dialect().family() != Family::Hive {
            return Err(self.dialect.unsupported("CLUSTER BY / DISTRIBUTE BY / SORT BY"));
        }
        if !query.cluster_by.is_empty() {
            clauses.push(self.list_clause("CLUSTER BY", &query.cluster_by, |g, e| g.expr(e))?);
        }
        if !query.distribute_by.is_empty() {
            clauses.push(self.list_clause("DISTRIBUTE BY", &query.distribute_by, |g, e| g.expr(e))?);
        }
        if !query.sort_by.is_empty() {
            clauses.push(self.list_clause("SORT BY", &query.sort_by, |g, o| g.order_by_expr(o))?);
        }

        let limit = query.limit.as_ref().map(|e| self.expr(e)).transpose()?;
        let offset = query.offset.as_ref().map(|e| self.expr(e)).transpose()?;
        if let Some(limit) = self.dialect.limit_offset(limit.as_deref(), offset.as_deref())? {
            clauses.push(limit);
        }

        Ok(clauses.join(&self.clause_sep()))
    }

    fn cte(&mut self, cte: &Cte) -> TranspileResult<String> {
        let columns = if cte.columns.is_empty() {
            String::new()
        } else {
            format!(" ({})", self.idents(&cte.columns))
        };
        Ok(format!(
            "{}{} AS {}",
            self.ident(&cte.alias),
            columns,
            self.subquery(&cte.query)?
        ))
    }

    fn set_expr(&mut self, body: &SetExpr) -> TranspileResult<String> {
        match body {
            SetExpr::Select(select) => self.select(select),
            SetExpr::Query(query) => self.subquery(query),
            SetExpr::SetOperation {
                op,
                quantifier,
                left,
                right,
            } => {
                let precedence = set_precedence(*op);
                let left = self.set_operand(left, precedence)?;
                let right = self.set_operand(right, precedence + 1)?;
                let keyword = match op {
                    SetOperator::Union => "UNION",
                    SetOperator::Intersect => "INTERSECT",
                    SetOperator::Except => "EXCEPT",
                };
                let quantifier = match quantifier {
                    SetQuantifier::None => "",
                    SetQuantifier::All => " ALL",
                    SetQuantifier::Distinct => " DISTINCT",
                };
                let sep = self.clause_sep();
                Ok(format!("{}{}{}{}{}{}", left, sep, keyword, quantifier, sep, right))
            }
            SetExpr::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| -> TranspileResult<String> { Ok(format!("({})", self.expr_list(row)?)) })
                    .collect::<TranspileResult<Vec<_>>>()?;
                Ok(format!("VALUES {}", rows.join(", ")))
            }
        }
    }

    fn set_operand(&mut self, operand: &SetExpr, min: u8) -> TranspileResult<String> {
        match operand {
            SetExpr::SetOperation { op, .. } if set_precedence(*op) < min => self.block(|g| g.set_expr(operand)),
            other => self.set_expr(other),
        }
    }

    fn select(&mut self, select: &Select) -> TranspileResult<String> {
        let keyword = if select.distinct { "SELECT DISTINCT" } else { "SELECT" };
        let mut clauses = vec![self.list_clause(keyword, &select.projection, |g, item| g.select_item(item))?];

        if !select.from.is_empty() {
            let tables = select
                .from
                .iter()
                .map(|t| self.table_with_joins(t))
                .collect::<TranspileResult<Vec<_>>>()?;
            clauses.push(format!("FROM {}", tables.join(", ")));
        }
        for view in &select.lateral_views {
            clauses.push(self.lateral_view(view)?);
        }
        if let Some(selection) = &select.selection {
            clauses.push(self.condition_clause("WHERE", selection)?);
        }
        if !select.group_by.is_empty() {
            clauses.push(self.list_clause("GROUP BY", &select.group_by, |g, e| g.expr(e))?);
        }
        if let Some(having) = &select.having {
            clauses.push(self.condition_clause("HAVING", having)?);
        }

        Ok(clauses.join(&self.clause_sep()))
    }

    fn select_item(&mut self, item: &SelectItem) -> TranspileResult<String> {
        Ok(match item {
            SelectItem::Expr { expr, alias: None } => self.expr(expr)?,
            SelectItem::Expr {
                expr,
                alias: Some(alias),
            } => format!("{} AS {}", self.expr(expr)?, self.ident(alias)),
            SelectItem::Wildcard => "*".to_string(),
            SelectItem::QualifiedWildcard(name) => format!("{}.*", self.object_name(name)),
        })
    }

    fn table_with_joins(&mut self, table: &TableWithJoins) -> TranspileResult<String> {
        let mut sql = self.table_factor(&table.relation)?;
        for join in &table.joins {
            sql.push_str(&self.clause_sep());
            sql.push_str(&self.join(join)?);
        }
        Ok(sql)
    }

    fn table_factor(&mut self, factor: &TableFactor) -> TranspileResult<String> {
        let (mut sql, alias) = match factor {
            TableFactor::Table { name, alias } => (self.object_name(name), alias),
            TableFactor::Derived { subquery, alias } => (self.subquery(subquery)?, alias),
        };
        if let Some(alias) = alias {
            sql.push_str(" AS ");
            sql.push_str(&self.ident(&alias.name));
            if !alias.columns.is_empty() {
                sql.push_str(&format!("({})", self.idents(&alias.columns)));
            }
        }
        Ok(sql)
    }

    fn join(&mut self, join: &Join) -> TranspileResult<String> {
        if !self.dialect.supports_join(join.kind) {
            return Err(self.dialect.unsupported(join_keyword(join.kind)));
        }
        let mut sql = format!("{} {}", join_keyword(join.kind), self.table_factor(&join.relation)?);
        match &join.constraint {
            JoinConstraint::On(condition) => {
                sql.push_str(" ON ");
                sql.push_str(&self.expr(condition)?);
            }
            JoinConstraint::Using(columns) => {
                sql.push_str(&format!(" USING ({})", self.idents(columns)));
            }
            JoinConstraint::None => {}
        }
        Ok(sql)
    }

    fn lateral_view(&mut self, view: &LateralView) -> TranspileResult<String> {
        if !self.dialect.supports_lateral_view() {
            return Err(self.dialect.unsupported("LATERAL VIEW"));
        }
        let mut sql = format!(
            "LATERAL VIEW {}{}",
            if view.outer { "OUTER " } else { "" },
            self.function(&view.function)?
        );
        if let Some(alias) = &view.table_alias {
            sql.push(' ');
            sql.push_str(&self.ident(alias));
        }
        if !view.column_aliases.is_empty() {
            sql.push_str(" AS ");
            sql.push_str(&self.idents(&view.column_aliases));
        }
        Ok(sql)
    }
}

fn set_precedence(op: SetOperator) -> u8 {
    match op {
        SetOperator::Union | SetOperator::Except => 1,
        SetOperator::Intersect => 2,
    }
}

fn join_keyword(kind: JoinKind) -> &'static str {
    match kind {
        JoinKind::Inner => "JOIN",
        JoinKind::LeftOuter => "LEFT JOIN",
        JoinKind::RightOuter => "RIGHT JOIN",
        JoinKind::FullOuter => "FULL OUTER JOIN",
        JoinKind::Cross => "CROSS JOIN",
        JoinKind::LeftSemi => "LEFT SEMI JOIN",
        JoinKind::LeftAnti => "LEFT ANTI JOIN",
    }
}
