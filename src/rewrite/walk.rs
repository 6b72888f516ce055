//! Bottom-up tree walk driving the active rules.

use super::traits::{RewriteContext, RewriteRule};
use crate::ast::*;
use crate::error::TranspileResult;

pub(crate) struct Walker<'r> {
    rules: Vec<&'r dyn RewriteRule>,
}

type Ctx<'c, 'o> = &'c mut RewriteContext<'o>;

impl<'r> Walker<'r> {
    pub(crate) fn new(rules: Vec<&'r dyn RewriteRule>) -> Self {
        Self { rules }
    }

    pub(crate) fn statement(&self, statement: Statement, ctx: Ctx) -> TranspileResult<Statement> {
        let statement = match statement {
            Statement::Query(q) => Statement::Query(Box::new(self.query(*q, ctx)?)),
            Statement::Insert(insert) => Statement::Insert(Insert {
                partition: insert
                    .partition
                    .into_iter()
                    .map(|p| {
                        Ok(PartitionSpec {
                            column: p.column,
                            value: self.opt_expr(p.value, ctx)?,
                        })
                    })
                    .collect::<TranspileResult<_>>()?,
                source: Box::new(self.query(*insert.source, ctx)?),
                ..insert
            }),
            Statement::CreateTable(table) => Statement::CreateTable(Box::new(self.create_table(*table, ctx)?)),
            other => other,
        };

        let mut statement = statement;
        for rule in &self.rules {
            statement = rule.rewrite_statement(statement, ctx)?;
        }
        Ok(statement)
    }

    fn create_table(&self, mut table: CreateTable, ctx: Ctx) -> TranspileResult<CreateTable> {
        table.columns = table
            .columns
            .into_iter()
            .map(|c| {
                Ok(ColumnDef {
                    data_type: self.data_type(c.data_type, ctx)?,
                    ..c
                })
            })
            .collect::<TranspileResult<_>>()?;
        table.partitioned_by = table
            .partitioned_by
            .into_iter()
            .map(|p| {
                let data_type = match p.data_type {
                    Some(t) => Some(self.data_type(t, ctx)?),
                    None => None,
                };
                Ok(PartitionColumn { name: p.name, data_type })
            })
            .collect::<TranspileResult<_>>()?;
        if let Some(query) = table.as_query.take() {
            table.as_query = Some(Box::new(self.query(*query, ctx)?));
        }
        Ok(table)
    }

    pub(crate) fn query(&self, query: Query, ctx: Ctx) -> TranspileResult<Query> {
        let mut query = Query {
            with: query
                .with
                .into_iter()
                .map(|cte| {
                    Ok(Cte {
                        query: Box::new(self.query(*cte.query, ctx)?),
                        ..cte
                    })
                })
                .collect::<TranspileResult<_>>()?,
            body: self.set_expr(query.body, ctx)?,
            order_by: self.order_by(query.order_by, ctx)?,
            distribute_by: self.exprs(query.distribute_by, ctx)?,
            sort_by: self.order_by(query.sort_by, ctx)?,
            cluster_by: self.exprs(query.cluster_by, ctx)?,
            limit: self.opt_expr(query.limit, ctx)?,
            offset: self.opt_expr(query.offset, ctx)?,
        };
        for rule in &self.rules {
            query = rule.rewrite_query(query, ctx)?;
        }
        Ok(query)
    }

    fn set_expr(&self, body: SetExpr, ctx: Ctx) -> TranspileResult<SetExpr> {
        Ok(match body {
            SetExpr::Select(select) => SetExpr::Select(Box::new(self.select(*select, ctx)?)),
            SetExpr::Query(q) => SetExpr::Query(Box::new(self.query(*q, ctx)?)),
            SetExpr::SetOperation {
                op,
                quantifier,
                left,
                right,
            } => SetExpr::SetOperation {
                op,
                quantifier,
                left: Box::new(self.set_expr(*left, ctx)?),
                right: Box::new(self.set_expr(*right, ctx)?),
            },
            SetExpr::Values(rows) => SetExpr::Values(
                rows.into_iter()
                    .map(|row| self.exprs(row, ctx))
                    .collect::<TranspileResult<_>>()?,
            ),
        })
    }

    fn select(&self, select: Select, ctx: Ctx) -> TranspileResult<Select> {
        let projection = select
            .projection
            .into_iter()
            .map(|item| {
                Ok(match item {
                    SelectItem::Expr { expr, alias } => SelectItem::Expr {
                        expr: self.expr(expr, ctx)?,
                        alias,
                    },
                    other => other,
                })
            })
            .collect::<TranspileResult<_>>()?;
        let from = select
            .from
            .into_iter()
            .map(|t| self.table_with_joins(t, ctx))
            .collect::<TranspileResult<_>>()?;
        let lateral_views = select
            .lateral_views
            .into_iter()
            .map(|lv| {
                Ok(LateralView {
                    function: self.function(lv.function, ctx)?,
                    ..lv
                })
            })
            .collect::<TranspileResult<_>>()?;

        let mut select = Select {
            distinct: select.distinct,
            projection,
            from,
            lateral_views,
            selection: self.opt_expr(select.selection, ctx)?,
            group_by: self.exprs(select.group_by, ctx)?,
            having: self.opt_expr(select.having, ctx)?,
        };
        for rule in &self.rules {
            select = rule.rewrite_select(select, ctx)?;
        }
        Ok(select)
    }

    fn table_with_joins(&self, table: TableWithJoins, ctx: Ctx) -> TranspileResult<TableWithJoins> {
        Ok(TableWithJoins {
            relation: self.table_factor(table.relation, ctx)?,
            joins: table
                .joins
                .into_iter()
                .map(|join| {
                    Ok(Join {
                        relation: self.table_factor(join.relation, ctx)?,
                        kind: join.kind,
                        constraint: match join.constraint {
                            JoinConstraint::On(e) => JoinConstraint::On(self.expr(e, ctx)?),
                            other => other,
                        },
                    })
                })
                .collect::<TranspileResult<_>>()?,
        })
    }

    fn table_factor(&self, factor: TableFactor, ctx: Ctx) -> TranspileResult<TableFactor> {
        Ok(match factor {
            TableFactor::Derived { subquery, alias } => TableFactor::Derived {
                subquery: Box::new(self.query(*subquery, ctx)?),
                alias,
            },
            table => table,
        })
    }

    fn order_by(&self, items: Vec<OrderByExpr>, ctx: Ctx) -> TranspileResult<Vec<OrderByExpr>> {
        items
            .into_iter()
            .map(|o| {
                Ok(OrderByExpr {
                    expr: self.expr(o.expr, ctx)?,
                    ..o
                })
            })
            .collect()
    }

    fn exprs(&self, exprs: Vec<Expr>, ctx: Ctx) -> TranspileResult<Vec<Expr>> {
        exprs.into_iter().map(|e| self.expr(e, ctx)).collect()
    }

    fn opt_expr(&self, expr: Option<Expr>, ctx: Ctx) -> TranspileResult<Option<Expr>> {
        expr.map(|e| self.expr(e, ctx)).transpose()
    }

    fn boxed(&self, expr: Box<Expr>, ctx: Ctx) -> TranspileResult<Box<Expr>> {
        Ok(Box::new(self.expr(*expr, ctx)?))
    }

    fn function(&self, function: Function, ctx: Ctx) -> TranspileResult<Function> {
        let over = match function.over {
            Some(spec) => Some(WindowSpec {
                partition_by: self.exprs(spec.partition_by, ctx)?,
                order_by: self.order_by(spec.order_by, ctx)?,
                frame: spec.frame,
            }),
            None => None,
        };
        Ok(Function {
            name: function.name,
            args: self.exprs(function.args, ctx)?,
            distinct: function.distinct,
            over,
        })
    }

    pub(crate) fn expr(&self, expr: Expr, ctx: Ctx) -> TranspileResult<Expr> {
        let mut expr = match expr {
            Expr::Unary { op, expr } => Expr::Unary {
                op,
                expr: self.boxed(expr, ctx)?,
            },
            Expr::Binary { left, op, right } => Expr::Binary {
                left: self.boxed(left, ctx)?,
                op,
                right: self.boxed(right, ctx)?,
            },
            Expr::Interval { value, unit } => Expr::Interval {
                value: self.boxed(value, ctx)?,
                unit,
            },
            Expr::Function(f) => Expr::Function(self.function(f, ctx)?),
            Expr::Cast { expr, data_type, safe } => Expr::Cast {
                expr: self.boxed(expr, ctx)?,
                data_type: self.data_type(data_type, ctx)?,
                safe,
            },
            Expr::Case {
                operand,
                branches,
                else_result,
            } => Expr::Case {
                operand: operand.map(|o| self.boxed(o, ctx)).transpose()?,
                branches: branches
                    .into_iter()
                    .map(|(when, then)| Ok((self.expr(when, ctx)?, self.expr(then, ctx)?)))
                    .collect::<TranspileResult<_>>()?,
                else_result: else_result.map(|e| self.boxed(e, ctx)).transpose()?,
            },
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => Expr::Between {
                expr: self.boxed(expr, ctx)?,
                negated,
                low: self.boxed(low, ctx)?,
                high: self.boxed(high, ctx)?,
            },
            Expr::InList { expr, list, negated } => Expr::InList {
                expr: self.boxed(expr, ctx)?,
                list: self.exprs(list, ctx)?,
                negated,
            },
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => Expr::InSubquery {
                expr: self.boxed(expr, ctx)?,
                subquery: Box::new(self.query(*subquery, ctx)?),
                negated,
            },
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: self.boxed(expr, ctx)?,
                negated,
            },
            Expr::Like {
                expr,
                pattern,
                negated,
                kind,
            } => Expr::Like {
                expr: self.boxed(expr, ctx)?,
                pattern: self.boxed(pattern, ctx)?,
                negated,
                kind,
            },
            Expr::Exists { subquery, negated } => Expr::Exists {
                subquery: Box::new(self.query(*subquery, ctx)?),
                negated,
            },
            Expr::Subquery(q) => Expr::Subquery(Box::new(self.query(*q, ctx)?)),
            Expr::Nested(e) => Expr::Nested(self.boxed(e, ctx)?),
            Expr::Subscript { expr, index } => Expr::Subscript {
                expr: self.boxed(expr, ctx)?,
                index: self.boxed(index, ctx)?,
            },
            Expr::Field { expr, field } => Expr::Field {
                expr: self.boxed(expr, ctx)?,
                field,
            },
            Expr::Lambda { params, body } => Expr::Lambda {
                params,
                body: self.boxed(body, ctx)?,
            },
            leaf @ (Expr::Column(_)
            | Expr::Literal(_)
            | Expr::TypedString { .. }
            | Expr::Wildcard) => leaf,
        };

        for rule in &self.rules {
            expr = rule.rewrite_expr(expr, ctx)?;
        }
        Ok(expr)
    }

    fn data_type(&self, data_type: DataType, ctx: Ctx) -> TranspileResult<DataType> {
        let mut data_type = match data_type {
            DataType::Array(inner) => DataType::Array(Box::new(self.data_type(*inner, ctx)?)),
            DataType::Map(key, value) => DataType::Map(
                Box::new(self.data_type(*key, ctx)?),
                Box::new(self.data_type(*value, ctx)?),
            ),
            DataType::Struct(fields) => DataType::Struct(
                fields
                    .into_iter()
                    .map(|f| {
                        Ok(StructField {
                            name: f.name,
                            data_type: self.data_type(f.data_type, ctx)?,
                        })
                    })
                    .collect::<TranspileResult<_>>()?,
            ),
            other => other,
        };
        for rule in &self.rules {
            data_type = rule.rewrite_type(data_type, ctx)?;
        }
        Ok(data_type)
    }
}
