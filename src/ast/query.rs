use serde::Serialize;

use super::{Expr, Function, Ident, ObjectName, OrderByExpr};

/// A full query: CTEs, body and the trailing clauses that apply to the whole
/// set expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub with: Vec<Cte>,
    pub body: SetExpr,
    pub order_by: Vec<OrderByExpr>,
    /// Hive `DISTRIBUTE BY`
    pub distribute_by: Vec<Expr>,
    /// Hive `SORT BY`
    pub sort_by: Vec<OrderByExpr>,
    /// Hive `CLUSTER BY`
    pub cluster_by: Vec<Expr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

impl Query {
    pub fn from_body(body: SetExpr) -> Self {
        Self {
            with: Vec::new(),
            body,
            order_by: Vec::new(),
            distribute_by: Vec::new(),
            sort_by: Vec::new(),
            cluster_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cte {
    pub alias: Ident,
    pub columns: Vec<Ident>,
    pub query: Box<Query>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SetExpr {
    Select(Box<Select>),
    /// Parenthesized query used as a set operand.
    Query(Box<Query>),
    SetOperation {
        op: SetOperator,
        quantifier: SetQuantifier,
        left: Box<SetExpr>,
        right: Box<SetExpr>,
    },
    Values(Vec<Vec<Expr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetOperator {
    Union,
    Intersect,
    /// `EXCEPT` / `MINUS`
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetQuantifier {
    None,
    All,
    Distinct,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Select {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableWithJoins>,
    pub lateral_views: Vec<LateralView>,
    pub selection: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectItem {
    Expr { expr: Expr, alias: Option<Ident> },
    Wildcard,
    QualifiedWildcard(ObjectName),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableFactor {
    Table {
        name: ObjectName,
        alias: Option<TableAlias>,
    },
    Derived {
        subquery: Box<Query>,
        alias: Option<TableAlias>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableAlias {
    pub name: Ident,
    pub columns: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Join {
    pub relation: TableFactor,
    pub kind: JoinKind,
    pub constraint: JoinConstraint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
    LeftSemi,
    LeftAnti,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Ident>),
    None,
}

/// `LATERAL VIEW [OUTER] explode(arr) t AS x`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LateralView {
    pub outer: bool,
    pub function: Function,
    pub table_alias: Option<Ident>,
    pub column_aliases: Vec<Ident>,
}
