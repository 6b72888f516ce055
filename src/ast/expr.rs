use serde::Serialize;

use super::{DataType, Ident, ObjectName, Query};

/// Scalar expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// Column reference, possibly qualified (`t.a`, `db.t.a`).
    Column(Vec<Ident>),
    Literal(Literal),
    /// `DATE '2024-01-01'`, `TIMESTAMP '...'`.
    TypedString { data_type: DataType, value: String },
    Interval { value: Box<Expr>, unit: IntervalUnit },
    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Function(Function),
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
        /// `TRY_CAST`
        safe: bool,
    },
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<(Expr, Expr)>,
        else_result: Option<Box<Expr>>,
    },
    Between {
        expr: Box<Expr>,
        negated: bool,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Query>,
        negated: bool,
    },
    IsNull { expr: Box<Expr>, negated: bool },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        kind: LikeKind,
    },
    Exists { subquery: Box<Query>, negated: bool },
    Subquery(Box<Query>),
    /// Explicit parentheses from the source.
    Nested(Box<Expr>),
    /// `arr[0]`, `m['key']`
    Subscript { expr: Box<Expr>, index: Box<Expr> },
    /// `expr.field` after a non-column expression (`arr[0].name`).
    Field { expr: Box<Expr>, field: Ident },
    /// `x -> x + 1`, `(acc, x) -> acc + x`
    Lambda { params: Vec<Ident>, body: Box<Expr> },
    /// `*` as a function argument (`COUNT(*)`).
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    /// Kept as source text so precision survives.
    Number(String),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NullSafeEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitOr,
    BitXor,
    BitAnd,
    Plus,
    Minus,
    /// String concatenation (`||` in Spark/Hive).
    Concat,
    Multiply,
    Divide,
    Modulo,
    /// Integer division (`DIV`).
    IntDiv,
}

impl BinaryOp {
    /// Binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NullSafeEq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => 4,
            BinaryOp::BitOr => 5,
            BinaryOp::BitXor => 6,
            BinaryOp::BitAnd => 7,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Concat => 8,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo | BinaryOp::IntDiv => 9,
        }
    }
}

/// Precedence of prefix `NOT`.
pub const NOT_PRECEDENCE: u8 = 3;
/// Precedence shared by `IS`, `IN`, `BETWEEN` and the `LIKE` family.
pub const PREDICATE_PRECEDENCE: u8 = 4;
/// Precedence of unary `-`, `+`, `~`.
pub const UNARY_PRECEDENCE: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LikeKind {
    Like,
    ILike,
    /// `RLIKE` / `REGEXP`
    RLike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntervalUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl IntervalUnit {
    /// Accepts singular and plural spellings, case-insensitive.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let lower = word.to_ascii_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        Some(match singular {
            "year" => IntervalUnit::Year,
            "quarter" => IntervalUnit::Quarter,
            "month" => IntervalUnit::Month,
            "week" => IntervalUnit::Week,
            "day" => IntervalUnit::Day,
            "hour" => IntervalUnit::Hour,
            "minute" => IntervalUnit::Minute,
            "second" => IntervalUnit::Second,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            IntervalUnit::Year => "YEAR",
            IntervalUnit::Quarter => "QUARTER",
            IntervalUnit::Month => "MONTH",
            IntervalUnit::Week => "WEEK",
            IntervalUnit::Day => "DAY",
            IntervalUnit::Hour => "HOUR",
            IntervalUnit::Minute => "MINUTE",
            IntervalUnit::Second => "SECOND",
        }
    }
}

/// A function call, including aggregates and window functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: ObjectName,
    pub args: Vec<Expr>,
    pub distinct: bool,
    pub over: Option<WindowSpec>,
}

impl Function {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self {
            name: ObjectName::new(name),
            args,
            distinct: false,
            over: None,
        }
    }

    /// Unqualified name, lower-cased, for rule matching.
    pub fn key(&self) -> String {
        self.name.last().to_ascii_lowercase()
    }

    pub fn rename(&mut self, name: &str) {
        self.name = ObjectName::new(name);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameUnits {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Box<Expr>),
    CurrentRow,
    Following(Box<Expr>),
    UnboundedFollowing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByExpr {
    pub expr: Expr,
    /// `None` when no direction was written.
    pub asc: Option<bool>,
    pub nulls_first: Option<bool>,
}

impl Expr {
    pub fn column(name: &str) -> Self {
        Expr::Column(vec![Ident::new(name)])
    }

    pub fn number(n: impl ToString) -> Self {
        Expr::Literal(Literal::Number(n.to_string()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Function(Function::new(name, args))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn cast(expr: Expr, data_type: DataType) -> Self {
        Expr::Cast {
            expr: Box::new(expr),
            data_type,
            safe: false,
        }
    }

    /// The string value of a string literal.
    pub fn as_str_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(Literal::String(s)) => Some(s),
            _ => None,
        }
    }
}
