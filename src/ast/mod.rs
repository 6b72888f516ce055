//! Dialect-independent syntax tree.
//!
//! The parser normalizes source spellings into these nodes (e.g. `MINUS` is
//! [`SetOperator::Except`], `DATETIME` is [`DataType::Timestamp`]). Only the
//! generator decides how a node is spelled in the target dialect.

mod ddl;
mod expr;
mod query;
mod types;

pub use ddl::*;
pub use expr::*;
pub use query::*;
pub use types::*;

use serde::Serialize;

/// A top-level SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Query(Box<Query>),
    Insert(Insert),
    CreateTable(Box<CreateTable>),
    DropTable { name: ObjectName, if_exists: bool },
}

/// An identifier, remembering whether the source quoted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ident {
    pub value: String,
    pub quoted: bool,
}

impl Ident {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }
}

/// A possibly qualified name (`db.tbl`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectName(pub Vec<Ident>);

impl ObjectName {
    pub fn new(name: &str) -> Self {
        Self(vec![Ident::new(name)])
    }

    /// The unqualified part.
    pub fn last(&self) -> &str {
        self.0.last().map(|i| i.value.as_str()).unwrap_or_default()
    }
}
