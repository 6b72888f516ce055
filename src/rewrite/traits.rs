//! Core traits for the rewrite system

use crate::ast::{DataType, Expr, Query, Select, Statement};
use crate::dialect::Dialect;
use crate::error::{TranspileError, TranspileResult};
use crate::pipeline::TranspileOptions;

/// State shared by every rule during one statement rewrite.
#[derive(Debug)]
pub struct RewriteContext<'a> {
    pub read: Dialect,
    pub write: Dialect,
    pub options: &'a TranspileOptions,
    notes: Vec<String>,
}

impl<'a> RewriteContext<'a> {
    pub fn new(read: Dialect, write: Dialect, options: &'a TranspileOptions) -> Self {
        Self {
            read,
            write,
            options,
            notes: Vec::new(),
        }
    }

    /// Record a lossy or approximate rewrite.
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(read = %self.read, write = %self.write, "{}", message);
        self.notes.push(message);
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn take_notes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notes)
    }

    /// An `Unsupported` error against the target dialect.
    pub fn unsupported(&self, feature: impl Into<String>) -> TranspileError {
        TranspileError::unsupported(self.write, feature)
    }
}

/// A tree rewrite between two dialects.
///
/// Hooks receive a node whose children were already rewritten and return
/// the replacement. All hooks default to the identity.
pub trait RewriteRule: Send + Sync {
    fn id(&self) -> &'static str;

    fn priority(&self) -> u32 {
        100
    }

    /// Whether the rule runs for this dialect pair.
    fn applies(&self, read: Dialect, write: Dialect) -> bool;

    fn rewrite_expr(&self, expr: Expr, _ctx: &mut RewriteContext) -> TranspileResult<Expr> {
        Ok(expr)
    }

    fn rewrite_type(&self, data_type: DataType, _ctx: &mut RewriteContext) -> TranspileResult<DataType> {
        Ok(data_type)
    }

    /// Runs on each SELECT after its projection, lateral views and
    /// predicates were rewritten.
    fn rewrite_select(&self, select: Select, _ctx: &mut RewriteContext) -> TranspileResult<Select> {
        Ok(select)
    }

    fn rewrite_query(&self, query: Query, _ctx: &mut RewriteContext) -> TranspileResult<Query> {
        Ok(query)
    }

    fn rewrite_statement(&self, statement: Statement, _ctx: &mut RewriteContext) -> TranspileResult<Statement> {
        Ok(statement)
    }
}
