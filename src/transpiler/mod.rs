//! SQL generation.
//!
//! [`Generator`] walks the AST and owns layout: clause order, parentheses and
//! pretty-printing. Everything that is spelled differently per dialect is
//! asked of a [`SqlGenerator`].

pub mod dialects;
mod ddl;
mod expr;
mod query;
pub mod traits;

#[cfg(test)]
mod tests;

pub use dialects::{DorisGenerator, HiveGenerator, MySqlGenerator, SparkGenerator};
pub use traits::{SqlGenerator, TypeContext, escape_identifier};

use crate::ast::{DataType, Expr, Ident, ObjectName, Query, Statement};
use crate::dialect::Dialect;
use crate::error::TranspileResult;

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Render for a specific dialect.
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranspileResult<String>;

    /// Render as Spark SQL.
    fn to_sql(&self) -> TranspileResult<String> {
        self.to_sql_with_dialect(Dialect::Spark)
    }
}

impl ToSql for Statement {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranspileResult<String> {
        Generator::new(dialect).statement(self)
    }
}

impl ToSql for Query {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranspileResult<String> {
        Generator::new(dialect).query(self)
    }
}

impl ToSql for Expr {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranspileResult<String> {
        Generator::new(dialect).expr(self)
    }
}

impl ToSql for DataType {
    fn to_sql_with_dialect(&self, dialect: Dialect) -> TranspileResult<String> {
        generator_for(dialect).data_type(self, TypeContext::Column)
    }
}

/// The spelling rules of a dialect.
pub fn generator_for(dialect: Dialect) -> &'static dyn SqlGenerator {
    match dialect {
        Dialect::Spark => &SparkGenerator,
        Dialect::Hive => &HiveGenerator,
        Dialect::Doris => &DorisGenerator,
        Dialect::MySql => &MySqlGenerator,
    }
}

/// Renders statements for one target dialect.
pub struct Generator {
    dialect: &'static dyn SqlGenerator,
    pretty: bool,
    indent_level: usize,
}

impl Generator {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect: generator_for(dialect),
            pretty: false,
            indent_level: 0,
        }
    }

    /// Multi-line output with two-space indentation.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn statement(&mut self, statement: &Statement) -> TranspileResult<String> {
        match statement {
            Statement::Query(query) => self.query(query),
            Statement::Insert(insert) => self.insert(insert),
            Statement::CreateTable(table) => self.create_table(table),
            Statement::DropTable { name, if_exists } => Ok(format!(
                "DROP TABLE {}{}",
                if *if_exists { "IF EXISTS " } else { "" },
                self.object_name(name)
            )),
        }
    }

    fn ident(&self, ident: &Ident) -> String {
        self.dialect.quote_identifier(ident)
    }

    fn idents(&self, idents: &[Ident]) -> String {
        idents.iter().map(|i| self.ident(i)).collect::<Vec<_>>().join(", ")
    }

    fn object_name(&self, name: &ObjectName) -> String {
        name.0.iter().map(|i| self.ident(i)).collect::<Vec<_>>().join(".")
    }

    fn pad(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    /// Separator between clauses at the current level.
    fn clause_sep(&self) -> String {
        if self.pretty {
            format!("\n{}", self.pad(self.indent_level))
        } else {
            " ".to_string()
        }
    }

    /// Runs `f` one indentation level deeper.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent_level += 1;
        let out = f(self);
        self.indent_level -= 1;
        out
    }

    /// `(inner)`, or in pretty mode the inner text on its own indented lines.
    fn block(&mut self, f: impl FnOnce(&mut Self) -> TranspileResult<String>) -> TranspileResult<String> {
        if !self.pretty {
            return Ok(format!("({})", f(self)?));
        }
        let inner = self.indented(f)?;
        Ok(format!(
            "(\n{}{}\n{})",
            self.pad(self.indent_level + 1),
            inner,
            self.pad(self.indent_level)
        ))
    }

    fn subquery(&mut self, query: &Query) -> TranspileResult<String> {
        self.block(|g| g.query(query))
    }

    /// `KEYWORD a, b`, or in pretty mode one item per indented line.
    fn list_clause<T>(
        &mut self,
        keyword: &str,
        items: &[T],
        mut f: impl FnMut(&mut Self, &T) -> TranspileResult<String>,
    ) -> TranspileResult<String> {
        let rendered = self.indented(|g| items.iter().map(|item| f(g, item)).collect::<TranspileResult<Vec<_>>>())?;
        if self.pretty {
            let pad = format!("\n{}", self.pad(self.indent_level + 1));
            Ok(format!("{}{}{}", keyword, pad, rendered.join(&format!(",{}", pad))))
        } else {
            Ok(format!("{} {}", keyword, rendered.join(", ")))
        }
    }

    /// `WHERE cond`, indented like a single list item.
    fn condition_clause(&mut self, keyword: &str, condition: &Expr) -> TranspileResult<String> {
        self.list_clause(keyword, std::slice::from_ref(condition), |g, e| g.expr(e))
    }
}
