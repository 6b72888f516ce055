
use crate::dialect::Dialect;
use crate::parser::parse;
use crate::transpiler::Generator;

/// Parse with `read` and print the first statement for `write`, no rewriting.
fn render(sql: &str, read: Dialect, write: Dialect) -> String {
    let statements = parse(sql, read).unwrap();
    Generator::new(write).statement(&statements[0]).unwrap()
}

fn render_pretty(sql: &str, dialect: Dialect) -> String {
    let statements = parse(sql, dialect).unwrap();
    Generator::new(dialect).pretty(true).statement(&statements[0]).unwrap()
}
