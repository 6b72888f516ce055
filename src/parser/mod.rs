//! SQL parser.
//!
//! Recursive descent over the token stream with precedence climbing for
//! binary operators. The source dialect decides lexing and what `||` means;
//! everything else lands in the dialect-independent [`crate::ast`].
//!
//! ```text
//! SELECT a, b FROM t WHERE x = 1
//!   │       │          └── parse_expr (precedence climbing)
//!   │       └── parse_table_with_joins
//!   └── parse_query → parse_set_expr → parse_select
//! ```

mod ddl;
mod expr;
mod query;

#[cfg(test)]
mod tests;

use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::{TranspileError, TranspileResult};
use crate::tokenizer::{tokenize, Spanned, Symbol, Token};

/// Deepest nesting of expressions, queries and types the parser accepts.
/// Keeps the recursive passes that follow well inside the stack.
pub const MAX_DEPTH: usize = 64;

/// Words that never become implicit aliases.
const RESERVED_WORDS: &[&str] = &[
    "select", "from", "where", "group", "having", "order", "by", "limit", "offset", "union",
    "intersect", "except", "minus", "join", "inner", "left", "right", "full", "cross", "outer",
    "semi", "anti", "on", "using", "as", "and", "or", "not", "in", "is", "like", "ilike", "rlike",
    "regexp", "between", "case", "when", "then", "else", "end", "lateral", "with", "distribute",
    "sort", "cluster", "window", "values", "insert", "overwrite", "partition", "div", "null",
    "true", "false", "distinct", "all",
];

/// Parse one or more `;`-separated statements written in `dialect`.
pub fn parse(sql: &str, dialect: Dialect) -> TranspileResult<Vec<Statement>> {
    let tokens = tokenize(sql, dialect)?;
    let mut parser = Parser::new(tokens, dialect, sql.len());
    let statements = parser.parse_statements()?;
    tracing::debug!(%dialect, count = statements.len(), "parsed statements");
    Ok(statements)
}

pub(crate) struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
    dialect: Dialect,
    source_len: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned>, dialect: Dialect, source_len: usize) -> Self {
        Self {
            tokens,
            index: 0,
            dialect,
            source_len,
            depth: 0,
        }
    }

    pub(crate) fn parse_statements(&mut self) -> TranspileResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.consume_symbol(Symbol::Semicolon) {}
            if self.peek().is_none() {
                break;
            }
            statements.push(self.parse_statement()?);
            if self.peek().is_some() && !self.consume_symbol(Symbol::Semicolon) {
                return Err(self.expected("';' or end of input"));
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> TranspileResult<Statement> {
        if self.peek_keyword("select")
            || self.peek_keyword("with")
            || self.peek_keyword("values")
            || self.peek_symbol(Symbol::LParen)
        {
            return Ok(Statement::Query(Box::new(self.parse_query()?)));
        }
        if self.parse_keyword("insert") {
            return Ok(Statement::Insert(self.parse_insert()?));
        }
        if self.parse_keyword("create") {
            return Ok(Statement::CreateTable(Box::new(self.parse_create_table()?)));
        }
        if self.parse_keyword("drop") {
            return self.parse_drop_table();
        }
        Err(self.expected("SELECT, WITH, INSERT, CREATE or DROP"))
    }

    // ---- token cursor ----

    fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.index).map(|s| s.token.clone());
        if tok.is_some() {
            self.index += 1;
        }
        tok
    }

    /// Byte offset of the current token, or the input length at the end.
    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(|s| s.position)
            .unwrap_or(self.source_len)
    }

    fn error(&self, message: impl Into<String>) -> TranspileError {
        TranspileError::parse(self.position(), message)
    }

    fn expected(&self, what: &str) -> TranspileError {
        let found = match self.peek() {
            Some(tok) => describe(tok),
            None => "end of input".to_string(),
        };
        self.error(format!("expected {}, found {}", what, found))
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> TranspileResult<T>) -> TranspileResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {} levels", MAX_DEPTH)));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ---- keywords ----

    fn word_at(&self, n: usize) -> Option<&str> {
        match self.peek_nth(n) {
            Some(Token::Word(w)) => Some(w.as_str()),
            _ => None,
        }
    }

    fn peek_keyword_at(&self, n: usize, keyword: &str) -> bool {
        self.word_at(n).is_some_and(|w| w.eq_ignore_ascii_case(keyword))
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek_keyword_at(0, keyword)
    }

    fn parse_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Consume a keyword sequence only if every word matches.
    fn parse_keywords(&mut self, keywords: &[&str]) -> bool {
        let all = keywords
            .iter()
            .enumerate()
            .all(|(i, kw)| self.peek_keyword_at(i, kw));
        if all {
            self.index += keywords.len();
        }
        all
    }

    fn expect_keyword(&mut self, keyword: &str) -> TranspileResult<()> {
        if self.parse_keyword(keyword) {
            Ok(())
        } else {
            Err(self.expected(&keyword.to_ascii_uppercase()))
        }
    }

    // ---- symbols ----

    fn peek_symbol(&self, symbol: Symbol) -> bool {
        self.peek_symbol_at(0, symbol)
    }

    fn peek_symbol_at(&self, n: usize, symbol: Symbol) -> bool {
        matches!(self.peek_nth(n), Some(Token::Symbol(s)) if *s == symbol)
    }

    fn consume_symbol(&mut self, symbol: Symbol) -> bool {
        if self.peek_symbol(symbol) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> TranspileResult<()> {
        if self.consume_symbol(symbol) {
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", symbol_text(symbol))))
        }
    }

    // ---- names ----

    fn parse_identifier(&mut self) -> TranspileResult<Ident> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let ident = Ident::new(w.clone());
                self.index += 1;
                Ok(ident)
            }
            Some(Token::QuotedIdent(q)) => {
                let ident = Ident::quoted(q.clone());
                self.index += 1;
                Ok(ident)
            }
            _ => Err(self.expected("identifier")),
        }
    }

    fn parse_object_name(&mut self) -> TranspileResult<ObjectName> {
        let mut parts = vec![self.parse_identifier()?];
        while self.peek_symbol(Symbol::Dot) && !self.peek_symbol_at(1, Symbol::Star) {
            self.index += 1;
            parts.push(self.parse_identifier()?);
        }
        Ok(ObjectName(parts))
    }

    fn parse_identifier_list(&mut self) -> TranspileResult<Vec<Ident>> {
        self.expect_symbol(Symbol::LParen)?;
        let mut idents = vec![self.parse_identifier()?];
        while self.consume_symbol(Symbol::Comma) {
            idents.push(self.parse_identifier()?);
        }
        self.expect_symbol(Symbol::RParen)?;
        Ok(idents)
    }

    /// `[AS] alias` where a bare alias must not be a reserved word.
    fn parse_optional_alias(&mut self) -> TranspileResult<Option<Ident>> {
        if self.parse_keyword("as") {
            return self.parse_identifier().map(Some);
        }
        match self.peek() {
            Some(Token::QuotedIdent(_)) => self.parse_identifier().map(Some),
            Some(Token::Word(w)) if !is_reserved(w) => self.parse_identifier().map(Some),
            _ => Ok(None),
        }
    }

    fn parse_string_literal(&mut self) -> TranspileResult<String> {
        match self.peek() {
            Some(Token::String(s)) => {
                let s = s.clone();
                self.index += 1;
                Ok(s)
            }
            _ => Err(self.expected("string literal")),
        }
    }

    fn parse_u32(&mut self) -> TranspileResult<u32> {
        match self.peek() {
            Some(Token::Number { text, suffix: None }) => {
                let n = text
                    .parse::<u32>()
                    .map_err(|_| self.error(format!("expected unsigned integer, found {}", text)))?;
                self.index += 1;
                Ok(n)
            }
            _ => Err(self.expected("unsigned integer")),
        }
    }

    /// True when the next tokens start a query: `SELECT`, `WITH`, `VALUES`
    /// or a parenthesized one of those.
    fn peek_query_start(&self, n: usize) -> bool {
        if self.peek_keyword_at(n, "select")
            || self.peek_keyword_at(n, "with")
            || self.peek_keyword_at(n, "values")
        {
            return true;
        }
        self.peek_symbol_at(n, Symbol::LParen) && self.peek_query_start(n + 1)
    }
}

fn is_reserved(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

fn describe(tok: &Token) -> String {
    match tok {
        Token::Word(w) => format!("'{}'", w),
        Token::QuotedIdent(q) => format!("`{}`", q),
        Token::String(s) => format!("string '{}'", s),
        Token::Number { text, .. } => format!("number {}", text),
        Token::Symbol(s) => format!("'{}'", symbol_text(*s)),
    }
}

fn symbol_text(symbol: Symbol) -> &'static str {
    match symbol {
        Symbol::LParen => "(",
        Symbol::RParen => ")",
        Symbol::LBracket => "[",
        Symbol::RBracket => "]",
        Symbol::Comma => ",",
        Symbol::Dot => ".",
        Symbol::Semicolon => ";",
        Symbol::Colon => ":",
        Symbol::Eq => "=",
        Symbol::DoubleEq => "==",
        Symbol::NullSafeEq => "<=>",
        Symbol::NotEq => "!=",
        Symbol::LtGt => "<>",
        Symbol::Lt => "<",
        Symbol::LtEq => "<=",
        Symbol::Gt => ">",
        Symbol::GtEq => ">=",
        Symbol::Plus => "+",
        Symbol::Minus => "-",
        Symbol::Star => "*",
        Symbol::Slash => "/",
        Symbol::Percent => "%",
        Symbol::Concat => "||",
        Symbol::Pipe => "|",
        Symbol::Amp => "&",
        Symbol::Caret => "^",
        Symbol::Tilde => "~",
        Symbol::Arrow => "->",
    }
}
