//! SQL tokenizer using nom.
//!
//! Turns source text into a flat list of positioned tokens. Whitespace and
//! comments are dropped; string literals and quoted identifiers are unescaped.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, one_of},
    combinator::{map, opt, recognize, value},
    error::{Error, ErrorKind},
    sequence::{pair, tuple},
    IResult,
};

use crate::dialect::Dialect;
use crate::error::{TranspileError, TranspileResult};

/// Punctuation and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    Eq,
    DoubleEq,
    NullSafeEq,
    NotEq,
    LtGt,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat,
    Pipe,
    Amp,
    Caret,
    Tilde,
    Arrow,
}

/// Spark/Hive typed numeric literal suffix (`10L`, `1.5BD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberSuffix {
    Long,
    Short,
    Tiny,
    Double,
    Float,
    Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Unquoted identifier or keyword.
    Word(String),
    /// Backtick-quoted identifier, unescaped.
    QuotedIdent(String),
    /// String literal, unescaped.
    String(String),
    Number {
        text: String,
        suffix: Option<NumberSuffix>,
    },
    Symbol(Symbol),
}

/// A token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Tokenize `input` using the lexical rules of `dialect`.
pub fn tokenize(input: &str, dialect: Dialect) -> TranspileResult<Vec<Spanned>> {
    let mut rest = input;
    let mut tokens = Vec::new();

    loop {
        rest = skip_trivia(input, rest, dialect)?;
        if rest.is_empty() {
            break;
        }
        let position = input.len() - rest.len();
        let (next, token) =
            next_token(rest, dialect).map_err(|msg| TranspileError::tokenize(position, msg))?;
        tokens.push(Spanned { token, position });
        rest = next;
    }

    Ok(tokens)
}

/// Split a script into statements on top-level `;`.
///
/// Semicolons inside strings or comments do not split. Statements holding
/// nothing but whitespace or comments are dropped.
pub fn split_statements(input: &str, dialect: Dialect) -> TranspileResult<Vec<String>> {
    let tokens = tokenize(input, dialect)?;
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_tokens = false;

    for tok in &tokens {
        if tok.token == Token::Symbol(Symbol::Semicolon) {
            if has_tokens {
                statements.push(input[start..tok.position].trim().to_string());
            }
            start = tok.position + 1;
            has_tokens = false;
        } else {
            has_tokens = true;
        }
    }
    if has_tokens {
        statements.push(input[start..].trim().to_string());
    }

    Ok(statements)
}

fn skip_trivia<'a>(source: &str, mut rest: &'a str, dialect: Dialect) -> TranspileResult<&'a str> {
    loop {
        let before = rest.len();

        if let Ok((r, _)) = multispace1::<_, Error<&str>>(rest) {
            rest = r;
        }
        if let Ok((r, _)) = line_comment(rest) {
            rest = r;
        }
        if dialect.hash_comments()
            && let Ok((r, _)) = hash_comment(rest)
        {
            rest = r;
        }
        if rest.starts_with("/*") {
            match block_comment(rest) {
                Ok((r, _)) => rest = r,
                Err(_) => {
                    return Err(TranspileError::tokenize(
                        source.len() - rest.len(),
                        "unterminated block comment",
                    ));
                }
            }
        }

        if rest.len() == before {
            return Ok(rest);
        }
    }
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    value((), pair(tag("--"), not_line_ending))(input)
}

fn hash_comment(input: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, ()> {
    value((), tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn next_token(rest: &str, dialect: Dialect) -> Result<(&str, Token), String> {
    let mut chars = rest.chars();
    let first = chars.next().unwrap_or_default();
    let second = chars.next();

    match first {
        '`' => quoted(rest, '`', false)
            .map(|(r, s)| (r, Token::QuotedIdent(s)))
            .map_err(|_| "unterminated quoted identifier".to_string()),
        '\'' | '"' => quoted(rest, first, true)
            .map(|(r, s)| (r, Token::String(s)))
            .map_err(|_| "unterminated string literal".to_string()),
        c if c.is_ascii_digit() || (c == '.' && second.is_some_and(|d| d.is_ascii_digit())) => {
            number(rest, dialect).map_err(|_| format!("malformed number near '{}'", c))
        }
        c if is_ident_start(c) => word(rest)
            .map(|(r, w)| (r, Token::Word(w.to_string())))
            .map_err(|_| format!("unexpected character '{}'", c)),
        c => symbol(rest)
            .map(|(r, s)| (r, Token::Symbol(s)))
            .map_err(|_| format!("unexpected character '{}'", c)),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_ident_start), take_while(is_ident_char)))(input)
}

/// Parse a quoted run. A doubled quote is an escaped quote; backslash escapes
/// are decoded when `backslash` is set.
fn quoted(input: &str, quote: char, backslash: bool) -> IResult<&str, String> {
    let (mut rest, _) = char(quote)(input)?;
    let mut out = String::new();

    loop {
        let Some(c) = rest.chars().next() else {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)));
        };
        let after = &rest[c.len_utf8()..];

        if c == quote {
            if after.starts_with(quote) {
                out.push(quote);
                rest = &after[quote.len_utf8()..];
                continue;
            }
            return Ok((after, out));
        }

        if c == '\\' && backslash {
            let Some(escaped) = after.chars().next() else {
                return Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)));
            };
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                // LIKE wildcards keep their backslash
                '%' | '_' => {
                    out.push('\\');
                    out.push(escaped);
                }
                other => out.push(other),
            }
            rest = &after[escaped.len_utf8()..];
            continue;
        }

        out.push(c);
        rest = after;
    }
}

fn number_body(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

fn number_suffix(input: &str) -> IResult<&str, NumberSuffix> {
    alt((
        value(NumberSuffix::Decimal, tag_no_case("bd")),
        value(NumberSuffix::Long, tag_no_case("l")),
        value(NumberSuffix::Short, tag_no_case("s")),
        value(NumberSuffix::Tiny, tag_no_case("y")),
        value(NumberSuffix::Double, tag_no_case("d")),
        value(NumberSuffix::Float, tag_no_case("f")),
    ))(input)
}

fn number(input: &str, dialect: Dialect) -> IResult<&str, Token> {
    let (rest, text) = number_body(input)?;

    let mut suffix = None;
    let mut rest = rest;
    if dialect.numeric_suffixes()
        && let Ok((after, s)) = number_suffix(rest)
        && !after.chars().next().is_some_and(is_ident_char)
    {
        suffix = Some(s);
        rest = after;
    }

    Ok((
        rest,
        Token::Number {
            text: text.to_string(),
            suffix,
        },
    ))
}

fn symbol(input: &str) -> IResult<&str, Symbol> {
    alt((
        alt((
            value(Symbol::NullSafeEq, tag("<=>")),
            value(Symbol::LtEq, tag("<=")),
            value(Symbol::LtGt, tag("<>")),
            value(Symbol::GtEq, tag(">=")),
            value(Symbol::DoubleEq, tag("==")),
            value(Symbol::NotEq, tag("!=")),
            value(Symbol::Concat, tag("||")),
            value(Symbol::Arrow, tag("->")),
        )),
        map(one_of("()[],.;:=<>+-*/%|&^~"), |c| match c {
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            '[' => Symbol::LBracket,
            ']' => Symbol::RBracket,
            ',' => Symbol::Comma,
            '.' => Symbol::Dot,
            ';' => Symbol::Semicolon,
            ':' => Symbol::Colon,
            '=' => Symbol::Eq,
            '<' => Symbol::Lt,
            '>' => Symbol::Gt,
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Star,
            '/' => Symbol::Slash,
            '%' => Symbol::Percent,
            '|' => Symbol::Pipe,
            '&' => Symbol::Amp,
            '^' => Symbol::Caret,
            _ => Symbol::Tilde,
        }),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(sql: &str, dialect: Dialect) -> Vec<Token> {
        tokenize(sql, dialect)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(
            kinds("SELECT a, `b c` FROM t", Dialect::Spark),
            vec![
                Token::Word("SELECT".into()),
                Token::Word("a".into()),
                Token::Symbol(Symbol::Comma),
                Token::QuotedIdent("b c".into()),
                Token::Word("FROM".into()),
                Token::Word("t".into()),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let toks = tokenize("a  +\n b", Dialect::Spark).unwrap();
        let positions: Vec<usize> = toks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 6]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#"'it''s' "say \"hi\"" 'a\nb' 'x\%'"#, Dialect::Spark),
            vec![
                Token::String("it's".into()),
                Token::String("say \"hi\"".into()),
                Token::String("a\nb".into()),
                Token::String("x\\%".into()),
            ]
        );
    }

    #[test]
    fn test_doubled_backtick() {
        assert_eq!(kinds("`a``b`", Dialect::Doris), vec![Token::QuotedIdent("a`b".into())]);
    }

    #[test]
    fn test_numbers_and_suffixes() {
        assert_eq!(
            kinds("1 2.5 .5 1e10 10L 3.0BD 7y", Dialect::Spark),
            vec![
                Token::Number { text: "1".into(), suffix: None },
                Token::Number { text: "2.5".into(), suffix: None },
                Token::Number { text: ".5".into(), suffix: None },
                Token::Number { text: "1e10".into(), suffix: None },
                Token::Number { text: "10".into(), suffix: Some(NumberSuffix::Long) },
                Token::Number { text: "3.0".into(), suffix: Some(NumberSuffix::Decimal) },
                Token::Number { text: "7".into(), suffix: Some(NumberSuffix::Tiny) },
            ]
        );
    }

    #[test]
    fn test_suffix_not_taken_before_identifier_chars() {
        assert_eq!(
            kinds("10days", Dialect::Spark),
            vec![
                Token::Number { text: "10".into(), suffix: None },
                Token::Word("days".into()),
            ]
        );
    }

    #[test]
    fn test_no_suffixes_in_doris() {
        assert_eq!(
            kinds("10L", Dialect::Doris),
            vec![
                Token::Number { text: "10".into(), suffix: None },
                Token::Word("L".into()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<=> <= <> != == || -> >= < >", Dialect::Spark),
            vec![
                Token::Symbol(Symbol::NullSafeEq),
                Token::Symbol(Symbol::LtEq),
                Token::Symbol(Symbol::LtGt),
                Token::Symbol(Symbol::NotEq),
                Token::Symbol(Symbol::DoubleEq),
                Token::Symbol(Symbol::Concat),
                Token::Symbol(Symbol::Arrow),
                Token::Symbol(Symbol::GtEq),
                Token::Symbol(Symbol::Lt),
                Token::Symbol(Symbol::Gt),
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let sql = "SELECT 1 -- trailing\n/* block\n comment */ + 2";
        assert_eq!(kinds(sql, Dialect::Spark).len(), 4);
    }

    #[test]
    fn test_hash_comments_only_in_mysql_family() {
        assert_eq!(kinds("1 # note", Dialect::Doris).len(), 1);
        assert!(tokenize("1 # note", Dialect::Spark).is_err());
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("SELECT 'abc", Dialect::Spark).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tokenize error at position 7: unterminated string literal"
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("SELECT /* oops", Dialect::Spark).unwrap_err();
        assert!(matches!(err, TranspileError::Tokenize { position: 7, .. }));
    }

    #[test]
    fn test_split_statements() {
        let script = "SELECT ';' FROM a; -- x;\n;SELECT 2;\n  ";
        assert_eq!(
            split_statements(script, Dialect::Spark).unwrap(),
            vec!["SELECT ';' FROM a".to_string(), "SELECT 2".to_string()]
        );
    }
}
