//! Tokenizer for macro blocks
//!
//! Turns the raw text of one macro block into a flat token sequence. Matching
//! priority, after skipping whitespace and commas:
//!
//! 1. `~@` (reserved)
//! 2. single-character punctuation: `[ ] { } ( ) ' ` ~ ^ @`
//! 3. double-quoted strings, backslash escapes allowed, closing quote optional
//! 4. `;` line comments
//! 5. bare words (numbers and symbols)
//!
//! Tokenizing never fails. Malformed input shows up later as a parse error.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char, one_of},
    combinator::{map, opt, recognize},
    multi::fold_many0,
    sequence::pair,
    IResult,
};
use serde::Serialize;

use crate::ast::Span;

// =============================================================================
// TOKEN TYPES
// =============================================================================

/// Which pair of characters delimits a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Paren,
    Bracket,
}

impl Delimiter {
    pub fn open_char(self) -> char {
        match self {
            Delimiter::Paren => '(',
            Delimiter::Bracket => '[',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            Delimiter::Paren => ')',
            Delimiter::Bracket => ']',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TokenKind {
    Open(Delimiter),
    Close(Delimiter),
    /// Punctuation with no evaluator meaning of its own (`'`, `~@`, `{`, ...)
    Reserved(String),
    /// String literal with escapes already resolved
    Str { value: String, terminated: bool },
    Comment(String),
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Tokenize one macro block
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = src;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let start = src.len() - rest.len();

        let (remaining, kind) = match token_kind(rest) {
            Ok(parsed) => parsed,
            // Every character is claimed by one of the rules above, so this
            // only guards against looping forever.
            Err(_) => {
                let width = rest.chars().next().map_or(1, char::len_utf8);
                (&rest[width..], TokenKind::Word(rest[..width].to_string()))
            }
        };

        let end = src.len() - remaining.len();
        tokens.push(Token::new(kind, Span::new(start, end)));
        rest = remaining;
    }

    tokens
}

// =============================================================================
// TOKEN RULES
// =============================================================================

fn token_kind(input: &str) -> IResult<&str, TokenKind> {
    alt((
        map(tag("~@"), |s: &str| TokenKind::Reserved(s.to_string())),
        map(one_of("[](){}'`~^@"), punctuation),
        string_literal,
        comment,
        map(take_while1(is_word_char), |s: &str| {
            TokenKind::Word(s.to_string())
        }),
    ))(input)
}

fn punctuation(ch: char) -> TokenKind {
    match ch {
        '(' => TokenKind::Open(Delimiter::Paren),
        ')' => TokenKind::Close(Delimiter::Paren),
        '[' => TokenKind::Open(Delimiter::Bracket),
        ']' => TokenKind::Close(Delimiter::Bracket),
        other => TokenKind::Reserved(other.to_string()),
    }
}

// Only `\"` and `\\` are escapes. Anything else keeps its backslash, so
// markup such as "\frac" or "\nu" survives intact.
fn string_literal(input: &str) -> IResult<&str, TokenKind> {
    let (input, _) = char('"')(input)?;
    let (input, value) = fold_many0(
        alt((
            recognize(pair(char('\\'), anychar)),
            take_while1(|c| c != '\\' && c != '"'),
        )),
        String::new,
        |mut acc, piece: &str| {
            match piece.strip_prefix('\\') {
                Some(escaped @ ("\"" | "\\")) => acc.push_str(escaped),
                _ => acc.push_str(piece),
            }
            acc
        },
    )(input)?;
    let (input, closing) = opt(char('"'))(input)?;

    Ok((
        input,
        TokenKind::Str {
            value,
            terminated: closing.is_some(),
        },
    ))
}

fn comment(input: &str) -> IResult<&str, TokenKind> {
    map(
        recognize(pair(char(';'), take_while(|c| c != '\n'))),
        |s: &str| TokenKind::Comment(s.to_string()),
    )(input)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace()
        && !matches!(
            c,
            '[' | ']' | '{' | '}' | '(' | ')' | '\'' | '"' | '`' | ',' | ';' | '@'
        )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    fn word(s: &str) -> TokenKind {
        TokenKind::Word(s.to_string())
    }

    fn string(s: &str) -> TokenKind {
        TokenKind::Str {
            value: s.to_string(),
            terminated: true,
        }
    }

    #[test]
    fn test_simple_list() {
        assert_eq!(
            kinds("(+ a 1)"),
            vec![
                TokenKind::Open(Delimiter::Paren),
                word("+"),
                word("a"),
                word("1"),
                TokenKind::Close(Delimiter::Paren),
            ]
        );
    }

    #[test]
    fn test_commas_are_whitespace() {
        assert_eq!(kinds(" a,b ,, c "), vec![word("a"), word("b"), word("c")]);
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            kinds("[a]"),
            vec![
                TokenKind::Open(Delimiter::Bracket),
                word("a"),
                TokenKind::Close(Delimiter::Bracket),
            ]
        );
    }

    #[test]
    fn test_reserved_punctuation() {
        assert_eq!(
            kinds("~@x 'y `z ~ ^ @ {}"),
            vec![
                TokenKind::Reserved("~@".into()),
                word("x"),
                TokenKind::Reserved("'".into()),
                word("y"),
                TokenKind::Reserved("`".into()),
                word("z"),
                TokenKind::Reserved("~".into()),
                TokenKind::Reserved("^".into()),
                TokenKind::Reserved("@".into()),
                TokenKind::Reserved("{".into()),
                TokenKind::Reserved("}".into()),
            ]
        );
    }

    #[test]
    fn test_caret_inside_word() {
        assert_eq!(kinds("x^2 a~b"), vec![word("x^2"), word("a~b")]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(kinds(r#""hello world""#), vec![string("hello world")]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\" \\ done""#),
            vec![string(r#"say "hi" \ done"#)]
        );
    }

    #[test]
    fn test_string_keeps_markup_backslashes() {
        assert_eq!(kinds(r#""\frac{1}{2} \nu""#), vec![string(r"\frac{1}{2} \nu")]);
    }

    #[test]
    fn test_string_with_parens_and_semicolon() {
        assert_eq!(kinds(r#""(a; b)""#), vec![string("(a; b)")]);
    }

    #[test]
    fn test_unterminated_string_is_accepted() {
        assert_eq!(
            kinds(r#"(a "open"#),
            vec![
                TokenKind::Open(Delimiter::Paren),
                word("a"),
                TokenKind::Str {
                    value: "open".into(),
                    terminated: false,
                },
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(
            kinds("a ; note (x)\nb"),
            vec![word("a"), TokenKind::Comment("; note (x)".into()), word("b")]
        );
    }

    #[test]
    fn test_word_stops_at_delimiters() {
        assert_eq!(
            kinds("foo!(bar)baz"),
            vec![
                word("foo!"),
                TokenKind::Open(Delimiter::Paren),
                word("bar"),
                TokenKind::Close(Delimiter::Paren),
                word("baz"),
            ]
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t,, ").is_empty());
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("  (ab \"c\")");
        assert_eq!(tokens[0].span, Span::new(2, 3));
        assert_eq!(tokens[1].span, Span::new(3, 5));
        assert_eq!(tokens[2].span, Span::new(6, 9));
        assert_eq!(tokens[3].span, Span::new(9, 10));
    }

    #[test]
    fn test_trailing_backslash_in_unterminated_string() {
        let tokens = tokenize("\"ab\\");
        assert_eq!(
            tokens[0].kind,
            TokenKind::Str {
                value: "ab".into(),
                terminated: false,
            }
        );
        assert_eq!(tokens[1].kind, word("\\"));
    }
}
