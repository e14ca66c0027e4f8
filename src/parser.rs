//! Recursive-descent parser over the token sequence
//!
//! A cursor walks the tokens with one token of lookahead:
//! - `(` or `[` opens a list that runs to its matching closer
//! - anything else is an atom, classified as integer, float, text or symbol
//!
//! Lists may nest at most [`MAX_NESTING_DEPTH`] deep, which also bounds the
//! evaluator's recursion.
//!
//! Comment tokens are skipped. Reserved punctuation (`'`, `~@`, `^`, ...)
//! parses as a symbol of the same spelling, so `^` can still name the
//! superscript operator.

use nom::{
    bytes::complete::take_while,
    character::complete::{char, digit1, satisfy},
    combinator::{all_consuming, opt, recognize},
    sequence::{pair, tuple},
};

use crate::ast::Expr;
use crate::errors::ParseError;
use crate::lexer::{tokenize, Delimiter, Token, TokenKind};

// ============================================================================
// Public API
// ============================================================================

/// Deepest list nesting accepted in one block
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse every top-level expression of a macro block
pub fn parse_block(src: &str) -> Result<Vec<Expr>, ParseError> {
    let tokens = tokenize(src);
    parse_tokens(&tokens)
}

/// Parse a token sequence into its top-level expressions
pub fn parse_tokens(tokens: &[Token]) -> Result<Vec<Expr>, ParseError> {
    let mut exprs = Vec::new();
    let mut cursor = 0;
    loop {
        skip_comments(tokens, &mut cursor);
        if cursor >= tokens.len() {
            return Ok(exprs);
        }
        exprs.push(parse_expr(tokens, &mut cursor)?);
    }
}

/// Parse one expression starting at `cursor` and advance past it
pub fn parse_expr(tokens: &[Token], cursor: &mut usize) -> Result<Expr, ParseError> {
    parse_nested(tokens, cursor, 0)
}

// ============================================================================
// Internal Parsers
// ============================================================================

/// `depth` is the number of lists already open around `cursor`
fn parse_nested(tokens: &[Token], cursor: &mut usize, depth: usize) -> Result<Expr, ParseError> {
    skip_comments(tokens, cursor);
    let token = tokens
        .get(*cursor)
        .ok_or(ParseError::UnexpectedEof { position: *cursor })?;

    match &token.kind {
        TokenKind::Open(delimiter) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(ParseError::TooDeep {
                    offset: token.span.start,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            *cursor += 1;
            parse_list(tokens, cursor, *delimiter, depth + 1)
        }
        TokenKind::Close(delimiter) => Err(ParseError::UnexpectedClose {
            found: delimiter.close_char(),
            offset: token.span.start,
        }),
        TokenKind::Str { value, .. } => {
            *cursor += 1;
            Ok(Expr::Text(value.clone()))
        }
        TokenKind::Word(word) | TokenKind::Reserved(word) => {
            *cursor += 1;
            Ok(classify_atom(word))
        }
        // skip_comments leaves the cursor on a non-comment token
        TokenKind::Comment(_) => unreachable!("comments are skipped before dispatch"),
    }
}

fn parse_list(
    tokens: &[Token],
    cursor: &mut usize,
    delimiter: Delimiter,
    depth: usize,
) -> Result<Expr, ParseError> {
    let mut items = Vec::new();
    loop {
        skip_comments(tokens, cursor);
        let token = tokens
            .get(*cursor)
            .ok_or(ParseError::UnexpectedEof { position: *cursor })?;

        match &token.kind {
            TokenKind::Close(closer) if *closer == delimiter => {
                *cursor += 1;
                return Ok(Expr::List(items));
            }
            TokenKind::Close(closer) => {
                return Err(ParseError::MismatchedClose {
                    expected: delimiter.close_char(),
                    found: closer.close_char(),
                    offset: token.span.start,
                });
            }
            _ => items.push(parse_nested(tokens, cursor, depth)?),
        }
    }
}

fn skip_comments(tokens: &[Token], cursor: &mut usize) {
    while tokens.get(*cursor).is_some_and(Token::is_comment) {
        *cursor += 1;
    }
}

// ============================================================================
// Atoms
// ============================================================================

/// Classify a bare word: integer first, then float, otherwise a symbol
pub fn classify_atom(word: &str) -> Expr {
    if is_integer(word) {
        Expr::integer(word)
    } else if is_float(word) {
        Expr::float(word)
    } else {
        Expr::symbol(word)
    }
}

/// `-?[0-9]+`
fn is_integer(word: &str) -> bool {
    all_consuming(recognize(pair(
        opt(char::<_, nom::error::Error<&str>>('-')),
        digit1,
    )))(word)
    .is_ok()
}

/// `-?[0-9][0-9.]*` with at least one `.`
fn is_float(word: &str) -> bool {
    word.contains('.')
        && all_consuming(recognize(tuple((
            opt(char::<_, nom::error::Error<&str>>('-')),
            satisfy(|c| c.is_ascii_digit()),
            take_while(|c: char| c.is_ascii_digit() || c == '.'),
        ))))(word)
        .is_ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn parse_one(src: &str) -> Expr {
        let mut exprs = parse_block(src).unwrap();
        assert_eq!(exprs.len(), 1, "expected a single expression in {src:?}");
        exprs.remove(0)
    }

    #[test]
    fn test_atoms() {
        assert_eq!(parse_one("42"), Expr::integer("42"));
        assert_eq!(parse_one("-7"), Expr::integer("-7"));
        assert_eq!(parse_one("3.14"), Expr::float("3.14"));
        assert_eq!(parse_one("-0.5"), Expr::float("-0.5"));
        assert_eq!(parse_one("zeta"), Expr::symbol("zeta"));
        assert_eq!(parse_one(r#""x=1""#), Expr::text("x=1"));
    }

    #[test]
    fn test_numeric_edge_cases() {
        assert_eq!(parse_one("-"), Expr::symbol("-"));
        assert_eq!(parse_one("1."), Expr::float("1."));
        assert_eq!(parse_one("1.2.3"), Expr::float("1.2.3"));
        assert_eq!(parse_one(".5"), Expr::symbol(".5"));
        assert_eq!(parse_one("1a"), Expr::symbol("1a"));
        assert_eq!(parse_one("--1"), Expr::symbol("--1"));
        assert_eq!(parse_one("-x"), Expr::symbol("-x"));
    }

    #[test]
    fn test_text_is_not_a_number() {
        assert_eq!(parse_one(r#""5""#), Expr::text("5"));
    }

    #[test]
    fn test_nested_lists() {
        assert_eq!(
            parse_one("(begin! \"equation\" (+ a (^ x 2)))"),
            Expr::list([
                Expr::symbol("begin!"),
                Expr::text("equation"),
                Expr::list([
                    Expr::symbol("+"),
                    Expr::symbol("a"),
                    Expr::list([Expr::symbol("^"), Expr::symbol("x"), Expr::integer("2")]),
                ]),
            ])
        );
    }

    #[test]
    fn test_bracket_lists_have_list_shape() {
        assert_eq!(parse_one("[a b]"), parse_one("(a b)"));
        assert_eq!(
            parse_one("(let [(a 1)] a)"),
            parse_one("(let ((a 1)) a)")
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(parse_one("()"), Expr::List(vec![]));
        assert_eq!(parse_one("[]"), Expr::List(vec![]));
    }

    #[test]
    fn test_multiple_top_level_expressions() {
        let exprs = parse_block("(define x \"5\") x").unwrap();
        assert_eq!(
            exprs,
            vec![
                Expr::list([Expr::symbol("define"), Expr::symbol("x"), Expr::text("5")]),
                Expr::symbol("x"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let exprs = parse_block("; heading\n(a ; inline\n b)\n; trailing").unwrap();
        assert_eq!(exprs, vec![Expr::list([Expr::symbol("a"), Expr::symbol("b")])]);
    }

    #[test]
    fn test_only_comments() {
        assert_eq!(parse_block("; nothing here").unwrap(), vec![]);
    }

    #[test]
    fn test_reserved_tokens_become_symbols() {
        assert_eq!(
            parse_one("(' ~@ x)"),
            Expr::list([Expr::symbol("'"), Expr::symbol("~@"), Expr::symbol("x")])
        );
    }

    #[test]
    fn test_parse_expr_advances_cursor() {
        let tokens = tokenize("(a b) c");
        let mut cursor = 0;
        parse_expr(&tokens, &mut cursor).unwrap();
        assert_eq!(cursor, 4);
        assert_eq!(parse_expr(&tokens, &mut cursor).unwrap(), Expr::symbol("c"));
        assert_eq!(cursor, 5);
    }

    #[test]
    fn test_error_unterminated_list() {
        assert_eq!(
            parse_block("(a (b c)"),
            Err(ParseError::UnexpectedEof { position: 6 })
        );
    }

    #[test]
    fn test_nesting_up_to_limit() {
        let src = "(".repeat(MAX_NESTING_DEPTH) + &")".repeat(MAX_NESTING_DEPTH);
        let expr = parse_one(&src);
        assert_eq!(expr.token_count(), 2 * MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_error_nesting_too_deep() {
        let src = "(".repeat(5_000) + &")".repeat(5_000);
        assert_eq!(
            parse_block(&src),
            Err(ParseError::TooDeep {
                offset: MAX_NESTING_DEPTH,
                limit: MAX_NESTING_DEPTH
            })
        );

        let src = format!("(a [{}])", "(b ".repeat(MAX_NESTING_DEPTH));
        assert!(matches!(
            parse_block(&src),
            Err(ParseError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_error_unterminated_string_inside_list() {
        assert!(matches!(
            parse_block("(a \"b)"),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_error_stray_closer() {
        assert_eq!(
            parse_block("(a))"),
            Err(ParseError::UnexpectedClose {
                found: ')',
                offset: 3
            })
        );
    }

    #[test]
    fn test_error_mismatched_closer() {
        assert_eq!(
            parse_block("(a]"),
            Err(ParseError::MismatchedClose {
                expected: ')',
                found: ']',
                offset: 2
            })
        );
    }

    #[test]
    fn test_round_trip_token_count() {
        let src = r#"(documentclass! "article" ["a4paper" 12pt] (begin! document [x -1 2.5]))"#;
        let original = tokenize(src).len();
        let expr = parse_one(src);
        assert_eq!(expr.token_count(), original);
        assert_eq!(tokenize(&expr.to_source()).len(), original);
    }

    proptest! {
        #[test]
        fn prop_integers_classify_as_integer(word in "-?[0-9]{1,18}") {
            prop_assert_eq!(classify_atom(&word), Expr::integer(word.clone()));
        }

        #[test]
        fn prop_dotted_numbers_classify_as_float(word in "-?[0-9][0-9.]{0,8}\\.[0-9.]{0,4}") {
            prop_assert_eq!(classify_atom(&word), Expr::float(word.clone()));
        }

        #[test]
        fn prop_words_classify_as_symbol(word in "[a-zA-Z+*/=<>_!][a-zA-Z0-9!.-]{0,10}") {
            prop_assert_eq!(classify_atom(&word), Expr::symbol(word.clone()));
        }
    }
}
