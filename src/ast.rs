//! Expression tree for the macro dialect
//!
//! The parser produces a small, closed tree:
//! - **Numbers**: `Integer` and `Float`, kept as their literal text so that
//!   markup output reproduces exactly what the author typed
//! - **Text**: quoted string literals, already unescaped
//! - **Symbol**: bare words, resolved against the environment at evaluation
//! - **List**: parenthesised or bracketed sequences (same shape either way)
//!
//! A `Symbol("5")` and a `Text("5")` are different values: only the former is
//! ever looked up.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SPANS
// =============================================================================

/// Byte range of a token in the macro block it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of start
    pub start: usize,
    /// Byte offset of end
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// ATOMS
// =============================================================================

/// A symbol name. Never interchangeable with literal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The literal text of a numeric token.
///
/// Numbers only ever flow into markup, so the source spelling is the value;
/// `as_i64`/`as_f64` are there for callers that need arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Numeral(String);

impl Numeral {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    pub fn literal(&self) -> &str {
        &self.0
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// One node of the expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expr {
    Integer(Numeral),
    Float(Numeral),
    Text(String),
    Symbol(Symbol),
    List(Vec<Expr>),
}

impl Expr {
    pub fn integer(literal: impl Into<String>) -> Self {
        Expr::Integer(Numeral::new(literal))
    }

    pub fn float(literal: impl Into<String>) -> Self {
        Expr::Float(Numeral::new(literal))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Expr::Text(value.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(Symbol::new(name))
    }

    pub fn list(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::List(items.into_iter().collect())
    }

    // =========================================================================
    // PREDICATES & EXTRACTORS
    // =========================================================================

    pub fn is_list(&self) -> bool {
        matches!(self, Expr::List(_))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(sym) => Some(sym.name()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Number of tokens this expression occupies in source form
    pub fn token_count(&self) -> usize {
        match self {
            Expr::List(items) => 2 + items.iter().map(Expr::token_count).sum::<usize>(),
            _ => 1,
        }
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Render back to dialect source. Bracket lists come back as parens.
    pub fn to_source(&self) -> String {
        match self {
            Expr::Integer(n) | Expr::Float(n) => n.literal().to_string(),
            Expr::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' || ch == '\\' {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out.push('"');
                out
            }
            Expr::Symbol(sym) => sym.name().to_string(),
            Expr::List(items) => {
                let inner: Vec<String> = items.iter().map(Expr::to_source).collect();
                format!("({})", inner.join(" "))
            }
        }
    }

    /// Render as markup: like `to_source`, but text is emitted raw.
    ///
    /// This is what a quoted expression contributes to the document.
    pub fn to_markup(&self) -> String {
        match self {
            Expr::Text(s) => s.clone(),
            Expr::List(items) => {
                let inner: Vec<String> = items.iter().map(Expr::to_markup).collect();
                format!("({})", inner.join(" "))
            }
            other => other.to_source(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}
