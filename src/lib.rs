//! lispytex: s-expression macros for LaTeX documents
//!
//! Annotate a LaTeX source with comment lines holding s-expressions and
//! expand them into markup in place:
//!
//! ```text
//! % (begin! equation (= (^ e (* i pi)) -1))
//! ```
//!
//! becomes
//!
//! ```text
//! \begin{equation}
//!   e^{i * pi} = -1
//! \end{equation}
//! ```
//!
//! # Layers
//!
//! - [`lexer`]: block text to tokens (never fails)
//! - [`parser`]: tokens to [`Expr`] trees
//! - [`evaluator`]: trees to markup, against an [`Environment`]
//! - [`scanner`]: finds annotated blocks in a host document
//! - [`expander`]: runs the whole pipeline over a document
//!
//! # Example
//!
//! ```
//! use lispytex::{expand_block, Environment};
//!
//! let mut env = Environment::new();
//! let markup = expand_block(&mut env, "(frac! (+ a b) 2)", 0, 0, 2).unwrap();
//! assert_eq!(markup, "\\frac{a + b}{2}");
//! ```

pub mod ast;
pub mod builtins;
pub mod config;
pub mod environment;
pub mod errors;
pub mod evaluator;
pub mod expander;
pub mod lexer;
pub mod parser;
pub mod scanner;

pub use ast::{Expr, Numeral, Span, Symbol};
pub use builtins::{Builtin, Operator};
pub use config::{ConfigLoader, ExpanderConfig};
pub use environment::{Environment, Frame};
pub use errors::{BlockError, EvalError, ExpandError, ParseError, ScanError};
pub use evaluator::{Evaluator, SpecialForm, Value, DEFAULT_INDENT_SIZE};
pub use expander::{expand_block, Expander};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_block, parse_tokens};
pub use scanner::{scan, MacroBlock, Scanner, Segment};
