//! Error types for macro expansion.
//!
//! Tokenizing never fails and an unbound symbol is not an error (it passes
//! through as literal text). Everything below aborts the run.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected end of input at token {position}: unterminated list")]
    UnexpectedEof { position: usize },

    #[error("Unexpected '{found}' at byte {offset}")]
    UnexpectedClose { found: char, offset: usize },

    #[error("Lists nested deeper than {limit} levels at byte {offset}")]
    TooDeep { offset: usize, limit: usize },

    #[error("Mismatched delimiter at byte {offset}: expected '{expected}', found '{found}'")]
    MismatchedClose {
        expected: char,
        found: char,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Operator '{operator}' takes {expected} arguments, but {found} were given")]
    Arity {
        operator: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot apply '{0}': it is not an operator or command")]
    NotCallable(String),

    #[error("Malformed '{form}' form: {reason}")]
    MalformedForm { form: &'static str, reason: String },
}

/// Failure while expanding one macro block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Macro block starting at line {line} is never closed ({depth} open)")]
    Unterminated { line: usize, depth: usize },
}

/// Failure while expanding a whole document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Macro block at line {line}: {source}")]
    Block {
        line: usize,
        #[source]
        source: BlockError,
    },
}
