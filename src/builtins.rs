//! Built-in operators
//!
//! A fixed table maps operator symbols to an [`Operator`]. Any other symbol
//! ending in `!` that is not a special form resolves to a markup command,
//! `(frac! a b)` → `\frac{a}{b}`.

use std::fmt;

use crate::errors::EvalError;
use crate::evaluator::SpecialForm;

/// How an operator lays out its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `a + b + c`, any number of arguments
    Sum,
    /// `a op b`
    Infix(&'static str),
    /// `a^{b}`, `a_{b}`
    Script(&'static str),
    /// `a < {b}`
    Relation(&'static str),
}

const OPERATOR_TABLE: [(&str, Operator); 20] = [
    ("+", Operator::Sum),
    ("plus", Operator::Sum),
    ("-", Operator::Infix("-")),
    ("minus", Operator::Infix("-")),
    ("*", Operator::Infix("*")),
    ("times", Operator::Infix("*")),
    ("/", Operator::Infix("/")),
    ("div", Operator::Infix("/")),
    ("=", Operator::Infix("=")),
    ("eq", Operator::Infix("=")),
    ("%", Operator::Infix("%")),
    ("mod", Operator::Infix("%")),
    ("^", Operator::Script("^")),
    ("up", Operator::Script("^")),
    ("_", Operator::Script("_")),
    ("sub", Operator::Script("_")),
    ("<", Operator::Relation("<")),
    ("lt", Operator::Relation("<")),
    (">", Operator::Relation(">")),
    ("gt", Operator::Relation(">")),
];

/// A callable value. Only ever produced by symbol lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Builtin {
    Operator { name: &'static str, op: Operator },
    /// Markup command, stored without its trailing `!`
    Command(String),
}

impl Builtin {
    /// Resolve a symbol against the built-in table
    pub fn resolve(symbol: &str) -> Option<Builtin> {
        if let Some((name, op)) = OPERATOR_TABLE.iter().find(|(name, _)| *name == symbol) {
            return Some(Builtin::Operator {
                name: *name,
                op: *op,
            });
        }

        let command = symbol.strip_suffix('!')?;
        if command.is_empty() || SpecialForm::of(symbol).is_some() {
            return None;
        }
        Some(Builtin::Command(command.to_string()))
    }

    /// Apply to already-evaluated arguments
    pub fn apply(&self, args: &[String]) -> Result<String, EvalError> {
        match self {
            Builtin::Operator { name, op } => match op {
                Operator::Sum => Ok(args.join(" + ")),
                Operator::Infix(sym) => {
                    let [a, b] = binary(name, args)?;
                    Ok(format!("{a} {sym} {b}"))
                }
                Operator::Script(sym) => {
                    let [a, b] = binary(name, args)?;
                    Ok(format!("{a}{sym}{{{b}}}"))
                }
                Operator::Relation(sym) => {
                    let [a, b] = binary(name, args)?;
                    Ok(format!("{a} {sym} {{{b}}}"))
                }
            },
            Builtin::Command(command) => {
                let mut out = format!("\\{command}");
                for arg in args {
                    out.push('{');
                    out.push_str(arg);
                    out.push('}');
                }
                Ok(out)
            }
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builtin::Operator { name, .. } => f.write_str(name),
            Builtin::Command(command) => write!(f, "{command}!"),
        }
    }
}

fn binary<'a>(name: &str, args: &'a [String]) -> Result<[&'a String; 2], EvalError> {
    match args {
        [a, b] => Ok([a, b]),
        _ => Err(EvalError::Arity {
            operator: name.to_string(),
            expected: 2,
            found: args.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn apply(symbol: &str, args: &[&str]) -> Result<String, EvalError> {
        Builtin::resolve(symbol).unwrap().apply(&strings(args))
    }

    #[test]
    fn test_sum_is_variadic() {
        assert_eq!(apply("+", &["a", "b", "c"]).unwrap(), "a + b + c");
        assert_eq!(apply("plus", &["1"]).unwrap(), "1");
        assert_eq!(apply("+", &[]).unwrap(), "");
    }

    #[test]
    fn test_infix_operators() {
        assert_eq!(apply("-", &["a", "b"]).unwrap(), "a - b");
        assert_eq!(apply("times", &["a", "b"]).unwrap(), "a * b");
        assert_eq!(apply("div", &["a", "b"]).unwrap(), "a / b");
        assert_eq!(apply("=", &["x", "1"]).unwrap(), "x = 1");
        assert_eq!(apply("mod", &["7", "3"]).unwrap(), "7 % 3");
    }

    #[test]
    fn test_scripts_group_second_operand() {
        assert_eq!(apply("^", &["x", "2"]).unwrap(), "x^{2}");
        assert_eq!(apply("sub", &["a", "ij"]).unwrap(), "a_{ij}");
    }

    #[test]
    fn test_relations_group_second_operand() {
        assert_eq!(apply("<", &["a", "b"]).unwrap(), "a < {b}");
        assert_eq!(apply("gt", &["a", "b"]).unwrap(), "a > {b}");
    }

    #[test]
    fn test_binary_arity() {
        assert_eq!(
            apply("-", &["a", "b", "c"]),
            Err(EvalError::Arity {
                operator: "-".into(),
                expected: 2,
                found: 3
            })
        );
        assert!(apply("^", &["x"]).is_err());
        assert!(apply("lt", &[]).is_err());
    }

    #[test]
    fn test_command() {
        assert_eq!(apply("foo!", &["a", "b"]).unwrap(), "\\foo{a}{b}");
        assert_eq!(apply("maketitle!", &[]).unwrap(), "\\maketitle");
    }

    #[test]
    fn test_special_forms_are_not_commands() {
        assert_eq!(Builtin::resolve("begin!"), None);
        assert_eq!(Builtin::resolve("documentclass!"), None);
        assert_eq!(Builtin::resolve("!"), None);
        assert_eq!(Builtin::resolve("zeta"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Builtin::resolve("minus").unwrap().to_string(), "minus");
        assert_eq!(Builtin::resolve("frac!").unwrap().to_string(), "frac!");
    }
}
