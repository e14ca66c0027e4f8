//! Tree-walking evaluator
//!
//! Walks one expression and produces markup text. Dispatch is on shape:
//!
//! ```text
//! atom                      → literal text, or symbol lookup
//! ()                        → empty text
//! (define name value)       → writes the process-wide tier, emits nothing
//! (let ((n v) ...) body)    → body under a brand-new local frame
//! (quote x)                 → x, unevaluated
//! (documentclass! n args b) → \documentclass{n}[args] + body
//! (begin! name body)        → \begin{name} ... \end{name}
//! (head args...)            → evaluate all, apply head to the rest
//! ```
//!
//! The caller's local frame is *not* visible inside a nested `let` body
//! unless the names are re-bound there.
//!
//! Only `begin!` and `documentclass!` lay text out on lines. Their output is
//! a [`Value::Layout`] already padded for its level. Anything captured as a
//! string (arguments, names, options, bindings) is evaluated inline, at
//! level 0 with no base indentation.

use tracing::debug;

use crate::ast::Expr;
use crate::builtins::Builtin;
use crate::environment::{Environment, Frame};
use crate::errors::EvalError;

/// Default number of spaces per nesting level
pub const DEFAULT_INDENT_SIZE: usize = 2;

// =============================================================================
// VALUES
// =============================================================================

/// Result of evaluating one expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    /// Lines already padded for the level they were evaluated at
    Layout(String),
    /// Output of `quote`: the expression exactly as written
    Quoted(Expr),
    Builtin(Builtin),
}

impl Value {
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Markup contributed by this value when spliced into text
    pub fn into_text(self) -> String {
        match self {
            Value::Text(text) | Value::Layout(text) => text,
            Value::Quoted(expr) => expr.to_markup(),
            Value::Builtin(builtin) => builtin.to_string(),
        }
    }
}

// =============================================================================
// SPECIAL FORMS
// =============================================================================

/// Head symbols with their own evaluation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Define,
    Let,
    Quote,
    DocumentClass,
    Begin,
}

impl SpecialForm {
    pub fn of(symbol: &str) -> Option<SpecialForm> {
        match symbol {
            "define" => Some(SpecialForm::Define),
            "let" => Some(SpecialForm::Let),
            "quote" => Some(SpecialForm::Quote),
            "documentclass!" => Some(SpecialForm::DocumentClass),
            "begin!" => Some(SpecialForm::Begin),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialForm::Define => "define",
            SpecialForm::Let => "let",
            SpecialForm::Quote => "quote",
            SpecialForm::DocumentClass => "documentclass!",
            SpecialForm::Begin => "begin!",
        }
    }

    /// Number of operands after the head
    fn operand_count(self) -> usize {
        match self {
            SpecialForm::Quote => 1,
            SpecialForm::Define | SpecialForm::Let | SpecialForm::Begin => 2,
            SpecialForm::DocumentClass => 3,
        }
    }
}

/// What a list evaluates as, decided from its head
enum ListForm {
    Special(SpecialForm),
    Application,
}

impl ListForm {
    fn of(head: &Expr) -> ListForm {
        match head.as_symbol().and_then(SpecialForm::of) {
            Some(form) => ListForm::Special(form),
            None => ListForm::Application,
        }
    }
}

// =============================================================================
// EVALUATOR
// =============================================================================

pub struct Evaluator<'env> {
    env: &'env mut Environment,
    base_indentation: usize,
    indent_size: usize,
}

impl<'env> Evaluator<'env> {
    /// `base_indentation` is fixed for the whole block
    pub fn new(env: &'env mut Environment, base_indentation: usize) -> Self {
        Self {
            env,
            base_indentation,
            indent_size: DEFAULT_INDENT_SIZE,
        }
    }

    pub fn with_indent(mut self, indent_size: usize) -> Self {
        self.indent_size = indent_size;
        self
    }

    /// Leading whitespace for a line at `level`
    pub fn padding(&self, level: usize) -> String {
        " ".repeat(self.indent_size * level + self.base_indentation)
    }

    pub fn evaluate(
        &mut self,
        expr: &Expr,
        level: usize,
        frame: &Frame,
    ) -> Result<Value, EvalError> {
        match expr {
            Expr::Integer(n) | Expr::Float(n) => Ok(Value::Text(n.literal().to_string())),
            Expr::Text(text) => Ok(Value::Text(text.clone())),
            Expr::Symbol(sym) => Ok(self.env.lookup(sym.name(), frame)),
            Expr::List(items) => {
                let Some((head, operands)) = items.split_first() else {
                    return Ok(Value::empty());
                };
                match ListForm::of(head) {
                    ListForm::Special(form) => {
                        check_operands(form, operands)?;
                        match form {
                            SpecialForm::Define => self.eval_define(operands, frame),
                            SpecialForm::Let => self.eval_let(operands, level, frame),
                            SpecialForm::Quote => Ok(Value::Quoted(operands[0].clone())),
                            SpecialForm::DocumentClass => {
                                self.eval_document_class(operands, level, frame)
                            }
                            SpecialForm::Begin => self.eval_begin(operands, level, frame),
                        }
                    }
                    ListForm::Application => self.apply(items, level, frame),
                }
            }
        }
    }

    /// Evaluate and flatten to markup text
    pub fn evaluate_text(
        &mut self,
        expr: &Expr,
        level: usize,
        frame: &Frame,
    ) -> Result<String, EvalError> {
        Ok(self.evaluate(expr, level, frame)?.into_text())
    }

    /// Evaluate and position the result at `level`: layout output as is,
    /// any other text padded line by line.
    pub fn render(
        &mut self,
        expr: &Expr,
        level: usize,
        frame: &Frame,
    ) -> Result<String, EvalError> {
        let value = self.evaluate(expr, level, frame)?;
        Ok(self.place(value, level, false))
    }

    /// Evaluate for use inside a line, independent of the block's position
    fn evaluate_inline(&mut self, expr: &Expr, frame: &Frame) -> Result<String, EvalError> {
        let base = std::mem::replace(&mut self.base_indentation, 0);
        let result = self.evaluate_text(expr, 0, frame);
        self.base_indentation = base;
        result
    }

    fn place(&self, value: Value, level: usize, trim: bool) -> String {
        match value {
            Value::Layout(text) => text,
            other => {
                let text = other.into_text();
                let text = if trim { text.trim() } else { text.as_str() };
                indent_lines(text, &self.padding(level))
            }
        }
    }

    fn eval_define(&mut self, operands: &[Expr], frame: &Frame) -> Result<Value, EvalError> {
        let name = binding_name(SpecialForm::Define, &operands[0])?;
        let value = self.evaluate_inline(&operands[1], frame)?;
        debug!(name = %name, value = %value, "define");
        self.env.define(name, value);
        Ok(Value::empty())
    }

    fn eval_let(
        &mut self,
        operands: &[Expr],
        level: usize,
        frame: &Frame,
    ) -> Result<Value, EvalError> {
        let bindings = operands[0].as_list().ok_or_else(|| EvalError::MalformedForm {
            form: SpecialForm::Let.name(),
            reason: format!("expected a binding list, found {}", operands[0]),
        })?;

        let mut local = Frame::new();
        for binding in bindings {
            match binding.as_list() {
                Some([name, value]) => {
                    let name = binding_name(SpecialForm::Let, name)?;
                    // Values see the caller's frame, not the one being built
                    let value = self.evaluate_inline(value, frame)?;
                    Environment::bind_local(&mut local, name, value);
                }
                _ => {
                    return Err(EvalError::MalformedForm {
                        form: SpecialForm::Let.name(),
                        reason: format!("expected (name value), found {binding}"),
                    })
                }
            }
        }

        self.evaluate(&operands[1], level, &local)
    }

    fn eval_document_class(
        &mut self,
        operands: &[Expr],
        level: usize,
        frame: &Frame,
    ) -> Result<Value, EvalError> {
        let name = self.evaluate_inline(&operands[0], frame)?;

        let mut options = Vec::new();
        match &operands[1] {
            Expr::List(items) => {
                for item in items {
                    options.push(self.evaluate_inline(item, frame)?);
                }
            }
            single => {
                let option = self.evaluate_inline(single, frame)?;
                if !option.is_empty() {
                    options.push(option);
                }
            }
        }

        let body = self.evaluate(&operands[2], level, frame)?;
        let body = self.place(body, level, true);
        let pad = self.padding(level);

        let mut out = format!("{pad}\\documentclass{{{name}}}");
        if !options.is_empty() {
            out.push('[');
            out.push_str(&options.join(", "));
            out.push(']');
        }
        if !body.trim().is_empty() {
            out.push('\n');
            out.push_str(&body);
        }
        Ok(Value::Layout(out))
    }

    fn eval_begin(
        &mut self,
        operands: &[Expr],
        level: usize,
        frame: &Frame,
    ) -> Result<Value, EvalError> {
        let name = self.evaluate_inline(&operands[0], frame)?;
        let body = self.evaluate(&operands[1], level + 1, frame)?;
        let body = self.place(body, level + 1, true);
        let pad = self.padding(level);

        let mut out = format!("{pad}\\begin{{{name}}}\n");
        if !body.trim().is_empty() {
            out.push_str(&body);
            out.push('\n');
        }
        out.push_str(&format!("{pad}\\end{{{name}}}"));
        Ok(Value::Layout(out))
    }

    fn apply(
        &mut self,
        items: &[Expr],
        level: usize,
        frame: &Frame,
    ) -> Result<Value, EvalError> {
        let Some((head, rest)) = items.split_first() else {
            return Ok(Value::empty());
        };
        let head = self.evaluate(head, level, frame)?;

        let mut args = Vec::with_capacity(rest.len());
        for item in rest {
            args.push(self.evaluate_inline(item, frame)?);
        }

        match head {
            Value::Builtin(builtin) => builtin.apply(&args).map(Value::Text),
            other => Err(EvalError::NotCallable(other.into_text())),
        }
    }
}

fn check_operands(form: SpecialForm, operands: &[Expr]) -> Result<(), EvalError> {
    if operands.len() == form.operand_count() {
        Ok(())
    } else {
        Err(EvalError::MalformedForm {
            form: form.name(),
            reason: format!(
                "expected {} operands, found {}",
                form.operand_count(),
                operands.len()
            ),
        })
    }
}

/// Prefix every non-empty line with `pad`
fn indent_lines(text: &str, pad: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn binding_name(form: SpecialForm, expr: &Expr) -> Result<String, EvalError> {
    match expr {
        Expr::Symbol(sym) => Ok(sym.name().to_string()),
        Expr::Text(text) => Ok(text.clone()),
        other => Err(EvalError::MalformedForm {
            form: form.name(),
            reason: format!("cannot bind to {other}"),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
