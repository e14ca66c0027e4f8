//! Binding environment
//!
//! Two tiers of text bindings:
//! - the process-wide tier, written by `define`, shared by every block of a
//!   run in document order and never rolled back
//! - a local [`Frame`], built fresh by each `let` and handed to that `let`'s
//!   body only
//!
//! Lookup order is process-wide tier, local frame, built-in table, and
//! finally the symbol's own name as literal text.

use std::collections::HashMap;

use tracing::trace;

use crate::builtins::Builtin;
use crate::evaluator::Value;

/// Local bindings for one `let` body
pub type Frame = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    globals: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` in the process-wide tier, overwriting any earlier value
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Bind `name` in a caller-supplied local frame
    pub fn bind_local(frame: &mut Frame, name: impl Into<String>, value: impl Into<String>) {
        frame.insert(name.into(), value.into());
    }

    /// Resolve a symbol. Never fails: unbound names come back as text.
    pub fn lookup(&self, name: &str, frame: &Frame) -> Value {
        if let Some(value) = self.globals.get(name) {
            return Value::Text(value.clone());
        }
        if let Some(value) = frame.get(name) {
            return Value::Text(value.clone());
        }
        if let Some(builtin) = Builtin::resolve(name) {
            return Value::Builtin(builtin);
        }
        trace!(symbol = name, "unbound symbol passed through as text");
        Value::Text(name.to_string())
    }

    /// Value bound in the process-wide tier
    pub fn global(&self, name: &str) -> Option<&str> {
        self.globals.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_symbol_is_literal_text() {
        let env = Environment::new();
        assert_eq!(
            env.lookup("zeta", &Frame::new()),
            Value::Text("zeta".into())
        );
    }

    #[test]
    fn test_define_overwrites() {
        let mut env = Environment::new();
        env.define("x", "1");
        env.define("x", "2");
        assert_eq!(env.global("x"), Some("2"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_global_tier_is_checked_before_frame() {
        let mut env = Environment::new();
        env.define("a", "global");
        let mut frame = Frame::new();
        Environment::bind_local(&mut frame, "a", "local");
        Environment::bind_local(&mut frame, "b", "local-b");

        assert_eq!(env.lookup("a", &frame), Value::Text("global".into()));
        assert_eq!(env.lookup("b", &frame), Value::Text("local-b".into()));
    }

    #[test]
    fn test_bindings_shadow_builtins() {
        let mut env = Environment::new();
        assert!(matches!(
            env.lookup("+", &Frame::new()),
            Value::Builtin(_)
        ));

        env.define("+", "plus-sign");
        assert_eq!(
            env.lookup("+", &Frame::new()),
            Value::Text("plus-sign".into())
        );

        let mut frame = Frame::new();
        Environment::bind_local(&mut frame, "frac!", "shadowed");
        assert_eq!(
            Environment::new().lookup("frac!", &frame),
            Value::Text("shadowed".into())
        );
    }

    #[test]
    fn test_command_symbols_resolve_to_builtins() {
        let env = Environment::new();
        assert_eq!(
            env.lookup("textbf!", &Frame::new()),
            Value::Builtin(Builtin::Command("textbf".into()))
        );
    }
}
