//! Configuration type definitions
//!
//! These structs map directly to `lispytex.yaml`.

use serde::{Deserialize, Serialize};

use crate::evaluator::DEFAULT_INDENT_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpanderConfig {
    /// Comment prefix that introduces a macro annotation
    pub marker: String,
    /// Spaces per nesting level
    pub indent_width: usize,
    /// Keep the annotation lines above their expansion
    pub keep_annotations: bool,
    /// Ignore brackets inside strings and `;` comments when delimiting blocks
    pub string_aware_scanning: bool,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            marker: "%".to_string(),
            indent_width: DEFAULT_INDENT_SIZE,
            keep_annotations: false,
            string_aware_scanning: false,
        }
    }
}
