//! Configuration for document expansion
//!
//! YAML-backed settings for the host scanner and the expander. Every field
//! has a default, so an empty or missing file is valid.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::ExpanderConfig;
