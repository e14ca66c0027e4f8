//! Configuration loader
//!
//! Loads and validates the YAML configuration file.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::ExpanderConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "LISPYTEX_CONFIG";

/// File picked up from the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "lispytex.yaml";

pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Loader that always yields the defaults
    pub fn defaults() -> Self {
        Self { path: None }
    }

    /// Resolve the configuration file
    ///
    /// Path resolution order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. LISPYTEX_CONFIG environment variable
    /// 3. `lispytex.yaml` in the working directory, if present
    /// 4. built-in defaults
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::new(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::new(DEFAULT_CONFIG_FILE);
        }

        Self::defaults()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<ExpanderConfig> {
        let Some(path) = &self.path else {
            debug!("No configuration file, using defaults");
            return Ok(ExpanderConfig::default());
        };
        info!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = if content.trim().is_empty() {
            ExpanderConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };

        Self::validate(&config)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    fn validate(config: &ExpanderConfig) -> Result<()> {
        if config.marker.trim().is_empty() {
            return Err(anyhow!("marker must not be empty"));
        }
        if config.marker.contains(['(', '[']) {
            return Err(anyhow!(
                "marker '{}' must not contain an opening bracket",
                config.marker
            ));
        }
        if config.indent_width == 0 {
            return Err(anyhow!("indent_width must be at least 1"));
        }
        Ok(())
    }
}
