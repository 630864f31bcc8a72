//! Export configuration.
//!
//! Every field has a default, so a JSON file only needs to name the values it
//! changes:
//!
//! ```json
//! { "max_attempts": 10, "viewport": { "width": 600, "height": 800 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the off-screen render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Polls before giving up on the sandbox becoming stylable.
    pub max_attempts: u32,
    /// Delay between polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Stop polling early once no stylesheet is still loading.
    pub settle_when_idle: bool,
    /// Size of the render context.
    pub viewport: Viewport,
    /// `style` of synthesized paragraphs.
    pub paragraph_style: String,
    /// Declarations appended to the extracted body style on the output wrapper.
    pub wrapper_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            poll_interval_ms: 50,
            settle_when_idle: true,
            viewport: Viewport::default(),
            paragraph_style: "margin:0;display:contents;".to_string(),
            wrapper_suffix: "width:100%; min-height:100%; box-sizing:border-box;".to_string(),
        }
    }
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The JSON did not match [`ExportConfig`].
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Parsed, but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ExportConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON or unknown fields,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`ExportConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        Ok(())
    }

    /// [`ExportConfig::poll_interval_ms`] as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upper bound on the time spent waiting for stylesheets.
    #[must_use]
    pub fn wait_budget(&self) -> Duration {
        self.poll_interval()
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}
