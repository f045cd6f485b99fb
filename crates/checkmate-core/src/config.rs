//! Configuration structures for the Checkmate engine.
//!
//! The engine has no global state: every component that needs tuning receives an
//! [`EngineConfig`] explicitly.

use crate::Error;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// How variable tokens are replaced in a serialized document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutionMode {
    /// Replace only the first literal occurrence of each token.
    #[default]
    FirstOccurrence,
    /// Replace every literal occurrence of each token.
    Global,
}

/// Configuration for an engine instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    /// Group assigned to options that carry no display hints
    #[validate(length(min = 1))]
    #[serde(default = "default_group")]
    pub default_group: String,

    /// Group assigned to well-known infrastructure options
    #[validate(length(min = 1))]
    #[serde(default = "default_hidden_group")]
    pub hidden_group: String,

    /// Decimal places kept for `gui-x`/`gui-y` annotations
    #[validate(range(min = 0, max = 9))]
    #[serde(default = "default_annotation_precision")]
    pub annotation_precision: u32,

    /// Upper bound on the compiled size of a constraint regex, in bytes
    #[validate(range(min = 1024, max = 67_108_864))]
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,

    /// Token replacement mode used by the substitution engine
    #[serde(default)]
    pub substitution: SubstitutionMode,
}

fn default_group() -> String {
    "application".to_string()
}

fn default_hidden_group() -> String {
    "hidden".to_string()
}

const fn default_annotation_precision() -> u32 {
    3
}

const fn default_regex_size_limit() -> usize {
    1 << 20
}

impl EngineConfig {
    /// Create a validated configuration with default values.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn new() -> Result<Self, Error> {
        let config = Self::default();
        config.check()?;
        Ok(config)
    }

    /// Validate the configuration, mapping failures to [`Error::ConfigError`].
    ///
    /// # Errors
    ///
    /// Returns an error if any field is out of range.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Set the default option group.
    #[must_use]
    pub fn with_default_group(mut self, group: impl Into<String>) -> Self {
        self.default_group = group.into();
        self
    }

    /// Set the hidden option group.
    #[must_use]
    pub fn with_hidden_group(mut self, group: impl Into<String>) -> Self {
        self.hidden_group = group.into();
        self
    }

    /// Set annotation precision in decimal places.
    #[must_use]
    pub const fn with_annotation_precision(mut self, places: u32) -> Self {
        self.annotation_precision = places;
        self
    }

    /// Set the regex size limit in bytes.
    #[must_use]
    pub const fn with_regex_size_limit(mut self, bytes: usize) -> Self {
        self.regex_size_limit = bytes;
        self
    }

    /// Set the substitution mode.
    #[must_use]
    pub const fn with_substitution(mut self, mode: SubstitutionMode) -> Self {
        self.substitution = mode;
        self
    }

    /// Round a coordinate to the configured annotation precision.
    #[must_use]
    pub fn round_coordinate(&self, value: f64) -> f64 {
        let places = i32::try_from(self.annotation_precision).unwrap_or(i32::MAX);
        let factor = 10f64.powi(places);
        (value * factor).round() / factor
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_group: default_group(),
            hidden_group: default_hidden_group(),
            annotation_precision: default_annotation_precision(),
            regex_size_limit: default_regex_size_limit(),
            substitution: SubstitutionMode::default(),
        }
    }
}
