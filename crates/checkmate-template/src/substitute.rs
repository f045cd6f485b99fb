//! Literal token substitution over a serialized document.
//!
//! This is a search-and-replace over the JSON text, not a template language: tokens are
//! matched literally and callers are expected to choose tokens that cannot collide with
//! ordinary content (for example `%repository_url%`).

use checkmate_core::{EngineConfig, Error, SubstitutionMode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::merge::merge_into;
use crate::Result;

/// Replaces tokens in documents according to a [`SubstitutionMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Substituter {
    mode: SubstitutionMode,
}

impl Substituter {
    /// Create a substituter with an explicit mode.
    #[must_use]
    pub const fn new(mode: SubstitutionMode) -> Self {
        Self { mode }
    }

    /// Create a substituter using the configured mode.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.substitution)
    }

    /// Replace every token of `variables` found in `target`.
    ///
    /// The document is serialized, each token present in the text is replaced, and the
    /// rewritten text is parsed and merged back with [`merge_into`]. Replacement text is
    /// escaped as the inside of a JSON string. Because the result is merged, a token
    /// inside an object key adds the rewritten key without removing the original one.
    ///
    /// Returns `true` if any token was found. `target` is not touched otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubstitutionFailed`] if the rewritten text is no longer valid
    /// JSON; `target` is left unchanged in that case.
    pub fn substitute<I, K, V>(&self, target: &mut Value, variables: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut text = serde_json::to_string(target)?;
        let mut changed = false;

        for (token, replacement) in variables {
            let token = token.as_ref();
            if token.is_empty() {
                warn!("ignoring empty substitution token");
                continue;
            }
            if !text.contains(token) {
                continue;
            }
            let replacement = escape_fragment(replacement.as_ref())?;
            text = match self.mode {
                SubstitutionMode::FirstOccurrence => text.replacen(token, &replacement, 1),
                SubstitutionMode::Global => text.replace(token, &replacement),
            };
            debug!(token, "substituted variable");
            changed = true;
        }

        if !changed {
            return Ok(false);
        }

        let rewritten: Value = serde_json::from_str(&text).map_err(|e| {
            Error::SubstitutionFailed(format!("document is no longer valid JSON: {e}"))
        })?;
        merge_into(target, &rewritten);
        Ok(true)
    }
}

/// Substitute with the default (first occurrence) mode.
///
/// # Errors
///
/// See [`Substituter::substitute`].
pub fn substitute_variables<I, K, V>(target: &mut Value, variables: I) -> Result<bool>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Substituter::default().substitute(target, variables)
}

/// `replacement` escaped as JSON string content, without the surrounding quotes.
fn escape_fragment(replacement: &str) -> Result<String> {
    let quoted = serde_json::to_string(replacement)?;
    Ok(quoted[1..quoted.len() - 1].to_string())
}
