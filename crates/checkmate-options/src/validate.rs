//! Validation of user-entered option values.

use checkmate_core::option::{ConstraintRule, OptionType};
use checkmate_core::{EngineConfig, OptionId};
use fancy_regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::normalize::NormalizedOption;

/// A failed check on a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Option the value was entered for.
    pub option: OptionId,
    /// Message to show the user.
    pub message: String,
}

impl Violation {
    fn new(option: &NormalizedOption, message: impl Into<String>) -> Self {
        Self {
            option: option.id().clone(),
            message: message.into(),
        }
    }
}

/// Checks values against normalized options.
#[derive(Debug, Clone, Default)]
pub struct OptionValidator {
    regex_size_limit: usize,
}

impl OptionValidator {
    /// Create a validator using the configured regex size limit.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            regex_size_limit: config.regex_size_limit,
        }
    }

    /// Validate `value` for `option`, returning every violation found.
    ///
    /// A null or empty value is only a violation for required options; no other
    /// checks run on it.
    #[must_use]
    pub fn validate(&self, option: &NormalizedOption, value: &Value) -> Vec<Violation> {
        if let Some(error) = &option.error {
            return vec![Violation::new(option, error.clone())];
        }

        if is_blank(value) {
            if option.spec.is_required() {
                return vec![Violation::new(
                    option,
                    format!("{} is required", option.spec.display_label()),
                )];
            }
            return Vec::new();
        }

        let mut violations = Vec::new();
        if let Some(message) = type_mismatch(option.option_type(), value) {
            violations.push(Violation::new(option, message));
            return violations;
        }

        let text = as_text(value);
        if let Some(pattern) = &option.spec.regex {
            if !self.matches(pattern, &text) {
                violations.push(Violation::new(
                    option,
                    format!("must match the pattern {pattern}"),
                ));
            }
        }

        for constraint in &option.spec.constraints {
            let passed = match &constraint.rule {
                ConstraintRule::Regex(pattern) => self.matches(pattern, &text),
                ConstraintRule::In(allowed) => allowed
                    .iter()
                    .any(|candidate| candidate == value || as_text(candidate) == text),
                ConstraintRule::Protocols(protocols) => Url::parse(&text)
                    .map(|url| protocols.iter().any(|p| p.eq_ignore_ascii_case(url.scheme())))
                    .unwrap_or(false),
                ConstraintRule::Range { comparison, bound } => {
                    match (as_number(value), bound.as_f64()) {
                        (Some(number), Some(bound)) => comparison.holds(number, bound),
                        _ => false,
                    }
                }
                ConstraintRule::MinLength(min) => char_count(&text) >= *min,
                ConstraintRule::MaxLength(max) => char_count(&text) <= *max,
                ConstraintRule::Unknown => true,
            };
            if !passed {
                violations.push(Violation::new(option, constraint.message_or_default()));
            }
        }
        violations
    }

    fn matches(&self, pattern: &str, text: &str) -> bool {
        let regex = match self.compile(pattern) {
            Ok(regex) => regex,
            Err(err) => {
                // normalization already drops these, so only hand-built options get here
                warn!(pattern, error = %err, "skipping invalid regex during validation");
                return true;
            }
        };
        regex.is_match(text).unwrap_or_else(|err| {
            warn!(pattern, error = %err, "regex evaluation gave up, treating value as a mismatch");
            false
        })
    }

    fn compile(&self, pattern: &str) -> Result<Regex, fancy_regex::Error> {
        let mut builder = RegexBuilder::new(pattern);
        if self.regex_size_limit > 0 {
            builder.delegate_size_limit(self.regex_size_limit);
        }
        builder.build()
    }
}

/// Validate with the default configuration.
#[must_use]
pub fn validate_value(option: &NormalizedOption, value: &Value) -> Vec<Violation> {
    OptionValidator::new(&EngineConfig::default()).validate(option, value)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn type_mismatch(option_type: &OptionType, value: &Value) -> Option<&'static str> {
    let ok = match option_type {
        OptionType::Integer => match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        OptionType::Boolean => match value {
            Value::Bool(_) => true,
            Value::String(s) => matches!(s.as_str(), "true" | "false"),
            _ => false,
        },
        OptionType::Url => value.as_str().is_some_and(|s| Url::parse(s).is_ok()),
        _ => !matches!(value, Value::Array(_) | Value::Object(_)),
    };
    if ok {
        return None;
    }
    Some(match option_type {
        OptionType::Integer => "must be a whole number",
        OptionType::Boolean => "must be true or false",
        OptionType::Url => "must be a valid URL",
        _ => "must be a single value",
    })
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn char_count(text: &str) -> u64 {
    u64::try_from(text.chars().count()).unwrap_or(u64::MAX)
}
