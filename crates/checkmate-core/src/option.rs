//! Blueprint option specifications.
//!
//! Options arrive as loosely shaped JSON. Parsing here is lenient on purpose: a single
//! badly written option or constraint must never prevent the rest of the list from
//! loading, so unexpected shapes are logged and carried along instead of rejected.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::{debug, warn};

use crate::ident::OptionId;

/// Declared type of an option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionType {
    /// Free-form single line string
    String,
    /// Whole number
    Integer,
    /// True/false toggle
    Boolean,
    /// Secret string
    Password,
    /// URL, optionally restricted by a `protocols` constraint
    Url,
    /// Deployment region selector
    Region,
    /// Multi-line text
    Text,
    /// Choice from a list
    Select,
    /// A string type this engine has no special handling for
    Other(String),
    /// The `type` field is missing or not a string
    Unresolved(TypeIssue),
}

/// Why an option type could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeIssue {
    /// No `type` field
    Missing,
    /// `type` present but not a string; holds the value found
    NotAString(Value),
}

impl OptionType {
    /// Resolve the `type` field of a raw option.
    #[must_use]
    pub fn resolve(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => Self::Unresolved(TypeIssue::Missing),
            Some(Value::String(name)) => Self::from_name(name),
            Some(other) => Self::Unresolved(TypeIssue::NotAString(other.clone())),
        }
    }

    /// Map a type name onto a variant.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "integer" | "int" => Self::Integer,
            "boolean" => Self::Boolean,
            "password" => Self::Password,
            "url" => Self::Url,
            "region" => Self::Region,
            "text" => Self::Text,
            "select" => Self::Select,
            other => Self::Other(other.to_string()),
        }
    }

    /// Type name as written in a blueprint, `None` when unresolved.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::String => Some("string"),
            Self::Integer => Some("integer"),
            Self::Boolean => Some("boolean"),
            Self::Password => Some("password"),
            Self::Url => Some("url"),
            Self::Region => Some("region"),
            Self::Text => Some("text"),
            Self::Select => Some("select"),
            Self::Other(name) => Some(name),
            Self::Unresolved(_) => None,
        }
    }

    /// Whether the type could not be resolved.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }
}

impl fmt::Display for TypeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("option type is missing"),
            Self::NotAString(found) => write!(f, "option type must be a string, found {found}"),
        }
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unresolved(TypeIssue::Missing) => serializer.serialize_none(),
            Self::Unresolved(TypeIssue::NotAString(found)) => found.serialize(serializer),
            known => serializer.serialize_str(known.name().unwrap_or_default()),
        }
    }
}

/// Comparison used by numeric range constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `greater-than`
    GreaterThan,
    /// `greater-than-or-equal-to`
    GreaterThanOrEqual,
    /// `less-than`
    LessThan,
    /// `less-than-or-equal-to`
    LessThanOrEqual,
}

impl Comparison {
    const ALL: [Self; 4] = [
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
    ];

    /// Constraint key in the blueprint.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::GreaterThan => "greater-than",
            Self::GreaterThanOrEqual => "greater-than-or-equal-to",
            Self::LessThan => "less-than",
            Self::LessThanOrEqual => "less-than-or-equal-to",
        }
    }

    /// Whether `value` satisfies the comparison against `bound`.
    #[must_use]
    pub fn holds(self, value: f64, bound: f64) -> bool {
        match self {
            Self::GreaterThan => value > bound,
            Self::GreaterThanOrEqual => value >= bound,
            Self::LessThan => value < bound,
            Self::LessThanOrEqual => value <= bound,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::GreaterThan => "greater than",
            Self::GreaterThanOrEqual => "greater than or equal to",
            Self::LessThan => "less than",
            Self::LessThanOrEqual => "less than or equal to",
        }
    }
}

/// The rule part of a constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintRule {
    /// Value must match the pattern
    Regex(String),
    /// Value must be one of the listed values
    In(Vec<Value>),
    /// URL scheme must be one of the listed protocols
    Protocols(Vec<String>),
    /// Numeric comparison against a bound
    Range {
        /// Comparison operator
        comparison: Comparison,
        /// Bound compared against
        bound: Number,
    },
    /// Minimum string length
    MinLength(u64),
    /// Maximum string length
    MaxLength(u64),
    /// A constraint this engine does not evaluate (kept verbatim in `extra`)
    Unknown,
}

/// One entry of an option's `constraints` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Constraint {
    /// What the constraint checks.
    pub rule: ConstraintRule,
    /// Author-supplied failure message.
    pub message: Option<String>,
    /// Keys not part of the rule.
    pub extra: Map<String, Value>,
}

impl Constraint {
    /// Create a constraint without message.
    #[must_use]
    pub fn new(rule: ConstraintRule) -> Self {
        Self {
            rule,
            message: None,
            extra: Map::new(),
        }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Parse one authored constraint object that may carry several rule keys.
    ///
    /// Every recognised rule becomes its own constraint sharing the authored message.
    /// Keys that are not rules stay on the first one.
    #[must_use]
    pub fn parse_all(map: Map<String, Value>) -> Vec<Self> {
        let mut first = Self::from(map);
        let mut split = Vec::new();
        while let Some(rule) = take_rule(&mut first.extra) {
            split.push(Self {
                rule,
                message: first.message.clone(),
                extra: Map::new(),
            });
        }
        if !split.is_empty() {
            debug!(rules = split.len() + 1, "split constraint with several rules");
        }
        std::iter::once(first).chain(split).collect()
    }

    /// The authored message, or one derived from the rule.
    #[must_use]
    pub fn message_or_default(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.rule {
            ConstraintRule::Regex(pattern) => format!("must match the pattern {pattern}"),
            ConstraintRule::In(values) => format!("must be one of: {}", join_values(values)),
            ConstraintRule::Protocols(protocols) => protocols_message(protocols),
            ConstraintRule::Range { comparison, bound } => {
                format!("must be {} {bound}", comparison.phrase())
            }
            ConstraintRule::MinLength(n) => format!("must be at least {n} characters"),
            ConstraintRule::MaxLength(n) => format!("must be at most {n} characters"),
            ConstraintRule::Unknown => "failed an unrecognized constraint".to_string(),
        }
    }
}

/// Default message for a `protocols` constraint.
#[must_use]
pub fn protocols_message(protocols: &[String]) -> String {
    format!("supported protocols are: {}", protocols.join(", "))
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<Map<String, Value>> for Constraint {
    fn from(mut map: Map<String, Value>) -> Self {
        let message = match map.remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(other) => {
                map.insert("message".to_string(), other);
                None
            }
            None => None,
        };

        let rule = take_rule(&mut map).unwrap_or(ConstraintRule::Unknown);
        Self {
            rule,
            message,
            extra: map,
        }
    }
}

/// Pull one recognised rule key out of `map`; mistyped rules stay in the map.
fn take_rule(map: &mut Map<String, Value>) -> Option<ConstraintRule> {
    if let Some(pattern) = map.get("regex").and_then(Value::as_str) {
        let rule = ConstraintRule::Regex(pattern.to_string());
        map.remove("regex");
        return Some(rule);
    }
    if let Some(values) = map.get("in").and_then(Value::as_array) {
        let rule = ConstraintRule::In(values.clone());
        map.remove("in");
        return Some(rule);
    }
    if let Some(protocols) = map.get("protocols").and_then(Value::as_array) {
        let rule = ConstraintRule::Protocols(
            protocols
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        );
        map.remove("protocols");
        return Some(rule);
    }
    for comparison in Comparison::ALL {
        if let Some(bound) = map.get(comparison.key()).and_then(number_of) {
            map.remove(comparison.key());
            return Some(ConstraintRule::Range { comparison, bound });
        }
    }
    if let Some(n) = map.get("min-length").and_then(Value::as_u64) {
        map.remove("min-length");
        return Some(ConstraintRule::MinLength(n));
    }
    if let Some(n) = map.get("max-length").and_then(Value::as_u64) {
        map.remove("max-length");
        return Some(ConstraintRule::MaxLength(n));
    }
    None
}

/// Numbers and numeric strings both count as numeric bounds.
fn number_of(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .map(Number::from)
            .or_else(|| s.trim().parse::<f64>().ok().and_then(Number::from_f64)),
        _ => None,
    }
}

impl From<Constraint> for Map<String, Value> {
    fn from(constraint: Constraint) -> Self {
        let mut map = Map::new();
        match constraint.rule {
            ConstraintRule::Regex(pattern) => {
                map.insert("regex".into(), Value::String(pattern));
            }
            ConstraintRule::In(values) => {
                map.insert("in".into(), Value::Array(values));
            }
            ConstraintRule::Protocols(protocols) => {
                map.insert(
                    "protocols".into(),
                    Value::Array(protocols.into_iter().map(Value::String).collect()),
                );
            }
            ConstraintRule::Range { comparison, bound } => {
                map.insert(comparison.key().into(), Value::Number(bound));
            }
            ConstraintRule::MinLength(n) => {
                map.insert("min-length".into(), Value::from(n));
            }
            ConstraintRule::MaxLength(n) => {
                map.insert("max-length".into(), Value::from(n));
            }
            ConstraintRule::Unknown => {}
        }
        if let Some(message) = constraint.message {
            map.insert("message".into(), Value::String(message));
        }
        map.extend(constraint.extra);
        map
    }
}

/// Author-supplied rendering metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct DisplayHints {
    /// Group the option is displayed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Position within the group, as authored. Usually a number, but any value is kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Value>,
    /// Kind of list the option renders as (`region`, ...).
    #[serde(rename = "list-type", skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,
    /// Example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,
    /// Explicit choice list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Vec<Value>>,
    /// Protocols that require certificates.
    #[serde(rename = "encrypted-protocols", skip_serializing_if = "Option::is_none")]
    pub encrypted_protocols: Option<Vec<String>>,
    /// Whether certificate errors are ignored.
    #[serde(
        rename = "always-accept-certificates",
        skip_serializing_if = "Option::is_none"
    )]
    pub always_accept_certificates: Option<bool>,
    /// Hints this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for DisplayHints {
    fn from(mut map: Map<String, Value>) -> Self {
        let mut take_str = |key: &str| match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => {
                warn!(hint = key, value = %other, "ignoring non-string display hint");
                None
            }
        };
        let group = take_str("group");
        let list_type = take_str("list-type");

        let order = map.remove("order").filter(|v| !v.is_null());
        let sample = map.remove("sample").filter(|v| !v.is_null());
        let choice = match map.remove("choice") {
            Some(Value::Array(items)) => Some(items),
            Some(Value::Null) | None => None,
            Some(other) => Some(vec![other]),
        };
        let encrypted_protocols = map
            .remove("encrypted-protocols")
            .and_then(|v| v.as_array().cloned())
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            });
        let always_accept_certificates = map
            .remove("always-accept-certificates")
            .and_then(|v| v.as_bool());

        Self {
            group,
            order,
            list_type,
            sample,
            choice,
            encrypted_protocols,
            always_accept_certificates,
            extra: map,
        }
    }
}

/// A user-settable blueprint parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSpec {
    /// Option id (key in the blueprint `options` map).
    pub id: OptionId,
    /// Declared type.
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether a value must be supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Legacy top-level pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// Validation constraints, in authored order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// Rendering hints.
    #[serde(rename = "display-hints", skip_serializing_if = "Option::is_none")]
    pub display_hints: Option<DisplayHints>,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OptionSpec {
    /// Build an option from an `options` map entry, injecting `id = key`.
    ///
    /// Never fails: a non-object entry yields an option with an unresolved type.
    #[must_use]
    pub fn from_entry(key: &str, raw: &Value) -> Self {
        let mut map = match raw {
            Value::Object(map) => map.clone(),
            other => {
                warn!(option = key, value = %other, "option entry is not an object");
                Map::new()
            }
        };
        map.remove("id");

        let option_type = OptionType::resolve(map.remove("type").as_ref());
        let label = take_string(&mut map, "label");
        let description = take_string(&mut map, "description");
        let default = map.remove("default");
        let required = match map.remove("required") {
            Some(Value::Bool(required)) => Some(required),
            Some(other) => {
                map.insert("required".to_string(), other);
                None
            }
            None => None,
        };
        let regex = take_string(&mut map, "regex");

        let constraints = match map.remove("constraints") {
            Some(Value::Array(items)) => items
                .into_iter()
                .flat_map(|item| match item {
                    Value::Object(constraint) => Constraint::parse_all(constraint),
                    other => {
                        warn!(option = key, value = %other, "skipping non-object constraint");
                        Vec::new()
                    }
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!(option = key, value = %other, "constraints must be a list");
                Vec::new()
            }
        };

        let display_hints = match map.remove("display-hints") {
            Some(Value::Object(hints)) => Some(DisplayHints::from(hints)),
            Some(Value::Null) | None => None,
            Some(other) => {
                warn!(option = key, value = %other, "display-hints must be an object");
                Some(DisplayHints::default())
            }
        };

        Self {
            id: OptionId::from(key),
            option_type,
            label,
            description,
            default,
            required,
            regex,
            constraints,
            display_hints,
            extra: map,
        }
    }

    /// Label to display: `label`, falling back to the id.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    /// Whether a value is mandatory.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Remove a string field; non-string values are left in place.
fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => map.remove(key).and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_option_type_resolution() {
        assert_eq!(OptionType::resolve(Some(&json!("url"))), OptionType::Url);
        assert_eq!(OptionType::resolve(Some(&json!("int"))), OptionType::Integer);
        assert_eq!(
            OptionType::resolve(Some(&json!("combo"))),
            OptionType::Other("combo".to_string())
        );
        assert_eq!(
            OptionType::resolve(None),
            OptionType::Unresolved(TypeIssue::Missing)
        );
        assert!(OptionType::resolve(Some(&json!(7))).is_unresolved());
    }

    #[test]
    fn test_type_issue_display() {
        assert_eq!(TypeIssue::Missing.to_string(), "option type is missing");
        assert_eq!(
            TypeIssue::NotAString(json!(["a"])).to_string(),
            "option type must be a string, found [\"a\"]"
        );
    }

    #[test]
    fn test_constraint_parsing() {
        let c: Constraint =
            serde_json::from_value(json!({"regex": "^[a-z]+$", "message": "letters"})).unwrap();
        assert_eq!(c.rule, ConstraintRule::Regex("^[a-z]+$".into()));
        assert_eq!(c.message.as_deref(), Some("letters"));

        let c: Constraint = serde_json::from_value(json!({"greater-than": "8"})).unwrap();
        assert_eq!(
            c.rule,
            ConstraintRule::Range {
                comparison: Comparison::GreaterThan,
                bound: Number::from(8)
            }
        );

        let c: Constraint = serde_json::from_value(json!({"check": "custom"})).unwrap();
        assert_eq!(c.rule, ConstraintRule::Unknown);
        assert_eq!(c.extra.get("check"), Some(&json!("custom")));
    }

    #[test]
    fn test_mistyped_rule_is_kept_verbatim() {
        let c: Constraint = serde_json::from_value(json!({"regex": 5})).unwrap();
        assert_eq!(c.rule, ConstraintRule::Unknown);
        assert_eq!(serde_json::to_value(&c).unwrap(), json!({"regex": 5}));
    }

    #[test]
    fn test_constraint_with_several_rules_is_split() {
        let map: Map<String, Value> = serde_json::from_value(json!({
            "regex": "^https://",
            "protocols": ["https"],
            "message": "secure links only",
            "note": "kept"
        }))
        .unwrap();
        let parsed = Constraint::parse_all(map);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].rule, ConstraintRule::Regex("^https://".into()));
        assert_eq!(parsed[0].extra.get("note"), Some(&json!("kept")));
        assert_eq!(parsed[1].rule, ConstraintRule::Protocols(vec!["https".into()]));
        assert_eq!(parsed[1].message.as_deref(), Some("secure links only"));
        assert!(parsed[1].extra.is_empty());
    }

    #[test]
    fn test_option_constraints_split_per_rule() {
        let option = OptionSpec::from_entry(
            "url",
            &json!({
                "type": "url",
                "constraints": [{"protocols": ["http"], "min-length": 8}, {"in": ["a"]}]
            }),
        );
        let rules: Vec<&ConstraintRule> = option.constraints.iter().map(|c| &c.rule).collect();
        assert_eq!(
            rules,
            vec![
                &ConstraintRule::Protocols(vec!["http".into()]),
                &ConstraintRule::MinLength(8),
                &ConstraintRule::In(vec![json!("a")]),
            ]
        );
    }

    #[test]
    fn test_constraint_serialization() {
        let c = Constraint::new(ConstraintRule::Protocols(vec!["http".into(), "https".into()]))
            .with_message("web only");
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({"protocols": ["http", "https"], "message": "web only"})
        );
    }

    #[test]
    fn test_constraint_default_messages() {
        let c = Constraint::new(ConstraintRule::Protocols(vec!["http".into(), "https".into()]));
        assert_eq!(c.message_or_default(), "supported protocols are: http, https");

        let c = Constraint::new(ConstraintRule::In(vec![json!("a"), json!(2)]));
        assert_eq!(c.message_or_default(), "must be one of: a, 2");

        let c = Constraint::new(ConstraintRule::MinLength(3));
        assert_eq!(c.message_or_default(), "must be at least 3 characters");
    }

    #[test]
    fn test_display_hints_parsing() {
        let hints: DisplayHints = serde_json::from_value(json!({
            "group": "deployment",
            "order": 2,
            "list-type": "region",
            "choice": ["a", "b"],
            "encrypted-protocols": ["https"],
            "always-accept-certificates": true,
            "tooltip": "hi"
        }))
        .unwrap();
        assert_eq!(hints.group.as_deref(), Some("deployment"));
        assert_eq!(hints.order, Some(json!(2)));
        assert_eq!(hints.list_type.as_deref(), Some("region"));
        assert_eq!(hints.choice.as_ref().map(Vec::len), Some(2));
        assert_eq!(hints.encrypted_protocols, Some(vec!["https".to_string()]));
        assert_eq!(hints.always_accept_certificates, Some(true));
        assert_eq!(hints.extra.get("tooltip"), Some(&json!("hi")));
    }

    #[test]
    fn test_display_hints_lenient() {
        let hints: DisplayHints =
            serde_json::from_value(json!({"group": 3, "order": "first"})).unwrap();
        assert!(hints.group.is_none());
        assert_eq!(hints.order, Some(json!("first")));

        let hints: DisplayHints = serde_json::from_value(json!({"order": null})).unwrap();
        assert!(hints.order.is_none());
    }

    #[test]
    fn test_option_from_entry() {
        let option = OptionSpec::from_entry(
            "domain",
            &json!({
                "id": "ignored",
                "type": "string",
                "label": "Domain",
                "default": "example.com",
                "constraints": [{"regex": ".+"}, "junk"],
                "display-hints": {"group": "dns"},
                "custom": 1
            }),
        );
        assert_eq!(option.id, "domain");
        assert_eq!(option.option_type, OptionType::String);
        assert_eq!(option.display_label(), "Domain");
        assert_eq!(option.constraints.len(), 1);
        assert_eq!(
            option.display_hints.and_then(|h| h.group).as_deref(),
            Some("dns")
        );
        assert_eq!(option.extra.get("custom"), Some(&json!(1)));
        assert!(!option.extra.contains_key("id"));
    }

    #[test]
    fn test_option_from_non_object_entry() {
        let option = OptionSpec::from_entry("broken", &json!("nope"));
        assert!(option.option_type.is_unresolved());
        assert_eq!(option.display_label(), "broken");
    }

    #[test]
    fn test_option_serialization_uses_blueprint_keys() {
        let option = OptionSpec::from_entry(
            "url",
            &json!({"type": "url", "display-hints": {"group": "application"}}),
        );
        let value = serde_json::to_value(&option).unwrap();
        assert_eq!(value["id"], json!("url"));
        assert_eq!(value["type"], json!("url"));
        assert_eq!(value["display-hints"]["group"], json!("application"));
    }
}
