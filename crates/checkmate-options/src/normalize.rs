//! Blueprint option normalization.
//!
//! [`Normalizer::normalize`] walks the blueprint `options` map in document order and
//! produces a [`NormalizedOptions`]: every option copied and annotated for display,
//! the group buckets they fall into, the distinguished region option and the group
//! layout to render.

use std::cmp::Ordering;

use checkmate_core::option::{protocols_message, ConstraintRule, OptionSpec, OptionType};
use checkmate_core::{Blueprint, EngineConfig, OptionId};
use fancy_regex::RegexBuilder;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::layout::DisplayLayout;

/// Serialized `order` of options without an explicit position.
pub const UNORDERED: &str = "XXX";

/// Options rendered as URLs regardless of their declared type.
const URL_KEYS: [&str; 2] = ["site_address", "url"];

/// Well-known infrastructure options kept out of the main form.
const HIDDEN_KEYS: [&str; 7] = [
    "domain",
    "register-dns",
    "web_server_protocol",
    "path",
    "ssl_certificate",
    "ssl_private_key",
    "ssl_intermediate_certificate",
];

/// Identity options that always belong in the default group.
const IDENTITY_KEYS: [&str; 3] = ["username", "password", "prefix"];

/// Display position of an option inside its group.
///
/// Numeric orders sort first, then authored non-numeric orders in blueprint order, then
/// options without an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionOrder {
    /// Explicit `display-hints.order`, kept exactly as authored
    At(Value),
    /// No explicit order; sorts after every ordered option
    Unordered,
}

impl OptionOrder {
    /// Whether an explicit order was authored.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(self, Self::At(_))
    }

    /// The authored order when it reads as a number (`2`, `1.5` or `"3"`).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::At(Value::Number(n)) => n.as_f64(),
            Self::At(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::At(_) if self.as_number().is_some() => 0,
            Self::At(_) => 1,
            Self::Unordered => 2,
        }
    }

    fn cmp_display(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| {
            match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            }
        })
    }
}

impl Serialize for OptionOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::At(value) => value.serialize(serializer),
            Self::Unordered => serializer.serialize_str(UNORDERED),
        }
    }
}

/// An option prepared for display and binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedOption {
    /// The parsed option.
    #[serde(flatten)]
    pub spec: OptionSpec,
    /// Position inside its group.
    pub order: OptionOrder,
    /// Resolved group; `None` keeps the option out of every bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Values offered to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Vec<Value>>,
    /// Accepted URL protocols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    /// Example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,
    /// Protocols that require certificates.
    #[serde(rename = "encrypted-protocols", skip_serializing_if = "Option::is_none")]
    pub encrypted_protocols: Option<Vec<String>>,
    /// Whether certificate errors are ignored.
    #[serde(
        rename = "always-accept-certificates",
        skip_serializing_if = "Option::is_none"
    )]
    pub always_accept_certificates: Option<bool>,
    /// Inline error marker for options that cannot be rendered normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedOption {
    fn new(spec: OptionSpec) -> Self {
        let error = match &spec.option_type {
            OptionType::Unresolved(issue) => Some(issue.to_string()),
            _ => None,
        };
        Self {
            spec,
            order: OptionOrder::Unordered,
            group: None,
            choice: None,
            protocols: None,
            sample: None,
            encrypted_protocols: None,
            always_accept_certificates: None,
            error,
        }
    }

    /// Option id.
    #[must_use]
    pub fn id(&self) -> &OptionId {
        &self.spec.id
    }

    /// Declared (or forced) type.
    #[must_use]
    pub fn option_type(&self) -> &OptionType {
        &self.spec.option_type
    }
}

/// A recovered problem found while normalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Option the problem was found on.
    pub option: OptionId,
    /// What was wrong and what was done about it.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
struct OptionGroup {
    name: String,
    members: Vec<usize>,
}

/// Result of normalizing a blueprint's options.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOptions {
    options: Vec<NormalizedOption>,
    groups: Vec<OptionGroup>,
    region: Option<usize>,
    layout: DisplayLayout,
    diagnostics: Vec<Diagnostic>,
}

impl NormalizedOptions {
    /// All options in blueprint order.
    #[must_use]
    pub fn options(&self) -> &[NormalizedOption] {
        &self.options
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the blueprint declared no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Look up an option by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NormalizedOption> {
        self.options.iter().find(|o| o.spec.id == id)
    }

    /// Look up an option by id for editing.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut NormalizedOption> {
        self.options.iter_mut().find(|o| o.spec.id == id)
    }

    /// The distinguished region selector, if any.
    #[must_use]
    pub fn region_option(&self) -> Option<&NormalizedOption> {
        self.region.map(|index| &self.options[index])
    }

    /// Group names in order of first use.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Members of a group sorted by display order (unordered options last).
    #[must_use]
    pub fn group(&self, name: &str) -> Vec<&NormalizedOption> {
        let mut members: Vec<&NormalizedOption> = self
            .groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.members.iter().map(|&i| &self.options[i]).collect())
            .unwrap_or_default();
        members.sort_by(|a, b| a.order.cmp_display(&b.order));
        members
    }

    /// Options carrying an inline error marker.
    pub fn errors(&self) -> impl Iterator<Item = &NormalizedOption> {
        self.options.iter().filter(|o| o.error.is_some())
    }

    /// Groups to display and their headers.
    #[must_use]
    pub const fn layout(&self) -> &DisplayLayout {
        &self.layout
    }

    /// Problems recovered from while normalizing.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume into the option list.
    #[must_use]
    pub fn into_options(self) -> Vec<NormalizedOption> {
        self.options
    }
}

struct GroupsView<'a>(&'a NormalizedOptions);

impl Serialize for GroupsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.groups.len()))?;
        for group in &self.0.groups {
            map.serialize_entry(&group.name, &self.0.group(&group.name))?;
        }
        map.end()
    }
}

impl Serialize for NormalizedOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NormalizedOptions", 4)?;
        state.serialize_field("options", &self.options)?;
        state.serialize_field("groups", &GroupsView(self))?;
        state.serialize_field("regionOption", &self.region_option())?;
        state.serialize_field("layout", self.layout.sections())?;
        state.end()
    }
}

/// Turns blueprint options into display-ready [`NormalizedOptions`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: EngineConfig,
}

impl Normalizer {
    /// Create a normalizer with the given configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Normalize every option of `blueprint`. Never fails.
    #[must_use]
    pub fn normalize(&self, blueprint: &Blueprint) -> NormalizedOptions {
        let mut options = Vec::with_capacity(blueprint.options.len());
        let mut groups: Vec<OptionGroup> = Vec::new();
        let mut legacy_region = None;
        let mut hinted_region = None;

        for (key, item) in &blueprint.options {
            let index = options.len();
            let mut option = NormalizedOption::new(OptionSpec::from_entry(key, item));

            let legacy_match = key == "region" || option.spec.option_type == OptionType::Region;
            if legacy_match {
                legacy_region = Some(index);
            }
            let hinted_match = option.spec.display_hints.as_ref().is_some_and(|hints| {
                hints.list_type.as_deref() == Some("region")
                    && hints.group.as_deref() == Some("deployment")
            });
            if hinted_match {
                hinted_region = Some(index);
            }

            self.assign_group(key, &mut option, legacy_match || hinted_match);
            apply_constraints(&mut option);

            if let Some(group) = option.group.clone() {
                match groups.iter_mut().find(|g| g.name == group) {
                    Some(bucket) => bucket.members.push(index),
                    None => groups.push(OptionGroup {
                        name: group,
                        members: vec![index],
                    }),
                }
            }
            options.push(option);
        }

        let mut diagnostics = Vec::new();
        for option in &mut options {
            self.drop_malformed_patterns(option, &mut diagnostics);
        }

        let layout = blueprint
            .option_groups()
            .map_or_else(DisplayLayout::default, |entries| {
                DisplayLayout::from_option_groups(entries)
            });

        debug!(
            options = options.len(),
            groups = groups.len(),
            "normalized blueprint options"
        );

        NormalizedOptions {
            options,
            groups,
            region: hinted_region.or(legacy_region),
            layout,
            diagnostics,
        }
    }

    fn assign_group(&self, key: &str, option: &mut NormalizedOption, is_region: bool) {
        if let Some(hints) = option.spec.display_hints.clone() {
            option.order = hints.order.map_or(OptionOrder::Unordered, OptionOrder::At);
            option.group = hints.group;
            option.sample = hints.sample;
            option.choice = hints.choice;
            option.encrypted_protocols = hints.encrypted_protocols;
            option.always_accept_certificates = hints.always_accept_certificates;
            return;
        }

        option.group = if URL_KEYS.contains(&key) {
            option.spec.option_type = OptionType::Url;
            Some(self.config.default_group.clone())
        } else if HIDDEN_KEYS.contains(&key) {
            Some(self.config.hidden_group.clone())
        } else if IDENTITY_KEYS.contains(&key) || !is_region {
            Some(self.config.default_group.clone())
        } else {
            None
        };
    }

    /// Remove patterns that do not compile, recording why.
    fn drop_malformed_patterns(
        &self,
        option: &mut NormalizedOption,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let id = option.spec.id.clone();
        let mut report = |pattern: &str, err: &fancy_regex::Error| {
            warn!(option = %id, pattern, error = %err, "dropping invalid regex");
            diagnostics.push(Diagnostic {
                option: id.clone(),
                message: format!("regex '{pattern}' is invalid and was ignored"),
            });
        };

        if let Some(pattern) = option.spec.regex.as_deref() {
            if let Err(err) = self.compile(pattern) {
                report(pattern, &err);
                option.spec.regex = None;
            }
        }

        option.spec.constraints.retain(|constraint| match &constraint.rule {
            ConstraintRule::Regex(pattern) => match self.compile(pattern) {
                Ok(()) => true,
                Err(err) => {
                    report(pattern, &err);
                    false
                }
            },
            _ => true,
        });
    }

    fn compile(&self, pattern: &str) -> Result<(), fancy_regex::Error> {
        RegexBuilder::new(pattern)
            .delegate_size_limit(self.config.regex_size_limit)
            .build()
            .map(|_| ())
    }
}

/// Hoist `protocols` and `in` constraints onto the option.
fn apply_constraints(option: &mut NormalizedOption) {
    for constraint in &mut option.spec.constraints {
        match &constraint.rule {
            ConstraintRule::Protocols(protocols) => {
                option.protocols = Some(protocols.clone());
                if constraint.message.is_none() {
                    constraint.message = Some(protocols_message(protocols));
                }
            }
            ConstraintRule::In(values) => {
                if option.choice.is_none() {
                    option.choice = Some(values.clone());
                }
            }
            _ => {}
        }
    }
}

/// Normalize with the default configuration.
#[must_use]
pub fn normalize(blueprint: &Blueprint) -> NormalizedOptions {
    Normalizer::default().normalize(blueprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blueprint(options: Value) -> Blueprint {
        Blueprint::from_value(json!({ "options": options })).unwrap()
    }

    #[test]
    fn test_region_by_legacy_heuristic_without_group() {
        let result = normalize(&blueprint(json!({
            "region": {"type": "select", "display-hints": {}}
        })));

        let region = result.region_option().unwrap();
        assert_eq!(region.id(), &OptionId::from("region"));
        assert!(region.group.is_none());
        assert_eq!(result.group_names().count(), 0);
    }

    #[test]
    fn test_hinted_region_wins_over_legacy() {
        let result = normalize(&blueprint(json!({
            "location": {
                "type": "string",
                "display-hints": {"list-type": "region", "group": "deployment"}
            },
            "region": {"type": "region"}
        })));

        assert_eq!(result.region_option().unwrap().id(), &OptionId::from("location"));
        // the legacy match is still a region-looking option, so it gets no bucket
        assert!(result.get("region").unwrap().group.is_none());
    }

    #[test]
    fn test_order_sentinel() {
        let result = normalize(&blueprint(json!({
            "a": {"type": "string", "display-hints": {"group": "application", "order": 2}},
            "b": {"type": "string", "display-hints": {"group": "application"}},
            "c": {"type": "string"}
        })));

        assert_eq!(result.get("a").unwrap().order, OptionOrder::At(json!(2)));
        assert_eq!(result.get("b").unwrap().order, OptionOrder::Unordered);
        assert_eq!(result.get("c").unwrap().order, OptionOrder::Unordered);
        assert_eq!(
            serde_json::to_value(&result.get("b").unwrap().order).unwrap(),
            json!("XXX")
        );
    }

    #[test]
    fn test_authored_order_is_kept_whatever_its_type() {
        let result = normalize(&blueprint(json!({
            "named": {"type": "string", "display-hints": {"group": "server", "order": "first"}},
            "text": {"type": "string", "display-hints": {"group": "server", "order": "2"}},
            "null": {"type": "string", "display-hints": {"group": "server", "order": null}},
            "bare": {"type": "string", "display-hints": {"group": "server"}},
            "plain": {"type": "string"}
        })));

        for option in result.options() {
            let authored = option
                .spec
                .display_hints
                .as_ref()
                .is_some_and(|hints| hints.order.is_some());
            let serialized = serde_json::to_value(&option.order).unwrap();
            assert_eq!(serialized != json!(UNORDERED), authored, "{}", option.id());
        }
        let named = result.get("named").unwrap();
        assert_eq!(serde_json::to_value(&named.order).unwrap(), json!("first"));
        assert_eq!(
            serde_json::to_value(&result.get("text").unwrap().order).unwrap(),
            json!("2")
        );
        assert_eq!(result.get("text").unwrap().order.as_number(), Some(2.0));
        assert!(named.order.as_number().is_none());
    }

    #[test]
    fn test_named_order_sorts_between_numeric_and_unordered() {
        let result = normalize(&blueprint(json!({
            "none": {"type": "string", "display-hints": {"group": "server"}},
            "named": {"type": "string", "display-hints": {"group": "server", "order": "last"}},
            "two": {"type": "string", "display-hints": {"group": "server", "order": 2}},
            "other": {"type": "string", "display-hints": {"group": "server", "order": true}},
            "one": {"type": "string", "display-hints": {"group": "server", "order": "1"}}
        })));
        let ids: Vec<&str> = result
            .group("server")
            .iter()
            .map(|o| o.id().as_str())
            .collect();
        assert_eq!(ids, vec!["one", "two", "named", "other", "none"]);
    }

    #[test]
    fn test_hints_without_group_leave_option_ungrouped() {
        let result = normalize(&blueprint(json!({
            "size": {"type": "integer", "display-hints": {"order": 1, "sample": 4}}
        })));
        let size = result.get("size").unwrap();
        assert!(size.group.is_none());
        assert_eq!(size.sample, Some(json!(4)));
        assert!(result.group("application").is_empty());
    }

    #[test]
    fn test_legacy_key_heuristics() {
        let result = normalize(&blueprint(json!({
            "url": {"type": "string"},
            "domain": {"type": "string"},
            "ssl_private_key": {"type": "text"},
            "username": {"type": "string"},
            "instance_count": {"type": "integer"}
        })));

        assert_eq!(result.get("url").unwrap().option_type(), &OptionType::Url);
        assert_eq!(result.get("url").unwrap().group.as_deref(), Some("application"));
        assert_eq!(result.get("domain").unwrap().group.as_deref(), Some("hidden"));
        assert_eq!(
            result.get("ssl_private_key").unwrap().group.as_deref(),
            Some("hidden")
        );
        assert_eq!(result.get("username").unwrap().group.as_deref(), Some("application"));
        assert_eq!(
            result.get("instance_count").unwrap().group.as_deref(),
            Some("application")
        );
        let names: Vec<&str> = result.group_names().collect();
        assert_eq!(names, vec!["application", "hidden"]);
    }

    #[test]
    fn test_configured_groups() {
        let config = EngineConfig::default()
            .with_default_group("general")
            .with_hidden_group("internal");
        let result = Normalizer::new(config).normalize(&blueprint(json!({
            "path": {"type": "string"},
            "name": {"type": "string"}
        })));
        assert_eq!(result.get("path").unwrap().group.as_deref(), Some("internal"));
        assert_eq!(result.get("name").unwrap().group.as_deref(), Some("general"));
    }

    #[test]
    fn test_protocols_constraint_is_hoisted_with_default_message() {
        let result = normalize(&blueprint(json!({
            "url": {
                "type": "url",
                "constraints": [{"protocols": ["http", "https"]}],
                "display-hints": {"group": "application", "encrypted-protocols": ["https"]}
            }
        })));
        let url = result.get("url").unwrap();
        assert_eq!(url.protocols, Some(vec!["http".to_string(), "https".to_string()]));
        assert_eq!(
            url.spec.constraints[0].message.as_deref(),
            Some("supported protocols are: http, https")
        );
        assert_eq!(url.encrypted_protocols, Some(vec!["https".to_string()]));
    }

    #[test]
    fn test_authored_protocol_message_is_kept() {
        let result = normalize(&blueprint(json!({
            "url": {"type": "url", "constraints": [{"protocols": ["https"], "message": "TLS only"}]}
        })));
        assert_eq!(
            result.get("url").unwrap().spec.constraints[0].message.as_deref(),
            Some("TLS only")
        );
    }

    #[test]
    fn test_protocols_hoisted_from_constraint_with_several_rules() {
        let result = normalize(&blueprint(json!({
            "url": {
                "type": "url",
                "constraints": [{"regex": "^https://", "protocols": ["https"]}]
            }
        })));
        let url = result.get("url").unwrap();
        assert_eq!(url.protocols, Some(vec!["https".to_string()]));
        assert_eq!(url.spec.constraints.len(), 2);
        assert_eq!(
            url.spec.constraints[1].message.as_deref(),
            Some("supported protocols are: https")
        );
    }

    #[test]
    fn test_in_constraint_doubles_as_choice() {
        let result = normalize(&blueprint(json!({
            "os": {"type": "select", "constraints": [{"in": ["ubuntu", "centos"]}]},
            "size": {
                "type": "select",
                "constraints": [{"in": [1, 2, 3]}],
                "display-hints": {"group": "server", "choice": [1, 2]}
            }
        })));
        assert_eq!(
            result.get("os").unwrap().choice,
            Some(vec![json!("ubuntu"), json!("centos")])
        );
        assert_eq!(result.get("size").unwrap().choice, Some(vec![json!(1), json!(2)]));
    }

    #[test]
    fn test_invalid_regex_is_dropped() {
        let result = normalize(&blueprint(json!({
            "name": {
                "type": "string",
                "regex": "[unterminated",
                "label": "Name",
                "constraints": [{"regex": "(oops"}, {"regex": "^ok$"}]
            }
        })));
        let name = result.get("name").unwrap();
        assert!(name.spec.regex.is_none());
        assert_eq!(name.spec.label.as_deref(), Some("Name"));
        assert_eq!(name.spec.constraints.len(), 1);
        assert_eq!(result.diagnostics().len(), 2);
        assert!(result.diagnostics()[0].message.contains("[unterminated"));
    }

    #[test]
    fn test_lookaround_regex_is_kept() {
        let result = normalize(&blueprint(json!({
            "password": {
                "type": "password",
                "regex": "^(?=.*\\d).{8,}$",
                "constraints": [{"regex": "^(?!admin$)"}]
            }
        })));
        let password = result.get("password").unwrap();
        assert_eq!(password.spec.regex.as_deref(), Some("^(?=.*\\d).{8,}$"));
        assert_eq!(password.spec.constraints.len(), 1);
        assert!(result.diagnostics().is_empty());
    }

    #[test]
    fn test_unresolved_type_marks_option_without_failing_list() {
        let result = normalize(&blueprint(json!({
            "missing": {"label": "No type"},
            "numeric": {"type": 3},
            "fine": {"type": "string"}
        })));
        assert_eq!(result.len(), 3);
        let errors: Vec<&str> = result.errors().map(|o| o.id().as_str()).collect();
        assert_eq!(errors, vec!["missing", "numeric"]);
        assert!(result.get("fine").unwrap().error.is_none());
    }

    #[test]
    fn test_group_sorted_by_order() {
        let result = normalize(&blueprint(json!({
            "c": {"type": "string", "display-hints": {"group": "server"}},
            "b": {"type": "string", "display-hints": {"group": "server", "order": 2}},
            "a": {"type": "string", "display-hints": {"group": "server", "order": 1}}
        })));
        let ids: Vec<&str> = result
            .group("server")
            .iter()
            .map(|o| o.id().as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_option_groups_overlay() {
        let blueprint = Blueprint::from_value(json!({
            "options": {},
            "meta-data": {"reach-info": {"option-groups": ["application", {"servers": "Servers"}]}}
        }))
        .unwrap();
        let result = normalize(&blueprint);
        let groups: Vec<&str> = result.layout().groups().collect();
        assert_eq!(groups, vec!["application", "servers"]);
        assert_eq!(result.layout().header("servers"), Some("Servers"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let result = normalize(&blueprint(json!({
            "region": {
                "type": "region",
                "display-hints": {"group": "deployment", "list-type": "region"}
            }
        })));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["regionOption"]["id"], json!("region"));
        assert_eq!(value["groups"]["deployment"][0]["id"], json!("region"));
        assert_eq!(value["options"][0]["order"], json!("XXX"));
    }

    #[test]
    fn test_get_mut_binding() {
        let mut result = normalize(&blueprint(json!({"name": {"type": "string"}})));
        result.get_mut("name").unwrap().spec.default = Some(json!("wp"));
        assert_eq!(result.group("application")[0].spec.default, Some(json!("wp")));
    }
}
