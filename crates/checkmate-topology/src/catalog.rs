//! Component catalog lookups and interface compatibility.
//!
//! The catalog itself lives outside the engine; the graph only needs to ask it what a
//! component provides and requires.

use std::collections::HashMap;

use checkmate_core::{ComponentId, Error};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::Result;

/// A `(resource_type, interface)` pair from a component's `provides` or `requires`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Capability {
    /// Kind of resource, e.g. `database` or `host`.
    pub resource_type: String,
    /// Wire interface, e.g. `mysql` or `ssh`.
    pub interface: String,
}

impl Capability {
    /// Create a capability.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            interface: interface.into(),
        }
    }

    /// Parse a `provides`/`requires` value.
    ///
    /// Accepts a list of entries or a single entry. An entry is either the long form
    /// `{resource_type, interface}` or a map of `resource_type` to `"interface"`,
    /// `{interface: ..}` or `true` (the resource type doubles as the interface).
    /// Unusable entries are skipped with a warning.
    #[must_use]
    pub fn parse_list(value: &Value) -> Vec<Self> {
        match value {
            Value::Null => Vec::new(),
            Value::Array(entries) => entries.iter().flat_map(Self::parse_entry).collect(),
            Value::Object(_) => Self::parse_entry(value),
            other => {
                warn!(value = %other, "ignoring malformed capability list");
                Vec::new()
            }
        }
    }

    fn parse_entry(entry: &Value) -> Vec<Self> {
        let Value::Object(map) = entry else {
            warn!(entry = %entry, "ignoring malformed capability entry");
            return Vec::new();
        };

        if let Some(resource_type) = map.get("resource_type").and_then(Value::as_str) {
            let interface = map
                .get("interface")
                .and_then(Value::as_str)
                .unwrap_or(resource_type);
            return vec![Self::new(resource_type, interface)];
        }

        map.iter()
            .filter_map(|(resource_type, spec)| {
                let interface: &str = match spec {
                    Value::String(interface) => interface.as_str(),
                    Value::Object(fields) => fields
                        .get("interface")
                        .and_then(Value::as_str)
                        .unwrap_or(resource_type),
                    Value::Bool(true) => resource_type,
                    other => {
                        warn!(
                            resource_type = resource_type.as_str(),
                            value = %other,
                            "ignoring malformed capability"
                        );
                        return None;
                    }
                };
                Some(Self::new(resource_type.as_str(), interface))
            })
            .collect()
    }
}

/// What the catalog knows about a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogComponent {
    /// Catalog id.
    pub id: ComponentId,
    /// Capabilities this component offers to others.
    pub provides: Vec<Capability>,
    /// Capabilities this component needs from others.
    pub requires: Vec<Capability>,
    /// Rendering hints, kept opaque.
    #[serde(rename = "display-hints", skip_serializing_if = "Map::is_empty")]
    pub display_hints: Map<String, Value>,
}

impl CatalogComponent {
    /// Parse a catalog entry. `id` is used when the entry has no `id` of its own.
    #[must_use]
    pub fn from_entry(id: &str, entry: &Value) -> Self {
        let id = entry.get("id").and_then(Value::as_str).unwrap_or(id);
        Self {
            id: ComponentId::from(id),
            provides: entry
                .get("provides")
                .map(Capability::parse_list)
                .unwrap_or_default(),
            requires: entry
                .get("requires")
                .map(Capability::parse_list)
                .unwrap_or_default(),
            display_hints: entry
                .get("display-hints")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Every interface this component provides or requires.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.provides
            .iter()
            .chain(&self.requires)
            .map(|c| c.interface.as_str())
    }
}

/// Lookup of catalog components by id.
#[cfg_attr(test, mockall::automock)]
pub trait Catalog {
    /// Find a component by catalog id.
    fn component(&self, id: &str) -> Option<CatalogComponent>;
}

impl<T: Catalog + ?Sized> Catalog for &T {
    fn component(&self, id: &str) -> Option<CatalogComponent> {
        (**self).component(id)
    }
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    components: HashMap<ComponentId, CatalogComponent>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a JSON object of component id to catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if `value` is not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let entries = value
            .as_object()
            .ok_or_else(|| Error::InvalidDocument("catalog must be an object".to_string()))?;
        let mut catalog = Self::new();
        for (id, entry) in entries {
            catalog.insert(CatalogComponent::from_entry(id, entry));
        }
        Ok(catalog)
    }

    /// Add or replace a component.
    pub fn insert(&mut self, component: CatalogComponent) {
        self.components.insert(component.id.clone(), component);
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn component(&self, id: &str) -> Option<CatalogComponent> {
        self.components.get(id).cloned()
    }
}

/// Which side of a connection offers the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// The source provides what the target requires.
    Provides,
    /// The source requires what the target provides.
    Requires,
}

/// One way two components could be connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceCandidate {
    /// Resource type both sides agree on.
    pub resource_type: String,
    /// Interface the relation would carry.
    pub interface: String,
    /// Which side provides it.
    pub direction: Direction,
}

/// Interfaces usable between `source` and `target`.
///
/// Both directions are checked: the source's provides against the target's requires,
/// then the source's requires against the target's provides. Each interface appears
/// at most once per direction.
#[must_use]
pub fn compatible_interfaces(
    source: &CatalogComponent,
    target: &CatalogComponent,
) -> Vec<InterfaceCandidate> {
    let mut candidates: Vec<InterfaceCandidate> = Vec::new();
    let pairs = [
        (&source.provides, &target.requires, Direction::Provides),
        (&source.requires, &target.provides, Direction::Requires),
    ];
    for (offered, wanted, direction) in pairs {
        for capability in offered {
            if !wanted.contains(capability) {
                continue;
            }
            let duplicate = candidates
                .iter()
                .any(|c| c.direction == direction && c.interface == capability.interface);
            if !duplicate {
                candidates.push(InterfaceCandidate {
                    resource_type: capability.resource_type.clone(),
                    interface: capability.interface.clone(),
                    direction,
                });
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use serde_json::json;

    #[test]
    fn test_capability_forms() {
        let parsed = Capability::parse_list(&json!([
            {"database": "mysql"},
            {"host": {"interface": "linux", "constraints": []}},
            {"ssh": true},
            {"resource_type": "cache", "interface": "redis"},
            {"broken": 5},
            "nonsense"
        ]));
        assert_eq!(
            parsed,
            vec![
                Capability::new("database", "mysql"),
                Capability::new("host", "linux"),
                Capability::new("ssh", "ssh"),
                Capability::new("cache", "redis"),
            ]
        );
    }

    #[test]
    fn test_single_entry_capability() {
        let parsed = Capability::parse_list(&json!({"application": "http"}));
        assert_eq!(parsed, vec![Capability::new("application", "http")]);
        assert!(Capability::parse_list(&Value::Null).is_empty());
    }

    #[test]
    fn test_catalog_component_from_entry() {
        let component = CatalogComponent::from_entry(
            "mysql",
            &json!({
                "provides": [{"database": "mysql"}],
                "requires": [{"host": "linux"}],
                "display-hints": {"icon": "db.png"}
            }),
        );
        assert_eq!(component.id, ComponentId::from("mysql"));
        assert_eq!(component.interfaces().collect::<Vec<_>>(), vec!["mysql", "linux"]);
        assert_eq!(component.display_hints["icon"], json!("db.png"));
    }

    #[test]
    fn test_static_catalog() {
        let catalog = StaticCatalog::from_value(&json!({
            "wordpress": {"requires": [{"database": "mysql"}]},
            "mysql": {"id": "mysql", "provides": [{"database": "mysql"}]}
        }))
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.component("wordpress").is_some());
        assert!(catalog.component("apache").is_none());

        assert!(StaticCatalog::from_value(&json!([])).is_err());
    }

    #[test]
    fn test_compatible_interfaces_both_directions() {
        let wordpress = CatalogComponent {
            id: ComponentId::from("wordpress"),
            provides: vec![Capability::new("application", "http")],
            requires: vec![Capability::new("database", "mysql")],
            ..CatalogComponent::default()
        };
        let mysql = CatalogComponent {
            id: ComponentId::from("mysql"),
            provides: vec![Capability::new("database", "mysql")],
            ..CatalogComponent::default()
        };
        let candidates = compatible_interfaces(&wordpress, &mysql);
        assert_eq!(
            candidates,
            vec![InterfaceCandidate {
                resource_type: "database".into(),
                interface: "mysql".into(),
                direction: Direction::Requires,
            }]
        );
        assert!(compatible_interfaces(&mysql, &mysql).is_empty());
    }

    #[test]
    fn test_resource_type_must_match() {
        let a = CatalogComponent {
            provides: vec![Capability::new("cache", "mysql")],
            ..CatalogComponent::default()
        };
        let b = CatalogComponent {
            requires: vec![Capability::new("database", "mysql")],
            ..CatalogComponent::default()
        };
        assert!(compatible_interfaces(&a, &b).is_empty());
    }

    #[test]
    fn test_catalog_mock() {
        let mut mock = MockCatalog::new();
        mock.expect_component()
            .with(eq("mysql"))
            .times(1)
            .returning(|id| Some(CatalogComponent::from_entry(id, &json!({}))));

        let found = mock.component("mysql").unwrap();
        assert_eq!(found.id, ComponentId::from("mysql"));
    }
}
