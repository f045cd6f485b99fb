//! Blueprint document models.
//!
//! The blueprint is owned by the caller and arrives fully parsed. Everything the engine
//! does not understand is kept in `extra` maps so a round trip through these types never
//! drops author data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::ident::{ComponentId, ServiceId};

/// Root blueprint document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Blueprint {
    /// Option id to raw option specification.
    #[serde(
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "Map::is_empty"
    )]
    pub options: Map<String, Value>,
    /// Service id to raw service specification.
    #[serde(
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "Map::is_empty"
    )]
    pub services: Map<String, Value>,
    /// Blueprint metadata, including layout `annotations`.
    #[serde(
        rename = "meta-data",
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "Map::is_empty"
    )]
    pub meta_data: Map<String, Value>,
    /// Remaining top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Blueprint {
    /// Build a blueprint from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if the value is not a blueprint-shaped object.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Convert the blueprint back into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Layout annotations keyed by service id, if any.
    #[must_use]
    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.meta_data.get("annotations").and_then(Value::as_object)
    }

    /// Layout annotations, created on first use.
    pub fn annotations_mut(&mut self) -> &mut Map<String, Value> {
        let entry = self
            .meta_data
            .entry("annotations")
            .or_insert_with(|| Value::Object(Map::new()));
        ensure_object(entry)
    }

    /// Author-specified option group list from `meta-data.reach-info.option-groups`.
    #[must_use]
    pub fn option_groups(&self) -> Option<&Vec<Value>> {
        self.meta_data
            .get("reach-info")
            .and_then(|info| info.get("option-groups"))
            .and_then(Value::as_array)
    }

    /// Parse a single service specification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if the service exists but is malformed.
    pub fn service(&self, id: &str) -> Result<Option<ServiceSpec>> {
        self.services
            .get(id)
            .map(|raw| ServiceSpec::from_entry(id, raw))
            .transpose()
    }

    /// Parse every service specification, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] for the first malformed service.
    pub fn service_specs(&self) -> Result<Vec<(ServiceId, ServiceSpec)>> {
        self.services
            .iter()
            .map(|(id, raw)| -> Result<(ServiceId, ServiceSpec)> {
                Ok((ServiceId::from(id.as_str()), ServiceSpec::from_entry(id, raw)?))
            })
            .collect()
    }
}

/// Make `value` an object (replacing anything else) and return the map.
pub fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// A service: a named role backed by one or more catalog components.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceSpec {
    /// Single backing component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,
    /// Backing components of a multi-component service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentRef>>,
    /// Relations to other services.
    #[serde(
        default,
        deserialize_with = "deserialize_relations",
        skip_serializing_if = "Option::is_none"
    )]
    pub relations: Option<Vec<Relation>>,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceSpec {
    /// Create a single-component service.
    #[must_use]
    pub fn single(component: ComponentRef) -> Self {
        Self {
            component: Some(component),
            ..Self::default()
        }
    }

    /// Parse a service entry from the `services` map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] naming the service if parsing fails.
    pub fn from_entry(id: &str, raw: &Value) -> Result<Self> {
        if !raw.is_object() {
            return Err(Error::InvalidDocument(format!(
                "services.{id} must be an object"
            )));
        }
        Self::deserialize(raw).map_err(|e| Error::InvalidDocument(format!("services.{id}: {e}")))
    }

    /// Component references in declaration order.
    #[must_use]
    pub fn component_refs(&self) -> Vec<&ComponentRef> {
        match (&self.components, &self.component) {
            (Some(list), _) => list.iter().collect(),
            (None, Some(single)) => vec![single],
            (None, None) => Vec::new(),
        }
    }

    /// Number of backing components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.component_refs().len()
    }

    /// Whether any backing component has the given catalog id.
    #[must_use]
    pub fn has_component(&self, id: &str) -> bool {
        self.component_refs()
            .iter()
            .any(|c| c.key().is_some_and(|key| key == id))
    }

    /// Add a component, converting a single `component` into a `components` list.
    pub fn push_component(&mut self, component: ComponentRef) {
        if let Some(list) = self.components.as_mut() {
            list.push(component);
        } else if let Some(existing) = self.component.take() {
            self.components = Some(vec![existing, component]);
        } else {
            self.component = Some(component);
        }
    }

    /// Remove a component from a `components` list.
    ///
    /// Returns `None` when the service has no list or the index is out of range.
    pub fn remove_component(&mut self, index: usize) -> Option<ComponentRef> {
        let list = self.components.as_mut()?;
        (index < list.len()).then(|| list.remove(index))
    }

    /// Relations in declaration order.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        self.relations.as_deref().unwrap_or(&[])
    }

    /// Relations list, created on first use.
    pub fn relations_mut(&mut self) -> &mut Vec<Relation> {
        self.relations.get_or_insert_with(Vec::new)
    }

    /// Every `(target, interface)` link declared by this service.
    #[must_use]
    pub fn links(&self) -> Vec<(&str, &str)> {
        self.relations().iter().flat_map(Relation::links).collect()
    }

    /// Whether a link to `target` over `interface` is declared.
    #[must_use]
    pub fn has_link(&self, target: &str, interface: &str) -> bool {
        self.links()
            .iter()
            .any(|(t, i)| *t == target && *i == interface)
    }

    /// Remove the first link to `target` over `interface`.
    ///
    /// Short-form entries holding several targets only lose the matching key; entries
    /// left empty are dropped. Returns `true` if a link was removed.
    pub fn remove_link(&mut self, target: &str, interface: &str) -> bool {
        let Some(relations) = self.relations.as_mut() else {
            return false;
        };
        let Some(index) = relations.iter().position(|r| {
            r.links()
                .iter()
                .any(|(t, i)| *t == target && *i == interface)
        }) else {
            return false;
        };

        let drop_entry = match &mut relations[index] {
            Relation::Long { .. } => true,
            Relation::Short(map) => {
                map.remove(target);
                map.is_empty()
            }
        };
        if drop_entry {
            relations.remove(index);
        }
        true
    }

    /// Keep only links for which `keep(target, interface)` holds.
    ///
    /// Returns the number of links removed.
    pub fn retain_links<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &str) -> bool,
    {
        let Some(relations) = self.relations.as_mut() else {
            return 0;
        };
        let mut removed = 0;
        relations.retain_mut(|relation| match relation {
            Relation::Long {
                interface, service, ..
            } => {
                let kept = keep(service.as_str(), interface.as_str());
                if !kept {
                    removed += 1;
                }
                kept
            }
            Relation::Short(map) => {
                map.retain(|target, value| match relation_interface(value) {
                    Some(interface) if !keep(target, interface) => {
                        removed += 1;
                        false
                    }
                    _ => true,
                });
                !map.is_empty()
            }
        });
        removed
    }
}

/// Reference to a catalog component from a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComponentRef {
    /// Catalog id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Catalog name, used when `id` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Component-local option values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Role of the component inside its service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentRef {
    /// Reference a component by catalog id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The identifying key: `id`, falling back to `name`.
    #[must_use]
    pub fn key(&self) -> Option<ComponentId> {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .map(ComponentId::from)
    }
}

/// One entry of a service's `relations` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    /// `{interface: .., service: ..}`
    Long {
        /// Interface carried by the relation.
        interface: String,
        /// Target service id.
        service: String,
        /// Fields not interpreted by the engine.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// `{target_service: interface}`
    Short(Map<String, Value>),
}

impl Relation {
    /// Short-form relation `{target: interface}`.
    #[must_use]
    pub fn short(target: impl Into<String>, interface: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(target.into(), Value::String(interface.into()));
        Self::Short(map)
    }

    /// `(target, interface)` pairs declared by this entry.
    #[must_use]
    pub fn links(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Long {
                interface, service, ..
            } => vec![(service.as_str(), interface.as_str())],
            Self::Short(map) => map
                .iter()
                .filter_map(|(target, value)| {
                    relation_interface(value).map(|interface| (target.as_str(), interface))
                })
                .collect(),
        }
    }
}

/// Interface named by a short-form relation value (`"mysql"` or `{interface: "mysql"}`).
fn relation_interface(value: &Value) -> Option<&str> {
    match value {
        Value::String(interface) => Some(interface),
        Value::Object(map) => map.get("interface").and_then(Value::as_str),
        _ => None,
    }
}

fn deserialize_map<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let option = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(option.unwrap_or_default())
}

/// Accepts the list form and the legacy `{target: interface}` map form.
fn deserialize_relations<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Relation>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RelationsForm {
        List(Vec<Relation>),
        Map(Map<String, Value>),
    }

    let form = Option::<RelationsForm>::deserialize(deserializer)?;
    Ok(form.map(|form| match form {
        RelationsForm::List(list) => list,
        RelationsForm::Map(map) => map
            .into_iter()
            .map(|(target, value)| {
                let mut entry = Map::new();
                entry.insert(target, value);
                Relation::Short(entry)
            })
            .collect(),
    }))
}
