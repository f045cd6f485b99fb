//! Nodes, edges and edits of the service-relation graph.
//!
//! The graph is derived data: services (with their relations) and service positions are
//! the only state, and nodes and edges are recomputed from them after every edit.

use std::collections::HashMap;

use checkmate_core::{
    Blueprint, ComponentId, ComponentRef, EngineConfig, Error, Relation, ServiceId, ServiceSpec,
};
use checkmate_template::merge_into;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::catalog::{compatible_interfaces, Catalog, InterfaceCandidate};
use crate::error::ConnectError;
use crate::Result;

/// Canvas position of a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate (`gui-x`).
    pub x: f64,
    /// Vertical coordinate (`gui-y`).
    pub y: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn from_annotation(value: &Value) -> Option<Self> {
        let x = value.get("gui-x").and_then(Value::as_f64)?;
        let y = value.get("gui-y").and_then(Value::as_f64)?;
        Some(Self::new(x, y))
    }
}

/// One backing component of a service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Owning service.
    pub service: ServiceId,
    /// Index of the component within the service.
    pub index: usize,
    /// Catalog id of the component.
    pub component: Option<ComponentId>,
    /// Role of the component inside its service.
    pub role: Option<String>,
    /// Position of the owning service.
    pub position: Option<Position>,
}

/// A single relation carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// Interface name, e.g. `mysql`.
    pub protocol: String,
}

/// All relations declared by `source` towards `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Service declaring the relations.
    pub source: ServiceId,
    /// Service the relations point at.
    pub target: ServiceId,
    /// One entry per relation, in declaration order.
    pub connections: Vec<Connection>,
}

impl Edge {
    /// Interfaces carried by this edge.
    pub fn protocols(&self) -> impl Iterator<Item = &str> {
        self.connections.iter().map(|c| c.protocol.as_str())
    }
}

/// A component of a specific service, as picked on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Service id.
    pub service: ServiceId,
    /// Catalog id of one of the service's components.
    pub component: ComponentId,
}

impl Endpoint {
    /// Create an endpoint.
    #[must_use]
    pub fn new(service: impl Into<ServiceId>, component: impl Into<ComponentId>) -> Self {
        Self {
            service: service.into(),
            component: component.into(),
        }
    }
}

/// Result of a connection attempt that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ConnectOutcome {
    /// A relation over `interface` exists between the two services.
    Connected {
        /// Interface the relation carries.
        interface: String,
    },
    /// Several interfaces fit; nothing was written. Retry with one of them.
    Ambiguous {
        /// Every usable interface.
        candidates: Vec<InterfaceCandidate>,
    },
}

impl ConnectOutcome {
    /// Whether a relation is in place.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Working copy of a blueprint's services and their relation graph.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    config: EngineConfig,
    services: Vec<(ServiceId, ServiceSpec)>,
    positions: HashMap<ServiceId, Position>,
    removed: Vec<ServiceId>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Topology {
    /// Build the graph from a `services` map and its layout annotations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if a service entry is malformed.
    pub fn build(
        services: &Map<String, Value>,
        annotations: Option<&Map<String, Value>>,
    ) -> Result<Self> {
        Self::build_with_config(EngineConfig::default(), services, annotations)
    }

    /// Build the graph with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if a service entry is malformed.
    pub fn build_with_config(
        config: EngineConfig,
        services: &Map<String, Value>,
        annotations: Option<&Map<String, Value>>,
    ) -> Result<Self> {
        let services = services
            .iter()
            .map(|(id, raw)| -> Result<(ServiceId, ServiceSpec)> {
                Ok((ServiceId::from(id.as_str()), ServiceSpec::from_entry(id, raw)?))
            })
            .collect::<Result<Vec<_>>>()?;
        let positions = annotations
            .into_iter()
            .flatten()
            .filter_map(|(id, value)| {
                Position::from_annotation(value).map(|p| (ServiceId::from(id.as_str()), p))
            })
            .collect();

        let mut topology = Self {
            config,
            services,
            positions,
            ..Self::default()
        };
        topology.rebuild();
        debug!(
            nodes = topology.nodes.len(),
            edges = topology.edges.len(),
            "built topology"
        );
        Ok(topology)
    }

    /// Build the graph for a whole blueprint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if a service entry is malformed.
    pub fn from_blueprint(blueprint: &Blueprint, config: EngineConfig) -> Result<Self> {
        Self::build_with_config(config, &blueprint.services, blueprint.annotations())
    }

    /// Nodes, one per backing component, in document order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges, one per ordered `(source, target)` pair.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The edge from `source` to `target`, if any relation exists.
    #[must_use]
    pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Services in document order.
    pub fn services(&self) -> impl Iterator<Item = (&ServiceId, &ServiceSpec)> {
        self.services.iter().map(|(id, spec)| (id, spec))
    }

    /// A service of the working copy.
    #[must_use]
    pub fn service(&self, id: &str) -> Option<&ServiceSpec> {
        self.services
            .iter()
            .find(|(s, _)| s == id)
            .map(|(_, spec)| spec)
    }

    /// Whether the service exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.service(id).is_some()
    }

    /// Position of a service.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Services connected to `service` in either direction.
    #[must_use]
    pub fn neighbors(&self, service: &str) -> Vec<&ServiceId> {
        let mut found: Vec<&ServiceId> = Vec::new();
        for edge in &self.edges {
            let other = if edge.source == service {
                &edge.target
            } else if edge.target == service {
                &edge.source
            } else {
                continue;
            };
            if !found.contains(&other) {
                found.push(other);
            }
        }
        found
    }

    /// Relate `source` to `target`.
    ///
    /// The interface must be one the two catalog components can share. Without an
    /// explicit `interface` a single compatible interface is used; if there are several,
    /// [`ConnectOutcome::Ambiguous`] lists them and the graph is left unchanged.
    /// Connecting over an interface that is already related is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] if the endpoints are the same service, unknown, missing
    /// from the catalog, or share no usable interface. Nothing is written in that case.
    pub fn connect<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        source: &Endpoint,
        target: &Endpoint,
        interface: Option<&str>,
    ) -> std::result::Result<ConnectOutcome, ConnectError> {
        if source.service == target.service {
            warn!(service = %source.service, "refusing to connect a service to itself");
            return Err(ConnectError::SelfConnection(source.service.clone()));
        }
        self.check_endpoint(source)?;
        self.check_endpoint(target)?;

        let provider = catalog
            .component(source.component.as_str())
            .ok_or_else(|| ConnectError::ComponentNotInCatalog(source.component.clone()))?;
        let consumer = catalog
            .component(target.component.as_str())
            .ok_or_else(|| ConnectError::ComponentNotInCatalog(target.component.clone()))?;

        let candidates = compatible_interfaces(&provider, &consumer);
        if candidates.is_empty() {
            warn!(
                source = %source.component,
                target = %target.component,
                "no compatible interface"
            );
            return Err(ConnectError::IncompatibleInterfaces(
                source.component.clone(),
                target.component.clone(),
            ));
        }

        let chosen = match interface {
            Some(requested) => {
                if !candidates.iter().any(|c| c.interface == requested) {
                    return Err(ConnectError::InterfaceNotOffered {
                        interface: requested.to_string(),
                        provider: source.component.clone(),
                        consumer: target.component.clone(),
                    });
                }
                requested.to_string()
            }
            None => {
                let first = &candidates[0].interface;
                if candidates.iter().any(|c| c.interface != *first) {
                    debug!(
                        count = candidates.len(),
                        "connection needs an explicit interface"
                    );
                    return Ok(ConnectOutcome::Ambiguous { candidates });
                }
                first.clone()
            }
        };

        let spec = self
            .spec_mut(source.service.as_str())
            .ok_or_else(|| ConnectError::UnknownService(source.service.clone()))?;
        if spec.has_link(target.service.as_str(), &chosen) {
            debug!(interface = %chosen, "services already connected");
            return Ok(ConnectOutcome::Connected { interface: chosen });
        }
        spec.relations_mut()
            .push(Relation::short(target.service.as_str(), chosen.as_str()));
        self.rebuild();

        info!(
            source = %source.service,
            target = %target.service,
            interface = %chosen,
            "connected services"
        );
        Ok(ConnectOutcome::Connected { interface: chosen })
    }

    /// Remove the relation from `source` to `target` over `interface`.
    ///
    /// Returns `false` (and changes nothing) if no such relation exists.
    pub fn sever(&mut self, source: &str, target: &str, interface: &str) -> bool {
        let removed = self
            .spec_mut(source)
            .is_some_and(|spec| spec.remove_link(target, interface));
        if removed {
            self.rebuild();
            info!(source, target, interface, "severed relation");
        }
        removed
    }

    /// Remove a whole service, or one component of a multi-component service.
    ///
    /// Removing a service (or its last component) also removes every relation pointing
    /// at it. Removing one component of several drops the relations, in both directions,
    /// whose interface none of the remaining components offers according to `catalog`;
    /// if a remaining component is not in the catalog, relations are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown service or component index.
    pub fn remove<C: Catalog + ?Sized>(
        &mut self,
        service: &str,
        component: Option<usize>,
        catalog: &C,
    ) -> Result<()> {
        let index = self
            .services
            .iter()
            .position(|(s, _)| s == service)
            .ok_or_else(|| Error::NotFound(format!("service not found: {service}")))?;
        let count = self.services[index].1.component_count();

        match component {
            Some(position) if position >= count => {
                return Err(Error::NotFound(format!(
                    "service {service} has no component at index {position}"
                )));
            }
            Some(position) if count > 1 => self.remove_component(index, position, catalog),
            _ => self.remove_service(index),
        }
        self.rebuild();
        Ok(())
    }

    fn remove_service(&mut self, index: usize) {
        let (id, _) = self.services.remove(index);
        self.positions.remove(&id);
        let severed: usize = self
            .services
            .iter_mut()
            .map(|(_, spec)| spec.retain_links(|target, _| target != id.as_str()))
            .sum();
        info!(service = %id, severed, "removed service");
        self.removed.push(id);
    }

    fn remove_component<C: Catalog + ?Sized>(
        &mut self,
        index: usize,
        position: usize,
        catalog: &C,
    ) {
        let (id, spec) = &mut self.services[index];
        let id = id.clone();
        let removed = spec.remove_component(position).and_then(|c| c.key());

        let offered = spec
            .component_refs()
            .iter()
            .map(|c| {
                let key = c.key()?;
                let entry = catalog.component(key.as_str())?;
                Some(entry.interfaces().map(str::to_string).collect::<Vec<_>>())
            })
            .collect::<Option<Vec<_>>>()
            .map(|lists| lists.into_iter().flatten().collect::<Vec<String>>());
        let Some(offered) = offered else {
            warn!(service = %id, "component missing from catalog, keeping relations");
            return;
        };
        let offers = |interface: &str| offered.iter().any(|o| o == interface);

        let mut severed = spec.retain_links(|_, interface| offers(interface));
        for (other, spec) in &mut self.services {
            if *other != id {
                severed += spec.retain_links(|target, interface| {
                    target != id.as_str() || offers(interface)
                });
            }
        }
        info!(
            service = %id,
            component = ?removed,
            severed,
            "removed component"
        );
    }

    /// Add a component to `service`, creating the service if needed.
    pub fn add_component(&mut self, service: impl Into<ServiceId>, component: ComponentRef) {
        let service = service.into();
        let key = component.key();
        match self.spec_mut(service.as_str()) {
            Some(spec) => spec.push_component(component),
            None => {
                self.removed.retain(|r| *r != service);
                self.services
                    .push((service.clone(), ServiceSpec::single(component)));
            }
        }
        self.rebuild();
        info!(service = %service, component = ?key, "added component");
    }

    /// A service id based on `base` that is not in use: `base`, `base-2`, `base-3`...
    #[must_use]
    pub fn unique_service_id(&self, base: &str) -> ServiceId {
        if !self.contains(base) {
            return ServiceId::from(base);
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}-{suffix}");
            if !self.contains(&candidate) {
                return ServiceId::from(candidate);
            }
            suffix += 1;
        }
    }

    /// Move a service (all of its nodes) on the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown service.
    pub fn move_service(&mut self, service: &str, x: f64, y: f64) -> Result<()> {
        let id = self
            .services
            .iter()
            .find(|(s, _)| s == service)
            .map(|(s, _)| s.clone())
            .ok_or_else(|| Error::NotFound(format!("service not found: {service}")))?;
        let position = Position::new(x, y);
        for node in self.nodes.iter_mut().filter(|n| n.service == id) {
            node.position = Some(position);
        }
        self.positions.insert(id, position);
        Ok(())
    }

    /// Write the working copy back into `blueprint`.
    ///
    /// Each service entry is replaced with its working copy (fields the engine does not
    /// interpret are carried along), removed services and their annotations are
    /// deleted, and positions are merged into `meta-data.annotations` rounded to the
    /// configured precision.
    ///
    /// # Errors
    ///
    /// Returns an error if a service cannot be serialized.
    pub fn save(&self, blueprint: &mut Blueprint) -> Result<()> {
        for (id, spec) in &self.services {
            let value = serde_json::to_value(spec)?;
            if blueprint.services.get(id.as_str()) != Some(&value) {
                blueprint.services.insert(id.to_string(), value);
            }
        }

        if !self.removed.is_empty() {
            let is_removed = |id: &String| self.removed.iter().any(|r| r == id.as_str());
            blueprint.services.retain(|id, _| !is_removed(id));
            if let Some(annotations) = blueprint
                .meta_data
                .get_mut("annotations")
                .and_then(Value::as_object_mut)
            {
                annotations.retain(|id, _| !is_removed(id));
            }
        }

        if !self.positions.is_empty() {
            let annotations = blueprint.annotations_mut();
            for (id, _) in &self.services {
                let Some(position) = self.positions.get(id) else {
                    continue;
                };
                let entry = annotations
                    .entry(id.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                merge_into(
                    entry,
                    &json!({
                        "gui-x": self.config.round_coordinate(position.x),
                        "gui-y": self.config.round_coordinate(position.y),
                    }),
                );
            }
        }

        debug!(services = self.services.len(), "saved topology");
        Ok(())
    }

    fn check_endpoint(&self, endpoint: &Endpoint) -> std::result::Result<(), ConnectError> {
        let spec = self
            .service(endpoint.service.as_str())
            .ok_or_else(|| ConnectError::UnknownService(endpoint.service.clone()))?;
        if spec.has_component(endpoint.component.as_str()) {
            Ok(())
        } else {
            Err(ConnectError::UnknownComponent {
                service: endpoint.service.clone(),
                component: endpoint.component.clone(),
            })
        }
    }

    fn spec_mut(&mut self, id: &str) -> Option<&mut ServiceSpec> {
        self.services
            .iter_mut()
            .find(|(s, _)| s == id)
            .map(|(_, spec)| spec)
    }

    fn rebuild(&mut self) {
        let mut nodes = Vec::new();
        for (id, spec) in &self.services {
            let position = self.positions.get(id).copied();
            for (index, component) in spec.component_refs().into_iter().enumerate() {
                nodes.push(Node {
                    service: id.clone(),
                    index,
                    component: component.key(),
                    role: component.role.clone(),
                    position,
                });
            }
        }

        let mut edges: Vec<Edge> = Vec::new();
        for (id, spec) in &self.services {
            for (target, interface) in spec.links() {
                if !self.contains(target) {
                    warn!(service = %id, target, "skipping relation to unknown service");
                    continue;
                }
                let connection = Connection {
                    protocol: interface.to_string(),
                };
                match edges
                    .iter_mut()
                    .find(|e| e.source == *id && e.target == target)
                {
                    Some(edge) => edge.connections.push(connection),
                    None => edges.push(Edge {
                        source: id.clone(),
                        target: ServiceId::from(target),
                        connections: vec![connection],
                    }),
                }
            }
        }

        self.nodes = nodes;
        self.edges = edges;
    }
}
