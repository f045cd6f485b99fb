//! Save-on-change editing of a blueprint's topology.

use checkmate_core::{Blueprint, ComponentRef, EngineConfig, ServiceId};
use tracing::debug;

use crate::catalog::Catalog;
use crate::graph::{ConnectOutcome, Endpoint, Topology};
use crate::Result;

/// Owns a blueprint and its [`Topology`], writing every successful edit straight back
/// into the blueprint.
#[derive(Debug)]
pub struct BlueprintEditor<C> {
    blueprint: Blueprint,
    catalog: C,
    config: EngineConfig,
    topology: Topology,
}

impl<C: Catalog> BlueprintEditor<C> {
    /// Start editing `blueprint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a service is malformed.
    pub fn new(blueprint: Blueprint, catalog: C, config: EngineConfig) -> Result<Self> {
        config.check()?;
        let topology = Topology::from_blueprint(&blueprint, config.clone())?;
        Ok(Self {
            blueprint,
            catalog,
            config,
            topology,
        })
    }

    /// The edited blueprint.
    #[must_use]
    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    /// The current graph.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Stop editing and hand the blueprint back.
    #[must_use]
    pub fn into_blueprint(self) -> Blueprint {
        self.blueprint
    }

    /// Rebuild the graph from the blueprint, discarding nothing that was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if a service is malformed.
    pub fn reload(&mut self) -> Result<()> {
        self.topology = Topology::from_blueprint(&self.blueprint, self.config.clone())?;
        debug!("reloaded topology");
        Ok(())
    }

    /// Swap in a different blueprint and rebuild the graph from it.
    ///
    /// # Errors
    ///
    /// Returns an error if a service is malformed; the previous blueprint is kept.
    pub fn replace_blueprint(&mut self, blueprint: Blueprint) -> Result<Blueprint> {
        let topology = Topology::from_blueprint(&blueprint, self.config.clone())?;
        self.topology = topology;
        Ok(std::mem::replace(&mut self.blueprint, blueprint))
    }

    /// See [`Topology::connect`]. Rejections are converted into the shared error type.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is rejected.
    pub fn connect(
        &mut self,
        source: &Endpoint,
        target: &Endpoint,
        interface: Option<&str>,
    ) -> Result<ConnectOutcome> {
        let outcome = self
            .topology
            .connect(&self.catalog, source, target, interface)?;
        if outcome.is_connected() {
            self.save()?;
        }
        Ok(outcome)
    }

    /// See [`Topology::sever`].
    ///
    /// # Errors
    ///
    /// Returns an error if the blueprint cannot be updated.
    pub fn sever(&mut self, source: &str, target: &str, interface: &str) -> Result<bool> {
        let severed = self.topology.sever(source, target, interface);
        if severed {
            self.save()?;
        }
        Ok(severed)
    }

    /// See [`Topology::remove`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown service or component index.
    pub fn remove(&mut self, service: &str, component: Option<usize>) -> Result<()> {
        self.topology.remove(service, component, &self.catalog)?;
        self.save()
    }

    /// See [`Topology::add_component`].
    ///
    /// # Errors
    ///
    /// Returns an error if the blueprint cannot be updated.
    pub fn add_component(
        &mut self,
        service: impl Into<ServiceId>,
        component: ComponentRef,
    ) -> Result<()> {
        self.topology.add_component(service, component);
        self.save()
    }

    /// See [`Topology::move_service`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown service.
    pub fn move_service(&mut self, service: &str, x: f64, y: f64) -> Result<()> {
        self.topology.move_service(service, x, y)?;
        self.save()
    }

    fn save(&mut self) -> Result<()> {
        self.topology.save(&mut self.blueprint)
    }
}
