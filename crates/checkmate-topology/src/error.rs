//! Rejections raised by [`Topology::connect`](crate::Topology::connect).

use checkmate_core::error::Error as CoreError;
use checkmate_core::{ComponentId, ServiceId};
use thiserror::Error;

/// Why a connection was refused. No relation is written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// Source and target are the same service.
    #[error("cannot connect service {0} to itself")]
    SelfConnection(ServiceId),
    /// The two components share no interface.
    #[error("components {0} and {1} have no compatible interface")]
    IncompatibleInterfaces(ComponentId, ComponentId),
    /// An explicit interface was requested that the components cannot use.
    #[error("interface {interface} is not offered between {provider} and {consumer}")]
    InterfaceNotOffered {
        /// Requested interface.
        interface: String,
        /// Source component.
        provider: ComponentId,
        /// Target component.
        consumer: ComponentId,
    },
    /// The service does not exist in the working copy.
    #[error("service not found: {0}")]
    UnknownService(ServiceId),
    /// The service exists but is not backed by the component.
    #[error("service {service} has no component {component}")]
    UnknownComponent {
        /// Service looked up.
        service: ServiceId,
        /// Component expected on it.
        component: ComponentId,
    },
    /// The catalog has no entry for the component.
    #[error("component not found in catalog: {0}")]
    ComponentNotInCatalog(ComponentId),
}

impl From<ConnectError> for CoreError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::UnknownService(_)
            | ConnectError::UnknownComponent { .. }
            | ConnectError::ComponentNotInCatalog(_) => CoreError::NotFound(err.to_string()),
            ConnectError::SelfConnection(_)
            | ConnectError::IncompatibleInterfaces(..)
            | ConnectError::InterfaceNotOffered { .. } => {
                CoreError::InvalidRequest(err.to_string())
            }
        }
    }
}
