//! # checkmate-topology
//!
//! The service-relation graph of a blueprint.
//!
//! A [`Topology`] is a working copy of a blueprint's services: one node per backing
//! component and one edge per related pair of services. Edits (connect, sever, remove,
//! add, move) apply to the working copy and are flushed back with [`Topology::save`].
//! [`BlueprintEditor`] does that flush after every edit.
//!
//! ## Modules
//!
//! - [`catalog`] - Component catalog lookups and interface compatibility
//! - [`error`] - Connection rejections
//! - [`graph`] - Nodes, edges and graph operations
//! - [`editor`] - Save-on-change editing of an owned blueprint

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod editor;
pub mod error;
pub mod graph;

pub use catalog::{
    compatible_interfaces, Capability, Catalog, CatalogComponent, Direction, InterfaceCandidate,
    StaticCatalog,
};
pub use editor::BlueprintEditor;
pub use error::ConnectError;
pub use graph::{ConnectOutcome, Connection, Edge, Endpoint, Node, Position, Topology};

/// Convenient result alias that reuses the shared Checkmate error type.
pub type Result<T> = checkmate_core::Result<T>;
