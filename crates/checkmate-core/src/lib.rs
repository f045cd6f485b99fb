//! # checkmate-core
//!
//! Core types and utilities shared by the Checkmate blueprint engine.
//!
//! This crate provides the blueprint document model, error handling, strongly typed
//! identifiers and the engine configuration consumed by the option normalizer, the
//! substitution engine and the service-relation graph.
//!
//! ## Modules
//!
//! - [`error`] - Error types and structured error responses
//! - [`ident`] - Strongly-typed identifiers for services, components and options
//! - [`blueprint`] - Blueprint, service, component and relation documents
//! - [`option`] - Option specifications, constraints and display hints
//! - [`config`] - Engine configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blueprint;
pub mod config;
pub mod error;
pub mod ident;
pub mod option;

// Re-export commonly used types
pub use blueprint::{Blueprint, ComponentRef, Relation, ServiceSpec};
pub use config::{EngineConfig, SubstitutionMode};
pub use error::{Error, Result};
pub use ident::{ComponentId, OptionId, ServiceId};
pub use option::{Constraint, ConstraintRule, DisplayHints, OptionSpec, OptionType};
