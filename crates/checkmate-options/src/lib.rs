//! Option normalization for Checkmate blueprints.
//!
//! This crate turns a blueprint's raw `options` map into an ordered, grouped list of
//! display-ready options, and validates user-entered values against them.

#![deny(missing_docs)]

pub mod layout;
pub mod normalize;
pub mod validate;

pub use layout::{DisplayLayout, GroupHeader};
pub use normalize::{
    normalize, Diagnostic, NormalizedOption, NormalizedOptions, Normalizer, OptionOrder,
};
pub use validate::{validate_value, OptionValidator, Violation};

/// Convenient result alias that reuses the shared Checkmate error type.
pub type Result<T> = checkmate_core::Result<T>;
