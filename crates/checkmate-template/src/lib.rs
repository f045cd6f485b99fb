//! Variable substitution and deep merge for Checkmate documents.
//!
//! Substitution rewrites literal tokens in the serialized form of a document and merges
//! the result back in place, so subtrees the tokens did not touch keep their identity.

#![deny(missing_docs)]

pub mod merge;
pub mod substitute;

pub use merge::{merge_into, merge_into_tracked};
pub use substitute::{substitute_variables, Substituter};

/// Convenient result alias that reuses the shared Checkmate error type.
pub type Result<T> = checkmate_core::Result<T>;
