//! # sr-core
//!
//! Core data model for the symreg expression engine.
//!
//! Provides:
//! - [`NodeKind`]/[`Node`]: the closed operator registry and the per-node record
//! - [`Tree`]: a postorder-encoded expression tree with O(1) sibling traversal
//! - [`Dataset`]: a column-oriented numeric table indexed by variable hash
//! - [`Range`]: a half-open row interval into a dataset
//!
//! Evaluation itself lives in `sr-eval`; this crate only owns the immutable
//! inputs it consumes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dataset;
pub mod error;
pub mod hash;
pub mod node;
pub mod range;
pub mod tree;

pub use dataset::{variable_hash, Dataset};
pub use error::{Error, Result};
pub use hash::HashMode;
pub use node::{Node, NodeKind};
pub use range::Range;
pub use tree::Tree;

/// Primal scalar precision, fixed at build time.
#[cfg(feature = "single-precision")]
pub type Float = f32;

/// Primal scalar precision, fixed at build time.
#[cfg(not(feature = "single-precision"))]
pub type Float = f64;
