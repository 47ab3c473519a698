//! # sr-eval
//!
//! The evaluation engine of the symreg framework.
//!
//! Provides:
//! - [`Interpreter`]: a row-blocked primal evaluator for postorder trees,
//!   generic over the working scalar
//! - [`DispatchTable`]: the (node kind, scalar type) → batched-kernel
//!   mapping, extensible for `Dynamic` nodes
//! - [`DerivativeCalculator`]: forward-mode Jacobians via chunked dual
//!   sweeps reusing the primal engine
//! - [`evaluate_trees`]: a rayon-based driver evaluating many trees over
//!   the same dataset range
//!
//! ## Architecture
//!
//! One tree evaluation is single-threaded: a per-call working buffer holds
//! one column of up to [`BATCH_SIZE`] rows per node, the nodes are walked
//! in postorder per row block, and each inner node's kernel combines its
//! child columns in place. The dual scalar reuses the identical machinery
//! with a narrower block, so the Jacobian path exercises the same kernels
//! the primal path does.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod dispatch;
pub mod interpreter;
pub mod jacobian;
pub mod kernels;
pub mod parallel;

pub use buffer::{batch_width, EvalBuffer, BATCH_SIZE};
pub use dispatch::{DispatchTable, Kernel};
pub use interpreter::Interpreter;
pub use jacobian::{DerivativeCalculator, StorageOrder};
pub use parallel::{evaluate_trees, evaluate_trees_into};
