//! # sr-ad
//!
//! Forward-mode automatic differentiation for the symreg engine.
//!
//! Provides:
//! - [`Dual`]: a dual number with a compile-time number of derivative lanes,
//!   sized so one evaluation sweep differentiates several coefficients at once
//! - [`Scalar`]: the trait the batched kernels and the interpreter are
//!   generic over, implemented for `f64`, `f32`, and [`Dual`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dual;
pub mod scalar;

pub use dual::{Dual, Dual4, Dual8};
pub use scalar::Scalar;
