//! The (node kind, scalar type) → kernel mapping.
//!
//! The table is generic over the working scalar, so the set of scalar
//! types the engine supports is expressed by instantiating one table per
//! scalar (at minimum the primal float and the dual). Keys are the stable
//! [`NodeKind::index`] values; leaves always map to nothing.

use crate::buffer::EvalBuffer;
use crate::kernels;
use sr_ad::Scalar;
use sr_core::{Error, Node, NodeKind, Result};
use std::sync::Arc;

/// A batched kernel: `(work buffer, nodes, parent index, row-block width)`.
pub type Kernel<T> = Arc<dyn Fn(&mut EvalBuffer<T>, &[Node], usize, usize) + Send + Sync>;

/// Mapping from node kind to the kernel evaluating it on scalar `T`.
#[derive(Clone)]
pub struct DispatchTable<T: Scalar> {
    kernels: [Option<Kernel<T>>; NodeKind::COUNT],
}

impl<T: Scalar> DispatchTable<T> {
    /// A table with every built-in operator kernel registered.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.set(NodeKind::Add, Arc::new(kernels::add::<T>));
        table.set(NodeKind::Mul, Arc::new(kernels::mul::<T>));
        table.set(NodeKind::Sub, Arc::new(kernels::sub::<T>));
        table.set(NodeKind::Div, Arc::new(kernels::div::<T>));
        table.set(NodeKind::Aq, Arc::new(kernels::aq::<T>));
        table.set(NodeKind::Fmax, Arc::new(kernels::fmax::<T>));
        table.set(NodeKind::Fmin, Arc::new(kernels::fmin::<T>));
        table.set(NodeKind::Pow, Arc::new(kernels::pow::<T>));
        table.set(NodeKind::Abs, Arc::new(kernels::abs::<T>));
        table.set(NodeKind::Acos, Arc::new(kernels::acos::<T>));
        table.set(NodeKind::Asin, Arc::new(kernels::asin::<T>));
        table.set(NodeKind::Atan, Arc::new(kernels::atan::<T>));
        table.set(NodeKind::Cbrt, Arc::new(kernels::cbrt::<T>));
        table.set(NodeKind::Ceil, Arc::new(kernels::ceil::<T>));
        table.set(NodeKind::Cos, Arc::new(kernels::cos::<T>));
        table.set(NodeKind::Cosh, Arc::new(kernels::cosh::<T>));
        table.set(NodeKind::Exp, Arc::new(kernels::exp::<T>));
        table.set(NodeKind::Floor, Arc::new(kernels::floor::<T>));
        table.set(NodeKind::Log, Arc::new(kernels::log::<T>));
        table.set(NodeKind::Logabs, Arc::new(kernels::logabs::<T>));
        table.set(NodeKind::Log1p, Arc::new(kernels::log1p::<T>));
        table.set(NodeKind::Sin, Arc::new(kernels::sin::<T>));
        table.set(NodeKind::Sinh, Arc::new(kernels::sinh::<T>));
        table.set(NodeKind::Sqrt, Arc::new(kernels::sqrt::<T>));
        table.set(NodeKind::Sqrtabs, Arc::new(kernels::sqrtabs::<T>));
        table.set(NodeKind::Tan, Arc::new(kernels::tan::<T>));
        table.set(NodeKind::Tanh, Arc::new(kernels::tanh::<T>));
        table.set(NodeKind::Square, Arc::new(kernels::square::<T>));
        table
    }

    /// A table with no kernels at all; useful as a base for fully custom
    /// operator sets.
    pub fn empty() -> Self {
        DispatchTable { kernels: std::array::from_fn(|_| None) }
    }

    fn set(&mut self, kind: NodeKind, kernel: Kernel<T>) {
        self.kernels[kind.index()] = Some(kernel);
    }

    /// Install or replace the kernel for an operator kind.
    ///
    /// This is the `Dynamic` extension point; registering a kernel for a
    /// leaf kind (Constant, Variable) is rejected.
    pub fn register(&mut self, kind: NodeKind, kernel: Kernel<T>) -> Result<()> {
        if kind.is_leaf() {
            return Err(Error::Validation(format!(
                "cannot register a kernel for leaf kind '{kind}'"
            )));
        }
        self.set(kind, kernel);
        Ok(())
    }

    /// The kernel for a kind, or `None` (always `None` for leaves and for
    /// unregistered `Dynamic`).
    #[inline]
    pub fn try_get(&self, kind: NodeKind) -> Option<&Kernel<T>> {
        self.kernels[kind.index()].as_ref()
    }

    /// True when a kernel is registered for `kind`.
    pub fn contains(&self, kind: NodeKind) -> bool {
        self.kernels[kind.index()].is_some()
    }
}

impl<T: Scalar> Default for DispatchTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
