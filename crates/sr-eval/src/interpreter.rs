//! The row-blocked primal interpreter.
//!
//! One call does a single setup sweep over the nodes (dataset column
//! resolution, effective-parameter selection, constant preload, kernel
//! lookup), then walks the tree once per row block of up to
//! [`BATCH_SIZE`](crate::BATCH_SIZE) rows. Blocking keeps every per-node
//! working column in L1/L2 no matter how many rows the range covers, and
//! gives the kernels fixed-width loops to vectorize.

use crate::buffer::EvalBuffer;
use crate::dispatch::{DispatchTable, Kernel};
use sr_ad::Scalar;
use sr_core::{Dataset, Error, Float, NodeKind, Range, Result, Tree};

/// Evaluates postorder trees over dataset ranges on scalar `T`.
pub struct Interpreter<T: Scalar = Float> {
    table: DispatchTable<T>,
}

struct NodeState<'a, T> {
    param: T,
    column: Option<&'a [Float]>,
    kernel: Option<Kernel<T>>,
}

impl<T: Scalar> Interpreter<T> {
    /// An interpreter with the built-in dispatch table.
    pub fn new() -> Self {
        Interpreter { table: DispatchTable::new() }
    }

    /// An interpreter with a caller-provided dispatch table (custom or
    /// extended kernel sets).
    pub fn with_table(table: DispatchTable<T>) -> Self {
        Interpreter { table }
    }

    /// The dispatch table.
    pub fn dispatch_table(&self) -> &DispatchTable<T> {
        &self.table
    }

    /// Mutable access to the dispatch table, e.g. to register `Dynamic`
    /// kernels.
    pub fn dispatch_table_mut(&mut self) -> &mut DispatchTable<T> {
        &mut self.table
    }

    /// Evaluate a tree over `[range.start, range.end)` and return one value
    /// per row.
    ///
    /// When `parameters` is given, its entries replace the values of the
    /// tree's `optimize`-marked leaves, consumed in postorder.
    pub fn evaluate(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        range: Range,
        parameters: Option<&[T]>,
    ) -> Result<Vec<T>> {
        let mut result = vec![T::from_float(0.0); range.size()];
        self.evaluate_into(tree, dataset, range, &mut result, parameters)?;
        Ok(result)
    }

    /// Like [`evaluate`](Self::evaluate), but tiles the range into
    /// `batch_size`-row sub-ranges evaluated independently. Output is
    /// identical; the tiling only bounds the lifetime of intermediate
    /// state per tile.
    pub fn evaluate_batched(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        range: Range,
        batch_size: usize,
        parameters: Option<&[T]>,
    ) -> Result<Vec<T>> {
        if batch_size == 0 {
            return Err(Error::Validation("batch size must be positive".into()));
        }
        if tree.is_empty() {
            return Err(Error::Validation("cannot evaluate an empty tree".into()));
        }
        let mut result = vec![T::from_float(0.0); range.size()];
        let mut start = range.start;
        let mut offset = 0;
        while start < range.end {
            let end = range.end.min(start + batch_size);
            let tile = Range::new(start, end);
            self.evaluate_into(
                tree,
                dataset,
                tile,
                &mut result[offset..offset + tile.size()],
                parameters,
            )?;
            offset += tile.size();
            start = end;
        }
        Ok(result)
    }

    /// Evaluate a tree into a caller-supplied span of exactly
    /// `range.size()` values.
    ///
    /// Contract violations (empty tree, mis-sized span, range outside the
    /// dataset, unknown variable hash, missing kernel, parameter count
    /// mismatch) return [`Error::Validation`]. Numeric conditions are not
    /// trapped: NaN and infinity propagate into the output.
    pub fn evaluate_into(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        range: Range,
        result: &mut [T],
        parameters: Option<&[T]>,
    ) -> Result<()> {
        let nodes = tree.nodes();
        if nodes.is_empty() {
            return Err(Error::Validation("cannot evaluate an empty tree".into()));
        }
        if result.len() != range.size() {
            return Err(Error::Validation(format!(
                "output span has {} rows, range covers {}",
                result.len(),
                range.size()
            )));
        }
        if range.start > range.end || range.end > dataset.n_rows() {
            return Err(Error::Validation(format!(
                "row range [{}, {}) outside dataset with {} rows",
                range.start,
                range.end,
                dataset.n_rows()
            )));
        }

        // Per-node setup, once per call.
        let mut states: Vec<NodeState<'_, T>> = Vec::with_capacity(nodes.len());
        let mut next_param = 0usize;
        for (i, node) in nodes.iter().enumerate() {
            let column =
                if node.is_variable() { Some(dataset.values_range(node.hash, range)?) } else { None };
            let param = match parameters {
                Some(p) if node.optimize => {
                    let value = p.get(next_param).copied().ok_or_else(|| {
                        Error::Validation(format!(
                            "parameter vector too short: {} values for {} optimizable leaves",
                            p.len(),
                            tree.coefficient_count()
                        ))
                    })?;
                    next_param += 1;
                    value
                }
                _ => T::from_float(node.value),
            };
            let kernel = self.table.try_get(node.kind).cloned();
            if kernel.is_none() && (!node.is_leaf() || node.kind == NodeKind::Dynamic) {
                return Err(Error::Validation(format!(
                    "no kernel registered for node {i} ('{}')",
                    node.kind
                )));
            }
            states.push(NodeState { param, column, kernel });
        }
        if let Some(p) = parameters {
            if next_param != p.len() {
                return Err(Error::Validation(format!(
                    "parameter vector too long: {} values for {next_param} optimizable leaves",
                    p.len()
                )));
            }
        }

        // Constant columns never change across row blocks.
        let mut buf = EvalBuffer::<T>::new(nodes.len());
        for (i, (node, state)) in nodes.iter().zip(&states).enumerate() {
            if node.is_constant() {
                buf.col_mut(i).fill(state.param);
            }
        }

        // Row-block loop.
        let width = buf.width();
        let total = range.size();
        let root = nodes.len() - 1;
        let mut row = 0;
        while row < total {
            let m = width.min(total - row);
            for (i, state) in states.iter().enumerate() {
                if let Some(column) = state.column {
                    let src = &column[row..row + m];
                    let dst = buf.col_mut(i);
                    for (d, &s) in dst[..m].iter_mut().zip(src) {
                        *d = state.param * T::from_float(s);
                    }
                } else if let Some(kernel) = state.kernel.as_deref() {
                    kernel(&mut buf, nodes, i, m);
                }
            }
            result[row..row + m].copy_from_slice(&buf.col(root)[..m]);
            row += m;
        }
        Ok(())
    }
}

impl<T: Scalar> Default for Interpreter<T> {
    fn default() -> Self {
        Self::new()
    }
}
