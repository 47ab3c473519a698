//! Forward-mode Jacobians of a tree output with respect to its
//! coefficients.
//!
//! The calculator drives the primal interpreter on [`Dual`] values and
//! sweeps the coefficient vector in chunks of `D` seeds, so `ceil(P / D)`
//! passes produce the full `rows x P` Jacobian. `D` trades per-sweep
//! footprint against the number of sweeps; 4 and 8 are the usual choices.

use crate::interpreter::Interpreter;
use nalgebra::DMatrix;
use sr_ad::Dual;
use sr_core::{Dataset, Error, Float, Range, Result, Tree};

/// Memory layout of a caller-supplied Jacobian buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOrder {
    /// Row `r` of the Jacobian is contiguous (matches row-major solvers).
    RowMajor,
    /// Column `i` of the Jacobian is contiguous (matches nalgebra).
    ColMajor,
}

/// Computes Jacobians by chunked dual-number sweeps of the primal engine.
pub struct DerivativeCalculator<const D: usize = 4> {
    interpreter: Interpreter<Dual<D>>,
}

impl<const D: usize> DerivativeCalculator<D> {
    /// A calculator with the built-in dual dispatch table.
    pub fn new() -> Self {
        DerivativeCalculator { interpreter: Interpreter::new() }
    }

    /// A calculator reusing a caller-configured dual interpreter (e.g. one
    /// with `Dynamic` kernels registered).
    pub fn with_interpreter(interpreter: Interpreter<Dual<D>>) -> Self {
        DerivativeCalculator { interpreter }
    }

    /// The underlying dual interpreter.
    pub fn interpreter(&self) -> &Interpreter<Dual<D>> {
        &self.interpreter
    }

    /// Mutable access to the underlying dual interpreter.
    pub fn interpreter_mut(&mut self) -> &mut Interpreter<Dual<D>> {
        &mut self.interpreter
    }

    /// Jacobian of the tree output over `range` with respect to `coeff`,
    /// evaluated at `coeff`. Shape `range.size() x coeff.len()`, returned
    /// as a (column-major) nalgebra matrix.
    pub fn jacobian(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        coeff: &[Float],
        range: Range,
    ) -> Result<DMatrix<Float>> {
        let mut jacobian = DMatrix::<Float>::zeros(range.size(), coeff.len());
        self.jacobian_into(tree, dataset, coeff, range, jacobian.as_mut_slice(), StorageOrder::ColMajor)?;
        Ok(jacobian)
    }

    /// Fill a caller-supplied `range.size() x coeff.len()` buffer with the
    /// Jacobian, in the requested storage order.
    ///
    /// `coeff` must have exactly one entry per `optimize`-marked leaf of
    /// the tree, in postorder.
    pub fn jacobian_into(
        &self,
        tree: &Tree,
        dataset: &Dataset,
        coeff: &[Float],
        range: Range,
        jacobian: &mut [Float],
        order: StorageOrder,
    ) -> Result<()> {
        let rows = range.size();
        let n_coeff = coeff.len();
        if n_coeff != tree.coefficient_count() {
            return Err(Error::Validation(format!(
                "coefficient count mismatch: tree has {} optimizable leaves, got {n_coeff}",
                tree.coefficient_count()
            )));
        }
        if jacobian.len() != rows * n_coeff {
            return Err(Error::Validation(format!(
                "jacobian buffer has {} cells, expected {rows} x {n_coeff}",
                jacobian.len()
            )));
        }
        jacobian.fill(0.0);

        let mut inputs: Vec<Dual<D>> = coeff.iter().map(|&c| Dual::constant(c)).collect();
        let mut outputs = vec![Dual::<D>::constant(0.0); rows];

        // Sweep the coefficients in chunks of D seeds.
        let mut s = 0;
        while s < n_coeff {
            let r = n_coeff.min(s + D);
            for i in s..r {
                inputs[i].eps[i - s] = 1.0;
            }

            self.interpreter.evaluate_into(tree, dataset, range, &mut outputs, Some(&inputs))?;

            match order {
                StorageOrder::ColMajor => {
                    for i in s..r {
                        let column = &mut jacobian[i * rows..(i + 1) * rows];
                        for (row, out) in outputs.iter().enumerate() {
                            column[row] = out.eps[i - s];
                        }
                    }
                }
                StorageOrder::RowMajor => {
                    for (row, out) in outputs.iter().enumerate() {
                        jacobian[row * n_coeff + s..row * n_coeff + r]
                            .copy_from_slice(&out.eps[..r - s]);
                    }
                }
            }

            // Clear the used seeds before the next chunk.
            for i in s..r {
                inputs[i].eps[i - s] = 0.0;
            }
            s = r;
        }
        Ok(())
    }
}

impl<const D: usize> Default for DerivativeCalculator<D> {
    fn default() -> Self {
        Self::new()
    }
}
