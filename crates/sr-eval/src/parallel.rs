//! Parallel evaluation of many trees over the same dataset range.
//!
//! One rayon task per tree; the output buffer is partitioned row-major so
//! tasks never alias. Inputs are immutable and the interpreter is shared,
//! so no locking is involved.

use crate::interpreter::Interpreter;
use rayon::prelude::*;
use sr_core::{Dataset, Error, Float, Range, Result, Tree};

/// Evaluate every tree over `[range.start, range.end)`, returning one row
/// vector per tree.
///
/// `n_threads == 0` uses the global rayon pool; otherwise the work runs on
/// a dedicated pool of the given size.
pub fn evaluate_trees(
    trees: &[Tree],
    dataset: &Dataset,
    range: Range,
    n_threads: usize,
) -> Result<Vec<Vec<Float>>> {
    let rows = range.size();
    let mut flat: Vec<Float> = vec![0.0; trees.len() * rows];
    evaluate_trees_into(trees, dataset, range, &mut flat, n_threads)?;
    if rows == 0 {
        return Ok(vec![Vec::new(); trees.len()]);
    }
    Ok(flat.chunks(rows).map(<[Float]>::to_vec).collect())
}

/// Evaluate every tree into a row-major `trees.len() x range.size()`
/// buffer.
///
/// Tasks are independent; the first error wins and there is no
/// cancellation beyond abandoning the call.
pub fn evaluate_trees_into(
    trees: &[Tree],
    dataset: &Dataset,
    range: Range,
    results: &mut [Float],
    n_threads: usize,
) -> Result<()> {
    let rows = range.size();
    if results.len() != trees.len() * rows {
        return Err(Error::Validation(format!(
            "output buffer has {} cells, expected {} trees x {rows} rows",
            results.len(),
            trees.len()
        )));
    }
    if rows == 0 || trees.is_empty() {
        return Ok(());
    }

    let interpreter = Interpreter::<Float>::new();
    let mut evaluate_all = || {
        results
            .par_chunks_mut(rows)
            .zip(trees.par_iter())
            .try_for_each(|(out, tree)| interpreter.evaluate_into(tree, dataset, range, out, None))
    };

    if n_threads == 0 {
        evaluate_all()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| Error::Computation(format!("failed to build thread pool: {e}")))?;
        pool.install(evaluate_all)
    }
}
