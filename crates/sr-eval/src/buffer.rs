//! The per-call working buffer: one column per node, one cell per row of
//! the current block, column-major in a single flat allocation.

use sr_ad::Scalar;

/// Row-block width for primal scalars.
///
/// Chosen so a column of one block fits in vector registers / L1 regardless
/// of the dataset's row count; a 100-node tree at this width occupies
/// ~100 × 64 × 8 bytes ≈ 50 KB of working set in double precision.
pub const BATCH_SIZE: usize = 64;

/// Row-block width for a given scalar type.
///
/// A dual cell occupies `1 + D` primal lanes, so the dual path narrows its
/// blocks to keep the same cache budget per column.
#[inline]
pub fn batch_width<T: Scalar>() -> usize {
    (BATCH_SIZE / T::LANES).max(1)
}

/// The working matrix of an active evaluation: column `i` holds the partial
/// value of node `i` over the current row block.
pub struct EvalBuffer<T> {
    data: Vec<T>,
    width: usize,
}

impl<T: Scalar> EvalBuffer<T> {
    /// Allocate a buffer with one [`batch_width`]-cell column per node.
    pub fn new(columns: usize) -> Self {
        let width = batch_width::<T>();
        EvalBuffer { data: vec![T::from_float(0.0); columns * width], width }
    }

    /// Cells per column.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Column `i`, immutable.
    #[inline]
    pub fn col(&self, i: usize) -> &[T] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    /// Column `i`, mutable.
    #[inline]
    pub fn col_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.width..(i + 1) * self.width]
    }

    /// Split into (all columns before `parent`, the `parent` column).
    ///
    /// In a postorder tree every child index is smaller than its parent's,
    /// so the first half contains every operand a kernel may read while the
    /// second is its write target.
    #[inline]
    pub fn split_at_parent(&mut self, parent: usize) -> (&[T], &mut [T]) {
        let width = self.width;
        let (head, tail) = self.data.split_at_mut(parent * width);
        (head, &mut tail[..width])
    }
}
