//! Column-oriented numeric tables (Structure-of-Arrays).
//!
//! Variable nodes reference a column by its 64-bit name hash; the evaluator
//! asks for a contiguous slice of that column over a row range. How the
//! columns got here (CSV, arrow, bindings) is a concern of the layers above
//! the core.

use crate::error::{Error, Result};
use crate::range::Range;
use crate::Float;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::Hasher;

/// Hash of a variable name, as stored in `Node::hash` for variable leaves.
pub fn variable_hash(name: &str) -> u64 {
    let mut h = FxHasher::default();
    h.write(name.as_bytes());
    h.finish()
}

/// A column-oriented numeric table indexed by variable hash.
#[derive(Debug, Clone)]
pub struct Dataset {
    names: Vec<String>,
    hashes: Vec<u64>,
    columns: Vec<Vec<Float>>,
    by_hash: FxHashMap<u64, usize>,
    n_rows: usize,
}

impl Dataset {
    /// Create a dataset from named columns.
    ///
    /// Requires at least one column; all columns must have equal length and
    /// distinct, non-empty names.
    pub fn from_columns(columns: impl IntoIterator<Item = (String, Vec<Float>)>) -> Result<Self> {
        let mut names = Vec::new();
        let mut hashes = Vec::new();
        let mut cols = Vec::new();
        let mut by_hash = FxHashMap::default();

        let mut n_rows: Option<usize> = None;
        for (name, col) in columns {
            if name.is_empty() {
                return Err(Error::Validation("dataset column with empty name".into()));
            }
            match n_rows {
                Some(n) if n != col.len() => {
                    return Err(Error::Validation(format!(
                        "column length mismatch for '{name}': expected {n}, got {}",
                        col.len()
                    )));
                }
                None => n_rows = Some(col.len()),
                _ => {}
            }
            let hash = variable_hash(&name);
            if by_hash.insert(hash, cols.len()).is_some() {
                return Err(Error::Validation(format!("duplicate dataset column '{name}'")));
            }
            names.push(name);
            hashes.push(hash);
            cols.push(col);
        }

        let n_rows = match n_rows {
            Some(n) => n,
            None => return Err(Error::Validation("dataset requires at least one column".into())),
        };

        Ok(Dataset { names, hashes, columns: cols, by_hash, n_rows })
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// The `(name, hash)` pairs of all columns, in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, u64)> {
        self.names.iter().map(String::as_str).zip(self.hashes.iter().copied())
    }

    /// Hash of a column by name, if present.
    pub fn hash_of(&self, name: &str) -> Option<u64> {
        let hash = variable_hash(name);
        self.by_hash.contains_key(&hash).then_some(hash)
    }

    /// Full column for a variable hash.
    pub fn values(&self, hash: u64) -> Result<&[Float]> {
        let idx = self
            .by_hash
            .get(&hash)
            .ok_or_else(|| Error::Validation(format!("unknown variable hash {hash:#x}")))?;
        Ok(&self.columns[*idx])
    }

    /// Contiguous slice of a column over `[range.start, range.end)`.
    ///
    /// The returned slice has exactly `range.size()` elements.
    pub fn values_range(&self, hash: u64, range: Range) -> Result<&[Float]> {
        if range.start > range.end || range.end > self.n_rows {
            return Err(Error::Validation(format!(
                "row range [{}, {}) outside dataset with {} rows",
                range.start, range.end, self.n_rows
            )));
        }
        let values = self.values(hash)?;
        Ok(&values[range.start..range.end])
    }
}
