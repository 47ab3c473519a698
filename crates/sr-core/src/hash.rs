//! Structural hashing of expression trees.
//!
//! One postorder sweep fills every node's `calculated_hash` with a hash of
//! the subtree rooted there. Child hashes of commutative operators are
//! sorted before combining, so `x + y` and `y + x` collide. Evaluation
//! never reads these hashes; they exist for subtree deduplication and
//! tree-distance analyses layered on top of the core.

use crate::tree::{children, Tree};
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Controls whether leaf values participate in the structural hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashMode {
    /// Leaf values (constants, variable weights) are folded in; trees that
    /// differ only in a coefficient hash differently.
    Strict,
    /// Structure and identity only; coefficient changes do not affect the
    /// hash.
    Relaxed,
}

impl Tree {
    /// Fill `calculated_hash` for every node.
    pub fn hash(&mut self, mode: HashMode) {
        let n = self.len();
        let mut child_hashes: Vec<u64> = Vec::new();
        for i in 0..n {
            let node = self.nodes()[i];
            let hashed = if node.arity == 0 {
                let mut h = FxHasher::default();
                h.write_u64(node.hash);
                if mode == HashMode::Strict {
                    h.write_u64(u64::from(node.value.to_bits()));
                }
                h.finish()
            } else {
                child_hashes.clear();
                child_hashes
                    .extend(children(self.nodes(), i).map(|c| self.nodes()[c].calculated_hash));
                if node.kind.is_commutative() {
                    child_hashes.sort_unstable();
                }
                let mut h = FxHasher::default();
                h.write_u64(node.hash);
                for &ch in &child_hashes {
                    h.write_u64(ch);
                }
                h.finish()
            };
            self.set_calculated_hash(i, hashed);
        }
    }
}
