// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The set of indices currently bound to cells.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::CellId;

/// Indices currently bound to cells, with the cell each one uses.
///
/// Iteration is in ascending index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleSet {
    bound: BTreeMap<usize, CellId>,
}

impl VisibleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound indices.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Returns `true` if `index` is bound.
    pub fn contains(&self, index: usize) -> bool {
        self.bound.contains_key(&index)
    }

    /// The cell bound to `index`.
    pub fn cell_of(&self, index: usize) -> Option<CellId> {
        self.bound.get(&index).copied()
    }

    /// Bound indices, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bound.keys().copied()
    }

    /// `(index, cell)` pairs, ascending by index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, CellId)> + '_ {
        self.bound.iter().map(|(&index, &cell)| (index, cell))
    }

    pub(crate) fn insert(&mut self, index: usize, cell: CellId) {
        let previous = self.bound.insert(index, cell);
        debug_assert!(previous.is_none(), "index {index} was already bound");
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<CellId> {
        self.bound.remove(&index)
    }

    /// Bound indices that are not in `keep`, which must be sorted ascending.
    pub(crate) fn outside(&self, keep: &[usize]) -> Vec<usize> {
        self.indices()
            .filter(|index| keep.binary_search(index).is_err())
            .collect()
    }

    /// Bound indices at or after `from`.
    pub(crate) fn at_or_after(&self, from: usize) -> Vec<usize> {
        self.bound.range(from..).map(|(&index, _)| index).collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::VisibleSet;
    use crate::{CellPool, ReuseTag};

    fn set_with(indices: &[usize]) -> VisibleSet {
        let mut pool = CellPool::new();
        let mut set = VisibleSet::new();
        for &index in indices {
            set.insert(index, pool.acquire(&ReuseTag::DEFAULT));
        }
        set
    }

    #[test]
    fn iterates_in_index_order() {
        let set = set_with(&[9, 2, 5]);
        assert_eq!(set.indices().collect::<Vec<_>>(), vec![2, 5, 9]);
        assert!(set.contains(5));
        assert!(set.cell_of(4).is_none());
    }

    #[test]
    fn diff_helpers() {
        let set = set_with(&[1, 2, 3, 7]);
        assert_eq!(set.outside(&[2, 3, 4]), vec![1, 7]);
        assert_eq!(set.at_or_after(3), vec![3, 7]);
    }
}
