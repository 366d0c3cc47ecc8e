// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell recycling keyed by reuse tag.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Names the family of interchangeable cells an item draws from.
///
/// Items whose cells look alike share a tag; a cell released by one of them can
/// be handed to any other item with the same tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReuseTag(Cow<'static, str>);

impl ReuseTag {
    /// The tag used when a data source does not distinguish cell kinds.
    pub const DEFAULT: Self = Self::from_static("cell");

    /// Create a tag from a static string.
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Create a tag from any string.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReuseTag {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&'static str> for ReuseTag {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl From<String> for ReuseTag {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

impl fmt::Display for ReuseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a cell instance in a [`CellPool`].
///
/// Ids are dense and stable for the life of the pool; hosts use them to key
/// their own visuals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);

impl CellId {
    /// The id as a dense index, suitable for indexing a host-side `Vec`.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellState {
    /// Parked in the pool, available to [`CellPool::acquire`].
    Free,
    /// Handed out by [`CellPool::acquire`] but not yet bound.
    Acquired,
    /// Showing the item at this index.
    Bound(usize),
}

/// A recyclable cell owned by a [`CellPool`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellHandle {
    id: CellId,
    reuse_tag: ReuseTag,
    state: CellState,
}

impl CellHandle {
    /// The cell's identifier.
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// The family this cell belongs to.
    pub const fn reuse_tag(&self) -> &ReuseTag {
        &self.reuse_tag
    }

    /// The cell's lifecycle state.
    pub const fn state(&self) -> CellState {
        self.state
    }

    /// Index the cell is bound to, if any.
    pub const fn bound_index(&self) -> Option<usize> {
        match self.state {
            CellState::Bound(index) => Some(index),
            _ => None,
        }
    }

    /// Returns `true` if the cell is parked in the pool.
    pub const fn is_free(&self) -> bool {
        matches!(self.state, CellState::Free)
    }
}

/// Recycles cells per [`ReuseTag`].
///
/// Cells move `Free → Acquired → Bound(index) → Free`. A cell leaves its tag's
/// free list when acquired and only returns on [`CellPool::release`], so it can
/// never be handed out while it still shows another item.
///
/// The pool only grows: released cells are parked, not destroyed, until
/// [`CellPool::drain_all`] at teardown.
#[derive(Clone, Debug, Default)]
pub struct CellPool {
    cells: Vec<CellHandle>,
    free: HashMap<ReuseTag, SmallVec<[CellId; 4]>>,
}

impl CellPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a free cell with the given tag, creating one if none is parked.
    ///
    /// The most recently released cell is reused first. The returned cell is in
    /// the [`CellState::Acquired`] state.
    pub fn acquire(&mut self, tag: &ReuseTag) -> CellId {
        if let Some(id) = self.free.get_mut(tag).and_then(SmallVec::pop) {
            self.cells[id.index()].state = CellState::Acquired;
            return id;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "CellId uses 32-bit indices by design."
        )]
        let id = CellId(self.cells.len() as u32);
        self.cells.push(CellHandle {
            id,
            reuse_tag: tag.clone(),
            state: CellState::Acquired,
        });
        tracing::trace!(cell = id.0, tag = %tag, total = self.cells.len(), "created cell");
        id
    }

    /// Bind an acquired cell to `index`.
    ///
    /// Returns `false`, leaving the pool unchanged, if `id` is unknown or the
    /// cell is not in the [`CellState::Acquired`] state.
    pub fn bind(&mut self, id: CellId, index: usize) -> bool {
        match self.cells.get_mut(id.index()) {
            Some(cell) if cell.state == CellState::Acquired => {
                cell.state = CellState::Bound(index);
                true
            }
            _ => false,
        }
    }

    /// Return a cell to its tag's free list.
    ///
    /// Releasing a cell that is already free (or unknown) does nothing and
    /// returns `false`.
    pub fn release(&mut self, id: CellId) -> bool {
        let Some(cell) = self.cells.get_mut(id.index()) else {
            return false;
        };
        if cell.is_free() {
            return false;
        }
        cell.state = CellState::Free;
        self.free
            .entry(cell.reuse_tag.clone())
            .or_default()
            .push(id);
        true
    }

    /// Remove every cell from the pool and hand them back to the caller.
    ///
    /// Used at teardown so the host can destroy its visuals. Ids restart from
    /// zero afterwards.
    pub fn drain_all(&mut self) -> Vec<CellHandle> {
        self.free.clear();
        core::mem::take(&mut self.cells)
    }

    /// Look up a cell.
    pub fn get(&self, id: CellId) -> Option<&CellHandle> {
        self.cells.get(id.index())
    }

    /// All cells, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CellHandle> {
        self.cells.iter()
    }

    /// Total number of cells ever created (and not drained).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the pool holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of parked cells with the given tag.
    pub fn free_count(&self, tag: &ReuseTag) -> usize {
        self.free.get(tag).map_or(0, SmallVec::len)
    }

    /// Number of cells currently bound to an index.
    pub fn bound_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.bound_index().is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellPool, CellState, ReuseTag};

    #[test]
    fn acquire_creates_then_reuses_released_cells() {
        let mut pool = CellPool::new();
        let tag = ReuseTag::DEFAULT;
        let a = pool.acquire(&tag);
        let b = pool.acquire(&tag);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);

        assert!(pool.bind(a, 0));
        assert!(pool.release(a));
        assert_eq!(pool.free_count(&tag), 1);

        // The released cell comes back instead of a new allocation.
        assert_eq!(pool.acquire(&tag), a);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.free_count(&tag), 0);
    }

    #[test]
    fn tags_keep_separate_free_lists() {
        let mut pool = CellPool::new();
        let photo = ReuseTag::from_static("photo");
        let text = ReuseTag::from(alloc::string::String::from("text"));
        let p = pool.acquire(&photo);
        pool.release(p);

        let t = pool.acquire(&text);
        assert_ne!(t, p, "a text cell must not reuse a photo cell");
        assert_eq!(pool.get(t).map(|c| c.reuse_tag().as_str()), Some("text"));
        assert_eq!(pool.free_count(&photo), 1);
    }

    #[test]
    fn bound_cells_are_never_reacquired() {
        let mut pool = CellPool::new();
        let tag = ReuseTag::DEFAULT;
        let a = pool.acquire(&tag);
        pool.bind(a, 7);
        for _ in 0..4 {
            assert_ne!(pool.acquire(&tag), a);
        }
        assert_eq!(pool.get(a).and_then(|c| c.bound_index()), Some(7));
    }

    #[test]
    fn bind_requires_acquired_state() {
        let mut pool = CellPool::new();
        let a = pool.acquire(&ReuseTag::DEFAULT);
        assert!(pool.bind(a, 1));
        // Already bound: a second bind would double-bind the cell.
        assert!(!pool.bind(a, 2));
        assert_eq!(pool.get(a).map(|c| c.state()), Some(CellState::Bound(1)));

        pool.release(a);
        assert!(!pool.bind(a, 3), "free cells must be acquired first");
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = CellPool::new();
        let tag = ReuseTag::DEFAULT;
        let a = pool.acquire(&tag);
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.free_count(&tag), 1);
    }

    #[test]
    fn drain_all_empties_the_pool() {
        let mut pool = CellPool::new();
        let a = pool.acquire(&ReuseTag::DEFAULT);
        pool.bind(a, 0);
        pool.acquire(&ReuseTag::DEFAULT);
        assert_eq!(pool.bound_count(), 1);

        let drained = pool.drain_all();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty());
        assert_eq!(pool.free_count(&ReuseTag::DEFAULT), 0);
    }
}
