// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the view consumes and exposes, plus an in-memory item store.

use alloc::vec::Vec;
use core::fmt;

use crate::{CellHandle, CollectionError, ReuseTag};

/// Read-only access to the items a collection view presents.
///
/// The view assumes the count does not change between two calls unless the host
/// announces the change (through `reload_data`, `insert_item_at_end`, and
/// friends on [`CollectionView`](crate::CollectionView)).
pub trait DataSource {
    /// Content handed to the cell configurator when an item is bound.
    type Content;

    /// Number of items.
    fn item_count(&self) -> usize;

    /// Content of the item at `index`, or `None` if `index` is out of range.
    fn content(&self, index: usize) -> Option<Self::Content>;

    /// Reuse tag for the item at `index`.
    ///
    /// Defaults to [`ReuseTag::DEFAULT`], i.e. every item shares one cell kind.
    fn reuse_tag(&self, index: usize) -> ReuseTag {
        let _ = index;
        ReuseTag::DEFAULT
    }
}

/// Renders item content into cells.
///
/// Called by the view whenever a cell is bound to an item. Any
/// `FnMut(&CellHandle, C)` closure is a `CellConfigurator<C>`.
pub trait CellConfigurator<C> {
    /// Show `content` in `cell`.
    fn configure(&mut self, cell: &CellHandle, content: C);

    /// Called just before `cell` is unbound and parked in the pool.
    ///
    /// The handle still reports the index it was showing.
    fn prepare_for_reuse(&mut self, cell: &CellHandle) {
        let _ = cell;
    }
}

impl<C, F> CellConfigurator<C> for F
where
    F: FnMut(&CellHandle, C),
{
    fn configure(&mut self, cell: &CellHandle, content: C) {
        self(cell, content);
    }
}

/// An ordered, in-memory item list implementing [`DataSource`].
///
/// Content is cloned out on every bind, so `T` is typically cheap to clone
/// (a label, an `Arc`, an id into host storage).
#[derive(Clone)]
pub struct ItemStore<T> {
    items: Vec<T>,
    tagger: Option<fn(&T) -> ReuseTag>,
}

impl<T> Default for ItemStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            tagger: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ItemStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemStore")
            .field("items", &self.items)
            .field("tagged", &self.tagger.is_some())
            .finish()
    }
}

impl<T> ItemStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `items`.
    pub fn from_items(items: impl Into<Vec<T>>) -> Self {
        Self {
            items: items.into(),
            tagger: None,
        }
    }

    /// Derive each item's reuse tag from its content.
    pub fn with_reuse_tags(mut self, tagger: fn(&T) -> ReuseTag) -> Self {
        self.tagger = Some(tagger);
        self
    }

    /// Append an item.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Insert an item at `index`, shifting later items.
    ///
    /// Fails if `index > len`.
    pub fn insert(&mut self, index: usize, item: T) -> Result<(), CollectionError> {
        if index > self.items.len() {
            return Err(CollectionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, item);
        Ok(())
    }

    /// Remove and return the item at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Items as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for ItemStore<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_items(items)
    }
}

impl<T: Clone> DataSource for ItemStore<T> {
    type Content = T;

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn content(&self, index: usize) -> Option<T> {
        self.items.get(index).cloned()
    }

    fn reuse_tag(&self, index: usize) -> ReuseTag {
        match (self.tagger, self.items.get(index)) {
            (Some(tagger), Some(item)) => tagger(item),
            _ => ReuseTag::DEFAULT,
        }
    }
}
