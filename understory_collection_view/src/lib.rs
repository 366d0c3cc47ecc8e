// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_collection_view --heading-base-level=0

//! Understory Collection View: a virtualized grid of reusable cells.
//!
//! This crate ties a data source, a sizing policy, and a pool of recyclable cells
//! to the shelf-packing layout from [`understory_grid_layout`]. It decides which
//! items intersect the viewport, hands out cells for them, and takes cells back
//! when items scroll away, so a host only ever materializes the visible slice of
//! a large collection.
//!
//! The pieces are:
//!
//! - [`DataSource`]: the query-only capability the view reads item counts and
//!   content through. [`ItemStore`] is a ready-made in-memory implementation.
//! - [`ItemSizer`]: the sizing capability ("layout delegate") re-exported from
//!   [`understory_grid_layout`].
//! - [`CellConfigurator`]: the callback the host implements to render an item's
//!   content into a cell. Cells are identified by [`CellId`] and grouped by
//!   [`ReuseTag`]; the host keeps its own visuals keyed by `CellId`.
//! - [`CellPool`]: recycles [`CellHandle`]s per reuse tag. It never shrinks
//!   within a session.
//! - [`VisibleSet`]: which indices are currently bound to which cells.
//! - [`CollectionView`]: owns all of the above plus the current
//!   [`LayoutSnapshot`], and exposes reload, insert/remove, scrolling, and
//!   hit-testing operations.
//!
//! Capabilities are injected, not inherited: a cell variant is just a reuse tag
//! plus whatever the configurator does for it.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_collection_view::{CellHandle, CollectionView, ItemStore};
//!
//! let mut view = CollectionView::new(Size::new(300.0, 200.0))
//!     .with_data_source(ItemStore::from_items(vec!["a", "b", "c"]))
//!     .with_layout_delegate(|_index: usize| Size::new(100.0, 100.0))
//!     .with_cell_configurator(|cell: &CellHandle, label: &'static str| {
//!         // Render `label` into the host's visual for `cell.id()`.
//!         let _ = (cell.id(), label);
//!     });
//! view.reload_data().unwrap();
//! assert_eq!(view.visible_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
//!
//! // The "add item" action: grow the store, then announce the append.
//! view.data_source_mut().unwrap().push("d");
//! view.insert_item_at_end().unwrap();
//! assert!(view.is_item_bound(3));
//!
//! // Scrolling past the first row returns its cells to the pool.
//! view.set_scroll_offset(Point::new(0.0, 150.0));
//! assert!(!view.is_item_bound(0));
//! ```
//!
//! ## Errors and state
//!
//! Configuration failures ([`CollectionError::MissingLayoutDelegate`],
//! [`CollectionError::InvalidLayoutBounds`]) are returned to the caller and leave
//! the previous layout, item count, and bound cells untouched. Stale bookkeeping
//! found while recomputing visibility (a bound index the data source no longer
//! has) is logged through [`tracing`] and dropped, so the view degrades to a
//! missing cell instead of taking the host down.
//!
//! ## Threading
//!
//! Every mutating operation takes `&mut self`: layout, visible set, and pool
//! change together as one unit. Hosts that drive a view from several threads
//! should put the whole view behind a single lock. Injected capabilities
//! must be `Send`, so `CollectionView<D>` is `Send` whenever `D` is.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod pool;
mod source;
mod view;
mod visible;

pub use error::CollectionError;
pub use pool::{CellHandle, CellId, CellPool, CellState, ReuseTag};
pub use source::{CellConfigurator, DataSource, ItemStore};
pub use view::{CollectionView, ScrollAlign};
pub use visible::VisibleSet;

pub use understory_grid_layout::{GridLayoutConfig, ItemSizer, LayoutSnapshot};
