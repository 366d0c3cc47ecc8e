// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_grid_layout --heading-base-level=0

//! Understory Grid Layout: a shelf-packing grid engine for virtualized collections.
//!
//! This crate computes per-item frames for a dense strip of items indexed `0..len`
//! laid out as a row-major grid whose cells may have different sizes. It is the
//! geometry half of a reusable-cell collection view: host frameworks feed it an
//! item count and a sizing policy, and get back an immutable [`LayoutSnapshot`]
//! they can query for visible items, hit testing, and content size.
//!
//! The core concepts are:
//!
//! - [`ItemSizer`]: the sizing capability (a "layout delegate"). Any
//!   `FnMut(usize) -> Size` closure works.
//! - [`GridLayoutConfig`]: spacing between items and rows plus content insets.
//! - [`compute_layout`]: a full layout pass producing a [`LayoutSnapshot`].
//! - [`LayoutSnapshot::append_one`]: the append fast path. It resumes the packing
//!   cursor stored in the snapshot, so appending is amortized O(1) and always
//!   yields exactly what a full [`compute_layout`] over `len + 1` items would.
//! - [`LayoutSnapshot::insert_at`] / [`LayoutSnapshot::remove_at`]: arbitrary edits.
//!   Packing restarts one row above the edited row (an edit can pull items back
//!   into it) and re-packs everything after, since one edit can reflow every
//!   later row. Earlier rows are kept as they are.
//! - [`LayoutSnapshot::indices_in_rect`] and [`LayoutSnapshot::index_at_point`]:
//!   visibility and hit-test queries over the packed rows.
//!
//! ## Packing rules
//!
//! Items are packed left to right. When the next item's right edge would pass
//! the usable width, the current row closes and a new row starts below the
//! tallest item of the row just completed. An item wider than the container still
//! gets a row of its own; it is never truncated. Items are top-aligned in their row.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_grid_layout::{GridLayoutConfig, compute_layout};
//!
//! let widths = [100.0, 150.0, 80.0];
//! let mut sizer = |i: usize| Size::new(widths[i], 50.0);
//!
//! let layout = compute_layout(3, &mut sizer, 300.0, &GridLayoutConfig::default()).unwrap();
//! assert_eq!(layout.rows().len(), 2);
//! assert_eq!(layout.content_size(), Size::new(300.0, 100.0));
//! assert_eq!(layout.frame_of(2), Some(Rect::new(0.0, 50.0, 80.0, 100.0)));
//!
//! // Appending resumes from the stored cursor instead of starting over.
//! let widths = [100.0, 150.0, 80.0, 120.0];
//! let mut sizer = |i: usize| Size::new(widths[i], 50.0);
//! let layout = layout.append_one(&mut sizer);
//! assert_eq!(layout.frame_of(3), Some(Rect::new(80.0, 50.0, 200.0, 100.0)));
//! ```
//!
//! All geometry is in a caller-chosen coordinate space (typically logical pixels),
//! using [`kurbo`] types. Sizes are expected to be finite; negative components
//! are clamped to zero.
//!
//! ## Features
//!
//! - `std` *(default)*: enables `kurbo/std`.
//! - `libm`: enables `kurbo/libm` for `no_std` targets.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod cursor;
mod error;
mod sizer;
mod snapshot;

pub use config::GridLayoutConfig;
pub use error::LayoutError;
pub use sizer::ItemSizer;
pub use snapshot::{ItemGeometry, LayoutRow, LayoutSnapshot, compute_layout};
