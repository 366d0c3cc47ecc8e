// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by layout operations.

use thiserror::Error;

/// Failure of a layout computation or incremental update.
///
/// A failed operation never touches the snapshot it was called on.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum LayoutError {
    /// The container width is not positive and finite, or the insets leave no
    /// room for items.
    #[error("invalid layout bounds: container width {width} leaves no usable space")]
    InvalidLayoutBounds {
        /// The rejected container width.
        width: f64,
    },
    /// An edit referenced an index outside the snapshot.
    #[error("index {index} out of range for layout of {len} items")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of items in the snapshot.
        len: usize,
    },
}
