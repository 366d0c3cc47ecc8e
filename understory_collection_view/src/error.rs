// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by collection view operations.

use thiserror::Error;
use understory_grid_layout::LayoutError;

/// Failure of a [`CollectionView`](crate::CollectionView) operation.
///
/// None of these leave the view in a partially updated state: the previous
/// layout, item count, and bound cells are kept.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CollectionError {
    /// The viewport width is not positive, or the layout insets leave no room.
    #[error("invalid layout bounds: container width {width} leaves no usable space")]
    InvalidLayoutBounds {
        /// The rejected container width.
        width: f64,
    },
    /// Layout was requested before a sizing delegate was set.
    #[error("layout requested without a layout delegate")]
    MissingLayoutDelegate,
    /// An index outside `0..len` was bound, queried, or edited.
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of items at the time of the call.
        len: usize,
    },
}

impl From<LayoutError> for CollectionError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::InvalidLayoutBounds { width } => Self::InvalidLayoutBounds { width },
            LayoutError::IndexOutOfRange { index, len } => Self::IndexOutOfRange { index, len },
        }
    }
}
