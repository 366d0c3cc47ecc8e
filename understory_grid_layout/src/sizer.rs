// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The sizing capability consulted during layout.

use kurbo::Size;

/// Supplies the size of each item, by index.
///
/// This is the "layout delegate" of a collection view. Sizes may differ per
/// index. Methods take `&mut self` so implementations are free to memoize
/// measurements without exposing interior mutability at the call site.
///
/// Any `FnMut(usize) -> Size` closure is an `ItemSizer`:
///
/// ```rust
/// use kurbo::Size;
/// use understory_grid_layout::ItemSizer;
///
/// let mut uniform = |_index: usize| Size::new(60.0, 60.0);
/// assert_eq!(uniform.size_for_item(3), Size::new(60.0, 60.0));
/// ```
pub trait ItemSizer {
    /// Size of the item at `index`.
    ///
    /// Implementations must return finite sizes. Negative components are
    /// clamped to zero by the layout engine.
    fn size_for_item(&mut self, index: usize) -> Size;
}

impl<F> ItemSizer for F
where
    F: FnMut(usize) -> Size,
{
    fn size_for_item(&mut self, index: usize) -> Size {
        self(index)
    }
}

/// Query `sizer` and normalize the result.
pub(crate) fn measure<S: ItemSizer + ?Sized>(sizer: &mut S, index: usize) -> Size {
    let size = sizer.size_for_item(index);
    debug_assert!(
        size.is_finite(),
        "ItemSizer returned a non-finite size for item {index}: {size:?}"
    );
    Size::new(size.width.max(0.0), size.height.max(0.0))
}
