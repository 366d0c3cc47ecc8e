// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shelf-packing cursor shared by full and incremental layout.
//!
//! Both [`compute_layout`](crate::compute_layout) and the incremental paths on
//! [`LayoutSnapshot`](crate::LayoutSnapshot) drive the same cursor, which is what
//! makes an incremental result bit-for-bit equal to a full recompute.

use kurbo::{Point, Rect, Size};

use crate::GridLayoutConfig;

/// Where an item landed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Placement {
    pub(crate) frame: Rect,
    /// The item opened a new row (this includes the very first item).
    pub(crate) new_row: bool,
}

/// Packing state after the most recently placed item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShelfCursor {
    left: f64,
    limit: f64,
    item_spacing: f64,
    line_spacing: f64,
    /// Right edge of the last item in the open row.
    x: f64,
    /// Top of the open row.
    y: f64,
    row_height: f64,
    row_len: usize,
}

impl ShelfCursor {
    /// A cursor positioned before the first item.
    pub(crate) fn new(container_width: f64, config: &GridLayoutConfig) -> Self {
        let left = config.insets.x0;
        Self {
            left,
            limit: container_width - config.insets.x1,
            item_spacing: config.item_spacing.max(0.0),
            line_spacing: config.line_spacing.max(0.0),
            x: left,
            y: config.insets.y0,
            row_height: 0.0,
            row_len: 0,
        }
    }

    /// Reposition at the start of an empty row whose top is `y`.
    pub(crate) fn restart_row(&mut self, y: f64) {
        self.x = self.left;
        self.y = y;
        self.row_height = 0.0;
        self.row_len = 0;
    }

    /// Place one item of `size`, wrapping to a new row on overflow.
    pub(crate) fn place(&mut self, size: Size) -> Placement {
        let mut new_row = self.row_len == 0;
        if self.row_len > 0 && self.x + self.item_spacing + size.width > self.limit {
            self.y = self.y + self.row_height + self.line_spacing;
            self.x = self.left;
            self.row_height = 0.0;
            self.row_len = 0;
            new_row = true;
        }
        let item_x = if self.row_len == 0 {
            self.left
        } else {
            self.x + self.item_spacing
        };
        let frame = Rect::from_origin_size(Point::new(item_x, self.y), size);
        self.x = frame.x1;
        self.row_height = self.row_height.max(size.height);
        self.row_len += 1;
        Placement { frame, new_row }
    }

    /// Bottom edge of the packed content, excluding the trailing inset.
    pub(crate) fn bottom(&self) -> f64 {
        self.y + self.row_height
    }
}

#[cfg(test)]
mod tests {
    use super::ShelfCursor;
    use crate::GridLayoutConfig;
    use kurbo::{Insets, Rect, Size};

    #[test]
    fn wraps_when_the_next_item_would_overflow() {
        let mut cursor = ShelfCursor::new(300.0, &GridLayoutConfig::default());
        let a = cursor.place(Size::new(100.0, 50.0));
        let b = cursor.place(Size::new(150.0, 40.0));
        let c = cursor.place(Size::new(80.0, 50.0));

        assert!(a.new_row);
        assert!(!b.new_row);
        assert!(c.new_row);
        assert_eq!(b.frame, Rect::new(100.0, 0.0, 250.0, 40.0));
        // Row height is the tallest item of the closed row.
        assert_eq!(c.frame, Rect::new(0.0, 50.0, 80.0, 100.0));
        assert_eq!(cursor.bottom(), 100.0);
    }

    #[test]
    fn oversized_item_gets_its_own_row() {
        let mut cursor = ShelfCursor::new(100.0, &GridLayoutConfig::default());
        cursor.place(Size::new(40.0, 10.0));
        let wide = cursor.place(Size::new(250.0, 10.0));
        let next = cursor.place(Size::new(10.0, 10.0));

        assert!(wide.new_row);
        assert_eq!(wide.frame, Rect::new(0.0, 10.0, 250.0, 20.0));
        assert!(next.new_row);
        assert_eq!(next.frame.origin().y, 20.0);
    }

    #[test]
    fn spacing_and_insets_shift_frames() {
        let config = GridLayoutConfig::new()
            .with_item_spacing(5.0)
            .with_line_spacing(10.0)
            .with_insets(Insets::new(8.0, 4.0, 8.0, 4.0));
        let mut cursor = ShelfCursor::new(100.0, &config);

        let a = cursor.place(Size::new(40.0, 20.0));
        let b = cursor.place(Size::new(40.0, 20.0));
        // 8 + 40 + 5 + 40 = 93 > 92, so the second item wraps.
        assert_eq!(a.frame, Rect::new(8.0, 4.0, 48.0, 24.0));
        assert!(b.new_row);
        assert_eq!(b.frame, Rect::new(8.0, 34.0, 48.0, 54.0));
    }

    #[test]
    fn restart_row_resumes_at_a_row_top() {
        let config = GridLayoutConfig::default();
        let mut cursor = ShelfCursor::new(300.0, &config);
        cursor.place(Size::new(100.0, 50.0));
        cursor.restart_row(50.0);
        let p = cursor.place(Size::new(30.0, 30.0));
        assert!(p.new_row);
        assert_eq!(p.frame, Rect::new(0.0, 50.0, 30.0, 80.0));
    }
}
