// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout snapshots: full computation, incremental edits, and queries.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};

use crate::cursor::ShelfCursor;
use crate::sizer::measure;
use crate::{GridLayoutConfig, ItemSizer, LayoutError};

/// The frame assigned to one item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemGeometry {
    /// Index of the item in the data source.
    pub index: usize,
    /// Position and size in content coordinates.
    pub frame: Rect,
}

/// One shelf of the layout: a run of items sharing a top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutRow {
    /// First item in the row (inclusive).
    pub start: usize,
    /// One past the last item in the row (exclusive).
    pub end: usize,
    /// Top edge of the row.
    pub y: f64,
    /// Height of the tallest item in the row.
    pub height: f64,
}

impl LayoutRow {
    /// Number of items in the row.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the row holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `index` belongs to this row.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Bottom edge of the row.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// The immutable result of one layout computation.
///
/// A snapshot is never modified in place. [`LayoutSnapshot::append_one`] consumes
/// the snapshot and returns its successor; [`LayoutSnapshot::insert_at`],
/// [`LayoutSnapshot::remove_at`], and [`LayoutSnapshot::relayout`] leave `self`
/// untouched and return a new snapshot, so a failed edit keeps the previous
/// layout usable.
///
/// Besides the frames, a snapshot remembers its rows and the packing cursor after
/// the last item. That is what lets appends resume instead of starting over.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSnapshot {
    container_width: f64,
    config: GridLayoutConfig,
    geometries: Vec<ItemGeometry>,
    rows: Vec<LayoutRow>,
    cursor: ShelfCursor,
    content_size: Size,
}

/// Lay out `item_count` items inside a container `container_width` wide.
///
/// `sizer` is queried once per item, in index order.
///
/// Fails with [`LayoutError::InvalidLayoutBounds`] if `container_width` is not
/// positive and finite, or if `config`'s horizontal insets consume all of it.
///
/// With zero items, the result has no geometries and a content size of
/// `(container_width, 0)`.
pub fn compute_layout<S: ItemSizer + ?Sized>(
    item_count: usize,
    sizer: &mut S,
    container_width: f64,
    config: &GridLayoutConfig,
) -> Result<LayoutSnapshot, LayoutError> {
    let mut snapshot = LayoutSnapshot::empty(container_width, *config)?;
    snapshot.geometries.reserve(item_count);
    snapshot.pack_range(0, item_count, sizer);
    Ok(snapshot)
}

/// Strict overlap: rectangles that only share an edge do not overlap.
fn frames_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

impl LayoutSnapshot {
    /// A snapshot with no items.
    ///
    /// Fails under the same conditions as [`compute_layout`].
    pub fn empty(container_width: f64, config: GridLayoutConfig) -> Result<Self, LayoutError> {
        config.validate_width(container_width)?;
        Ok(Self {
            container_width,
            config,
            geometries: Vec::new(),
            rows: Vec::new(),
            cursor: ShelfCursor::new(container_width, &config),
            content_size: Size::new(container_width, 0.0),
        })
    }

    /// Append one item at index [`item_count`](Self::item_count).
    ///
    /// Only the new item is measured and placed; if it overflows the last row it
    /// opens a new one. The result is identical to running [`compute_layout`]
    /// over `item_count + 1` items with the same sizer.
    #[must_use]
    pub fn append_one<S: ItemSizer + ?Sized>(mut self, sizer: &mut S) -> Self {
        let index = self.geometries.len();
        self.pack_range(index, index + 1, sizer);
        self
    }

    /// Insert one item at `index`, shifting later items up by one.
    ///
    /// `sizer` must describe the items *after* the insertion. Rows ending before
    /// the edit are reused; the rest is re-packed, since the new item can reflow
    /// every later row.
    ///
    /// Fails with [`LayoutError::IndexOutOfRange`] if `index > item_count`.
    pub fn insert_at<S: ItemSizer + ?Sized>(
        &self,
        index: usize,
        sizer: &mut S,
    ) -> Result<Self, LayoutError> {
        let len = self.item_count();
        if index > len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        Ok(self.repack_from(index, len + 1, sizer))
    }

    /// Remove the item at `index`, shifting later items down by one.
    ///
    /// `sizer` must describe the items *after* the removal.
    ///
    /// Fails with [`LayoutError::IndexOutOfRange`] if `index >= item_count`.
    pub fn remove_at<S: ItemSizer + ?Sized>(
        &self,
        index: usize,
        sizer: &mut S,
    ) -> Result<Self, LayoutError> {
        let len = self.item_count();
        if index >= len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        Ok(self.repack_from(index, len - 1, sizer))
    }

    /// Recompute every item for a new container width, keeping the configuration.
    pub fn relayout<S: ItemSizer + ?Sized>(
        &self,
        container_width: f64,
        sizer: &mut S,
    ) -> Result<Self, LayoutError> {
        compute_layout(self.item_count(), sizer, container_width, &self.config)
    }

    /// Number of items laid out.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.geometries.len()
    }

    /// Returns `true` if the snapshot has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Width the layout was computed for.
    #[must_use]
    pub const fn container_width(&self) -> f64 {
        self.container_width
    }

    /// Spacing and insets the layout was computed with.
    #[must_use]
    pub const fn config(&self) -> &GridLayoutConfig {
        &self.config
    }

    /// Total size of the laid-out content.
    ///
    /// The width is always the container width. The height reaches the bottom of
    /// the last row plus the bottom inset, or zero when there are no items.
    #[must_use]
    pub const fn content_size(&self) -> Size {
        self.content_size
    }

    /// All item geometries, ordered by index.
    #[must_use]
    pub fn geometries(&self) -> &[ItemGeometry] {
        &self.geometries
    }

    /// Geometry of a single item.
    #[must_use]
    pub fn geometry(&self, index: usize) -> Option<&ItemGeometry> {
        self.geometries.get(index)
    }

    /// Frame of a single item.
    #[must_use]
    pub fn frame_of(&self, index: usize) -> Option<Rect> {
        self.geometries.get(index).map(|g| g.frame)
    }

    /// All rows, ordered top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    /// The row containing `index`.
    #[must_use]
    pub fn row_of(&self, index: usize) -> Option<&LayoutRow> {
        self.row_index_of(index).map(|r| &self.rows[r])
    }

    /// Indices of the items whose frames intersect `rect`, in ascending order.
    ///
    /// Frames that merely touch `rect` along an edge are not included. Rows are
    /// located by binary search; items within candidate rows are tested one by one.
    pub fn indices_in_rect(&self, rect: Rect) -> impl Iterator<Item = usize> + '_ {
        let rect = rect.abs();
        let first = self.rows.partition_point(|row| row.bottom() <= rect.y0);
        self.rows[first..]
            .iter()
            .take_while(move |row| row.y < rect.y1)
            .flat_map(move |row| {
                self.geometries[row.start..row.end]
                    .iter()
                    .filter(move |g| frames_overlap(g.frame, rect))
                    .map(|g| g.index)
            })
    }

    /// Hit test: the item whose frame contains `point`, if any.
    ///
    /// Frames are half-open, so a point on a shared edge belongs to the item to
    /// its right (or below).
    #[must_use]
    pub fn index_at_point(&self, point: Point) -> Option<usize> {
        let r = self.rows.partition_point(|row| row.bottom() <= point.y);
        let row = self.rows.get(r)?;
        if point.y < row.y {
            return None;
        }
        self.geometries[row.start..row.end]
            .iter()
            .find(|g| g.frame.contains(point))
            .map(|g| g.index)
    }

    fn row_index_of(&self, index: usize) -> Option<usize> {
        let r = self.rows.partition_point(|row| row.end <= index);
        (r < self.rows.len()).then_some(r)
    }

    /// Keep every row that cannot be affected by an edit at `edit`, then pack
    /// items up to `new_len` with `sizer`.
    fn repack_from<S: ItemSizer + ?Sized>(&self, edit: usize, new_len: usize, sizer: &mut S) -> Self {
        // The first item of the edited row may now fit on the previous row, so
        // re-packing starts one row earlier.
        let anchor = edit.min(self.item_count().saturating_sub(1));
        let first_row = self
            .row_index_of(anchor)
            .map_or(0, |r| r.saturating_sub(1));

        let mut out = Self {
            container_width: self.container_width,
            config: self.config,
            geometries: Vec::with_capacity(new_len),
            rows: Vec::new(),
            cursor: ShelfCursor::new(self.container_width, &self.config),
            content_size: Size::new(self.container_width, 0.0),
        };

        let start = if first_row > 0 {
            let kept = self.rows[first_row];
            out.rows.extend_from_slice(&self.rows[..first_row]);
            out.geometries
                .extend_from_slice(&self.geometries[..kept.start]);
            out.cursor.restart_row(kept.y);
            kept.start
        } else {
            0
        };

        out.pack_range(start, new_len, sizer);
        out
    }

    fn pack_range<S: ItemSizer + ?Sized>(&mut self, from: usize, to: usize, sizer: &mut S) {
        debug_assert_eq!(
            from,
            self.geometries.len(),
            "packing must continue from the end of the snapshot"
        );
        for index in from..to {
            let size = measure(sizer, index);
            let placement = self.cursor.place(size);
            let frame = placement.frame;
            match self.rows.last_mut() {
                Some(row) if !placement.new_row => {
                    row.end = index + 1;
                    row.height = row.height.max(size.height);
                }
                _ => self.rows.push(LayoutRow {
                    start: index,
                    end: index + 1,
                    y: frame.y0,
                    height: size.height,
                }),
            }
            self.geometries.push(ItemGeometry { index, frame });
        }
        let height = if self.geometries.is_empty() {
            0.0
        } else {
            self.cursor.bottom() + self.config.insets.y1
        };
        self.content_size = Size::new(self.container_width, height);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::{Insets, Point, Rect, Size};

    use super::{LayoutSnapshot, compute_layout, frames_overlap};
    use crate::{GridLayoutConfig, LayoutError};

    fn sizer_for(sizes: &[Size]) -> impl FnMut(usize) -> Size + '_ {
        move |i| sizes[i]
    }

    fn widths(ws: &[f64], height: f64) -> Vec<Size> {
        ws.iter().map(|&w| Size::new(w, height)).collect()
    }

    fn layout(sizes: &[Size], width: f64) -> LayoutSnapshot {
        compute_layout(
            sizes.len(),
            &mut sizer_for(sizes),
            width,
            &GridLayoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn three_items_wrap_into_two_rows() {
        let sizes = widths(&[100.0, 150.0, 80.0], 50.0);
        let snap = layout(&sizes, 300.0);

        assert_eq!(snap.item_count(), 3);
        assert_eq!(snap.rows().len(), 2);
        assert_eq!((snap.rows()[0].start, snap.rows()[0].end), (0, 2));
        assert_eq!((snap.rows()[1].start, snap.rows()[1].end), (2, 3));
        assert_eq!(snap.frame_of(0), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert_eq!(snap.frame_of(1), Some(Rect::new(100.0, 0.0, 250.0, 50.0)));
        assert_eq!(snap.frame_of(2), Some(Rect::new(0.0, 50.0, 80.0, 100.0)));
        assert_eq!(snap.content_size(), Size::new(300.0, 100.0));
    }

    #[test]
    fn empty_layout_has_zero_height() {
        let snap = layout(&[], 240.0);
        assert!(snap.is_empty());
        assert!(snap.rows().is_empty());
        assert_eq!(snap.content_size(), Size::new(240.0, 0.0));
        assert_eq!(snap.indices_in_rect(Rect::new(0.0, 0.0, 240.0, 500.0)).count(), 0);
        assert_eq!(snap.index_at_point(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn invalid_widths_are_rejected() {
        let sizes = widths(&[10.0], 10.0);
        for width in [0.0, -20.0, f64::NAN, f64::INFINITY] {
            let err = compute_layout(1, &mut sizer_for(&sizes), width, &GridLayoutConfig::default())
                .unwrap_err();
            assert!(
                matches!(err, LayoutError::InvalidLayoutBounds { .. }),
                "width {width} should be rejected"
            );
        }

        // Insets that eat the whole container leave no usable width.
        let config = GridLayoutConfig::new().with_insets(Insets::new(60.0, 0.0, 60.0, 0.0));
        assert_eq!(
            compute_layout(1, &mut sizer_for(&sizes), 100.0, &config),
            Err(LayoutError::InvalidLayoutBounds { width: 100.0 })
        );
    }

    #[test]
    fn oversized_item_is_not_truncated() {
        let sizes = widths(&[50.0, 400.0, 50.0], 20.0);
        let snap = layout(&sizes, 300.0);
        assert_eq!(snap.rows().len(), 3);
        assert_eq!(snap.frame_of(1), Some(Rect::new(0.0, 20.0, 400.0, 40.0)));
        // Content width stays the container width.
        assert_eq!(snap.content_size(), Size::new(300.0, 60.0));
    }

    #[test]
    fn frames_do_not_overlap_and_are_row_major() {
        let sizes: Vec<Size> = (0..40)
            .map(|i| Size::new(20.0 + (i * 37 % 90) as f64, 10.0 + (i * 13 % 40) as f64))
            .collect();
        let snap = layout(&sizes, 250.0);
        let geoms = snap.geometries();
        for (i, a) in geoms.iter().enumerate() {
            assert_eq!(a.index, i);
            for b in &geoms[i + 1..] {
                assert!(!frames_overlap(a.frame, b.frame), "{a:?} overlaps {b:?}");
                assert!(b.frame.y0 >= a.frame.y0, "frames must be row-major");
            }
        }
    }

    #[test]
    fn row_height_is_tallest_item() {
        let sizes = vec![
            Size::new(50.0, 10.0),
            Size::new(50.0, 70.0),
            Size::new(50.0, 30.0),
            Size::new(50.0, 5.0),
        ];
        let snap = layout(&sizes, 150.0);
        assert_eq!(snap.rows()[0].height, 70.0);
        assert_eq!(snap.frame_of(3), Some(Rect::new(0.0, 70.0, 50.0, 75.0)));
        // Items are top-aligned within a row.
        assert_eq!(snap.frame_of(2).map(|f| f.y0), Some(0.0));
    }

    #[test]
    fn append_matches_full_recompute() {
        let sizes = widths(&[100.0, 150.0, 80.0, 120.0, 200.0, 30.0, 300.0, 10.0], 40.0);
        let config = GridLayoutConfig::new()
            .with_item_spacing(4.0)
            .with_line_spacing(6.0)
            .with_insets(Insets::new(3.0, 2.0, 5.0, 7.0));
        let mut snap = compute_layout(0, &mut sizer_for(&sizes), 310.0, &config).unwrap();
        for n in 1..=sizes.len() {
            snap = snap.append_one(&mut sizer_for(&sizes));
            let full = compute_layout(n, &mut sizer_for(&sizes), 310.0, &config).unwrap();
            assert_eq!(snap, full, "append diverged at {n} items");
        }
    }

    #[test]
    fn append_to_empty_places_item_at_origin() {
        let snap = layout(&[], 300.0);
        let snap = snap.append_one(&mut |_: usize| Size::new(60.0, 60.0));
        assert_eq!(snap.frame_of(0), Some(Rect::new(0.0, 0.0, 60.0, 60.0)));
        assert_eq!(snap.content_size(), Size::new(300.0, 60.0));
    }

    #[test]
    fn insert_matches_full_recompute_at_every_position() {
        let base = widths(&[90.0, 60.0, 120.0, 40.0, 150.0, 70.0, 70.0], 25.0);
        let snap = layout(&base, 220.0);
        for at in 0..=base.len() {
            let mut after = base.clone();
            after.insert(at, Size::new(55.0, 35.0));
            let edited = snap.insert_at(at, &mut sizer_for(&after)).unwrap();
            assert_eq!(edited, layout(&after, 220.0), "insert at {at} diverged");
        }
    }

    #[test]
    fn insert_can_pull_items_back_onto_previous_row() {
        // Row 0 holds [150]; 100 does not fit after it and opens row 1.
        let base = widths(&[150.0, 100.0, 50.0], 10.0);
        let snap = layout(&base, 200.0);
        assert_eq!(snap.rows().len(), 2);

        // A 40-wide item at index 1 fits on row 0 and pushes 100 down.
        let after = widths(&[150.0, 40.0, 100.0, 50.0], 10.0);
        let edited = snap.insert_at(1, &mut sizer_for(&after)).unwrap();
        assert_eq!(edited, layout(&after, 200.0));
        assert_eq!((edited.rows()[0].start, edited.rows()[0].end), (0, 2));
    }

    #[test]
    fn remove_matches_full_recompute_at_every_position() {
        let base = widths(&[90.0, 60.0, 120.0, 40.0, 150.0, 70.0, 70.0], 25.0);
        let snap = layout(&base, 220.0);
        for at in 0..base.len() {
            let mut after = base.clone();
            after.remove(at);
            let edited = snap.remove_at(at, &mut sizer_for(&after)).unwrap();
            assert_eq!(edited, layout(&after, 220.0), "remove at {at} diverged");
        }
    }

    #[test]
    fn edits_out_of_range_leave_snapshot_untouched() {
        let base = widths(&[10.0, 20.0], 10.0);
        let snap = layout(&base, 100.0);
        let before = snap.clone();
        assert_eq!(
            snap.insert_at(3, &mut sizer_for(&base)),
            Err(LayoutError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert_eq!(
            snap.remove_at(2, &mut sizer_for(&base)),
            Err(LayoutError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(snap, before);
    }

    #[test]
    fn remove_last_item_yields_empty_layout() {
        let base = widths(&[10.0], 10.0);
        let snap = layout(&base, 100.0);
        let empty = snap.remove_at(0, &mut sizer_for(&[])).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.content_size(), Size::new(100.0, 0.0));
    }

    #[test]
    fn relayout_reflows_for_new_width() {
        let sizes = widths(&[100.0, 100.0, 100.0], 10.0);
        let snap = layout(&sizes, 300.0);
        assert_eq!(snap.rows().len(), 1);
        let narrow = snap.relayout(150.0, &mut sizer_for(&sizes)).unwrap();
        assert_eq!(narrow.rows().len(), 3);
        assert_eq!(narrow.content_size(), Size::new(150.0, 30.0));
        assert!(matches!(
            snap.relayout(0.0, &mut sizer_for(&sizes)),
            Err(LayoutError::InvalidLayoutBounds { .. })
        ));
    }

    #[test]
    fn rect_query_returns_intersecting_indices() {
        // 10 rows of 3 items, each 100x20.
        let sizes = widths(&[100.0; 30], 20.0);
        let snap = layout(&sizes, 300.0);

        let hits: Vec<_> = snap
            .indices_in_rect(Rect::new(0.0, 30.0, 300.0, 70.0))
            .collect();
        assert_eq!(hits, vec![3, 4, 5, 6, 7, 8, 9, 10, 11]);

        // Touching an edge does not count as intersecting.
        let hits: Vec<_> = snap
            .indices_in_rect(Rect::new(100.0, 0.0, 200.0, 20.0))
            .collect();
        assert_eq!(hits, vec![1]);

        // Rects past the content are empty.
        assert_eq!(snap.indices_in_rect(Rect::new(0.0, 500.0, 300.0, 600.0)).count(), 0);
    }

    #[test]
    fn point_query_hits_the_containing_item() {
        let sizes = vec![Size::new(100.0, 50.0), Size::new(100.0, 20.0)];
        let snap = layout(&sizes, 300.0);
        assert_eq!(snap.index_at_point(Point::new(10.0, 10.0)), Some(0));
        assert_eq!(snap.index_at_point(Point::new(100.0, 10.0)), Some(1));
        // Below the shorter item but inside its row.
        assert_eq!(snap.index_at_point(Point::new(150.0, 30.0)), None);
        // Right of the last item.
        assert_eq!(snap.index_at_point(Point::new(250.0, 10.0)), None);
        assert_eq!(snap.index_at_point(Point::new(10.0, 50.0)), None);
    }

    #[test]
    fn row_lookup() {
        let sizes = widths(&[100.0, 150.0, 80.0], 50.0);
        let snap = layout(&sizes, 300.0);
        assert_eq!(snap.row_of(1).map(|r| r.start), Some(0));
        assert_eq!(snap.row_of(2).map(|r| r.len()), Some(1));
        assert!(snap.row_of(3).is_none());
        assert!(snap.rows()[0].contains(1));
    }
}
