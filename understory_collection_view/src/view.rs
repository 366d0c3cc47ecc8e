// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collection view controller: layout, visibility, and cell binding.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};
use understory_grid_layout::{GridLayoutConfig, ItemSizer, LayoutSnapshot, compute_layout};

use crate::{
    CellConfigurator, CellHandle, CellId, CellPool, CollectionError, DataSource, VisibleSet,
};

/// Alignment mode when scrolling a specific item into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Align the top of the item with the top of the viewport.
    Start,
    /// Center the item vertically within the viewport.
    Center,
    /// Align the bottom of the item with the bottom of the viewport.
    End,
    /// Move just enough to make the item fully visible, preferring the
    /// smallest change from the current scroll offset.
    Nearest,
}

/// A virtualized grid of reusable cells.
///
/// This type:
/// - owns the data source, the layout delegate, and the cell configurator,
/// - keeps the current [`LayoutSnapshot`] and the visible rectangle,
/// - binds cells from its [`CellPool`] to the items intersecting the visible
///   rectangle (plus overscan), and releases them when items leave it.
///
/// Replacing the data source, the layout delegate, or the layout configuration
/// invalidates the layout: every cell is released and nothing is bound, hit
/// tested, or measured until the next [`reload_data`](Self::reload_data) (or an
/// announced insert, which falls back to a reload) rebuilds it.
///
/// Every operation that fails returns an error and leaves the layout, the
/// visible set, and the pool as they were.
///
/// Capabilities must be `Send`, so the whole view can move between threads or
/// sit behind one `Mutex`.
pub struct CollectionView<D: DataSource> {
    data_source: Option<D>,
    layout_delegate: Option<Box<dyn ItemSizer + Send>>,
    configurator: Option<Box<dyn CellConfigurator<D::Content> + Send>>,
    layout_config: GridLayoutConfig,

    /// `None` until the first reload, and again after an invalidation.
    layout: Option<LayoutSnapshot>,

    visible_rect: Rect,
    overscan_before: f64,
    overscan_after: f64,

    visible: VisibleSet,
    pool: CellPool,
}

impl<D: DataSource + fmt::Debug> fmt::Debug for CollectionView<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionView")
            .field("data_source", &self.data_source)
            .field("has_layout_delegate", &self.layout_delegate.is_some())
            .field("has_configurator", &self.configurator.is_some())
            .field("layout_config", &self.layout_config)
            .field("item_count", &self.item_count())
            .field("needs_reload", &self.needs_reload())
            .field("visible_rect", &self.visible_rect)
            .field("visible", &self.visible)
            .field("pool_len", &self.pool.len())
            .finish_non_exhaustive()
    }
}

impl<D: DataSource> CollectionView<D> {
    /// Creates a view with a viewport of `viewport` at the content origin.
    ///
    /// The view has no capabilities yet; attach them with the `with_*` builders
    /// or the `set_*` methods, then call [`reload_data`](Self::reload_data).
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            data_source: None,
            layout_delegate: None,
            configurator: None,
            layout_config: GridLayoutConfig::default(),
            layout: None,
            visible_rect: Rect::from_origin_size(
                Point::ORIGIN,
                Size::new(viewport.width.max(0.0), viewport.height.max(0.0)),
            ),
            overscan_before: 0.0,
            overscan_after: 0.0,
            visible: VisibleSet::new(),
            pool: CellPool::new(),
        }
    }

    /// Builder form of [`set_data_source`](Self::set_data_source).
    #[must_use]
    pub fn with_data_source(mut self, data_source: D) -> Self {
        self.set_data_source(data_source);
        self
    }

    /// Builder form of [`set_layout_delegate`](Self::set_layout_delegate).
    #[must_use]
    pub fn with_layout_delegate(mut self, delegate: impl ItemSizer + Send + 'static) -> Self {
        self.set_layout_delegate(delegate);
        self
    }

    /// Builder form of [`set_cell_configurator`](Self::set_cell_configurator).
    #[must_use]
    pub fn with_cell_configurator(
        mut self,
        configurator: impl CellConfigurator<D::Content> + Send + 'static,
    ) -> Self {
        self.set_cell_configurator(configurator);
        self
    }

    /// Builder form of [`set_layout_config`](Self::set_layout_config).
    #[must_use]
    pub fn with_layout_config(mut self, config: GridLayoutConfig) -> Self {
        self.set_layout_config(config);
        self
    }

    /// Replaces the data source and invalidates the layout.
    pub fn set_data_source(&mut self, data_source: D) {
        self.invalidate_layout();
        self.data_source = Some(data_source);
    }

    /// Replaces the layout delegate and invalidates the layout.
    pub fn set_layout_delegate(&mut self, delegate: impl ItemSizer + Send + 'static) {
        self.invalidate_layout();
        self.layout_delegate = Some(Box::new(delegate));
    }

    /// Detaches and returns the layout delegate.
    ///
    /// The current layout stays in place, but anything that needs to measure
    /// items fails with [`CollectionError::MissingLayoutDelegate`] until a new
    /// delegate is set.
    pub fn take_layout_delegate(&mut self) -> Option<Box<dyn ItemSizer + Send>> {
        self.layout_delegate.take()
    }

    /// Replaces the cell configurator.
    ///
    /// The layout stays valid. Bound cells are handed to the previous
    /// configurator's `prepare_for_reuse`, then rebound through the new one.
    pub fn set_cell_configurator(
        &mut self,
        configurator: impl CellConfigurator<D::Content> + Send + 'static,
    ) {
        self.release_from(0);
        self.configurator = Some(Box::new(configurator));
        self.update_visible_cells();
    }

    /// Replaces the spacing and insets and invalidates the layout.
    pub fn set_layout_config(&mut self, config: GridLayoutConfig) {
        self.invalidate_layout();
        self.layout_config = config;
    }

    /// The data source, if one is attached.
    pub fn data_source(&self) -> Option<&D> {
        self.data_source.as_ref()
    }

    /// Mutable access to the data source.
    ///
    /// Changing the item count through this reference must be followed by the
    /// matching announcement (`reload_data`, `insert_item_at_end`,
    /// `insert_item_at`, or `remove_item_at`).
    pub fn data_source_mut(&mut self) -> Option<&mut D> {
        self.data_source.as_mut()
    }

    /// The spacing and insets used for the next layout.
    pub fn layout_config(&self) -> &GridLayoutConfig {
        &self.layout_config
    }

    /// The current layout, if one has been computed.
    pub fn layout(&self) -> Option<&LayoutSnapshot> {
        self.layout.as_ref()
    }

    /// Returns `true` if there is no valid layout: before the first reload,
    /// after an invalidation, and after [`teardown`](Self::teardown).
    pub fn needs_reload(&self) -> bool {
        self.layout.is_none()
    }

    /// Number of items in the current layout.
    pub fn item_count(&self) -> usize {
        self.layout.as_ref().map_or(0, LayoutSnapshot::item_count)
    }

    /// Size of the laid-out content, or `(viewport width, 0)` with no layout.
    pub fn content_size(&self) -> Size {
        self.layout.as_ref().map_or_else(
            || Size::new(self.visible_rect.width(), 0.0),
            LayoutSnapshot::content_size,
        )
    }

    /// The visible rectangle in content coordinates.
    pub fn visible_rect(&self) -> Rect {
        self.visible_rect
    }

    /// Extra distance bound above and below the visible rectangle.
    pub fn overscan(&self) -> (f64, f64) {
        (self.overscan_before, self.overscan_after)
    }

    /// Indices currently bound to cells, ascending.
    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible.indices()
    }

    /// The full index-to-cell mapping.
    pub fn visible_set(&self) -> &VisibleSet {
        &self.visible
    }

    /// Returns `true` if `index` is bound to a cell.
    pub fn is_item_bound(&self, index: usize) -> bool {
        self.visible.contains(index)
    }

    /// The cell bound to `index`.
    pub fn cell_for_item(&self, index: usize) -> Option<&CellHandle> {
        self.visible
            .cell_of(index)
            .and_then(|cell| self.pool.get(cell))
    }

    /// Frame of `index` in content coordinates.
    pub fn frame_of_item(&self, index: usize) -> Option<Rect> {
        self.layout.as_ref().and_then(|layout| layout.frame_of(index))
    }

    /// The item under `point`, in content coordinates.
    pub fn item_at_point(&self, point: Point) -> Option<usize> {
        self.layout
            .as_ref()
            .and_then(|layout| layout.index_at_point(point))
    }

    /// The cell pool.
    pub fn pool(&self) -> &CellPool {
        &self.pool
    }

    /// Recomputes the layout from scratch and rebinds the visible cells.
    ///
    /// A missing data source counts as zero items. Fails with
    /// [`CollectionError::MissingLayoutDelegate`] if no delegate is set, or with
    /// [`CollectionError::InvalidLayoutBounds`] if the viewport width (minus the
    /// insets) is not positive; either way nothing changes.
    pub fn reload_data(&mut self) -> Result<(), CollectionError> {
        let count = self.source_count();
        let width = self.visible_rect.width();
        let sizer = self
            .layout_delegate
            .as_deref_mut()
            .ok_or(CollectionError::MissingLayoutDelegate)?;
        let layout = compute_layout(count, sizer, width, &self.layout_config)?;
        tracing::debug!(
            items = count,
            rows = layout.rows().len(),
            height = layout.content_size().height,
            "reloaded collection view"
        );
        self.release_from(0);
        self.layout = Some(layout);
        self.update_visible_cells();
        Ok(())
    }

    /// Announces that the data source gained one item at the end.
    ///
    /// Only the new item is measured and placed, and a cell is bound to it if it
    /// lands in the visible rectangle. If the layout needs a reload, or the data
    /// source grew by more than one item, this falls back to
    /// [`reload_data`](Self::reload_data).
    ///
    /// Fails with [`CollectionError::IndexOutOfRange`] if the data source did not
    /// grow.
    pub fn insert_item_at_end(&mut self) -> Result<(), CollectionError> {
        let Some(prior) = self.patchable_item_count() else {
            return self.reload_data();
        };
        if !self.check_growth(prior)? {
            return self.reload_data();
        }
        let sizer = self
            .layout_delegate
            .as_deref_mut()
            .ok_or(CollectionError::MissingLayoutDelegate)?;
        if let Some(layout) = self.layout.take() {
            self.layout = Some(layout.append_one(sizer));
        }
        tracing::debug!(index = prior, "appended item");
        self.update_visible_cells();
        Ok(())
    }

    /// Announces that the data source gained one item at `index`.
    ///
    /// Items from `index` on shift up by one; their cells are released and the
    /// visible ones rebound to the shifted content. Falls back to
    /// [`reload_data`](Self::reload_data) under the same conditions as
    /// [`insert_item_at_end`](Self::insert_item_at_end).
    pub fn insert_item_at(&mut self, index: usize) -> Result<(), CollectionError> {
        let Some(prior) = self.patchable_item_count() else {
            let len = self.source_count();
            if index >= len {
                return Err(CollectionError::IndexOutOfRange { index, len });
            }
            return self.reload_data();
        };
        if index > prior {
            return Err(CollectionError::IndexOutOfRange { index, len: prior });
        }
        if !self.check_growth(prior)? {
            return self.reload_data();
        }
        let Some(layout) = self.layout.as_ref() else {
            return self.reload_data();
        };
        let sizer = self
            .layout_delegate
            .as_deref_mut()
            .ok_or(CollectionError::MissingLayoutDelegate)?;
        let next = layout.insert_at(index, sizer)?;
        self.release_from(index);
        self.layout = Some(next);
        tracing::debug!(index, "inserted item");
        self.update_visible_cells();
        Ok(())
    }

    /// Announces that the item at `index` was removed from the data source.
    ///
    /// Items after `index` shift down by one and are rebound. Falls back to
    /// [`reload_data`](Self::reload_data) if the layout needs a reload or the
    /// data source did not shrink by exactly one item.
    ///
    /// Fails with [`CollectionError::IndexOutOfRange`] if `index` was not an
    /// item before the removal.
    pub fn remove_item_at(&mut self, index: usize) -> Result<(), CollectionError> {
        let Some(prior) = self.patchable_item_count() else {
            let len = self.source_count() + 1;
            if index >= len {
                return Err(CollectionError::IndexOutOfRange { index, len });
            }
            return self.reload_data();
        };
        if index >= prior {
            return Err(CollectionError::IndexOutOfRange { index, len: prior });
        }
        let count = self.source_count();
        if count + 1 != prior {
            tracing::warn!(
                expected = prior - 1,
                actual = count,
                "data source did not shrink by one item; reloading"
            );
            return self.reload_data();
        }
        let Some(layout) = self.layout.as_ref() else {
            return self.reload_data();
        };
        let sizer = self
            .layout_delegate
            .as_deref_mut()
            .ok_or(CollectionError::MissingLayoutDelegate)?;
        let next = layout.remove_at(index, sizer)?;
        self.release_from(index);
        self.layout = Some(next);
        tracing::debug!(index, "removed item");
        self.update_visible_cells();
        Ok(())
    }

    /// Moves or resizes the visible rectangle and rebinds cells.
    ///
    /// A width change re-packs the whole layout. Fails with
    /// [`CollectionError::InvalidLayoutBounds`] if the new width cannot hold a
    /// layout (checked even while the layout is invalidated), or
    /// [`CollectionError::MissingLayoutDelegate`] if items need to be measured
    /// and there is no delegate; the previous rectangle and layout are kept.
    pub fn set_visible_rect(&mut self, rect: Rect) -> Result<(), CollectionError> {
        let rect = rect.abs();
        let width_changed = rect.width() != self.visible_rect.width();
        if width_changed {
            self.layout_config.validate_width(rect.width())?;
        }
        if width_changed && let Some(layout) = self.layout.as_ref() {
            let sizer = self
                .layout_delegate
                .as_deref_mut()
                .ok_or(CollectionError::MissingLayoutDelegate)?;
            let next = layout.relayout(rect.width(), sizer)?;
            tracing::debug!(
                width = rect.width(),
                height = next.content_size().height,
                "reflowed for new width"
            );
            self.layout = Some(next);
        }
        self.visible_rect = rect;
        self.update_visible_cells();
        Ok(())
    }

    /// Resizes the viewport, keeping its origin.
    pub fn set_viewport_size(&mut self, size: Size) -> Result<(), CollectionError> {
        self.set_visible_rect(Rect::from_origin_size(self.visible_rect.origin(), size))
    }

    /// Moves the viewport origin to `offset` and rebinds cells.
    ///
    /// Negative coordinates are clamped to zero.
    pub fn set_scroll_offset(&mut self, offset: Point) {
        let origin = Point::new(offset.x.max(0.0), offset.y.max(0.0));
        if origin == self.visible_rect.origin() {
            return;
        }
        self.visible_rect = Rect::from_origin_size(origin, self.visible_rect.size());
        self.update_visible_cells();
    }

    /// Moves the viewport by `delta`.
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.set_scroll_offset(self.visible_rect.origin() + delta);
    }

    /// Clamps the scroll offset so the viewport stays within the content.
    pub fn clamp_scroll_to_content(&mut self) {
        let content = self.content_size();
        let viewport = self.visible_rect.size();
        let origin = self.visible_rect.origin();
        let max_x = (content.width - viewport.width).max(0.0);
        let max_y = (content.height - viewport.height).max(0.0);
        self.set_scroll_offset(Point::new(origin.x.min(max_x), origin.y.min(max_y)));
    }

    /// Scrolls vertically so that item `index` is brought into view.
    ///
    /// Fails with [`CollectionError::IndexOutOfRange`] if `index` is not in the
    /// current layout.
    pub fn scroll_to_item(&mut self, index: usize, align: ScrollAlign) -> Result<(), CollectionError> {
        let frame = self
            .frame_of_item(index)
            .ok_or(CollectionError::IndexOutOfRange {
                index,
                len: self.item_count(),
            })?;
        let viewport = self.visible_rect.height();
        let current = self.visible_rect.y0;

        let y = match align {
            ScrollAlign::Start => frame.y0,
            ScrollAlign::End => frame.y1 - viewport,
            ScrollAlign::Center => (frame.y0 + frame.y1) / 2.0 - viewport / 2.0,
            ScrollAlign::Nearest => {
                if frame.y0 >= current && frame.y1 <= current + viewport {
                    current
                } else if frame.y0 < current {
                    frame.y0
                } else {
                    frame.y1 - viewport
                }
            }
        };

        self.set_scroll_offset(Point::new(self.visible_rect.x0, y));
        Ok(())
    }

    /// Sets asymmetric overscan: extra distance above and below the visible
    /// rectangle whose items are bound too. Negative values are clamped to zero.
    pub fn set_overscan(&mut self, before: f64, after: f64) {
        let before = before.max(0.0);
        let after = after.max(0.0);
        if before == self.overscan_before && after == self.overscan_after {
            return;
        }
        self.overscan_before = before;
        self.overscan_after = after;
        self.update_visible_cells();
    }

    /// Binds a cell to `index`, configuring it with the item's content.
    ///
    /// Binding an index that is already bound returns its existing cell and does
    /// nothing else. Fails with [`CollectionError::IndexOutOfRange`] if `index` is
    /// past the end of the layout or the data source.
    ///
    /// Cells bound this way stay bound until they fall outside the visible
    /// rectangle on the next visibility update, or until
    /// [`unbind_item`](Self::unbind_item).
    pub fn bind_item(&mut self, index: usize) -> Result<CellId, CollectionError> {
        let len = self.item_count().min(self.source_count());
        if index >= len {
            return Err(CollectionError::IndexOutOfRange { index, len });
        }
        if let Some(cell) = self.visible.cell_of(index) {
            return Ok(cell);
        }
        let Some(source) = self.data_source.as_ref() else {
            return Err(CollectionError::IndexOutOfRange { index, len: 0 });
        };
        let Some(content) = source.content(index) else {
            return Err(CollectionError::IndexOutOfRange {
                index,
                len: source.item_count(),
            });
        };
        let tag = source.reuse_tag(index);

        let cell = self.pool.acquire(&tag);
        let bound = self.pool.bind(cell, index);
        debug_assert!(bound, "a freshly acquired cell accepts a binding");
        if let (Some(configurator), Some(handle)) =
            (self.configurator.as_deref_mut(), self.pool.get(cell))
        {
            configurator.configure(handle, content);
        }
        self.visible.insert(index, cell);
        tracing::trace!(index, cell = cell.index(), tag = %tag, "bound cell");
        Ok(cell)
    }

    /// Releases the cell bound to `index` back to the pool.
    ///
    /// Returns `false` if `index` was not bound.
    pub fn unbind_item(&mut self, index: usize) -> bool {
        let Some(cell) = self.visible.remove(index) else {
            return false;
        };
        if let (Some(configurator), Some(handle)) =
            (self.configurator.as_deref_mut(), self.pool.get(cell))
        {
            configurator.prepare_for_reuse(handle);
        }
        self.pool.release(cell);
        tracing::trace!(index, cell = cell.index(), "unbound cell");
        true
    }

    /// Releases every cell, drops the layout, and drains the pool.
    ///
    /// Returns the drained cells so the host can destroy its visuals. The
    /// capabilities stay attached; a later [`reload_data`](Self::reload_data)
    /// starts over with an empty pool.
    pub fn teardown(&mut self) -> Vec<CellHandle> {
        self.release_from(0);
        self.layout = None;
        let cells = self.pool.drain_all();
        tracing::debug!(cells = cells.len(), "tore down collection view");
        cells
    }

    fn source_count(&self) -> usize {
        self.data_source.as_ref().map_or(0, DataSource::item_count)
    }

    /// Item count of a layout that can be edited in place.
    fn patchable_item_count(&self) -> Option<usize> {
        self.layout.as_ref().map(LayoutSnapshot::item_count)
    }

    /// Release every cell and drop the layout.
    fn invalidate_layout(&mut self) {
        self.release_from(0);
        if self.layout.take().is_some() {
            tracing::debug!("invalidated layout");
        }
    }

    /// Checks that the data source grew by one item since the layout had
    /// `prior` items.
    ///
    /// Returns `Ok(false)` if it grew by more, which calls for a full reload.
    fn check_growth(&self, prior: usize) -> Result<bool, CollectionError> {
        let count = self.source_count();
        match count.cmp(&(prior + 1)) {
            Ordering::Less => Err(CollectionError::IndexOutOfRange {
                index: prior,
                len: count,
            }),
            Ordering::Equal => Ok(true),
            Ordering::Greater => {
                tracing::warn!(
                    expected = prior + 1,
                    actual = count,
                    "data source grew by more than one item; reloading"
                );
                Ok(false)
            }
        }
    }

    fn release_from(&mut self, from: usize) {
        for index in self.visible.at_or_after(from) {
            self.unbind_item(index);
        }
    }

    /// The visible rectangle extended vertically by the overscan.
    fn binding_rect(&self) -> Rect {
        let r = self.visible_rect;
        Rect::new(
            r.x0,
            r.y0 - self.overscan_before,
            r.x1,
            r.y1 + self.overscan_after,
        )
    }

    /// Diffs the bound cells against the items in the binding rectangle.
    fn update_visible_cells(&mut self) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let len = layout.item_count().min(self.source_count());
        let mut wanted: Vec<usize> = layout.indices_in_rect(self.binding_rect()).collect();
        if let Some(cut) = wanted.iter().position(|&index| index >= len) {
            tracing::error!(
                first = wanted[cut],
                len,
                "layout has items the data source no longer reports; skipping them"
            );
            wanted.truncate(cut);
        }

        for index in self.visible.outside(&wanted) {
            if index >= len {
                tracing::error!(index, len, "dropping stale visible entry");
            }
            self.unbind_item(index);
        }
        for index in wanted {
            let bound = self.bind_item(index);
            if let Err(err) = &bound {
                tracing::error!(index, %err, "failed to bind visible item");
            }
            // Stale indices were filtered out above; what is left must bind.
            debug_assert!(bound.is_ok(), "visible item {index} failed to bind");
        }
    }
}
