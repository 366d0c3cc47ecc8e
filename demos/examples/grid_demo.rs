// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid demo: a photo-grid controller built on `understory_collection_view`.
//!
//! This example shows how to:
//! - keep the item list in an `ItemStore` owned by the view,
//! - size items through a layout delegate closure,
//! - render item content into host-side cells keyed by `CellId`,
//! - append items with `insert_item_at_end`, the "add item" button action,
//! - scroll and watch cells being recycled.
//!
//! Run:
//! - `cargo run -p understory_demos --example grid_demo`
//! - `RUST_LOG=understory_collection_view=trace cargo run -p understory_demos --example grid_demo`

use std::sync::{Arc, Mutex};

use kurbo::{Point, Size, Vec2};
use tracing_subscriber::EnvFilter;
use understory_collection_view::{
    CellConfigurator, CellHandle, CellId, CollectionError, CollectionView, ItemStore, ScrollAlign,
};

const IMAGE_NAMES: [&str; 4] = ["bird", "flower", "mountain", "shore"];

/// One entry of the demo's item list.
#[derive(Clone, Debug)]
struct GridItem {
    label: String,
    image_name: &'static str,
}

impl GridItem {
    fn numbered(n: usize) -> Self {
        Self {
            label: format!("Item {n}"),
            image_name: IMAGE_NAMES[n % IMAGE_NAMES.len()],
        }
    }
}

/// What a host would draw for one cell.
#[derive(Clone, Debug, Default)]
struct GridCell {
    label_text: String,
    image: Option<&'static str>,
}

/// Host-side visuals, indexed by `CellId::index`.
type Surface = Arc<Mutex<Vec<GridCell>>>;

/// Writes item content into the surface, and clears cells parked for reuse.
struct GridCellRenderer {
    surface: Surface,
}

impl CellConfigurator<GridItem> for GridCellRenderer {
    fn configure(&mut self, cell: &CellHandle, content: GridItem) {
        let Ok(mut surface) = self.surface.lock() else {
            return;
        };
        let slot = cell.id().index();
        if surface.len() <= slot {
            surface.resize_with(slot + 1, GridCell::default);
        }
        surface[slot] = GridCell {
            label_text: content.label,
            image: Some(content.image_name),
        };
    }

    fn prepare_for_reuse(&mut self, cell: &CellHandle) {
        if let Ok(mut surface) = self.surface.lock()
            && let Some(visual) = surface.get_mut(cell.id().index())
        {
            visual.image = None;
        }
    }
}

struct GridDemoController {
    view: CollectionView<ItemStore<GridItem>>,
    surface: Surface,
}

impl GridDemoController {
    fn new(viewport: Size, initial_items: usize) -> Result<Self, CollectionError> {
        let surface = Surface::default();
        let items: Vec<GridItem> = (0..initial_items).map(GridItem::numbered).collect();
        let mut view = CollectionView::new(viewport)
            .with_data_source(ItemStore::from_items(items))
            // Every fifth item is a wide "panorama" tile.
            .with_layout_delegate(|index: usize| {
                if index % 5 == 4 {
                    Size::new(250.0, 128.0)
                } else {
                    Size::new(128.0, 128.0)
                }
            })
            .with_cell_configurator(GridCellRenderer {
                surface: Arc::clone(&surface),
            });
        view.set_overscan(0.0, 64.0);
        view.reload_data()?;
        Ok(Self { view, surface })
    }

    /// The "add item" button.
    fn add_item(&mut self) -> Result<(), CollectionError> {
        let next = self.view.item_count();
        if let Some(store) = self.view.data_source_mut() {
            store.push(GridItem::numbered(next));
        }
        self.view.insert_item_at_end()
    }

    fn visual(&self, cell: CellId) -> Option<GridCell> {
        let surface = self.surface.lock().ok()?;
        surface.get(cell.index()).cloned()
    }

    fn report(&self, caption: &str) {
        let rect = self.view.visible_rect();
        tracing::info!(
            caption,
            items = self.view.item_count(),
            bound = self.view.visible_set().len(),
            pooled = self.view.pool().len(),
            top = rect.y0,
            content_height = self.view.content_size().height,
            "grid state"
        );
        for (index, cell) in self.view.visible_set().iter() {
            if let Some(visual) = self.visual(cell) {
                tracing::debug!(
                    index,
                    cell = cell.index(),
                    label = %visual.label_text,
                    image = visual.image.unwrap_or("-"),
                    "visible cell"
                );
            }
        }
    }
}

fn init_logging() {
    // Respect RUST_LOG, default to "info".
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        eprintln!("a tracing subscriber was already installed");
    }
}

fn main() -> Result<(), CollectionError> {
    init_logging();

    let mut demo = GridDemoController::new(Size::new(540.0, 400.0), 24)?;
    demo.report("initial");

    for _ in 0..3 {
        demo.add_item()?;
    }
    demo.report("after adding three items");

    for _ in 0..8 {
        demo.view.scroll_by(Vec2::new(0.0, 96.0));
    }
    demo.view.clamp_scroll_to_content();
    demo.report("scrolled to the bottom");

    demo.view.scroll_to_item(0, ScrollAlign::Start)?;
    demo.report("back to the first item");

    if let Some(index) = demo.view.item_at_point(Point::new(140.0, 10.0)) {
        tracing::info!(index, "clicked item");
    }

    // A narrower window reflows the grid.
    demo.view.set_viewport_size(Size::new(300.0, 400.0))?;
    demo.report("narrow window");

    let cells = demo.view.teardown();
    tracing::info!(destroyed = cells.len(), "tore down the grid");
    Ok(())
}
