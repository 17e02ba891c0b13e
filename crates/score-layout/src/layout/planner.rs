//! Column-major flow layout and pagination
//!
//! Item `i` goes to column `i % columns`. Each column keeps its own vertical
//! cursor; on fixed-size pages, the first item that would overflow its column
//! starts a new page and every column restarts at the top.

use crate::constants::LAYOUT_EPSILON_MM;
use crate::options::LayoutConfig;
use crate::types::{LayoutError, Result};

use super::{LayoutItem, LayoutPlan, MmRect, PageLayout, PlacedItem};

/// Running state of the page currently being filled
struct PageCursor {
    index: usize,
    cursors: Vec<f32>,
    rows: Vec<usize>,
    items: Vec<PlacedItem>,
}

impl PageCursor {
    fn new(index: usize, columns: usize) -> Self {
        Self {
            index,
            cursors: vec![0.0; columns],
            rows: vec![0; columns],
            items: Vec::new(),
        }
    }

    fn content_height(&self) -> f32 {
        self.cursors.iter().copied().fold(0.0, f32::max)
    }
}

/// Vertical offset of the first row on a page
fn content_top_mm(config: &LayoutConfig, page_index: usize) -> f32 {
    if page_index == 0 {
        config.margin_mm + config.title_band_mm()
    } else {
        config.margin_mm
    }
}

/// Height available to the columns on a fixed-size page
fn usable_height_mm(config: &LayoutConfig, page_height: f32, page_index: usize) -> f32 {
    page_height - content_top_mm(config, page_index) - config.margin_mm
}

/// Compute placements for `items` in order.
///
/// Every item is scaled to the column width, keeping its aspect ratio. On
/// fixed pages an item taller than the usable height is scaled down until it
/// fits. Unbounded pages never break; the single page grows to fit the
/// tallest column.
pub fn plan_layout(items: &[LayoutItem], config: &LayoutConfig) -> Result<LayoutPlan> {
    if items.is_empty() {
        return Err(LayoutError::EmptyInput);
    }
    config.validate()?;

    let columns = config.columns;
    let (page_width, page_height) = config.page_dimensions_mm();
    let column_width = config.usable_width_mm() / columns as f32;
    if !(column_width > 0.0) {
        return Err(LayoutError::DegenerateLayout(format!(
            "Column width is {} mm",
            column_width
        )));
    }

    let mut finished: Vec<PageCursor> = Vec::new();
    let mut page = PageCursor::new(0, columns);

    for (sequence_index, item) in items.iter().enumerate() {
        if item.width_px == 0 || item.height_px == 0 {
            return Err(LayoutError::DegenerateLayout(format!(
                "Item {} has no area ({}x{} px)",
                sequence_index, item.width_px, item.height_px
            )));
        }

        let column = sequence_index % columns;
        let mut width = column_width;
        let mut height = column_width * item.height_ratio();

        if let Some(page_height) = page_height {
            let usable = usable_height_mm(config, page_height, page.index);
            if height > usable {
                log::warn!(
                    "Item {} is {:.1} mm tall, scaling to fit {:.1} mm",
                    sequence_index,
                    height,
                    usable
                );
                width *= usable / height;
                height = usable;
            }

            let gap = if page.rows[column] > 0 {
                config.spacing.resolve_mm(height)
            } else {
                0.0
            };
            let overflows = page.cursors[column] + gap + height > usable + LAYOUT_EPSILON_MM;
            if overflows && !page.items.is_empty() {
                log::debug!(
                    "Page break before item {} (column {} at {:.1} mm of {:.1} mm)",
                    sequence_index,
                    column,
                    page.cursors[column],
                    usable
                );
                let next = PageCursor::new(page.index + 1, columns);
                finished.push(std::mem::replace(&mut page, next));
            }
        }

        let gap = if page.rows[column] > 0 {
            config.spacing.resolve_mm(height)
        } else {
            0.0
        };
        let y = content_top_mm(config, page.index) + page.cursors[column] + gap;
        let x = config.margin_mm + column as f32 * column_width;

        page.items.push(PlacedItem {
            sequence_index,
            image_id: item.image_id,
            page_index: page.index,
            column_index: column,
            row_index: page.rows[column],
            rect: MmRect::new(x, y, width, height),
        });
        page.cursors[column] += gap + height;
        page.rows[column] += 1;
    }
    finished.push(page);

    let pages: Vec<PageLayout> = finished
        .into_iter()
        .map(|cursor| {
            let height_mm = match page_height {
                Some(height) => height,
                None => {
                    content_top_mm(config, cursor.index)
                        + cursor.content_height()
                        + config.margin_mm
                }
            };
            PageLayout {
                index: cursor.index,
                width_mm: page_width,
                height_mm,
                items: cursor.items,
            }
        })
        .collect();

    log::debug!(
        "Planned {} items on {} page(s), column width {:.1} mm",
        items.len(),
        pages.len(),
        column_width
    );

    Ok(LayoutPlan {
        pages,
        columns,
        column_width_mm: column_width,
        margin_mm: config.margin_mm,
        title: config.title_text().map(str::to_string),
        title_band_mm: config.title_band_mm(),
    })
}
