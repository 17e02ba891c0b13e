//! Layout data types
//!
//! These types sit between the cropped rasters and the renderers. All
//! positions are in millimetres with the origin at the top-left of a page.

use crate::types::{ImageId, RasterBuffer};

/// Pixel size of one strip to be placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    pub image_id: ImageId,
    pub width_px: u32,
    pub height_px: u32,
}

impl LayoutItem {
    pub fn new(image_id: ImageId, width_px: u32, height_px: u32) -> Self {
        Self {
            image_id,
            width_px,
            height_px,
        }
    }

    pub fn from_raster(raster: &RasterBuffer) -> Self {
        Self::new(raster.image_id, raster.width(), raster.height())
    }

    /// Height over width
    pub fn height_ratio(&self) -> f32 {
        self.height_px as f32 / self.width_px as f32
    }
}

/// A rectangle on a page (origin top-left, millimetres)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MmRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl MmRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Final position of one strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedItem {
    /// Position of the item in the input sequence
    pub sequence_index: usize,
    pub image_id: ImageId,
    pub page_index: usize,
    pub column_index: usize,
    /// Row within its column on its page
    pub row_index: usize,
    pub rect: MmRect,
}

/// One output page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub index: usize,
    pub width_mm: f32,
    pub height_mm: f32,
    pub items: Vec<PlacedItem>,
}

/// Complete result of layout planning
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub pages: Vec<PageLayout>,
    pub columns: usize,
    pub column_width_mm: f32,
    pub margin_mm: f32,
    pub title: Option<String>,
    /// Height of the title band on the first page (0 when untitled)
    pub title_band_mm: f32,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All placements in input order
    pub fn placements(&self) -> impl Iterator<Item = &PlacedItem> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Column index of every item in input order
    pub fn column_assignments(&self) -> Vec<usize> {
        self.placements().map(|item| item.column_index).collect()
    }

    /// Area reserved for the title on the first page
    pub fn title_rect(&self) -> Option<MmRect> {
        let page = self.pages.first()?;
        self.title.as_ref()?;
        Some(MmRect::new(
            self.margin_mm,
            self.margin_mm,
            page.width_mm - 2.0 * self.margin_mm,
            self.title_band_mm,
        ))
    }
}
