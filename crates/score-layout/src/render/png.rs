//! Flattened PNG output
//!
//! All pages are drawn onto one white canvas, stacked top to bottom.

use crate::constants::{MAX_FLATTENED_SIDE_PX, WHITE};
use crate::layout::LayoutPlan;
use crate::types::{LayoutError, RasterBuffer, Result};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use super::check_rasters;

fn mm_to_px(mm: f32, px_per_mm: f32) -> u32 {
    (mm * px_per_mm).round().max(0.0) as u32
}

/// Draw every page of `plan` onto a single canvas at `dpi`
pub fn flatten_pages(plan: &LayoutPlan, rasters: &[RasterBuffer], dpi: f32) -> Result<RgbImage> {
    check_rasters(plan, rasters)?;
    if !(dpi > 0.0) {
        return Err(LayoutError::RenderFailure(format!("Invalid DPI {}", dpi)));
    }

    let px_per_mm = dpi / 25.4;
    let width_mm = plan.pages.iter().map(|p| p.width_mm).fold(0.0, f32::max);
    let height_mm: f32 = plan.pages.iter().map(|p| p.height_mm).sum();
    let width = mm_to_px(width_mm, px_per_mm).max(1);
    let height = mm_to_px(height_mm, px_per_mm).max(1);

    if width > MAX_FLATTENED_SIDE_PX || height > MAX_FLATTENED_SIDE_PX {
        return Err(LayoutError::RenderFailure(format!(
            "Flattened image would be {}x{} px (limit {} px per side)",
            width, height, MAX_FLATTENED_SIDE_PX
        )));
    }

    let mut canvas = RgbImage::from_pixel(width, height, WHITE);
    let mut page_top_mm = 0.0;

    for page in &plan.pages {
        for placed in &page.items {
            let raster = &rasters[placed.sequence_index];
            let target_w = mm_to_px(placed.rect.width, px_per_mm).max(1);
            let target_h = mm_to_px(placed.rect.height, px_per_mm).max(1);
            let scaled = imageops::resize(&raster.pixels, target_w, target_h, FilterType::Triangle);

            let x = mm_to_px(placed.rect.x, px_per_mm);
            let y = mm_to_px(page_top_mm + placed.rect.y, px_per_mm);
            imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
        }
        page_top_mm += page.height_mm;
    }

    Ok(canvas)
}

/// Render `plan` as PNG bytes
pub fn render_png(plan: &LayoutPlan, rasters: &[RasterBuffer], dpi: f32) -> Result<Vec<u8>> {
    let canvas = flatten_pages(plan, rasters, dpi)?;

    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| LayoutError::RenderFailure(format!("PNG encoding failed: {}", e)))?;
    Ok(bytes)
}
