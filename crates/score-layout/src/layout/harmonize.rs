//! Aspect-ratio harmonization
//!
//! Pads narrower strips with white so every item shares the widest
//! width/height ratio in the sequence. Runs before placement.

use crate::geometry::pad_to_width;
use crate::types::{PadSide, RasterBuffer};

use super::LayoutItem;

/// Largest width/height ratio among `dims`, ignoring empty entries
fn max_ratio(dims: impl Iterator<Item = (u32, u32)>) -> Option<f64> {
    dims.filter(|&(w, h)| w > 0 && h > 0)
        .map(|(w, h)| w as f64 / h as f64)
        .fold(None, |acc, ratio| match acc {
            Some(max) if max >= ratio => Some(max),
            _ => Some(ratio),
        })
}

/// Width a strip of `height` needs to reach `ratio`, never narrower than `width`
fn harmonized_width(width: u32, height: u32, ratio: f64) -> u32 {
    let target = (height as f64 * ratio).round() as u32;
    target.max(width)
}

/// Harmonize item dimensions without touching pixels
pub fn harmonize_items(items: &[LayoutItem]) -> Vec<LayoutItem> {
    let Some(ratio) = max_ratio(items.iter().map(|item| (item.width_px, item.height_px))) else {
        return items.to_vec();
    };

    items
        .iter()
        .map(|item| LayoutItem {
            width_px: harmonized_width(item.width_px, item.height_px, ratio),
            ..*item
        })
        .collect()
}

/// Pad every raster to the widest aspect ratio in the sequence.
///
/// `side` chooses where the white margin goes.
pub fn harmonize_rasters(rasters: Vec<RasterBuffer>, side: PadSide) -> Vec<RasterBuffer> {
    let Some(ratio) = max_ratio(rasters.iter().map(|r| (r.width(), r.height()))) else {
        return rasters;
    };

    rasters
        .into_iter()
        .map(|raster| {
            let width = harmonized_width(raster.width(), raster.height(), ratio);
            if width == raster.width() {
                return raster;
            }
            log::debug!(
                "Padding {:?} from {} to {} px wide",
                raster.image_id,
                raster.width(),
                width
            );
            RasterBuffer {
                image_id: raster.image_id,
                pixels: pad_to_width(&raster.pixels, width, side),
            }
        })
        .collect()
}
