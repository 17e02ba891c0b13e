//! Reference crop selection
//!
//! The reference crop is drawn once on the first image of the sequence and
//! propagated to every other image. Only its vertical window is shared; the
//! horizontal extent stays with the reference image.

use crate::constants::MIN_CROP_SIZE_PX;
use crate::types::{ImageId, LayoutError, PixelRect, Result, Selection, SourceImage};

/// The crop window defined on the reference image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceCrop {
    /// Left edge of the window (0 unless horizontal trimming is enabled)
    pub x: u32,
    /// Top edge of the window
    pub y: u32,
    /// Window width (the reference image's width unless horizontal trimming is enabled)
    pub width: u32,
    /// Window height, shared by every image
    pub height: u32,
    /// When set, `x`/`width` are baked into the reference raster only
    pub horizontal_trim_enabled: bool,
    /// The clamped rectangle as drawn on the reference image
    pub selection: PixelRect,
    /// Image the crop was drawn on
    pub reference_id: ImageId,
    /// Width of the reference image
    pub reference_width: u32,
    /// Height of the reference image
    pub reference_height: u32,
}

impl ReferenceCrop {
    pub fn window(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.width, self.height)
    }
}

/// Compute the reference crop from a user selection on `image`.
///
/// The selection is clamped to the image and widened to the minimum crop size
/// where needed. Without horizontal trimming the window always spans the full
/// image width.
pub fn compute_reference_crop(
    image: &SourceImage,
    selection: Selection,
    horizontal_trim_enabled: bool,
) -> Result<ReferenceCrop> {
    let selected = clamp_selection(selection, image.width, image.height)?;

    let (x, width) = if horizontal_trim_enabled {
        (selected.x, selected.width)
    } else {
        (0, image.width)
    };

    log::debug!(
        "Reference crop on {:?}: y={} height={} x={} width={} (horizontal trim: {})",
        image.id,
        selected.y,
        selected.height,
        x,
        width,
        horizontal_trim_enabled
    );

    Ok(ReferenceCrop {
        x,
        y: selected.y,
        width,
        height: selected.height,
        horizontal_trim_enabled,
        selection: selected,
        reference_id: image.id,
        reference_width: image.width,
        reference_height: image.height,
    })
}

/// Clamp a user selection to `[0, width] x [0, height]`.
///
/// Fails with `InvalidCropBounds` when nothing of the selection remains inside
/// the image. Sides shorter than the minimum crop size are extended, staying
/// inside the image.
pub fn clamp_selection(selection: Selection, width: u32, height: u32) -> Result<PixelRect> {
    let Selection {
        x,
        y,
        width: sel_width,
        height: sel_height,
    } = selection;

    if ![x, y, sel_width, sel_height].iter().all(|v| v.is_finite()) {
        return Err(LayoutError::InvalidCropBounds(format!(
            "selection has non-finite coordinates: {:?}",
            selection
        )));
    }

    let (left, clamped_width) = clamp_axis(x, sel_width, width);
    let (top, clamped_height) = clamp_axis(y, sel_height, height);

    if clamped_width == 0 || clamped_height == 0 {
        return Err(LayoutError::InvalidCropBounds(format!(
            "selection {:?} is empty inside a {}x{} image",
            selection, width, height
        )));
    }

    let (left, clamped_width) = enforce_min_extent(left, clamped_width, width);
    let (top, clamped_height) = enforce_min_extent(top, clamped_height, height);

    Ok(PixelRect::new(left, top, clamped_width, clamped_height))
}

/// Clamp one axis of a selection, returning (start, extent)
fn clamp_axis(origin: f64, extent: f64, limit: u32) -> (u32, u32) {
    let limit_f = limit as f64;
    let start = origin.round().clamp(0.0, limit_f) as u32;
    let end = (origin + extent).round().clamp(0.0, limit_f) as u32;
    (start, end.saturating_sub(start))
}

/// Grow an extent to the minimum crop size without leaving `[0, limit]`
fn enforce_min_extent(start: u32, extent: u32, limit: u32) -> (u32, u32) {
    let min = MIN_CROP_SIZE_PX.min(limit);
    if extent >= min {
        return (start, extent);
    }
    (start.min(limit - min), min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn blank(width: u32, height: u32) -> SourceImage {
        SourceImage::new("blank", RgbImage::new(width, height))
    }

    #[test]
    fn test_full_width_without_horizontal_trim() {
        let image = blank(1000, 1400);
        let crop =
            compute_reference_crop(&image, Selection::new(120.0, 100.0, 500.0, 1200.0), false)
                .unwrap();

        assert_eq!(crop.window(), PixelRect::new(0, 100, 1000, 1200));
        assert_eq!(crop.selection, PixelRect::new(120, 100, 500, 1200));
    }

    #[test]
    fn test_horizontal_trim_keeps_selection() {
        let image = blank(1000, 1400);
        let crop =
            compute_reference_crop(&image, Selection::new(120.0, 100.0, 500.0, 1200.0), true)
                .unwrap();

        assert_eq!(crop.window(), PixelRect::new(120, 100, 500, 1200));
    }

    #[test]
    fn test_selection_clamped_to_image() {
        let rect = clamp_selection(Selection::new(-50.0, -20.0, 300.0, 2000.0), 200, 400).unwrap();
        assert_eq!(rect, PixelRect::new(0, 0, 200, 400));
    }

    #[test]
    fn test_selection_outside_image_fails() {
        let result = clamp_selection(Selection::new(500.0, 0.0, 100.0, 100.0), 200, 400);
        assert!(matches!(result, Err(LayoutError::InvalidCropBounds(_))));

        let result = clamp_selection(Selection::new(0.0, 0.0, -5.0, 100.0), 200, 400);
        assert!(matches!(result, Err(LayoutError::InvalidCropBounds(_))));
    }

    #[test]
    fn test_small_selection_grows_to_minimum() {
        let rect = clamp_selection(Selection::new(195.0, 10.0, 3.0, 4.0), 200, 400).unwrap();
        assert_eq!(rect.width, MIN_CROP_SIZE_PX);
        assert_eq!(rect.height, MIN_CROP_SIZE_PX);
        assert!(rect.fits_within(200, 400));
        assert_eq!(rect.x, 190);
    }

    #[test]
    fn test_non_finite_selection_rejected() {
        let result = clamp_selection(Selection::new(f64::NAN, 0.0, 10.0, 10.0), 200, 400);
        assert!(matches!(result, Err(LayoutError::InvalidCropBounds(_))));
    }
}
