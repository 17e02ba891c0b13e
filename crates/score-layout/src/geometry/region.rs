//! Effective crop regions
//!
//! Resolves the rectangle actually sampled from each source image.

use crate::types::{ImageId, LayoutError, PixelRect, Result, Rotation, SourceImage};

use super::{
    Affine2, ImageAdjustment, ReferenceCrop, clamp_trims, clamp_vertical_offset,
    rotated_dimensions, rotation_about_center,
};

/// The resolved crop for one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveCropRegion {
    pub image_id: ImageId,
    /// Rectangle sampled from the source raster
    pub source: PixelRect,
    /// Rotation applied after cropping
    pub rotation: Rotation,
    /// Canvas width when the crop is left-justified onto white padding
    pub padded_width: Option<u32>,
}

impl EffectiveCropRegion {
    /// Width and height of the rendered raster
    pub fn output_dimensions(&self) -> (u32, u32) {
        let width = self.padded_width.unwrap_or(self.source.width);
        rotated_dimensions(width, self.source.height, self.rotation)
    }

    /// Maps a point of the cropped (unrotated) canvas into the rendered raster
    pub fn rotation_transform(&self) -> Affine2 {
        let width = self.padded_width.unwrap_or(self.source.width);
        rotation_about_center(width as f64, self.source.height as f64, self.rotation)
    }

    pub fn is_reference(&self, crop: &ReferenceCrop) -> bool {
        self.image_id == crop.reference_id
    }
}

/// Compute the effective crop of `image` under `crop`.
///
/// The reference image keeps the crop window exactly (padded back to its full
/// width when horizontal trimming is on). Every other image takes the vertical
/// window shifted by its adjustment and its own width minus the side trims.
/// Out-of-range offsets and trims are clamped, never rejected.
pub fn compute_effective_crop(
    image: &SourceImage,
    crop: &ReferenceCrop,
    adjustment: Option<&ImageAdjustment>,
) -> Result<EffectiveCropRegion> {
    if image.id == crop.reference_id {
        return reference_region(image, crop);
    }

    let adjustment = adjustment.copied().unwrap_or_default();
    let height = crop.height.min(image.height);
    let offset = clamp_vertical_offset(crop.y, height, image.height, adjustment.vertical_offset);
    if offset != adjustment.vertical_offset {
        log::debug!(
            "Clamped vertical offset for {:?} from {} to {}",
            image.id,
            adjustment.vertical_offset,
            offset
        );
    }

    let (left, right) = clamp_trims(adjustment.left_trim, adjustment.right_trim, image.width);
    let width = image.width - left - right;
    let y = (crop.y as i64 + offset) as u32;

    if width == 0 || height == 0 {
        return Err(LayoutError::InvalidCropBounds(format!(
            "{:?} resolves to an empty {}x{} region",
            image.id, width, height
        )));
    }

    Ok(EffectiveCropRegion {
        image_id: image.id,
        source: PixelRect::new(left, y, width, height),
        rotation: adjustment.rotation,
        padded_width: None,
    })
}

/// Region of the reference image: exactly the crop window.
///
/// Without horizontal trimming the window already spans the full width, so
/// the drawn horizontal extent is not applied to the reference raster either;
/// it survives only as `ReferenceCrop::selection`. With trimming on, the
/// window is sampled and padded back to the image width.
fn reference_region(image: &SourceImage, crop: &ReferenceCrop) -> Result<EffectiveCropRegion> {
    let window = crop.window();
    if window.width == 0 || window.height == 0 || !window.fits_within(image.width, image.height) {
        return Err(LayoutError::InvalidCropBounds(format!(
            "reference window {:?} does not fit a {}x{} image",
            window, image.width, image.height
        )));
    }

    let padded_width =
        (crop.horizontal_trim_enabled && window.width < image.width).then_some(image.width);

    Ok(EffectiveCropRegion {
        image_id: image.id,
        source: window,
        rotation: Rotation::None,
        padded_width,
    })
}
