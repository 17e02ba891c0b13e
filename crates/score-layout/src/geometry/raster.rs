//! Cropped raster rendering
//!
//! Produces new buffers from a source image and an effective crop region.
//! The source raster is never modified.

use crate::constants::WHITE;
use crate::types::{LayoutError, PadSide, RasterBuffer, Result, Rotation, SourceImage};
use image::{RgbImage, imageops};

use super::EffectiveCropRegion;

/// Crop, pad and rotate `image` according to `region`.
///
/// When the region carries a padded width, the cropped content is moved to
/// x=0 and the rest of the canvas is filled white.
pub fn render_cropped_raster(
    image: &SourceImage,
    region: &EffectiveCropRegion,
) -> Result<RasterBuffer> {
    let source = region.source;
    if source.width == 0 || source.height == 0 || !source.fits_within(image.width, image.height) {
        return Err(LayoutError::InvalidCropBounds(format!(
            "region {:?} does not fit a {}x{} image",
            source, image.width, image.height
        )));
    }

    let cropped =
        imageops::crop_imm(image.pixels(), source.x, source.y, source.width, source.height)
            .to_image();

    let canvas = match region.padded_width {
        Some(width) if width > source.width => pad_to_width(&cropped, width, PadSide::Right),
        _ => cropped,
    };

    Ok(RasterBuffer {
        image_id: region.image_id,
        pixels: rotate_raster(canvas, region.rotation),
    })
}

/// Rotate a raster clockwise by a quarter turn multiple
pub fn rotate_raster(raster: RgbImage, rotation: Rotation) -> RgbImage {
    match rotation {
        Rotation::None => raster,
        Rotation::Clockwise90 => imageops::rotate90(&raster),
        Rotation::Clockwise180 => imageops::rotate180(&raster),
        Rotation::Clockwise270 => imageops::rotate270(&raster),
    }
}

/// Place `raster` on a white canvas `width` pixels wide.
/// Rasters already at least that wide are returned unchanged.
pub fn pad_to_width(raster: &RgbImage, width: u32, side: PadSide) -> RgbImage {
    if width <= raster.width() {
        return raster.clone();
    }

    let mut canvas = RgbImage::from_pixel(width, raster.height(), WHITE);
    let offset = side.content_offset(width - raster.width());
    imageops::replace(&mut canvas, raster, offset as i64, 0);
    canvas
}
