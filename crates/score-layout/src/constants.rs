//! Shared constants for trimming and layout
//!
//! This module centralizes magic numbers and constants used throughout
//! the geometry and layout passes.

use image::Rgb;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Millimeters per CSS pixel (96 pixels per inch)
pub const MM_PER_PIXEL: f32 = 25.4 / 96.0;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert a pixel length (96 dpi) to millimeters
#[inline]
pub fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_PIXEL
}

// =============================================================================
// Cropping
// =============================================================================

/// Smallest crop extent accepted on either axis, in source pixels
pub const MIN_CROP_SIZE_PX: u32 = 10;

/// Fill colour for padded canvas areas
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// =============================================================================
// Page Layout
// =============================================================================

/// Default margin around the layout area (mm)
pub const DEFAULT_MARGIN_MM: f32 = 10.0;

/// Base width of an unbounded page when none is configured (A4 width)
pub const DEFAULT_UNBOUNDED_WIDTH_MM: f32 = 210.0;

/// Default gap for custom spacing (pixels)
pub const DEFAULT_CUSTOM_SPACING_PX: u32 = 10;

/// Height reserved for the title on the first page (mm)
pub const TITLE_BAND_MM: f32 = 15.0;

/// Tolerance used when comparing accumulated column heights (mm)
pub const LAYOUT_EPSILON_MM: f32 = 1e-3;

// =============================================================================
// Rendering
// =============================================================================

/// Font size of the title (points)
pub const TITLE_FONT_SIZE: f32 = 16.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Resolution at which rasters are embedded into the PDF before scaling
pub const PDF_IMAGE_DPI: f32 = 300.0;

/// Default resolution of flattened PNG output
pub const DEFAULT_PNG_DPI: f32 = 150.0;

/// Largest side of a flattened PNG canvas (pixels)
pub const MAX_FLATTENED_SIDE_PX: u32 = 30_000;
