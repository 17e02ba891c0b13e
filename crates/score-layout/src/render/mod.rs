//! Output rendering
//!
//! Turns a `LayoutPlan` plus the cropped rasters into output bytes:
//! - PDF pages with the rasters embedded as image XObjects
//! - A single flattened PNG with every page stacked top to bottom

mod pdf;
mod png;

pub use pdf::render_pdf;
pub use png::{flatten_pages, render_png};

use crate::constants::DEFAULT_PNG_DPI;
use crate::layout::LayoutPlan;
use crate::types::{LayoutError, OutputFormat, RasterBuffer, Result};

/// Settings for the output stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Resolution of flattened PNG output
    pub png_dpi: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pdf,
            png_dpi: DEFAULT_PNG_DPI,
        }
    }
}

/// Render `plan` in the requested format
pub fn render_output(
    plan: &LayoutPlan,
    rasters: &[RasterBuffer],
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Pdf => render_pdf(plan, rasters),
        OutputFormat::Png => render_png(plan, rasters, options.png_dpi),
    }
}

/// Check that every placement has a matching raster
pub(crate) fn check_rasters(plan: &LayoutPlan, rasters: &[RasterBuffer]) -> Result<()> {
    for placed in plan.placements() {
        match rasters.get(placed.sequence_index) {
            Some(raster) if raster.image_id == placed.image_id => {}
            Some(raster) => {
                return Err(LayoutError::RenderFailure(format!(
                    "Raster {} belongs to {:?}, expected {:?}",
                    placed.sequence_index, raster.image_id, placed.image_id
                )));
            }
            None => {
                return Err(LayoutError::RenderFailure(format!(
                    "No raster for item {} ({} provided)",
                    placed.sequence_index,
                    rasters.len()
                )));
            }
        }
    }
    Ok(())
}
