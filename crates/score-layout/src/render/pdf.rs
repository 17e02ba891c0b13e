//! PDF output via printpdf

use crate::constants::{HELVETICA_CHAR_WIDTH_RATIO, PDF_IMAGE_DPI, TITLE_FONT_SIZE, mm_to_pt};
use crate::layout::{LayoutPlan, MmRect, PageLayout};
use crate::types::{RasterBuffer, Result};
use printpdf::*;

use super::check_rasters;

/// Render every page of `plan` into a PDF document.
///
/// Rasters are indexed by each placement's sequence index.
pub fn render_pdf(plan: &LayoutPlan, rasters: &[RasterBuffer]) -> Result<Vec<u8>> {
    check_rasters(plan, rasters)?;

    let mut doc = PdfDocument::new(plan.title.as_deref().unwrap_or("Score"));

    let mut pages = Vec::with_capacity(plan.pages.len());
    for page in &plan.pages {
        let mut ops = Vec::new();

        for placed in &page.items {
            let raster = &rasters[placed.sequence_index];
            let id = doc.add_image(&to_raw_image(raster));
            ops.push(Op::UseXobject {
                id,
                transform: image_transform(raster, &placed.rect, page),
            });
        }

        if page.index == 0 {
            if let (Some(title), Some(band)) = (plan.title.as_deref(), plan.title_rect()) {
                ops.extend(title_ops(title, &band, page));
            }
        }

        pages.push(PdfPage::new(Mm(page.width_mm), Mm(page.height_mm), ops));
    }

    doc.pages = pages;

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    for warning in &warnings {
        log::debug!("PDF warning: {:?}", warning);
    }

    Ok(bytes)
}

fn to_raw_image(raster: &RasterBuffer) -> RawImage {
    RawImage {
        pixels: RawImageData::U8(raster.pixels.as_raw().clone()),
        width: raster.width() as usize,
        height: raster.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    }
}

/// Place a raster into `rect` (top-left origin) on a bottom-up PDF page
fn image_transform(raster: &RasterBuffer, rect: &MmRect, page: &PageLayout) -> XObjectTransform {
    // Natural size of the image at the embedding resolution
    let natural_w = raster.width() as f32 * 72.0 / PDF_IMAGE_DPI;
    let natural_h = raster.height() as f32 * 72.0 / PDF_IMAGE_DPI;

    XObjectTransform {
        translate_x: Some(Pt(mm_to_pt(rect.x))),
        translate_y: Some(Pt(mm_to_pt(page.height_mm - rect.bottom()))),
        scale_x: Some(mm_to_pt(rect.width) / natural_w),
        scale_y: Some(mm_to_pt(rect.height) / natural_h),
        dpi: Some(PDF_IMAGE_DPI),
        ..Default::default()
    }
}

/// Centered title in the band at the top of the first page
fn title_ops(title: &str, band: &MmRect, page: &PageLayout) -> Vec<Op> {
    let text_width_pt =
        title.chars().count() as f32 * TITLE_FONT_SIZE * HELVETICA_CHAR_WIDTH_RATIO;
    let center_x_pt = mm_to_pt(band.x + band.width / 2.0);
    let x = (center_x_pt - text_width_pt / 2.0).max(mm_to_pt(band.x));
    let baseline = mm_to_pt(page.height_mm - band.y - band.height / 2.0) - TITLE_FONT_SIZE / 3.0;

    vec![
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point {
                x: Pt(x),
                y: Pt(baseline),
            },
        },
        Op::SetFontSizeBuiltinFont {
            font: BuiltinFont::Helvetica,
            size: Pt(TITLE_FONT_SIZE),
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(title.to_string())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
    ]
}
