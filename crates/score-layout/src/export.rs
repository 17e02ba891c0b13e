//! End-to-end pipeline: crop every image, plan the layout, render output
//!
//! Cropping runs one blocking task per image; planning is a single
//! sequential pass; rendering runs on a blocking task so callers on an
//! async runtime are never stalled.

use crate::geometry::render_cropped_raster;
use crate::io::save_output;
use crate::layout::{LayoutItem, LayoutPlan, harmonize_rasters, plan_layout};
use crate::options::LayoutConfig;
use crate::render::{RenderOptions, render_output};
use crate::session::SessionState;
use crate::types::*;
use std::path::Path;

/// Cropped rasters together with their placements
#[derive(Debug, Clone)]
pub struct PreparedLayout {
    /// One raster per image, in sequence order
    pub rasters: Vec<RasterBuffer>,
    pub plan: LayoutPlan,
}

/// Crop every image of the session in parallel, keeping sequence order
pub async fn crop_all(session: &SessionState) -> Result<Vec<RasterBuffer>> {
    let regions = session.effective_regions()?;

    let tasks: Vec<_> = session
        .images()
        .iter()
        .cloned()
        .zip(regions)
        .map(|(image, region)| {
            tokio::task::spawn_blocking(move || render_cropped_raster(&image, &region))
        })
        .collect();

    let mut rasters = Vec::with_capacity(tasks.len());
    for task in tasks {
        rasters.push(task.await??);
    }
    Ok(rasters)
}

/// Harmonize (if enabled) and plan the layout of already cropped rasters
pub fn build_plan(rasters: Vec<RasterBuffer>, config: &LayoutConfig) -> Result<PreparedLayout> {
    let rasters = if config.harmonize_aspect {
        harmonize_rasters(rasters, config.harmonize_pad)
    } else {
        rasters
    };

    let items: Vec<LayoutItem> = rasters.iter().map(LayoutItem::from_raster).collect();
    let plan = plan_layout(&items, config)?;
    Ok(PreparedLayout { rasters, plan })
}

/// Crop and plan the current session
pub async fn prepare_layout(session: &SessionState) -> Result<PreparedLayout> {
    session.layout.validate()?;

    let rasters = crop_all(session).await?;
    let config = session.layout.clone();
    tokio::task::spawn_blocking(move || build_plan(rasters, &config)).await?
}

/// Render a prepared layout on a blocking task
pub async fn render_prepared(prepared: PreparedLayout, options: RenderOptions) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || render_output(&prepared.plan, &prepared.rasters, &options))
        .await?
}

/// Produce the output document for the session
pub async fn export(session: &SessionState) -> Result<Vec<u8>> {
    let prepared = prepare_layout(session).await?;
    let pages = prepared.plan.page_count();
    let bytes = render_prepared(prepared, session.render).await?;

    log::info!(
        "Exported {} images on {} page(s) as {:?} ({} bytes)",
        session.images().len(),
        pages,
        session.render.format,
        bytes.len()
    );
    Ok(bytes)
}

/// Export the session and write it to `path`
pub async fn export_to_file(session: &SessionState, path: impl AsRef<Path>) -> Result<()> {
    let bytes = export(session).await?;
    save_output(bytes, path).await
}
