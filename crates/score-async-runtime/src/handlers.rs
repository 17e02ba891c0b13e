use crate::{ImageSummary, SessionUpdate};
use score_layout::render::flatten_pages;
use score_layout::{
    ImageAdjustment, LayoutConfig, PresetId, Result, SessionState, calculate_statistics,
    load_images, prepare_layout, render_prepared, save_output,
};
use std::path::PathBuf;
use tokio::sync::mpsc;

type UpdateSender = mpsc::UnboundedSender<SessionUpdate>;

fn send_error(update_tx: &UpdateSender, context: &str, error: impl std::fmt::Display) {
    log::warn!("{}: {}", context, error);
    let _ = update_tx.send(SessionUpdate::Error {
        message: format!("{}: {}", context, error),
    });
}

pub fn send_images(session: &SessionState, update_tx: &UpdateSender) {
    let images = session
        .images()
        .iter()
        .map(|image| ImageSummary {
            id: image.id,
            name: image.name.clone(),
            width: image.width,
            height: image.height,
        })
        .collect();
    let _ = update_tx.send(SessionUpdate::ImagesChanged { images });
}

pub async fn handle_load_images(
    paths: Vec<PathBuf>,
    session: &mut SessionState,
    update_tx: &UpdateSender,
) {
    match load_images(&paths).await {
        Ok(images) => {
            log::info!("Loaded {} image(s)", images.len());
            session.add_images(images);
            send_images(session, update_tx);
        }
        Err(e) => send_error(update_tx, "Failed to load images", e),
    }
}

/// Run a sequence edit and report the new order
pub fn handle_sequence_edit(
    session: &mut SessionState,
    update_tx: &UpdateSender,
    edit: impl FnOnce(&mut SessionState) -> Result<()>,
) {
    match edit(session) {
        Ok(()) => send_images(session, update_tx),
        Err(e) => send_error(update_tx, "Failed to edit image order", e),
    }
}

/// Run an adjustment edit and report the clamped result
pub fn handle_adjustment(
    index: usize,
    session: &mut SessionState,
    update_tx: &UpdateSender,
    edit: impl FnOnce(&mut SessionState) -> Result<ImageAdjustment>,
) {
    match edit(session) {
        Ok(adjustment) => {
            let _ = update_tx.send(SessionUpdate::AdjustmentChanged { index, adjustment });
        }
        Err(e) => send_error(update_tx, "Failed to adjust image", e),
    }
}

pub fn handle_reference_crop(
    selection: score_layout::Selection,
    horizontal_trim: bool,
    session: &mut SessionState,
    update_tx: &UpdateSender,
) {
    match session.apply_reference_crop(selection, horizontal_trim) {
        Ok(crop) => {
            let crop = *crop;
            let _ = update_tx.send(SessionUpdate::ReferenceCropApplied { crop });
        }
        Err(e) => send_error(update_tx, "Failed to apply reference crop", e),
    }
}

pub fn send_presets(session: &SessionState, update_tx: &UpdateSender) {
    let _ = update_tx.send(SessionUpdate::PresetsChanged {
        presets: session.presets().to_vec(),
    });
}

pub fn handle_apply_preset(
    id: PresetId,
    index: usize,
    session: &mut SessionState,
    update_tx: &UpdateSender,
) {
    handle_adjustment(index, session, update_tx, |s| s.apply_preset(id, index));
}

pub fn handle_set_layout(
    config: LayoutConfig,
    session: &mut SessionState,
    update_tx: &UpdateSender,
) {
    if let Err(e) = config.validate() {
        send_error(update_tx, "Invalid layout", e);
        return;
    }
    session.layout = config.clone();
    let _ = update_tx.send(SessionUpdate::LayoutChanged { config });
}

pub async fn handle_load_config(
    path: PathBuf,
    session: &mut SessionState,
    update_tx: &UpdateSender,
) {
    match LayoutConfig::load(&path).await {
        Ok(config) => handle_set_layout(config, session, update_tx),
        Err(e) => send_error(update_tx, "Failed to load configuration", e),
    }
}

pub async fn handle_save_config(path: PathBuf, session: &SessionState, update_tx: &UpdateSender) {
    match session.layout.save(&path).await {
        Ok(()) => {
            let _ = update_tx.send(SessionUpdate::ConfigSaved { path });
        }
        Err(e) => send_error(update_tx, "Failed to save configuration", e),
    }
}

pub async fn handle_calculate_stats(session: &SessionState, update_tx: &UpdateSender) {
    match prepare_layout(session).await {
        Ok(prepared) => {
            let stats = calculate_statistics(&prepared.plan);
            let _ = update_tx.send(SessionUpdate::StatsCalculated { stats });
        }
        Err(e) => send_error(update_tx, "Failed to calculate statistics", e),
    }
}

/// Flattened preview of the current layout
pub async fn render_preview(session: &SessionState, dpi: f32) -> Result<SessionUpdate> {
    let prepared = prepare_layout(session).await?;
    let page_count = prepared.plan.page_count();

    let canvas = tokio::task::spawn_blocking(move || {
        flatten_pages(&prepared.plan, &prepared.rasters, dpi)
    })
    .await??;

    Ok(SessionUpdate::PreviewGenerated {
        width: canvas.width(),
        height: canvas.height(),
        rgb_data: canvas.into_raw(),
        page_count,
    })
}

pub async fn handle_export(output_path: PathBuf, session: &SessionState, update_tx: &UpdateSender) {
    let result = async {
        let prepared = prepare_layout(session).await?;
        let page_count = prepared.plan.page_count();
        let bytes = render_prepared(prepared, session.render).await?;
        save_output(bytes, &output_path).await?;
        Ok::<_, score_layout::LayoutError>(page_count)
    }
    .await;

    match result {
        Ok(page_count) => {
            let _ = update_tx.send(SessionUpdate::ExportComplete {
                path: output_path,
                page_count,
            });
        }
        Err(e) => send_error(update_tx, "Failed to export", e),
    }
}
