use std::path::PathBuf;

mod handlers;
mod worker;

pub use worker::{WorkerHandle, spawn_worker, worker_task};

// Re-export types from the library crate
pub use score_layout::{
    ImageAdjustment, ImageId, LayoutConfig, LayoutStatistics, PresetId, ReferenceCrop,
    RenderOptions, Selection, WizardStep, YAxisPreset,
};

/// Commands sent from the front end to the worker
#[derive(Debug)]
pub enum SessionCommand {
    LoadImages {
        paths: Vec<PathBuf>,
    },
    RemoveImage {
        index: usize,
    },
    MoveImage {
        from: usize,
        before: usize,
    },
    SwapUp {
        index: usize,
    },
    SwapDown {
        index: usize,
    },
    DuplicateImage {
        index: usize,
    },
    ApplyReferenceCrop {
        selection: Selection,
        horizontal_trim: bool,
    },
    SetAdjustment {
        index: usize,
        adjustment: ImageAdjustment,
    },
    RotateClockwise {
        index: usize,
    },
    RotateCounterClockwise {
        index: usize,
    },
    AddPreset {
        name: String,
        y_offset: i64,
    },
    RemovePreset {
        id: PresetId,
    },
    ApplyPreset {
        id: PresetId,
        index: usize,
    },
    SetLayout {
        config: LayoutConfig,
    },
    SetRenderOptions {
        options: RenderOptions,
    },
    LoadConfig {
        path: PathBuf,
    },
    SaveConfig {
        path: PathBuf,
    },
    NextStep,
    PrevStep,
    CalculateStats,
    /// Render a flattened preview. Queued previews are coalesced.
    GeneratePreview {
        dpi: f32,
    },
    Export {
        output_path: PathBuf,
    },
}

/// Summary of one image in the working set
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub id: ImageId,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    ImagesChanged {
        images: Vec<ImageSummary>,
    },
    ReferenceCropApplied {
        crop: ReferenceCrop,
    },
    AdjustmentChanged {
        index: usize,
        adjustment: ImageAdjustment,
    },
    PresetsChanged {
        presets: Vec<YAxisPreset>,
    },
    LayoutChanged {
        config: LayoutConfig,
    },
    RenderOptionsChanged {
        options: RenderOptions,
    },
    ConfigSaved {
        path: PathBuf,
    },
    StepChanged {
        step: WizardStep,
    },
    StatsCalculated {
        stats: LayoutStatistics,
    },
    PreviewGenerated {
        width: u32,
        height: u32,
        rgb_data: Vec<u8>,
        page_count: usize,
    },
    ExportComplete {
        path: PathBuf,
        page_count: usize,
    },
    Error {
        message: String,
    },
}
