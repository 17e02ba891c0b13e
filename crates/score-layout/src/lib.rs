pub mod constants;
mod export;
pub mod geometry;
mod io;
pub mod layout;
mod options;
pub mod render;
mod session;
mod stats;
mod types;

pub use export::{
    PreparedLayout, build_plan, crop_all, export, export_to_file, prepare_layout, render_prepared,
};
pub use geometry::{
    EffectiveCropRegion, ImageAdjustment, ReferenceCrop, compute_effective_crop,
    compute_reference_crop, render_cropped_raster,
};
pub use io::{decode_image, load_image, load_images, save_output};
pub use layout::{LayoutItem, LayoutPlan, PageLayout, PlacedItem, plan_layout};
pub use options::*;
pub use render::{RenderOptions, render_output};
pub use session::*;
pub use stats::{LayoutStatistics, calculate_statistics};
pub use types::*;
