//! Geometry engine for cropping source images
//!
//! This module turns one reference crop plus per-image adjustments into the
//! pixel regions that are actually sampled:
//! - Reference crop selection and clamping
//! - Per-image adjustments (vertical offset, side trims, rotation)
//! - Effective crop regions
//! - Quarter-turn rotation transforms
//! - Cropped raster rendering

mod adjustment;
mod crop;
mod raster;
mod region;
mod rotation;

pub use adjustment::*;
pub use crop::*;
pub use raster::*;
pub use region::*;
pub use rotation::*;
