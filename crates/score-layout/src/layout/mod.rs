//! Layout calculation for trimmed score strips
//!
//! This module handles the geometric calculations that turn a sequence of
//! cropped rasters into pages:
//! - Aspect-ratio harmonization (padding strips to a common width ratio)
//! - Column-major placement with vertical spacing
//! - Pagination for fixed page sizes, or a single growing page

mod harmonize;
mod planner;
mod types;

pub use harmonize::*;
pub use planner::*;
pub use types::*;
