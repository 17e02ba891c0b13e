use crate::constants::MIN_CROP_SIZE_PX;
use image::RgbImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid crop bounds: {0}")]
    InvalidCropBounds(String),
    #[error("Unsupported rotation: {0} degrees")]
    UnsupportedRotation(i32),
    #[error("No images to lay out")]
    EmptyInput,
    #[error("Degenerate layout: {0}")]
    DegenerateLayout(String),
    #[error("Render failure: {0}")]
    RenderFailure(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Reference crop has not been applied")]
    MissingReferenceCrop,
    #[error("Index {index} is out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Output page size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Custom {
        width_mm: f32,
        height_mm: f32,
    },
    /// A single page that grows to fit every item
    Unbounded,
}

impl PageSize {
    /// Get base dimensions (always portrait for the presets).
    /// Unbounded pages have no fixed dimensions.
    pub fn dimensions_mm(self) -> Option<(f32, f32)> {
        match self {
            PageSize::A3 => Some((297.0, 420.0)),
            PageSize::A4 => Some((210.0, 297.0)),
            PageSize::A5 => Some((148.0, 210.0)),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => Some((width_mm, height_mm)),
            PageSize::Unbounded => None,
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> Option<(f32, f32)> {
        let (w, h) = self.dimensions_mm()?;
        Some(match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        })
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, PageSize::Unbounded)
    }
}

/// Quarter-turn rotation applied to a cropped image.
///
/// Serialized as clockwise degrees (0, 90, 180 or 270).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Parse a rotation given in degrees. Only exact quarter turns are accepted.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Clockwise180),
            270 => Ok(Rotation::Clockwise270),
            other => Err(LayoutError::UnsupportedRotation(other)),
        }
    }

    pub fn rotate_clockwise(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise90,
            Rotation::Clockwise90 => Rotation::Clockwise180,
            Rotation::Clockwise180 => Rotation::Clockwise270,
            Rotation::Clockwise270 => Rotation::None,
        }
    }

    pub fn rotate_counter_clockwise(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise270,
            Rotation::Clockwise90 => Rotation::None,
            Rotation::Clockwise180 => Rotation::Clockwise90,
            Rotation::Clockwise270 => Rotation::Clockwise180,
        }
    }

    /// True for quarter turns that exchange width and height
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = LayoutError;

    fn try_from(degrees: i32) -> Result<Self> {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of an image in the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageId(pub u64);

impl ImageId {
    pub fn next() -> Self {
        ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::SeqCst))
    }
}

/// A decoded source image.
///
/// The raster is shared read-only; cloning a `SourceImage` never copies pixels.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: ImageId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    data: Arc<RgbImage>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, data: RgbImage) -> Self {
        let (width, height) = data.dimensions();
        Self {
            id: ImageId::next(),
            name: name.into(),
            width,
            height,
            data: Arc::new(data),
        }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.data
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Copy that shares the raster but carries a fresh id
    pub fn duplicate(&self) -> Self {
        Self {
            id: ImageId::next(),
            name: format!("{} (copy)", self.name),
            width: self.width,
            height: self.height,
            data: Arc::clone(&self.data),
        }
    }
}

/// An axis-aligned rectangle in source pixel space (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate (exclusive)
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate (exclusive)
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// True when the rectangle lies inside a `width` x `height` raster
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// True when both sides reach the minimum crop size (or the whole axis)
    pub fn meets_minimum(&self, width: u32, height: u32) -> bool {
        self.width >= MIN_CROP_SIZE_PX.min(width) && self.height >= MIN_CROP_SIZE_PX.min(height)
    }
}

/// A rectangle drawn by the user, in source pixel space.
///
/// Values may be fractional or fall outside the image; they are clamped when
/// the reference crop is computed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Selection {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Cropped (and possibly rotated or padded) raster produced for one image
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    pub image_id: ImageId,
    pub pixels: RgbImage,
}

impl RasterBuffer {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width() as f64 / self.height() as f64
    }
}

/// Which side receives blank margin when an image is widened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PadSide {
    /// Content stays left-justified, white margin on the right
    #[default]
    Right,
    /// Content is pushed right, white margin on the left
    Left,
    /// Margin split evenly between both sides
    Center,
}

impl PadSide {
    /// Horizontal offset of the content inside a canvas `extra` pixels wider
    pub fn content_offset(self, extra: u32) -> u32 {
        match self {
            PadSide::Right => 0,
            PadSide::Left => extra,
            PadSide::Center => extra / 2,
        }
    }
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputFormat {
    /// Paginated PDF document
    #[default]
    Pdf,
    /// Single flattened PNG of every page
    Png,
}
