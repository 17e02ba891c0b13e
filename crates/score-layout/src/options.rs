use crate::constants::{DEFAULT_MARGIN_MM, DEFAULT_UNBOUNDED_WIDTH_MM, TITLE_BAND_MM, px_to_mm};
use crate::geometry::ImageAdjustment;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gap between items as a fraction of the item's rendered height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpacingFraction {
    Sixteenth,
    Eighth,
    Quarter,
}

impl SpacingFraction {
    pub fn factor(self) -> f32 {
        match self {
            SpacingFraction::Sixteenth => 1.0 / 16.0,
            SpacingFraction::Eighth => 1.0 / 8.0,
            SpacingFraction::Quarter => 1.0 / 4.0,
        }
    }
}

/// Vertical spacing between successive items in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpacingMode {
    #[default]
    None,
    Fraction(SpacingFraction),
    /// Fixed gap in pixels (96 dpi)
    CustomPixels(u32),
}

impl SpacingMode {
    /// Resolve the gap placed above an item of the given rendered height
    pub fn resolve_mm(self, item_height_mm: f32) -> f32 {
        match self {
            SpacingMode::None => 0.0,
            SpacingMode::Fraction(fraction) => item_height_mm * fraction.factor(),
            SpacingMode::CustomPixels(px) => px_to_mm(px as f32),
        }
    }
}

/// Page layout configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    // Page
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margin_mm: f32,
    /// Usable width (inside margins) of an unbounded page
    pub unbounded_width_mm: f32,

    // Flow
    pub columns: usize,
    pub spacing: SpacingMode,

    // Title on the first page
    pub title: Option<String>,

    // Aspect-ratio harmonization
    pub harmonize_aspect: bool,
    pub harmonize_pad: PadSide,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: DEFAULT_MARGIN_MM,
            unbounded_width_mm: DEFAULT_UNBOUNDED_WIDTH_MM,
            columns: 1,
            spacing: SpacingMode::None,
            title: None,
            harmonize_aspect: false,
            harmonize_pad: PadSide::Right,
        }
    }
}

impl LayoutConfig {
    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Page width and (for fixed pages) height, orientation applied.
    ///
    /// An unbounded page is as wide as its base width plus both margins.
    pub fn page_dimensions_mm(&self) -> (f32, Option<f32>) {
        match self.page_size.dimensions_with_orientation(self.orientation) {
            Some((w, h)) => (w, Some(h)),
            None => (self.unbounded_width_mm + 2.0 * self.margin_mm, None),
        }
    }

    /// Width available to the columns
    pub fn usable_width_mm(&self) -> f32 {
        let (width, _) = self.page_dimensions_mm();
        width - 2.0 * self.margin_mm
    }

    /// Title text, if one is set and not blank
    pub fn title_text(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Height reserved for the title on the first page
    pub fn title_band_mm(&self) -> f32 {
        if self.title_text().is_some() {
            TITLE_BAND_MM
        } else {
            0.0
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(LayoutError::DegenerateLayout(
                "Column count must be at least 1".to_string(),
            ));
        }

        if !(self.margin_mm >= 0.0) {
            return Err(LayoutError::Config(format!(
                "Margin must be non-negative, got {}",
                self.margin_mm
            )));
        }

        match self.page_size {
            PageSize::Custom {
                width_mm,
                height_mm,
            } if !(width_mm > 0.0 && height_mm > 0.0) => {
                return Err(LayoutError::Config(format!(
                    "Custom page size must be positive, got {}x{} mm",
                    width_mm, height_mm
                )));
            }
            PageSize::Unbounded if !(self.unbounded_width_mm > 0.0) => {
                return Err(LayoutError::Config(format!(
                    "Unbounded page width must be positive, got {} mm",
                    self.unbounded_width_mm
                )));
            }
            _ => {}
        }

        if let Some(title) = self.title_text() {
            if let Some(c) = title.chars().find(|c| !is_builtin_font_char(*c)) {
                return Err(LayoutError::Config(format!(
                    "Title character {:?} cannot be drawn with the built-in PDF font",
                    c
                )));
            }
        }

        let (width, height) = self.page_dimensions_mm();
        if width - 2.0 * self.margin_mm <= 0.0 {
            return Err(LayoutError::DegenerateLayout(format!(
                "Margins of {} mm leave no room on a {} mm wide page",
                self.margin_mm, width
            )));
        }
        if let Some(height) = height {
            if height - 2.0 * self.margin_mm - self.title_band_mm() <= 0.0 {
                return Err(LayoutError::DegenerateLayout(format!(
                    "Margins and title leave no room on a {} mm tall page",
                    height
                )));
            }
        }

        Ok(())
    }
}

/// Characters that print unchanged with the built-in Helvetica font.
///
/// Title text is emitted byte for byte, so only printable ASCII survives.
fn is_builtin_font_char(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Adjustment for the image at `index` in the sequence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdjustmentEntry {
    pub index: usize,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub adjustment: ImageAdjustment,
}

/// Per-image adjustments stored alongside a layout
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdjustmentFile {
    pub adjustments: Vec<AdjustmentEntry>,
}

impl AdjustmentFile {
    /// Load adjustments from JSON file
    #[cfg(feature = "serde")]
    ///
    /// Rotations are given in degrees; anything but a quarter turn fails with
    /// `UnsupportedRotation`.
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let raw: RawAdjustmentFile = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse adjustments: {}", e)))?;

        let adjustments = raw
            .adjustments
            .into_iter()
            .map(|entry| {
                Ok(AdjustmentEntry {
                    index: entry.index,
                    adjustment: ImageAdjustment {
                        rotation: Rotation::from_degrees(entry.rotation)?,
                        vertical_offset: entry.vertical_offset,
                        left_trim: entry.left_trim,
                        right_trim: entry.right_trim,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { adjustments })
    }
}

/// On-disk form of an adjustment file, rotation still in raw degrees
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawAdjustmentFile {
    adjustments: Vec<RawAdjustmentEntry>,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawAdjustmentEntry {
    index: usize,
    #[serde(default)]
    rotation: i32,
    #[serde(default)]
    vertical_offset: i64,
    #[serde(default)]
    left_trim: u32,
    #[serde(default)]
    right_trim: u32,
}
