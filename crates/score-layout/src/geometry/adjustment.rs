//! Per-image adjustments relative to the reference crop

use crate::constants::MIN_CROP_SIZE_PX;
use crate::types::Rotation;

use super::ReferenceCrop;

/// Interactive adjustments for one non-reference image.
///
/// All fields default to zero; values are clamped against the image and the
/// reference crop whenever they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImageAdjustment {
    /// Quarter-turn rotation about the crop's center
    pub rotation: Rotation,
    /// Signed pixel delta added to the reference crop's `y`
    pub vertical_offset: i64,
    /// Pixels removed from the image's left edge
    pub left_trim: u32,
    /// Pixels removed from the image's right edge
    pub right_trim: u32,
}

impl ImageAdjustment {
    /// Return a copy whose offset and trims are legal for an image of the
    /// given size under `crop`. Clamping is idempotent.
    pub fn clamped(self, crop: &ReferenceCrop, width: u32, height: u32) -> Self {
        let window_height = crop.height.min(height);
        let vertical_offset =
            clamp_vertical_offset(crop.y, window_height, height, self.vertical_offset);
        let (left_trim, right_trim) = clamp_trims(self.left_trim, self.right_trim, width);

        Self {
            rotation: self.rotation,
            vertical_offset,
            left_trim,
            right_trim,
        }
    }

    /// Set the left trim, bounded by the current right trim
    pub fn set_left_trim(&mut self, value: u32, width: u32) {
        self.left_trim = value.min(max_trim(width, self.right_trim));
    }

    /// Set the right trim, bounded by the current left trim
    pub fn set_right_trim(&mut self, value: u32, width: u32) {
        self.right_trim = value.min(max_trim(width, self.left_trim));
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Largest trim on one side given the trim on the other side
fn max_trim(width: u32, other: u32) -> u32 {
    width
        .saturating_sub(other)
        .saturating_sub(MIN_CROP_SIZE_PX.min(width))
}

/// Clamp a vertical offset so that the window `[crop_y + offset, crop_y + offset + crop_height)`
/// stays inside `[0, source_height]`.
pub fn clamp_vertical_offset(
    crop_y: u32,
    crop_height: u32,
    source_height: u32,
    offset: i64,
) -> i64 {
    let min = -(crop_y as i64);
    let max = source_height as i64 - crop_y as i64 - crop_height as i64;
    if max < min {
        // Window taller than the image: pin it to the top edge
        return min;
    }
    offset.clamp(min, max)
}

/// Clamp left/right trims so at least the minimum crop width survives.
/// The left trim is honored first.
pub fn clamp_trims(left: u32, right: u32, source_width: u32) -> (u32, u32) {
    let budget = source_width.saturating_sub(MIN_CROP_SIZE_PX.min(source_width));
    let left = left.min(budget);
    let right = right.min(budget - left);
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_offset_within_range_untouched() {
        assert_eq!(clamp_vertical_offset(100, 1200, 1400, 50), 50);
        assert_eq!(clamp_vertical_offset(100, 1200, 1400, -100), -100);
    }

    #[test]
    fn test_vertical_offset_clamped_at_bottom() {
        // Offset of a full image height lands the window flush with the bottom
        let offset = clamp_vertical_offset(100, 1200, 1400, 1400);
        assert_eq!(offset, 100);
        assert_eq!(100 + offset + 1200, 1400);
    }

    #[test]
    fn test_vertical_offset_clamped_at_top() {
        assert_eq!(clamp_vertical_offset(100, 1200, 1400, -500), -100);
    }

    #[test]
    fn test_trims_keep_minimum_width() {
        assert_eq!(clamp_trims(600, 600, 1000), (600, 390));
        assert_eq!(clamp_trims(2000, 0, 1000), (990, 0));
        assert_eq!(clamp_trims(5, 5, 8), (0, 0));
    }

    #[test]
    fn test_set_trims_respect_each_other() {
        let mut adjustment = ImageAdjustment::default();
        adjustment.set_right_trim(300, 1000);
        adjustment.set_left_trim(900, 1000);
        assert_eq!(adjustment.left_trim, 690);

        adjustment.set_right_trim(900, 1000);
        assert_eq!(adjustment.right_trim, 300);
    }
}
