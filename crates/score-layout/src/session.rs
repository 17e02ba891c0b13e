//! In-memory session state
//!
//! A `SessionState` owns the ordered working set of images, the reference
//! crop, per-image adjustments and the layout settings. It is passed
//! explicitly to the geometry and layout passes; nothing here is global.

use crate::geometry::{
    EffectiveCropRegion, ImageAdjustment, ReferenceCrop, compute_effective_crop,
    compute_reference_crop,
};
use crate::options::LayoutConfig;
use crate::render::RenderOptions;
use crate::types::*;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Image Sequence
// =============================================================================

/// Ordered set of source images with value semantics.
///
/// Every edit returns a new sequence and leaves `self` untouched. Cloning is
/// cheap because rasters are shared.
#[derive(Debug, Clone, Default)]
pub struct ImageSequence {
    images: Vec<SourceImage>,
}

impl ImageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SourceImage> {
        self.images.get(index)
    }

    pub fn first(&self) -> Option<&SourceImage> {
        self.images.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceImage> {
        self.images.iter()
    }

    pub fn as_slice(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.images.iter().position(|image| image.id == id)
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.images.iter().map(|image| image.id).collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.images.len() {
            Ok(())
        } else {
            Err(LayoutError::IndexOutOfRange {
                index,
                len: self.images.len(),
            })
        }
    }

    /// Insert `image` at `index` (`index == len` appends)
    pub fn insert_at(&self, index: usize, image: SourceImage) -> Result<Self> {
        if index > self.images.len() {
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        let mut images = self.images.clone();
        images.insert(index, image);
        Ok(Self { images })
    }

    pub fn remove_at(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let mut images = self.images.clone();
        images.remove(index);
        Ok(Self { images })
    }

    /// Move the image at `from` so it sits directly before the image
    /// currently at `before`. `before == len` moves it to the end.
    pub fn move_before(&self, from: usize, before: usize) -> Result<Self> {
        self.check_index(from)?;
        if before > self.images.len() {
            return Err(LayoutError::IndexOutOfRange {
                index: before,
                len: self.images.len(),
            });
        }

        let mut images = self.images.clone();
        let image = images.remove(from);
        let target = if before > from { before - 1 } else { before };
        images.insert(target, image);
        Ok(Self { images })
    }

    /// Append several images in order
    pub fn push_many(&self, new_images: impl IntoIterator<Item = SourceImage>) -> Self {
        let mut images = self.images.clone();
        images.extend(new_images);
        Self { images }
    }

    /// Swap with the previous image. The first image stays put.
    pub fn swap_up(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let mut images = self.images.clone();
        if index > 0 {
            images.swap(index - 1, index);
        }
        Ok(Self { images })
    }

    /// Swap with the next image. The last image stays put.
    pub fn swap_down(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let mut images = self.images.clone();
        if index + 1 < images.len() {
            images.swap(index, index + 1);
        }
        Ok(Self { images })
    }

    /// Insert a copy of the image at `index` right after it
    pub fn duplicate_at(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let copy = self.images[index].duplicate();
        self.insert_at(index + 1, copy)
    }
}

impl From<Vec<SourceImage>> for ImageSequence {
    fn from(images: Vec<SourceImage>) -> Self {
        Self { images }
    }
}

// =============================================================================
// Wizard Steps
// =============================================================================

/// Steps of the trimming workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WizardStep {
    #[default]
    Upload,
    Order,
    ReferenceCrop,
    Adjust,
    Layout,
    Output,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Upload,
        WizardStep::Order,
        WizardStep::ReferenceCrop,
        WizardStep::Adjust,
        WizardStep::Layout,
        WizardStep::Output,
    ];

    /// Next step. Adjusting is skipped when there is only one image.
    pub fn next(self, image_count: usize) -> Self {
        match self {
            WizardStep::Upload => WizardStep::Order,
            WizardStep::Order => WizardStep::ReferenceCrop,
            WizardStep::ReferenceCrop if image_count <= 1 => WizardStep::Layout,
            WizardStep::ReferenceCrop => WizardStep::Adjust,
            WizardStep::Adjust => WizardStep::Layout,
            WizardStep::Layout | WizardStep::Output => WizardStep::Output,
        }
    }

    /// Previous step, with the same skip rule as `next`
    pub fn prev(self, image_count: usize) -> Self {
        match self {
            WizardStep::Upload | WizardStep::Order => WizardStep::Upload,
            WizardStep::ReferenceCrop => WizardStep::Order,
            WizardStep::Adjust => WizardStep::ReferenceCrop,
            WizardStep::Layout if image_count <= 1 => WizardStep::ReferenceCrop,
            WizardStep::Layout => WizardStep::Adjust,
            WizardStep::Output => WizardStep::Layout,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Upload => "Upload",
            WizardStep::Order => "Order",
            WizardStep::ReferenceCrop => "Reference crop",
            WizardStep::Adjust => "Adjust",
            WizardStep::Layout => "Layout",
            WizardStep::Output => "Output",
        }
    }
}

// =============================================================================
// Vertical Offset Presets
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PresetId(pub u64);

/// A named vertical offset that can be applied to any image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct YAxisPreset {
    pub id: PresetId,
    pub name: String,
    pub y_offset: i64,
}

// =============================================================================
// Session State
// =============================================================================

/// Complete working state of one trimming session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    images: ImageSequence,
    reference_crop: Option<ReferenceCrop>,
    adjustments: HashMap<ImageId, ImageAdjustment>,
    presets: Vec<YAxisPreset>,
    next_preset_id: u64,
    step: WizardStep,
    pub layout: LayoutConfig,
    pub render: RenderOptions,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &ImageSequence {
        &self.images
    }

    pub fn reference_crop(&self) -> Option<&ReferenceCrop> {
        self.reference_crop.as_ref()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn set_step(&mut self, step: WizardStep) {
        self.step = step;
    }

    pub fn next_step(&mut self) -> WizardStep {
        self.step = self.step.next(self.images.len());
        self.step
    }

    pub fn prev_step(&mut self) -> WizardStep {
        self.step = self.step.prev(self.images.len());
        self.step
    }

    /// Adjustment of the image at `index` (all zero if never edited)
    pub fn adjustment(&self, index: usize) -> Result<ImageAdjustment> {
        let image = self.image_at(index)?;
        Ok(self.adjustments.get(&image.id).copied().unwrap_or_default())
    }

    fn image_at(&self, index: usize) -> Result<&SourceImage> {
        self.images.get(index).ok_or(LayoutError::IndexOutOfRange {
            index,
            len: self.images.len(),
        })
    }

    /// Drop state that refers to images no longer in the sequence
    fn replace_images(&mut self, images: ImageSequence) {
        self.images = images;

        let ids = self.images.ids();
        self.adjustments.retain(|id, _| ids.contains(id));

        if let Some(crop) = &self.reference_crop {
            if !ids.contains(&crop.reference_id) {
                log::info!("Reference image removed, clearing reference crop");
                self.reference_crop = None;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Sequence editing
    // -------------------------------------------------------------------------

    pub fn add_images(&mut self, images: impl IntoIterator<Item = SourceImage>) {
        let images = self.images.push_many(images);
        self.replace_images(images);
    }

    pub fn insert_image(&mut self, index: usize, image: SourceImage) -> Result<()> {
        let images = self.images.insert_at(index, image)?;
        self.replace_images(images);
        Ok(())
    }

    pub fn remove_image(&mut self, index: usize) -> Result<()> {
        let images = self.images.remove_at(index)?;
        self.replace_images(images);
        Ok(())
    }

    /// Remove an image unless it is the last one left.
    ///
    /// Returns whether anything was removed.
    pub fn delete_image_keep_one(&mut self, index: usize) -> Result<bool> {
        self.image_at(index)?;
        if self.images.len() <= 1 {
            return Ok(false);
        }
        self.remove_image(index)?;
        Ok(true)
    }

    pub fn move_image(&mut self, from: usize, before: usize) -> Result<()> {
        let images = self.images.move_before(from, before)?;
        self.replace_images(images);
        Ok(())
    }

    pub fn swap_up(&mut self, index: usize) -> Result<()> {
        let images = self.images.swap_up(index)?;
        self.replace_images(images);
        Ok(())
    }

    pub fn swap_down(&mut self, index: usize) -> Result<()> {
        let images = self.images.swap_down(index)?;
        self.replace_images(images);
        Ok(())
    }

    /// Duplicate the image at `index`; the copy inherits its adjustment.
    ///
    /// The copy has its own id, so a copy of the reference image is an
    /// ordinary image: it takes the shared vertical window at full width
    /// (no horizontal trim or padding) and can be adjusted like any other.
    pub fn duplicate_image(&mut self, index: usize) -> Result<()> {
        let source_id = self.image_at(index)?.id;
        let images = self.images.duplicate_at(index)?;
        let copy_id = images.as_slice()[index + 1].id;

        if let Some(adjustment) = self.adjustments.get(&source_id).copied() {
            self.adjustments.insert(copy_id, adjustment);
        }
        self.replace_images(images);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cropping
    // -------------------------------------------------------------------------

    /// Define the reference crop on the first image.
    ///
    /// Replaces any previous crop. Existing adjustments are kept and
    /// re-clamped against the new window.
    pub fn apply_reference_crop(
        &mut self,
        selection: Selection,
        horizontal_trim_enabled: bool,
    ) -> Result<&ReferenceCrop> {
        let reference = self.images.first().ok_or(LayoutError::EmptyInput)?;
        let crop = compute_reference_crop(reference, selection, horizontal_trim_enabled)?;

        for image in self.images.iter() {
            if let Some(adjustment) = self.adjustments.get_mut(&image.id) {
                *adjustment = adjustment.clamped(&crop, image.width, image.height);
            }
        }
        self.adjustments.remove(&crop.reference_id);

        Ok(self.reference_crop.insert(crop))
    }

    /// Apply `edit` to the adjustment of a non-reference image, then clamp it
    fn update_adjustment(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut ImageAdjustment, &SourceImage),
    ) -> Result<ImageAdjustment> {
        let crop = self.reference_crop.ok_or(LayoutError::MissingReferenceCrop)?;
        let image = self.image_at(index)?.clone();
        if image.id == crop.reference_id {
            return Err(LayoutError::Config(
                "The reference image cannot be adjusted; redo the reference crop instead"
                    .to_string(),
            ));
        }

        let mut adjustment = self.adjustments.get(&image.id).copied().unwrap_or_default();
        edit(&mut adjustment, &image);
        let clamped = adjustment.clamped(&crop, image.width, image.height);
        if clamped != adjustment {
            log::warn!("Adjustment for {} clamped to {:?}", image.name, clamped);
        }

        self.adjustments.insert(image.id, clamped);
        Ok(clamped)
    }

    /// Replace the whole adjustment of the image at `index`
    pub fn set_adjustment(
        &mut self,
        index: usize,
        adjustment: ImageAdjustment,
    ) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |current, _| *current = adjustment)
    }

    pub fn set_vertical_offset(&mut self, index: usize, offset: i64) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |adjustment, _| adjustment.vertical_offset = offset)
    }

    pub fn set_left_trim(&mut self, index: usize, value: u32) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |adjustment, image| {
            adjustment.set_left_trim(value, image.width)
        })
    }

    pub fn set_right_trim(&mut self, index: usize, value: u32) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |adjustment, image| {
            adjustment.set_right_trim(value, image.width)
        })
    }

    pub fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |adjustment, _| adjustment.rotation = rotation)
    }

    pub fn rotate_clockwise(&mut self, index: usize) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |adjustment, _| {
            adjustment.rotation = adjustment.rotation.rotate_clockwise()
        })
    }

    pub fn rotate_counter_clockwise(&mut self, index: usize) -> Result<ImageAdjustment> {
        self.update_adjustment(index, |adjustment, _| {
            adjustment.rotation = adjustment.rotation.rotate_counter_clockwise()
        })
    }

    /// Effective crop of every image, in sequence order
    pub fn effective_regions(&self) -> Result<Vec<EffectiveCropRegion>> {
        if self.images.is_empty() {
            return Err(LayoutError::EmptyInput);
        }
        let crop = self.reference_crop.as_ref().ok_or(LayoutError::MissingReferenceCrop)?;

        self.images
            .iter()
            .map(|image| compute_effective_crop(image, crop, self.adjustments.get(&image.id)))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Presets
    // -------------------------------------------------------------------------

    pub fn presets(&self) -> &[YAxisPreset] {
        &self.presets
    }

    /// Add a preset. A blank name becomes "Preset N".
    pub fn add_preset(&mut self, name: &str, y_offset: i64) -> PresetId {
        self.next_preset_id += 1;
        let id = PresetId(self.next_preset_id);
        let name = match name.trim() {
            "" => format!("Preset {}", self.presets.len() + 1),
            trimmed => trimmed.to_string(),
        };
        self.presets.push(YAxisPreset { id, name, y_offset });
        id
    }

    pub fn remove_preset(&mut self, id: PresetId) -> bool {
        let before = self.presets.len();
        self.presets.retain(|preset| preset.id != id);
        self.presets.len() != before
    }

    /// Rename and/or change the offset of a preset
    pub fn update_preset(
        &mut self,
        id: PresetId,
        name: Option<&str>,
        y_offset: Option<i64>,
    ) -> bool {
        let Some(preset) = self.presets.iter_mut().find(|preset| preset.id == id) else {
            return false;
        };
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            preset.name = name.to_string();
        }
        if let Some(y_offset) = y_offset {
            preset.y_offset = y_offset;
        }
        true
    }

    /// Set the vertical offset of the image at `index` from a preset
    pub fn apply_preset(&mut self, id: PresetId, index: usize) -> Result<ImageAdjustment> {
        let offset = self
            .presets
            .iter()
            .find(|preset| preset.id == id)
            .map(|preset| preset.y_offset)
            .ok_or_else(|| LayoutError::Config(format!("Unknown preset {:?}", id)))?;
        self.set_vertical_offset(index, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn image(name: &str) -> SourceImage {
        SourceImage::new(name, RgbImage::new(20, 20))
    }

    fn names(seq: &ImageSequence) -> Vec<String> {
        seq.iter().map(|image| image.name.clone()).collect()
    }

    fn abc() -> ImageSequence {
        ImageSequence::new().push_many([image("a"), image("b"), image("c")])
    }

    #[test]
    fn test_edits_leave_original_untouched() {
        let seq = abc();
        let removed = seq.remove_at(1).unwrap();

        assert_eq!(names(&seq), ["a", "b", "c"]);
        assert_eq!(names(&removed), ["a", "c"]);
    }

    #[test]
    fn test_move_before() {
        let seq = abc();
        assert_eq!(names(&seq.move_before(2, 0).unwrap()), ["c", "a", "b"]);
        assert_eq!(names(&seq.move_before(0, 2).unwrap()), ["b", "a", "c"]);
        assert_eq!(names(&seq.move_before(0, 3).unwrap()), ["b", "c", "a"]);
        assert_eq!(names(&seq.move_before(1, 1).unwrap()), ["a", "b", "c"]);
    }

    #[test]
    fn test_swap_at_edges_is_noop() {
        let seq = abc();
        assert_eq!(names(&seq.swap_up(0).unwrap()), ["a", "b", "c"]);
        assert_eq!(names(&seq.swap_down(2).unwrap()), ["a", "b", "c"]);
        assert_eq!(names(&seq.swap_up(2).unwrap()), ["a", "c", "b"]);
    }

    #[test]
    fn test_out_of_range() {
        let seq = abc();
        assert!(matches!(
            seq.remove_at(3),
            Err(LayoutError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(seq.insert_at(4, image("d")).is_err());
        assert!(seq.insert_at(3, image("d")).is_ok());
    }

    #[test]
    fn test_wizard_skips_adjust_for_single_image() {
        assert_eq!(WizardStep::ReferenceCrop.next(1), WizardStep::Layout);
        assert_eq!(WizardStep::ReferenceCrop.next(2), WizardStep::Adjust);
        assert_eq!(WizardStep::Layout.prev(1), WizardStep::ReferenceCrop);
        assert_eq!(WizardStep::Layout.prev(3), WizardStep::Adjust);
        assert_eq!(WizardStep::Output.next(3), WizardStep::Output);
        assert_eq!(WizardStep::Upload.prev(3), WizardStep::Upload);
    }

    #[test]
    fn test_preset_auto_name() {
        let mut session = SessionState::new();
        session.add_preset("", 10);
        session.add_preset("Low", 40);
        session.add_preset("  ", 20);

        let names: Vec<&str> = session.presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Preset 1", "Low", "Preset 3"]);
    }
}
