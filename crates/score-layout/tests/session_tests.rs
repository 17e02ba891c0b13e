use image::RgbImage;
use score_layout::*;

fn image(name: &str, width: u32, height: u32) -> SourceImage {
    SourceImage::new(name, RgbImage::new(width, height))
}

/// Three 1000x1400 pages cropped to y=100, height=1200
fn cropped_session() -> SessionState {
    let mut session = SessionState::new();
    session.add_images([
        image("p1", 1000, 1400),
        image("p2", 1000, 1400),
        image("p3", 1000, 1400),
    ]);
    session
        .apply_reference_crop(Selection::new(0.0, 100.0, 1000.0, 1200.0), false)
        .unwrap();
    session
}

#[test]
fn test_reference_crop_uses_first_image() {
    let session = cropped_session();
    let crop = session.reference_crop().unwrap();

    assert_eq!(crop.reference_id, session.images().as_slice()[0].id);
    assert_eq!(crop.window(), PixelRect::new(0, 100, 1000, 1200));
}

#[test]
fn test_reference_crop_requires_images() {
    let mut session = SessionState::new();
    let result = session.apply_reference_crop(Selection::new(0.0, 0.0, 10.0, 10.0), false);
    assert!(matches!(result, Err(LayoutError::EmptyInput)));
}

#[test]
fn test_adjustment_requires_reference_crop() {
    let mut session = SessionState::new();
    session.add_images([image("a", 100, 100), image("b", 100, 100)]);

    assert!(matches!(
        session.set_vertical_offset(1, 10),
        Err(LayoutError::MissingReferenceCrop)
    ));
    assert!(matches!(
        session.effective_regions(),
        Err(LayoutError::MissingReferenceCrop)
    ));
}

#[test]
fn test_reference_image_cannot_be_adjusted() {
    let mut session = cropped_session();
    assert!(matches!(
        session.set_vertical_offset(0, 10),
        Err(LayoutError::Config(_))
    ));
}

#[test]
fn test_offsets_are_clamped() {
    let mut session = cropped_session();

    let adjustment = session.set_vertical_offset(1, 1400).unwrap();
    assert_eq!(adjustment.vertical_offset, 100);

    let adjustment = session.set_vertical_offset(2, -500).unwrap();
    assert_eq!(adjustment.vertical_offset, -100);

    let regions = session.effective_regions().unwrap();
    assert_eq!(regions[1].source, PixelRect::new(0, 200, 1000, 1200));
    assert_eq!(regions[2].source, PixelRect::new(0, 0, 1000, 1200));
}

#[test]
fn test_trims_respect_minimum_width() {
    let mut session = cropped_session();

    session.set_left_trim(1, 600).unwrap();
    let adjustment = session.set_right_trim(1, 600).unwrap();
    assert_eq!(adjustment.left_trim, 600);
    assert_eq!(adjustment.right_trim, 390);

    let regions = session.effective_regions().unwrap();
    assert_eq!(regions[1].source.width, 10);
}

#[test]
fn test_rotation_steps_wrap() {
    let mut session = cropped_session();

    assert_eq!(
        session.rotate_counter_clockwise(1).unwrap().rotation,
        Rotation::Clockwise270
    );
    assert_eq!(session.rotate_clockwise(1).unwrap().rotation, Rotation::None);
    for _ in 0..3 {
        session.rotate_clockwise(2).unwrap();
    }
    assert_eq!(session.adjustment(2).unwrap().rotation, Rotation::Clockwise270);
}

#[test]
fn test_adjustments_follow_images_when_reordered() {
    let mut session = cropped_session();
    session.set_vertical_offset(2, 50).unwrap();
    let moved_id = session.images().as_slice()[2].id;

    session.swap_up(2).unwrap();

    assert_eq!(session.images().as_slice()[1].id, moved_id);
    assert_eq!(session.adjustment(1).unwrap().vertical_offset, 50);
    assert_eq!(session.adjustment(2).unwrap().vertical_offset, 0);
}

#[test]
fn test_removing_reference_clears_crop() {
    let mut session = cropped_session();
    session.remove_image(0).unwrap();
    assert!(session.reference_crop().is_none());
}

#[test]
fn test_delete_keeps_last_image() {
    let mut session = SessionState::new();
    session.add_images([image("a", 50, 50), image("b", 50, 50)]);

    assert!(session.delete_image_keep_one(0).unwrap());
    assert!(!session.delete_image_keep_one(0).unwrap());
    assert_eq!(session.images().len(), 1);
    assert_eq!(session.images().as_slice()[0].name, "b");
}

#[test]
fn test_duplicate_shares_raster_with_fresh_id() {
    let mut session = cropped_session();
    session.set_vertical_offset(1, 30).unwrap();

    session.duplicate_image(1).unwrap();

    let images = session.images().as_slice();
    assert_eq!(images.len(), 4);
    assert_eq!(images[2].name, "p2 (copy)");
    assert_ne!(images[2].id, images[1].id);
    assert!(std::ptr::eq(images[1].pixels(), images[2].pixels()));
    assert_eq!(session.adjustment(2).unwrap().vertical_offset, 30);
}

#[test]
fn test_reference_copy_is_an_ordinary_image() {
    let mut session = SessionState::new();
    session.add_images([image("p1", 1000, 1400), image("p2", 1000, 1400)]);
    session
        .apply_reference_crop(Selection::new(200.0, 100.0, 500.0, 1200.0), true)
        .unwrap();

    session.duplicate_image(0).unwrap();

    let regions = session.effective_regions().unwrap();
    assert_eq!(regions[0].source, PixelRect::new(200, 100, 500, 1200));
    assert_eq!(regions[0].padded_width, Some(1000));
    assert_eq!(regions[1].source, PixelRect::new(0, 100, 1000, 1200));
    assert_eq!(regions[1].padded_width, None);

    let adjustment = session.set_vertical_offset(1, 50).unwrap();
    assert_eq!(adjustment.vertical_offset, 50);
}

#[test]
fn test_recrop_reclamps_adjustments() {
    let mut session = cropped_session();
    session.set_vertical_offset(1, 100).unwrap();

    // Window now reaches the bottom edge: no room to move down
    session
        .apply_reference_crop(Selection::new(0.0, 200.0, 1000.0, 1200.0), false)
        .unwrap();

    assert_eq!(session.adjustment(1).unwrap().vertical_offset, 0);
}

#[test]
fn test_presets() {
    let mut session = cropped_session();
    let low = session.add_preset("Low", 80);
    let auto = session.add_preset("", -20);

    assert_eq!(session.presets()[1].name, "Preset 2");

    assert!(session.update_preset(low, Some("Lower"), Some(1000)));
    assert_eq!(session.presets()[0].name, "Lower");

    // Applied through the same clamping as interactive offsets
    let adjustment = session.apply_preset(low, 1).unwrap();
    assert_eq!(adjustment.vertical_offset, 100);

    assert!(session.remove_preset(auto));
    assert!(!session.remove_preset(auto));
    assert!(matches!(
        session.apply_preset(auto, 1),
        Err(LayoutError::Config(_))
    ));
}

#[test]
fn test_wizard_navigation() {
    let mut session = SessionState::new();
    session.add_images([image("solo", 20, 20)]);

    assert_eq!(session.next_step(), WizardStep::Order);
    assert_eq!(session.next_step(), WizardStep::ReferenceCrop);
    assert_eq!(session.next_step(), WizardStep::Layout);
    assert_eq!(session.prev_step(), WizardStep::ReferenceCrop);

    session.add_images([image("second", 20, 20)]);
    assert_eq!(session.next_step(), WizardStep::Adjust);
}
