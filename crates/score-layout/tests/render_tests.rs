use image::{Rgb, RgbImage};
use lopdf::{Document, Object};
use score_layout::*;

/// A page of "staff lines": white with dark horizontal bands
fn score_page(name: &str, width: u32, height: u32) -> SourceImage {
    let pixels = RgbImage::from_fn(width, height, |_, y| {
        if (y / 10) % 4 == 0 {
            Rgb([20, 20, 20])
        } else {
            Rgb([250, 250, 250])
        }
    });
    SourceImage::new(name, pixels)
}

fn session_with(count: usize, layout: LayoutConfig) -> SessionState {
    let mut session = SessionState::new();
    session.add_images((0..count).map(|i| score_page(&format!("page{}", i), 400, 560)));
    session
        .apply_reference_crop(Selection::new(0.0, 40.0, 400.0, 200.0), false)
        .unwrap();
    session.layout = layout;
    session
}

#[tokio::test]
async fn test_crop_all_keeps_order() {
    let mut session = session_with(3, LayoutConfig::default());
    session.set_rotation(2, Rotation::Clockwise90).unwrap();

    let rasters = crop_all(&session).await.unwrap();

    let ids: Vec<ImageId> = rasters.iter().map(|r| r.image_id).collect();
    assert_eq!(ids, session.images().ids());
    assert_eq!((rasters[0].width(), rasters[0].height()), (400, 200));
    assert_eq!((rasters[2].width(), rasters[2].height()), (200, 400));
}

#[tokio::test]
async fn test_pdf_page_count_matches_plan() {
    // 2:1 strips in one column on A4: 95 mm each, two per page
    let session = session_with(5, LayoutConfig::default());

    let prepared = prepare_layout(&session).await.unwrap();
    assert_eq!(prepared.plan.page_count(), 3);

    let bytes = export(&session).await.unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[tokio::test]
async fn test_unbounded_pdf_is_single_page() {
    let layout = LayoutConfig {
        page_size: PageSize::Unbounded,
        columns: 2,
        title: Some("Prelude".to_string()),
        ..Default::default()
    };
    let session = session_with(5, layout);

    let bytes = export(&session).await.unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

/// Text shown by `Tj` operators on the first page
fn first_page_text(doc: &Document) -> Vec<Vec<u8>> {
    let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
    let content = doc.get_and_decode_page_content(page_id).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_pdf_title_on_first_page() {
    let layout = LayoutConfig {
        title: Some("  Sonata  ".to_string()),
        ..Default::default()
    };
    let session = session_with(3, layout);

    let bytes = export(&session).await.unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    assert_eq!(doc.get_pages().len(), 2);
    assert_eq!(first_page_text(&doc), vec![b"Sonata".to_vec()]);
}

#[tokio::test]
async fn test_unprintable_title_fails_before_rendering() {
    let layout = LayoutConfig {
        title: Some("楽譜".to_string()),
        ..Default::default()
    };
    let session = session_with(1, layout);

    assert!(matches!(export(&session).await, Err(LayoutError::Config(_))));
}

#[tokio::test]
async fn test_png_output_is_flattened() {
    let mut session = session_with(3, LayoutConfig::default());
    session.render = RenderOptions {
        format: OutputFormat::Png,
        png_dpi: 25.4,
    };

    let bytes = export(&session).await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();

    // Two A4 pages stacked at 1 px per mm
    assert_eq!((decoded.width(), decoded.height()), (210, 594));
}

#[tokio::test]
async fn test_export_to_file() {
    use tempfile::TempDir;

    let session = session_with(2, LayoutConfig::default());
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("score.pdf");

    export_to_file(&session, &path).await.unwrap();

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    assert!(!dir.path().join("score.pdf.partial").exists());
}

#[tokio::test]
async fn test_export_without_crop_fails() {
    let mut session = SessionState::new();
    session.add_images([score_page("only", 100, 100)]);

    assert!(matches!(
        export(&session).await,
        Err(LayoutError::MissingReferenceCrop)
    ));
}

#[tokio::test]
async fn test_harmonized_export() {
    let layout = LayoutConfig {
        harmonize_aspect: true,
        ..Default::default()
    };
    let mut session = session_with(3, layout);
    session.set_left_trim(1, 100).unwrap();

    let prepared = prepare_layout(&session).await.unwrap();
    let widths: Vec<u32> = prepared.rasters.iter().map(|r| r.width()).collect();
    assert_eq!(widths, vec![400, 400, 400]);
}

#[tokio::test]
async fn test_load_images_rejects_unsupported_format() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let png = dir.path().join("a.png");
    let bmp = dir.path().join("b.bmp");
    score_page("a", 40, 30).pixels().save(&png).unwrap();
    score_page("b", 40, 30).pixels().save(&bmp).unwrap();

    let images = load_images(&[&png]).await.unwrap();
    assert_eq!(images[0].name, "a.png");
    assert_eq!((images[0].width, images[0].height), (40, 30));

    assert!(matches!(
        load_image(&bmp).await,
        Err(LayoutError::UnsupportedFormat(_))
    ));
}
