//! Image and output file I/O

use crate::types::*;
use image::ImageFormat;
use std::path::Path;

/// Decode an uploaded file. Only JPEG and PNG are accepted.
pub fn decode_image(name: impl Into<String>, bytes: &[u8]) -> Result<SourceImage> {
    let name = name.into();
    let format = image::guess_format(bytes)
        .map_err(|_| LayoutError::UnsupportedFormat(format!("{}: unrecognized data", name)))?;

    match format {
        ImageFormat::Jpeg | ImageFormat::Png => {}
        other => {
            return Err(LayoutError::UnsupportedFormat(format!(
                "{}: {:?}",
                name, other
            )));
        }
    }

    let pixels = image::load_from_memory_with_format(bytes, format)?.to_rgb8();
    log::debug!(
        "Decoded {} ({}x{} {:?})",
        name,
        pixels.width(),
        pixels.height(),
        format
    );
    Ok(SourceImage::new(name, pixels))
}

/// Load a single image file
pub async fn load_image(path: impl AsRef<Path>) -> Result<SourceImage> {
    let path = path.as_ref().to_owned();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = tokio::fs::read(&path).await?;
    let image = tokio::task::spawn_blocking(move || decode_image(name, &bytes)).await??;
    Ok(image)
}

/// Load multiple image files, keeping their order
pub async fn load_images(paths: &[impl AsRef<Path>]) -> Result<Vec<SourceImage>> {
    let mut images = Vec::new();
    for path in paths {
        images.push(load_image(path).await?);
    }
    Ok(images)
}

/// Write rendered output.
///
/// Bytes go to a sibling temporary file first, so a failed write never
/// leaves a partial document at `path`.
pub async fn save_output(bytes: Vec<u8>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");

    tokio::fs::write(&partial, bytes).await?;
    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let image = RgbImage::from_pixel(12, 8, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let image = decode_image("page.png", &encode(ImageFormat::Png)).unwrap();
        assert_eq!((image.width, image.height), (12, 8));
        assert_eq!(image.name, "page.png");
    }

    #[test]
    fn test_decode_jpeg() {
        let image = decode_image("page.jpg", &encode(ImageFormat::Jpeg)).unwrap();
        assert_eq!((image.width, image.height), (12, 8));
    }

    #[test]
    fn test_reject_other_formats() {
        let bmp = encode(ImageFormat::Bmp);
        assert!(matches!(
            decode_image("page.bmp", &bmp),
            Err(LayoutError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode_image("notes.txt", b"just some text"),
            Err(LayoutError::UnsupportedFormat(_))
        ));
    }
}
