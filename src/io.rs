// ============================================================================
// IMAGE I/O — decoding sources and encoding graded results
// ============================================================================
//
// Thin wrappers around the `image` crate. The pipeline itself never touches
// the filesystem; these helpers are the collaborator seam used by both the
// CLI and the GUI.
// ============================================================================

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    WebP,
    Bmp,
}

impl SaveFormat {
    /// Parse a user-facing format name (CLI `--format` values).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Infer a format from a file extension, if recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_name)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
        }
    }
}

/// Decode any supported image file into RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("could not decode '{}': {}", path.display(), e))?;
    Ok(img.into_rgba8())
}

/// Encode and write a graded buffer. JPEG honors `quality` (1–100); the
/// other formats ignore it.
pub fn save_image(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), String> {
    match format {
        SaveFormat::Jpeg => {
            // JPEG has no alpha channel; graded output is opaque anyway
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            let file = File::create(path)
                .map_err(|e| format!("could not create '{}': {}", path.display(), e))?;
            let writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(writer, quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(|e| format!("JPEG encode failed: {}", e))
        }
        _ => {
            // png / webp / bmp: the crate picks the codec from the extension,
            // so make sure the path carries the right one
            let path = path.with_extension(format.extension());
            image
                .save(&path)
                .map_err(|e| format!("could not write '{}': {}", path.display(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!(SaveFormat::from_name("PNG"), Some(SaveFormat::Png));
        assert_eq!(SaveFormat::from_name("jpg"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_name("jpeg"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_name("tiff"), None);
        assert_eq!(
            SaveFormat::from_path(Path::new("out/photo.WebP")),
            Some(SaveFormat::WebP)
        );
        assert_eq!(SaveFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn png_round_trip_through_disk() {
        let dir = std::env::temp_dir().join("filterfe_io_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.png");

        let img = RgbaImage::from_fn(10, 6, |x, y| {
            image::Rgba([x as u8 * 20, y as u8 * 40, 7, 255])
        });
        save_image(&img, &path, SaveFormat::Png, 90).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back.as_raw(), img.as_raw());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_reports_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.contains("not/here.png"));
    }
}
