//! Saving box crops and small file-name helpers.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use crate::detection::geometry::clamp_to_image;
use crate::error::{Error, Result};
use crate::models::LineRecord;

/// Extensions accepted as input frames.
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Fail on the first path that is not a png, jpg or jpeg image.
pub fn ensure_supported<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths.iter().map(|p| p.as_ref()) {
        if !is_supported_image(path) {
            return Err(Error::UnsupportedImage {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Replace the final extension of `path`. `ext` may carry a leading dot.
pub fn change_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext.trim_start_matches('.'))
}

/// Random file stem for intermediate images.
pub fn temp_filename() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Save one crop per record as `{stem}_{i}{ext}` in `out_dir`, where `i` is
/// the record's position in reading order and the name parts come from
/// `source`. Crops are grown by `margin` and clamped to the frame; records
/// that fall outside the frame are skipped. Returns the written paths.
pub fn save_box_images(
    source: &Path,
    frame: &DynamicImage,
    records: &[LineRecord],
    out_dir: &Path,
    margin: u32,
) -> Result<Vec<PathBuf>> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let Some((x, y, w, h)) =
            clamp_to_image(&record.rect.expand(margin as i32), frame.width(), frame.height())
        else {
            continue;
        };
        let path = out_dir.join(format!("{stem}_{i}{ext}"));
        frame.crop_imm(x, y, w, h).save(&path)?;
        debug!(path = %path.display(), "Saved box image");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;
    use image::{GenericImageView, GrayImage, Luma};

    #[test]
    fn supported_extensions_ignore_case() {
        assert!(is_supported_image(Path::new("a/frame.PNG")));
        assert!(is_supported_image(Path::new("frame.jpeg")));
        assert!(!is_supported_image(Path::new("frame.gif")));
        assert!(!is_supported_image(Path::new("frame")));
    }

    #[test]
    fn first_unsupported_input_is_reported() {
        assert!(ensure_supported(&["a.png", "b.JPG", "c.jpeg"]).is_ok());

        let err = ensure_supported(&["a.png", "notes.txt", "clip.gif"]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImage { path } if path == Path::new("notes.txt")));
    }

    #[test]
    fn change_extension_replaces_last_part() {
        assert_eq!(change_extension(Path::new("a.b.png"), ".jpg"), PathBuf::from("a.b.jpg"));
        assert_eq!(change_extension(Path::new("a.png"), "txt"), PathBuf::from("a.txt"));
    }

    #[test]
    fn temp_filenames_are_hex_and_unique() {
        let a = temp_filename();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, temp_filename());
    }

    #[test]
    fn crops_are_named_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let frame = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 50, Luma([0])));
        let records = [
            LineRecord { index: 1, rect: Rect::new(10, 10, 30, 20), center: 15 },
            LineRecord { index: 0, rect: Rect::new(0, 0, 5, 5), center: 15 },
        ];

        let paths =
            save_box_images(Path::new("/videos/shot.png"), &frame, &records, dir.path(), 2).unwrap();

        assert_eq!(paths, vec![dir.path().join("shot_0.png"), dir.path().join("shot_1.png")]);
        let first = image::open(&paths[0]).unwrap();
        assert_eq!(first.dimensions(), (24, 14));
        // Clamped at the frame's top-left corner.
        let second = image::open(&paths[1]).unwrap();
        assert_eq!(second.dimensions(), (7, 7));
    }
}
