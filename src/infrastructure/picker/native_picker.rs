//! Photo picker backed by the native file dialog.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::entities::{ImageType, Locator, PickedImage};
use crate::domain::errors::PickerError;
use crate::domain::ports::PhotoPickerPort;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "heic"];

/// Opens the platform file dialog filtered to images.
#[derive(Debug, Clone, Default)]
pub struct NativePhotoPicker {
    start_dir: Option<PathBuf>,
}

impl NativePhotoPicker {
    /// Creates a picker opening in the dialog's default directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { start_dir: None }
    }

    /// Opens the dialog in `dir`.
    #[must_use]
    pub fn with_start_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl PhotoPickerPort for NativePhotoPicker {
    async fn pick_image(&self) -> Result<PickedImage, PickerError> {
        let start_dir = self.start_dir.clone();
        let chosen = tokio::task::spawn_blocking(move || {
            let mut dialog = rfd::FileDialog::new()
                .set_title("Add Photo")
                .add_filter("Images", IMAGE_EXTENSIONS);
            if let Some(dir) = start_dir {
                dialog = dialog.set_directory(dir);
            }
            dialog.pick_file()
        })
        .await
        .map_err(|e| PickerError::unavailable(e.to_string()))?;

        let Some(path) = chosen else {
            return Err(PickerError::Cancelled);
        };
        read_picked(&path).await
    }
}

/// Reads a picked file and checks that it holds an image.
///
/// # Errors
/// Returns error if the file cannot be read or is not a recognised image.
pub async fn read_picked(path: &Path) -> Result<PickedImage, PickerError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to read picked file");
        PickerError::read_failed(e.to_string())
    })?;

    let kind = match ImageType::sniff(&bytes) {
        ImageType::Unknown => ImageType::from_path(path),
        sniffed => sniffed,
    };
    if kind == ImageType::Unknown {
        return Err(PickerError::NotAnImage {
            path: path.display().to_string(),
        });
    }

    debug!(path = %path.display(), kind = %kind, bytes = bytes.len(), "Picked image");
    Ok(PickedImage::new(bytes, kind, Locator::from_path(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(2, 2)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_reads_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, png_bytes()).unwrap();

        let picked = read_picked(&path).await.unwrap();
        assert_eq!(picked.kind, ImageType::Png);
        assert_eq!(picked.locator, Locator::from_path(&path));
        assert_eq!(picked.locator.local_path(), Some(path));
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = read_picked(&path).await.unwrap_err();
        assert!(matches!(err, PickerError::NotAnImage { .. }));
    }

    #[tokio::test]
    async fn test_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.heic");
        std::fs::write(&path, b"not sniffable").unwrap();

        let picked = read_picked(&path).await.unwrap();
        assert_eq!(picked.kind, ImageType::Heic);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = read_picked(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PickerError::ReadFailed { .. }));
    }
}
