//! Decoded image payloads and their encoded formats.

use std::path::Path;
use std::sync::Arc;

/// Encoded format of an image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageType {
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
    /// GIF image.
    Gif,
    /// WebP image.
    Webp,
    /// HEIC/HEIF image (common for phone cameras).
    Heic,
    /// Format could not be determined.
    #[default]
    Unknown,
}

impl ImageType {
    /// Derives the type from a file extension, case-insensitively.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "webp" => Self::Webp,
            "heic" | "heif" => Self::Heic,
            _ => Self::Unknown,
        }
    }

    /// Derives the type from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    /// Derives the type from a MIME content type such as `image/png`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/gif" => Self::Gif,
            "image/webp" => Self::Webp,
            "image/heic" | "image/heif" => Self::Heic,
            _ => Self::Unknown,
        }
    }

    /// Sniffs the type from encoded bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Jpeg) => Self::Jpeg,
            Ok(image::ImageFormat::Png) => Self::Png,
            Ok(image::ImageFormat::Gif) => Self::Gif,
            Ok(image::ImageFormat::WebP) => Self::Webp,
            _ => Self::Unknown,
        }
    }

    /// Returns the MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Heic => "image/heic",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// Returns the canonical file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Heic => "heic",
            Self::Unknown => "bin",
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// A decoded image ready for display.
///
/// The pixel buffer is shared; clones are cheap and read-only.
#[derive(Clone)]
pub struct ImagePayload {
    image: Arc<image::DynamicImage>,
    kind: ImageType,
}

impl ImagePayload {
    /// Wraps a decoded image.
    #[must_use]
    pub fn new(image: image::DynamicImage, kind: ImageType) -> Self {
        Self {
            image: Arc::new(image),
            kind,
        }
    }

    /// Returns the decoded image.
    #[must_use]
    pub fn image(&self) -> &image::DynamicImage {
        &self.image
    }

    /// Returns the source format.
    #[must_use]
    pub const fn kind(&self) -> ImageType {
        self.kind
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Estimated memory footprint of the decoded buffer.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.image.as_bytes().len()
    }

    /// Returns true if both payloads share the same pixel buffer.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("kind", &self.kind)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}
