//! Network and filesystem image fetcher.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::domain::entities::{ImagePayload, ImageType, Locator};
use crate::domain::errors::LoadError;
use crate::domain::ports::{ImageFetcherPort, LoadResult};

/// Fetches images over HTTP (or from local `file://` locators) and decodes
/// them, optionally downscaling to a maximum edge length.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    max_dimension: Option<u32>,
}

impl HttpImageFetcher {
    /// Creates a fetcher with its own HTTP client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(timeout: Duration, max_dimension: Option<u32>) -> LoadResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, max_dimension))
    }

    /// Creates a fetcher sharing an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, max_dimension: Option<u32>) -> Self {
        Self {
            client,
            max_dimension,
        }
    }

    /// Downloads image bytes from a URL.
    async fn download(&self, url: &str) -> LoadResult<(Bytes, Option<String>)> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::network(format!("Request timed out: {e}"))
            } else {
                LoadError::network(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(LoadError::not_found(format!("HTTP {status} for {url}")));
        }
        if !status.is_success() {
            return Err(LoadError::network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::network(format!("Failed to read body: {e}")))?;

        Ok((bytes, content_type))
    }

    async fn read_local(path: &Path) -> LoadResult<Bytes> {
        tokio::fs::read(path).await.map(Bytes::from).map_err(|e| {
            LoadError::not_found(format!("Cannot read {}: {e}", path.display()))
        })
    }
}

#[async_trait::async_trait]
impl ImageFetcherPort for HttpImageFetcher {
    async fn fetch(&self, locator: &Locator) -> LoadResult {
        let (bytes, content_type) = if let Some(path) = locator.local_path() {
            trace!(path = %path.display(), "Reading local image");
            let kind = ImageType::from_path(&path);
            let bytes = Self::read_local(&path).await?;
            let content_type = (kind != ImageType::Unknown).then(|| kind.mime().to_string());
            (bytes, content_type)
        } else {
            debug!(locator = %locator, "Downloading image from network");
            self.download(locator.as_str()).await?
        };

        let max_dimension = self.max_dimension;
        tokio::task::spawn_blocking(move || decode(&bytes, content_type.as_deref(), max_dimension))
            .await
            .map_err(|e| LoadError::decode(format!("Decode task panicked: {e}")))?
    }
}

/// Decodes encoded image bytes, downscaling so neither edge exceeds
/// `max_dimension`.
///
/// # Errors
/// Returns [`LoadError::DecodeFailure`] if the bytes are not a supported image.
pub fn decode(
    bytes: &[u8],
    content_type: Option<&str>,
    max_dimension: Option<u32>,
) -> LoadResult {
    let kind = content_type
        .map(ImageType::from_content_type)
        .filter(|kind| *kind != ImageType::Unknown)
        .unwrap_or_else(|| ImageType::sniff(bytes));

    let img = image::load_from_memory(bytes)
        .map_err(|e| LoadError::decode(format!("Failed to decode image: {e}")))?;

    let img = match max_dimension {
        Some(max) if img.width() > max || img.height() > max => {
            img.resize(max, max, image::imageops::FilterType::Lanczos3)
        }
        _ => img,
    };

    Ok(ImagePayload::new(img, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let payload = decode(&png_bytes(12, 6), None, None).unwrap();
        assert_eq!((payload.width(), payload.height()), (12, 6));
        assert_eq!(payload.kind(), ImageType::Png);
    }

    #[test]
    fn test_decode_downscales_preserving_aspect() {
        let payload = decode(&png_bytes(40, 20), Some("image/png"), Some(10)).unwrap();
        assert_eq!((payload.width(), payload.height()), (10, 5));
    }

    #[test]
    fn test_decode_small_image_untouched() {
        let payload = decode(&png_bytes(8, 8), None, Some(400)).unwrap();
        assert_eq!((payload.width(), payload.height()), (8, 8));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not pixels", Some("image/jpeg"), None).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailure { .. }));
    }

    #[tokio::test]
    async fn test_fetch_local_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png_bytes(5, 3))?;

        let fetcher = HttpImageFetcher::new(Duration::from_secs(5), None)?;
        let payload = fetcher.fetch(&Locator::from_path(&path)).await?;

        assert_eq!((payload.width(), payload.height()), (5, 3));
        assert_eq!(payload.kind(), ImageType::Png);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_missing_local_file_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::TempDir::new()?;
        let fetcher = HttpImageFetcher::new(Duration::from_secs(5), None)?;

        let err = fetcher
            .fetch(&Locator::from_path(&dir.path().join("missing.png")))
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::NotFound { .. }));
        Ok(())
    }
}
