//! Image resource locator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

const FILE_SCHEME: &str = "file://";

/// Opaque key identifying an image resource.
///
/// Used both as the cache key and as the de-duplication key for in-flight
/// fetches. Cloning is cheap; the underlying string is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator(Arc<str>);

impl Locator {
    /// Creates a locator from any string-like input.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Arc::from(value.into()))
    }

    /// Creates a `file://` locator for a local path.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self::new(format!("{FILE_SCHEME}{}", path.display()))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the local path if this locator points at the filesystem.
    ///
    /// Both `file://` locators and bare absolute paths count as local.
    #[must_use]
    pub fn local_path(&self) -> Option<PathBuf> {
        if let Some(rest) = self.0.strip_prefix(FILE_SCHEME) {
            return Some(PathBuf::from(rest));
        }
        let path = Path::new(&*self.0);
        path.is_absolute().then(|| path.to_path_buf())
    }

    /// Returns true if the locator is fetched over the network.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.local_path().is_none()
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_equality_and_hash_key() {
        let a = Locator::new("https://picsum.photos/200/300");
        let b = Locator::from("https://picsum.photos/200/300");
        let mut set = std::collections::HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_file_locator_round_trips_path() {
        let path = Path::new("/tmp/photos/cat.png");
        let locator = Locator::from_path(path);
        assert_eq!(locator.as_str(), "file:///tmp/photos/cat.png");
        assert_eq!(locator.local_path(), Some(path.to_path_buf()));
        assert!(!locator.is_remote());
    }

    #[test]
    fn test_http_locator_is_remote() {
        let locator = Locator::new("https://example.com/a.jpg");
        assert!(locator.local_path().is_none());
        assert!(locator.is_remote());
    }
}
