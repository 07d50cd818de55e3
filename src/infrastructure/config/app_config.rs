//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::services::{DeleteMode, GridOptions};
use crate::infrastructure::image::{CacheCapacity, ImageLoaderConfig};

use super::args::CliArgs;

pub(super) const APP_NAME: &str = "photo-grid";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "probuilt";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Thumbnail cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Image loader configuration.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Grid configuration.
    #[serde(default)]
    pub grid: GridConfig,

    /// Demo data source configuration.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Thumbnail cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum decoded bytes held in memory.
    #[serde(default = "default_cache_bytes")]
    pub max_bytes: usize,

    /// Optional cap on the number of cached thumbnails.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    /// Converts to the cache's capacity bounds.
    #[must_use]
    pub const fn capacity(&self) -> CacheCapacity {
        CacheCapacity {
            max_bytes: self.max_bytes,
            max_entries: self.max_entries,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_cache_bytes(),
            max_entries: None,
        }
    }
}

/// Image loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum concurrent downloads.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Longest edge of decoded thumbnails in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    /// Abort downloads nobody is waiting for anymore.
    #[serde(default)]
    pub abort_unsubscribed: bool,
}

impl LoaderConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Converts to the loader's runtime configuration.
    #[must_use]
    pub const fn loader_config(&self) -> ImageLoaderConfig {
        ImageLoaderConfig {
            max_concurrent_fetches: self.max_concurrent_fetches,
            abort_unsubscribed: self.abort_unsubscribed,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            timeout_secs: default_timeout_secs(),
            thumbnail_size: default_thumbnail_size(),
            abort_unsubscribed: false,
        }
    }
}

/// Grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Initial number of columns.
    #[serde(default = "default_columns")]
    pub columns: u8,

    /// Smallest selectable column count.
    #[serde(default = "default_min_columns")]
    pub min_columns: u8,

    /// Largest selectable column count.
    #[serde(default = "default_max_columns")]
    pub max_columns: u8,

    /// Whether deleted cells disappear before or after the data source
    /// confirms.
    #[serde(default)]
    pub delete_mode: DeleteMode,
}

impl GridConfig {
    /// Converts to the presenter's grid options.
    #[must_use]
    pub const fn options(&self) -> GridOptions {
        GridOptions {
            columns: self.columns,
            column_range: self.min_columns..=self.max_columns,
            delete_mode: self.delete_mode,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            min_columns: default_min_columns(),
            max_columns: default_max_columns(),
            delete_mode: DeleteMode::default(),
        }
    }
}

/// Demo data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Photo ids shown in the demo gallery.
    #[serde(default = "default_demo_ids")]
    pub ids: Vec<i64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ids: default_demo_ids(),
        }
    }
}

const fn default_cache_bytes() -> usize {
    crate::infrastructure::image::memory_cache::DEFAULT_CACHE_BYTES
}

const fn default_max_concurrent_fetches() -> usize {
    4
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_thumbnail_size() -> u32 {
    400
}

const fn default_columns() -> u8 {
    3
}

const fn default_min_columns() -> u8 {
    1
}

const fn default_max_columns() -> u8 {
    8
}

fn default_demo_ids() -> Vec<i64> {
    (10..22).collect()
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(columns) = args.columns {
            self.grid.columns = columns;
        }
        if let Some(delete_mode) = args.delete_mode {
            self.grid.delete_mode = delete_mode;
        }
        if let Some(cache_mb) = args.cache_mb {
            self.cache.max_bytes = cache_mb.saturating_mul(1024 * 1024);
        }
        if let Some(max_entries) = args.cache_entries {
            self.cache.max_entries = Some(max_entries);
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.loader.timeout_secs = timeout_secs;
        }
        if let Some(ids) = args.ids {
            self.demo.ids = ids;
        }
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("photo-grid.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            cache: CacheConfig::default(),
            loader: LoaderConfig::default(),
            grid: GridConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}
