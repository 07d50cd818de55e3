//! Application configuration.

pub mod app_config;
/// Command-line arguments.
pub mod args;
/// Config file location and persistence.
pub mod storage;

pub use app_config::{AppConfig, CacheConfig, DemoConfig, GridConfig, LoaderConfig, LogLevel};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
