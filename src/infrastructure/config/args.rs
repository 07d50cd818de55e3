use super::app_config::LogLevel;
use crate::application::services::DeleteMode;
use clap::Parser;
use std::path::PathBuf;

/// Command-line overrides for [`AppConfig`](super::AppConfig).
#[derive(Debug, Parser)]
#[command(
    name = "photo-grid",
    version,
    about = "A terminal photo grid with cached async thumbnails",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Initial number of grid columns.
    #[arg(long)]
    pub columns: Option<u8>,

    /// When deleted cells disappear from the grid.
    #[arg(long, value_enum)]
    pub delete_mode: Option<DeleteMode>,

    /// Thumbnail cache budget in MiB.
    #[arg(long, value_name = "MIB")]
    pub cache_mb: Option<usize>,

    /// Maximum number of cached thumbnails.
    #[arg(long)]
    pub cache_entries: Option<usize>,

    /// Image request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Photo ids shown by the demo gallery.
    #[arg(long, value_delimiter = ',')]
    pub ids: Option<Vec<i64>>,
}
