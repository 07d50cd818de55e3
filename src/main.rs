use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use directories::UserDirs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use photo_grid::application::{DetailPresenter, GridPresenter};
use photo_grid::domain::ports::ImageFetcherPort;
use photo_grid::infrastructure::{
    AppConfig, CliArgs, DemoDataSource, HttpImageFetcher, ImageLoader, MemoryImageCache,
    NativePhotoPicker, StorageManager, TimeoutFetcher,
};
use photo_grid::presentation::App;
use photo_grid::presentation::widgets::ImageManager;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_app(config: &AppConfig, images: ImageManager) -> Result<App> {
    let cache = Arc::new(MemoryImageCache::new(config.cache.capacity()));

    let thumbnails: Arc<dyn ImageFetcherPort> = Arc::new(TimeoutFetcher::new(
        Arc::new(HttpImageFetcher::new(
            config.loader.timeout(),
            Some(config.loader.thumbnail_size),
        )?),
        config.loader.timeout(),
    ));
    let originals: Arc<dyn ImageFetcherPort> =
        Arc::new(HttpImageFetcher::new(config.loader.timeout(), None)?);

    let loader = ImageLoader::new(config.loader.loader_config(), cache.clone(), thumbnails);
    let data_source = Arc::new(DemoDataSource::new(config.demo.ids.clone()));

    let grid = GridPresenter::new(data_source.clone(), loader, config.grid.options());
    let detail = DetailPresenter::new(data_source, originals);

    let picker = UserDirs::new()
        .and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
        .map_or_else(NativePhotoPicker::new, NativePhotoPicker::with_start_dir);
    let picker = Arc::new(picker);
    Ok(App::new(grid, detail, picker, cache, images))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = load_config()?;
    init_logging(&config)?;

    info!(version = photo_grid::VERSION, "Starting photo grid");

    let mut terminal = ratatui::init();
    let images = ImageManager::new();
    info!(protocol = ?images.protocol_type(), "Terminal graphics ready");

    let result = match create_app(&config, images) {
        Ok(app) => app.run(&mut terminal).await,
        Err(e) => Err(e),
    };

    ratatui::restore();

    result
}
