//! Main application orchestrator.

use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::application::{DetailPresenter, GridEvent, GridPresenter};
use crate::domain::entities::ItemId;
use crate::domain::errors::GalleryError;
use crate::domain::ports::{ImageCachePort, PhotoPickerPort};
use crate::infrastructure::MemoryImageCache;
use crate::presentation::events::{self, Command};
use crate::presentation::widgets::{
    DetailView, FooterBar, GridView, GridViewState, HeaderBar, ImageManager, StatusLevel,
};

const TITLE: &str = "Image Gallery";

/// Result of a background operation.
#[derive(Debug)]
enum Action {
    Loaded(Result<(), GalleryError>),
    Refreshed(Result<(), GalleryError>),
    Removed(Result<(), GalleryError>),
    PhotoAdded(Result<bool, GalleryError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Grid,
    Detail { id: ItemId, label: String },
}

/// Terminal front end over the grid and detail presenters.
pub struct App {
    grid: GridPresenter,
    detail: DetailPresenter,
    picker: Arc<dyn PhotoPickerPort>,
    cache: Arc<MemoryImageCache>,
    images: ImageManager,
    screen: Screen,
    grid_state: GridViewState,
    status: Option<(StatusLevel, String)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    exiting: bool,
}

impl App {
    /// Creates the app. `images` must be built after the terminal entered
    /// raw mode.
    #[must_use]
    pub fn new(
        grid: GridPresenter,
        detail: DetailPresenter,
        picker: Arc<dyn PhotoPickerPort>,
        cache: Arc<MemoryImageCache>,
        images: ImageManager,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            grid,
            detail,
            picker,
            cache,
            images,
            screen: Screen::Grid,
            grid_state: GridViewState::default(),
            status: None,
            action_tx,
            action_rx,
            exiting: false,
        }
    }

    /// # Errors
    /// Returns error if drawing to the terminal fails.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();
        let mut grid_events = self.grid.subscribe();
        let mut detail_states = self.detail.subscribe();

        self.spawn_grid_task(|grid| async move { Action::Loaded(grid.load().await) });
        terminal.draw(|frame| self.render(frame))?;

        while !self.exiting {
            tokio::select! {
                Some(Ok(event)) = terminal_events.next() => {
                    if let Event::Key(key) = event {
                        self.handle_key(key);
                    }
                }

                result = grid_events.recv() => match result {
                    Ok(event) => self.handle_grid_event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Grid events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("Grid event stream closed");
                        self.exiting = true;
                    }
                },

                Ok(()) = detail_states.changed() => {}

                Some(action) = self.action_rx.recv() => self.handle_action(action),
            }

            terminal.draw(|frame| self.render(frame))?;
        }

        info!("Application exiting normally");
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let [header_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let snapshot = self.grid.snapshot();
        let cache_info = format!("{} cached", self.cache.len());
        let status = self
            .status
            .as_ref()
            .map(|(level, message)| (*level, message.as_str()));

        match &self.screen {
            Screen::Grid => {
                frame.render_widget(HeaderBar::new(TITLE).snapshot(&snapshot), header_area);
                frame.render_stateful_widget(
                    GridView::new(&snapshot, &mut self.images),
                    body_area,
                    &mut self.grid_state,
                );
                frame.render_widget(
                    FooterBar::new(events::grid_hints(snapshot.editing))
                        .status(status)
                        .right_info(Some(&cache_info)),
                    footer_area,
                );
            }
            Screen::Detail { label, .. } => {
                let state = self.detail.state();
                frame.render_widget(HeaderBar::new(TITLE), header_area);
                frame.render_widget(
                    DetailView::new(&state, &mut self.images).title(label.clone()),
                    body_area,
                );
                frame.render_widget(
                    FooterBar::new(events::detail_hints()).status(status),
                    footer_area,
                );
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let command = match self.screen {
            Screen::Grid => events::grid_command(&key),
            Screen::Detail { .. } => events::detail_command(&key),
        };
        if let Some(command) = command {
            self.status = None;
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Quit => self.exiting = true,
            Command::Move(direction) => {
                let snapshot = self.grid.snapshot();
                self.grid_state.move_selection(
                    direction,
                    usize::from(snapshot.columns),
                    snapshot.len(),
                );
            }
            Command::Open => self.open_selected(),
            Command::Back => {
                if let Screen::Detail { id, .. } = &self.screen {
                    debug!(id = %id, "Closing detail view");
                }
                self.detail.close();
                self.screen = Screen::Grid;
            }
            Command::ToggleEdit => {
                self.grid.toggle_editing();
            }
            Command::MoreColumns | Command::FewerColumns => {
                if !self.grid.is_editing() {
                    self.set_status(StatusLevel::Info, "Enter edit mode to change columns");
                } else if command == Command::MoreColumns {
                    self.grid.increment_columns();
                } else {
                    self.grid.decrement_columns();
                }
            }
            Command::Delete => self.delete_selected(),
            Command::AddPhoto => {
                if self.grid.is_editing() {
                    self.set_status(StatusLevel::Info, "Finish editing to add photos");
                    return;
                }
                let picker = Arc::clone(&self.picker);
                self.spawn_grid_task(move |grid| async move {
                    Action::PhotoAdded(grid.add_photo(picker.as_ref()).await)
                });
            }
            Command::Refresh => {
                self.set_status(StatusLevel::Info, "Refreshing…");
                self.spawn_grid_task(|grid| async move { Action::Refreshed(grid.refresh().await) });
            }
            Command::ClearCache => {
                info!(stats = %self.cache.stats(), "Clearing thumbnail cache");
                self.grid.loader().clear_cache();
                self.set_status(StatusLevel::Success, "Cache cleared");
            }
        }
    }

    fn selected_item(&self) -> Option<crate::domain::entities::GalleryItem> {
        let snapshot = self.grid.snapshot();
        snapshot
            .cells
            .into_iter()
            .nth(self.grid_state.selected())
            .map(|cell| cell.item)
    }

    fn open_selected(&mut self) {
        if self.grid.is_editing() {
            return;
        }
        let Some(item) = self.selected_item() else {
            return;
        };
        debug!(id = %item.id, "Opening detail view");
        self.screen = Screen::Detail {
            id: item.id,
            label: item.label(),
        };

        let detail = self.detail.clone();
        tokio::spawn(async move {
            detail.open(item.id).await;
        });
    }

    fn delete_selected(&mut self) {
        if !self.grid.is_editing() {
            self.set_status(StatusLevel::Info, "Enter edit mode to delete");
            return;
        }
        let Some(item) = self.selected_item() else {
            return;
        };
        self.spawn_grid_task(move |grid| async move {
            Action::Removed(grid.remove_item(item.id).await)
        });
    }

    fn spawn_grid_task<F, Fut>(&self, task: F)
    where
        F: FnOnce(GridPresenter) -> Fut,
        Fut: std::future::Future<Output = Action> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        let future = task(self.grid.clone());
        tokio::spawn(async move {
            let _ = tx.send(future.await);
        });
    }

    fn handle_grid_event(&mut self, event: &GridEvent) {
        match event {
            GridEvent::ItemsChanged | GridEvent::ItemRemoved(_) => {
                self.grid_state.clamp(self.grid.snapshot().len());
            }
            GridEvent::RemoveFailed(id) => {
                debug!(id = %id, "Removal rolled back");
            }
            GridEvent::CellChanged(_)
            | GridEvent::EditModeChanged(_)
            | GridEvent::ColumnsChanged(_)
            | GridEvent::ImageAdded => {}
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Loaded(Err(e)) | Action::Refreshed(Err(e)) => {
                error!(error = %e, "Failed to load gallery");
                self.set_status(StatusLevel::Error, format!("Load failed: {e}"));
            }
            Action::Refreshed(Ok(())) => self.set_status(StatusLevel::Success, "Refreshed"),
            Action::Removed(Err(e)) => {
                self.set_status(failure_level(&e), format!("Delete failed: {e}"));
            }
            Action::PhotoAdded(Ok(true)) => self.set_status(StatusLevel::Success, "Photo added"),
            Action::PhotoAdded(Err(e)) => {
                warn!(error = %e, "Adding photo failed");
                self.set_status(failure_level(&e), format!("Add failed: {e}"));
            }
            Action::Loaded(Ok(())) | Action::Removed(Ok(())) | Action::PhotoAdded(Ok(false)) => {}
        }
    }

    fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = Some((level, message.into()));
    }
}

/// Retryable failures are warnings, the rest errors.
const fn failure_level(error: &GalleryError) -> StatusLevel {
    if error.is_recoverable() {
        StatusLevel::Warning
    } else {
        StatusLevel::Error
    }
}
