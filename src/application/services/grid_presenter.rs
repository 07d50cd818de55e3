//! Grid state container.
//!
//! Owns the rendered cells, drives one independent load per cell through the
//! shared [`ImageLoader`], and publishes changes as [`GridEvent`]s.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::entities::{GalleryItem, ImagePayload, ItemId};
use crate::domain::errors::{GalleryError, LoadError, PickerError};
use crate::domain::ports::{GalleryDataSource, PhotoPickerPort};
use crate::infrastructure::image::{ImageLoader, LoadTicket, SubscriberToken};

use super::column_stepper::ColumnStepper;

const EVENT_CAPACITY: usize = 64;

/// When a deleted cell leaves the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Remove immediately; put the cell back if the data source refuses.
    Optimistic,
    /// Remove once the data source confirms.
    #[default]
    Confirmed,
}

/// Load state of one cell.
#[derive(Debug, Clone)]
pub enum CellState {
    /// Waiting for the thumbnail.
    Loading,
    /// Thumbnail available.
    Loaded(ImagePayload),
    /// Thumbnail failed to load.
    Failed(LoadError),
}

impl CellState {
    /// Returns true while the thumbnail is loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true once the thumbnail is available.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the loaded thumbnail.
    #[must_use]
    pub const fn payload(&self) -> Option<&ImagePayload> {
        match self {
            Self::Loaded(payload) => Some(payload),
            _ => None,
        }
    }
}

/// One rendered grid cell.
#[derive(Debug, Clone)]
pub struct GridCell {
    /// Item shown by the cell.
    pub item: GalleryItem,
    /// Thumbnail state.
    pub state: CellState,
}

/// Change notification for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// The set or order of cells changed.
    ItemsChanged,
    /// A single cell's load state changed.
    CellChanged(ItemId),
    /// Edit mode was toggled.
    EditModeChanged(bool),
    /// Column count changed.
    ColumnsChanged(u8),
    /// A cell was removed.
    ItemRemoved(ItemId),
    /// The data source refused a removal.
    RemoveFailed(ItemId),
    /// A picked image was submitted.
    ImageAdded,
}

/// Read-only copy of the grid for rendering.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    /// Cells in data source order.
    pub cells: Vec<GridCell>,
    /// Whether edit mode is active.
    pub editing: bool,
    /// Current column count.
    pub columns: u8,
    /// Column stepper title.
    pub columns_title: String,
}

impl GridSnapshot {
    /// Adding photos is disabled while editing.
    #[must_use]
    pub const fn can_add_photo(&self) -> bool {
        !self.editing
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Grid presentation options.
#[derive(Debug, Clone)]
pub struct GridOptions {
    /// Initial column count.
    pub columns: u8,
    /// Selectable column range.
    pub column_range: RangeInclusive<u8>,
    /// Delete behaviour.
    pub delete_mode: DeleteMode,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: 3,
            column_range: 1..=8,
            delete_mode: DeleteMode::default(),
        }
    }
}

struct CellSlot {
    cell: GridCell,
    pending: Option<SubscriberToken>,
}

struct GridState {
    slots: Vec<CellSlot>,
    /// Items detached by an optimistic delete that the data source has not
    /// answered yet.
    removing: HashSet<ItemId>,
    editing: bool,
    stepper: ColumnStepper,
}

/// Presenter behind the photo grid.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct GridPresenter {
    data_source: Arc<dyn GalleryDataSource>,
    loader: ImageLoader,
    state: Arc<RwLock<GridState>>,
    events: broadcast::Sender<GridEvent>,
    delete_mode: DeleteMode,
}

impl GridPresenter {
    /// Creates a presenter over `data_source`, loading thumbnails through
    /// `loader`.
    #[must_use]
    pub fn new(
        data_source: Arc<dyn GalleryDataSource>,
        loader: ImageLoader,
        options: GridOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            data_source,
            loader,
            state: Arc::new(RwLock::new(GridState {
                slots: Vec::new(),
                removing: HashSet::new(),
                editing: false,
                stepper: ColumnStepper::new(options.columns, options.column_range),
            })),
            events,
            delete_mode: options.delete_mode,
        }
    }

    /// Subscribes to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GridEvent> {
        self.events.subscribe()
    }

    /// Returns a copy of the current grid.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        let state = self.state.read();
        GridSnapshot {
            cells: state.slots.iter().map(|slot| slot.cell.clone()).collect(),
            editing: state.editing,
            columns: state.stepper.columns(),
            columns_title: state.stepper.title(),
        }
    }

    /// Returns one cell.
    #[must_use]
    pub fn cell(&self, id: ItemId) -> Option<GridCell> {
        let state = self.state.read();
        state
            .slots
            .iter()
            .find(|slot| slot.cell.item.id == id)
            .map(|slot| slot.cell.clone())
    }

    /// Returns the shared image loader.
    #[must_use]
    pub const fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Fetches the item list and starts thumbnail loads.
    ///
    /// # Errors
    /// Returns error if the data source fails to fetch.
    pub async fn load(&self) -> Result<(), GalleryError> {
        self.data_source.fetch_thumbnails().await?;
        self.sync_items();
        Ok(())
    }

    /// Asks the data source to refetch, then resynchronises the cells.
    /// Failed cells are retried.
    ///
    /// # Errors
    /// Returns error if the data source fails to refresh.
    pub async fn refresh(&self) -> Result<(), GalleryError> {
        info!("Refreshing gallery");
        self.data_source.refresh().await?;
        self.sync_items();
        Ok(())
    }

    /// Rebuilds the cells from the data source's current items.
    ///
    /// Cells whose item and locator are unchanged keep their state; new
    /// cells start loading; cells that disappeared have their loads
    /// cancelled. Items with an optimistic delete in progress stay hidden.
    pub fn sync_items(&self) {
        let items = self.data_source.list_items();
        {
            let mut state = self.state.write();
            let mut previous: HashMap<ItemId, CellSlot> = state
                .slots
                .drain(..)
                .map(|slot| (slot.cell.item.id, slot))
                .collect();

            let mut slots = Vec::with_capacity(items.len());
            for item in items {
                if state.removing.contains(&item.id) {
                    continue;
                }
                match previous.remove(&item.id) {
                    Some(mut slot)
                        if slot.cell.item.locator == item.locator
                            && !slot.cell.state.is_failed() =>
                    {
                        slot.cell.item = item;
                        slots.push(slot);
                    }
                    Some(mut slot) => {
                        self.cancel_slot(&mut slot);
                        slots.push(self.new_slot(item));
                    }
                    None => slots.push(self.new_slot(item)),
                }
            }

            for mut slot in previous.into_values() {
                self.cancel_slot(&mut slot);
            }

            debug!(cells = slots.len(), "Synchronised grid cells");
            state.slots = slots;
        }
        self.emit(GridEvent::ItemsChanged);
    }

    /// Restarts the thumbnail load of one cell.
    ///
    /// # Errors
    /// Returns error if no cell shows `id`.
    pub fn reload_cell(&self, id: ItemId) -> Result<(), GalleryError> {
        {
            let mut state = self.state.write();
            let slot = state
                .slots
                .iter_mut()
                .find(|slot| slot.cell.item.id == id)
                .ok_or(GalleryError::ItemNotFound { id })?;
            self.cancel_slot(slot);
            self.start_load(slot);
        }
        self.emit(GridEvent::CellChanged(id));
        Ok(())
    }

    /// Returns whether edit mode is active.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.state.read().editing
    }

    /// Enters or leaves edit mode.
    pub fn set_editing(&self, editing: bool) {
        let changed = {
            let mut state = self.state.write();
            let changed = state.editing != editing;
            state.editing = editing;
            changed
        };
        if changed {
            debug!(editing, "Edit mode changed");
            self.emit(GridEvent::EditModeChanged(editing));
        }
    }

    /// Toggles edit mode and returns the new value.
    pub fn toggle_editing(&self) -> bool {
        let editing = !self.is_editing();
        self.set_editing(editing);
        editing
    }

    /// Adds a column. Returns false at the upper bound.
    pub fn increment_columns(&self) -> bool {
        self.step_columns(ColumnStepper::increment)
    }

    /// Removes a column. Returns false at the lower bound.
    pub fn decrement_columns(&self) -> bool {
        self.step_columns(ColumnStepper::decrement)
    }

    fn step_columns(&self, step: fn(&mut ColumnStepper) -> bool) -> bool {
        let changed = {
            let mut state = self.state.write();
            step(&mut state.stepper).then(|| state.stepper.columns())
        };
        if let Some(columns) = changed {
            self.emit(GridEvent::ColumnsChanged(columns));
        }
        changed.is_some()
    }

    /// Deletes an item. Only available in edit mode.
    ///
    /// # Errors
    /// Returns error if edit mode is off, the item is unknown, or the data
    /// source refuses the removal.
    pub async fn remove_item(&self, id: ItemId) -> Result<(), GalleryError> {
        if !self.is_editing() {
            return Err(GalleryError::EditModeRequired);
        }

        match self.delete_mode {
            DeleteMode::Confirmed => {
                if self.cell(id).is_none() {
                    return Err(GalleryError::ItemNotFound { id });
                }
                if let Err(e) = self.data_source.remove_item(&id).await {
                    warn!(id = %id, error = %e, "Data source refused removal");
                    self.emit(GridEvent::RemoveFailed(id));
                    return Err(e);
                }
                self.detach(id, false);
                info!(id = %id, "Removed gallery item");
                self.emit(GridEvent::ItemRemoved(id));
            }
            DeleteMode::Optimistic => {
                let (index, slot) = self
                    .detach(id, true)
                    .ok_or(GalleryError::ItemNotFound { id })?;
                self.emit(GridEvent::ItemRemoved(id));

                if let Err(e) = self.data_source.remove_item(&id).await {
                    warn!(id = %id, error = %e, "Data source refused removal, restoring cell");
                    self.restore(index, slot);
                    self.emit(GridEvent::RemoveFailed(id));
                    return Err(e);
                }
                self.state.write().removing.remove(&id);
                info!(id = %id, "Removed gallery item");
            }
        }
        Ok(())
    }

    /// Lets the user pick a photo and submits it to the data source.
    ///
    /// Returns `Ok(false)` if the user dismissed the picker.
    ///
    /// # Errors
    /// Returns error while editing, or if picking or submitting fails.
    pub async fn add_photo(&self, picker: &dyn PhotoPickerPort) -> Result<bool, GalleryError> {
        if self.is_editing() {
            return Err(GalleryError::EditModeActive);
        }

        let image = match picker.pick_image().await {
            Ok(image) => image,
            Err(PickerError::Cancelled) => {
                debug!("Photo picker dismissed");
                return Ok(false);
            }
            Err(e) => {
                warn!(error = %e, "Photo picker failed");
                return Err(e.into());
            }
        };

        info!(
            locator = %image.locator,
            kind = %image.kind,
            bytes = image.bytes.len(),
            "Submitting picked image"
        );
        self.data_source.submit_image(image).await?;
        self.sync_items();
        self.emit(GridEvent::ImageAdded);
        Ok(true)
    }

    fn new_slot(&self, item: GalleryItem) -> CellSlot {
        let mut slot = CellSlot {
            cell: GridCell {
                item,
                state: CellState::Loading,
            },
            pending: None,
        };
        self.start_load(&mut slot);
        slot
    }

    fn start_load(&self, slot: &mut CellSlot) {
        let id = slot.cell.item.id;
        let Some(locator) = slot.cell.item.locator.clone() else {
            slot.cell.state = CellState::Failed(LoadError::not_found("item has no image locator"));
            return;
        };

        match self.loader.begin(&locator) {
            LoadTicket::Ready(payload) => {
                slot.cell.state = CellState::Loaded(payload);
            }
            LoadTicket::Pending(pending) => {
                let token = pending.token();
                slot.cell.state = CellState::Loading;
                slot.pending = Some(token);

                let state = Arc::clone(&self.state);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = pending.wait().await;
                    let updated = {
                        let mut state = state.write();
                        let slot = state
                            .slots
                            .iter_mut()
                            .find(|slot| slot.cell.item.id == id && slot.pending == Some(token));
                        slot.map(|slot| {
                            slot.pending = None;
                            slot.cell.state = match result {
                                Ok(payload) => CellState::Loaded(payload),
                                Err(e) => CellState::Failed(e),
                            };
                        })
                        .is_some()
                    };
                    if updated {
                        let _ = events.send(GridEvent::CellChanged(id));
                    }
                });
            }
        }
    }

    fn cancel_slot(&self, slot: &mut CellSlot) {
        if let (Some(token), Some(locator)) = (slot.pending.take(), &slot.cell.item.locator) {
            self.loader.cancel(locator, token);
        }
    }

    fn detach(&self, id: ItemId, pending_removal: bool) -> Option<(usize, CellSlot)> {
        let mut state = self.state.write();
        let index = state.slots.iter().position(|slot| slot.cell.item.id == id)?;
        let mut slot = state.slots.remove(index);
        self.cancel_slot(&mut slot);
        if pending_removal {
            state.removing.insert(id);
        }
        Some((index, slot))
    }

    fn restore(&self, index: usize, mut slot: CellSlot) {
        let id = slot.cell.item.id;
        let mut state = self.state.write();
        state.removing.remove(&id);
        if state.slots.iter().any(|existing| existing.cell.item.id == id) {
            return;
        }
        if slot.cell.state.is_loading() {
            self.start_load(&mut slot);
        }
        let index = index.min(state.slots.len());
        state.slots.insert(index, slot);
    }

    fn emit(&self, event: GridEvent) {
        let _ = self.events.send(event);
    }
}
