//! Application layer with the grid and detail presenters.

/// Presenters and their state types.
pub mod services;

pub use services::{
    CellState, ColumnStepper, DeleteMode, DetailPresenter, DetailState, GridCell, GridEvent,
    GridOptions, GridPresenter, GridSnapshot,
};
