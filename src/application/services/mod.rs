pub mod column_stepper;
pub mod detail_presenter;
pub mod grid_presenter;

pub use column_stepper::ColumnStepper;
pub use detail_presenter::{DetailPresenter, DetailState};
pub use grid_presenter::{
    CellState, DeleteMode, GridCell, GridEvent, GridOptions, GridPresenter, GridSnapshot,
};
