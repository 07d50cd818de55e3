//! Presentation layer with the terminal UI.

/// Key bindings.
pub mod events;
/// Application loop.
pub mod ui;
/// Reusable widgets.
pub mod widgets;

pub use ui::App;
