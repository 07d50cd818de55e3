//! Photo Grid - a photo grid component with a terminal front end.
//!
//! The core is a de-duplicating, cache-backed async image loader. Around it
//! sit the grid and detail presenters, a demo gallery data source, a native
//! photo picker and a ratatui interface.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the presenters.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing configuration, image loading and adapters.
pub mod infrastructure;
/// Presentation layer containing UI components and event handling.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "photo-grid";
