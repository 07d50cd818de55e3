mod detail_view;
mod footer_bar;
mod grid_view;
mod header_bar;
mod image_state;

pub use detail_view::DetailView;
pub use footer_bar::{FooterBar, FooterBarStyle, StatusLevel};
pub use grid_view::{GridView, GridViewState, GridViewStyle};
pub use header_bar::{HeaderBar, HeaderBarStyle};
pub use image_state::ImageManager;
