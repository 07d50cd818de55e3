//! Demo gallery data.

pub mod demo_data_source;

pub use demo_data_source::DemoDataSource;
