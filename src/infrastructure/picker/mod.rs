//! Photo picker adapters.

pub mod native_picker;

pub use native_picker::{NativePhotoPicker, read_picked};
