//! Photo picker port definition.

use async_trait::async_trait;

use crate::domain::entities::PickedImage;
use crate::domain::errors::PickerError;

/// Port for letting the user pick one image.
#[async_trait]
pub trait PhotoPickerPort: Send + Sync {
    /// Presents the picker and waits for the user's choice.
    ///
    /// Dismissing the picker yields [`PickerError::Cancelled`].
    async fn pick_image(&self) -> Result<PickedImage, PickerError>;
}
