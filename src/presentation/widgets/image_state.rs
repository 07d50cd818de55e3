//! Terminal image protocols for thumbnails and the detail original.

use std::collections::HashMap;

use ratatui::layout::Rect;
use ratatui_image::Resize;
use ratatui_image::picker::{Capability, Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;
use tracing::debug;

use crate::application::GridSnapshot;
use crate::domain::entities::{ImagePayload, ItemId};

struct ProtocolSlot {
    payload: ImagePayload,
    protocol: StatefulProtocol,
}

impl ProtocolSlot {
    fn new(picker: &Picker, payload: &ImagePayload) -> Self {
        Self {
            payload: payload.clone(),
            protocol: picker.new_resize_protocol(payload.image().clone()),
        }
    }
}

/// Owns the terminal graphics picker and one protocol per loaded image.
///
/// Protocols keep their last encoding, so an unchanged area is not resized
/// again on the next frame.
pub struct ImageManager {
    picker: Picker,
    thumbnails: HashMap<ItemId, ProtocolSlot>,
    original: Option<ProtocolSlot>,
}

impl ImageManager {
    /// Queries the terminal for its graphics protocol, falling back to
    /// half blocks.
    ///
    /// Must run after the terminal entered raw mode.
    #[must_use]
    pub fn new() -> Self {
        let mut picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::halfblocks());

        let caps = picker.capabilities();
        let has_sixel = caps.iter().any(|c| matches!(c, Capability::Sixel));
        let has_kitty = caps.iter().any(|c| matches!(c, Capability::Kitty));
        if has_sixel && !has_kitty && picker.protocol_type() == ProtocolType::Halfblocks {
            picker.set_protocol_type(ProtocolType::Sixel);
        }

        debug!(protocol = ?picker.protocol_type(), "Image protocol selected");
        Self::with_picker(picker)
    }

    /// Renders with half blocks only.
    #[must_use]
    pub fn halfblocks() -> Self {
        Self::with_picker(Picker::halfblocks())
    }

    fn with_picker(picker: Picker) -> Self {
        Self {
            picker,
            thumbnails: HashMap::new(),
            original: None,
        }
    }

    /// Graphics protocol in use.
    #[must_use]
    pub fn protocol_type(&self) -> ProtocolType {
        self.picker.protocol_type()
    }

    /// Number of thumbnail protocols currently held.
    #[must_use]
    pub fn thumbnail_count(&self) -> usize {
        self.thumbnails.len()
    }

    /// Returns the protocol of a cell, rebuilding it when the payload
    /// changed.
    pub fn thumbnail(&mut self, id: ItemId, payload: &ImagePayload) -> &mut StatefulProtocol {
        let picker = &self.picker;
        let slot = self
            .thumbnails
            .entry(id)
            .or_insert_with(|| ProtocolSlot::new(picker, payload));
        if !slot.payload.same_as(payload) {
            *slot = ProtocolSlot::new(picker, payload);
        }
        &mut slot.protocol
    }

    /// Drops protocols of cells that are gone or no longer loaded.
    pub fn retain_thumbnails(&mut self, snapshot: &GridSnapshot) {
        let loaded: HashMap<ItemId, &ImagePayload> = snapshot
            .cells
            .iter()
            .filter_map(|cell| cell.state.payload().map(|payload| (cell.item.id, payload)))
            .collect();
        self.thumbnails.retain(|id, slot| {
            loaded
                .get(id)
                .is_some_and(|payload| slot.payload.same_as(payload))
        });
    }

    /// Returns the protocol of the opened original.
    pub fn original(&mut self, payload: &ImagePayload) -> &mut StatefulProtocol {
        let picker = &self.picker;
        let slot = self
            .original
            .get_or_insert_with(|| ProtocolSlot::new(picker, payload));
        if !slot.payload.same_as(payload) {
            *slot = ProtocolSlot::new(picker, payload);
        }
        &mut slot.protocol
    }

    /// Releases the original once the detail view shows something else.
    pub fn clear_original(&mut self) {
        self.original = None;
    }

    /// Returns true while an original protocol is held.
    #[must_use]
    pub const fn has_original(&self) -> bool {
        self.original.is_some()
    }
}

impl Default for ImageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ImageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageManager")
            .field("protocol", &self.picker.protocol_type())
            .field("thumbnails", &self.thumbnails.len())
            .field("has_original", &self.original.is_some())
            .finish()
    }
}

/// Area an image fitted into `area` occupies, centered.
#[must_use]
pub fn fitted_area(protocol: &StatefulProtocol, area: Rect) -> Rect {
    let size = protocol.size_for(Resize::Fit(None), area);
    let width = size.width.min(area.width);
    let height = size.height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
