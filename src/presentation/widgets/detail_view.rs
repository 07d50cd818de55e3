//! Full-size image view.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};
use ratatui_image::{Resize, StatefulImage};

use super::image_state::{ImageManager, fitted_area};
use crate::application::DetailState;

/// Renders the original image of the opened item.
pub struct DetailView<'a> {
    state: &'a DetailState,
    images: &'a mut ImageManager,
    title: String,
}

impl<'a> DetailView<'a> {
    /// Creates a view of `state`, drawing the original with `images`.
    #[must_use]
    pub fn new(state: &'a DetailState, images: &'a mut ImageManager) -> Self {
        Self {
            state,
            images,
            title: String::new(),
        }
    }

    /// Sets the border title, typically the item label.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn message(lines: Vec<Line<'static>>, area: Rect, buf: &mut Buffer) {
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let y = area.y + area.height.saturating_sub(height) / 2;
        let text_area = Rect::new(area.x, y, area.width, area.bottom().saturating_sub(y));
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}

impl Widget for DetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        if !self.title.is_empty() {
            block = block.title(Span::styled(
                format!(" {} ", self.title),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let images = self.images;
        let DetailState::Loaded { payload, .. } = self.state else {
            images.clear_original();
            if !inner.is_empty() {
                Self::render_message(self.state, inner, buf);
            }
            return;
        };
        if inner.is_empty() {
            return;
        }
        let protocol = images.original(payload);
        let image_area = fitted_area(protocol, inner);
        StatefulImage::default()
            .resize(Resize::Fit(None))
            .render(image_area, buf, protocol);
    }
}

impl DetailView<'_> {
    fn render_message(state: &DetailState, inner: Rect, buf: &mut Buffer) {
        let dim = Style::default().fg(Color::DarkGray);
        match state {
            DetailState::Idle | DetailState::Loaded { .. } => {}
            DetailState::Loading(_) => {
                Self::message(vec![Line::styled("Loading…", dim)], inner, buf);
            }
            DetailState::Missing(_) => {
                Self::message(vec![Line::styled("No image available", dim)], inner, buf);
            }
            DetailState::Failed { error, .. } => {
                Self::message(
                    vec![
                        Line::styled("Error unable to load image", Style::default().fg(Color::Red)),
                        Line::styled(error.to_string(), dim),
                    ],
                    inner,
                    buf,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ItemId;
    use crate::domain::errors::{GalleryError, LoadError};
    use crate::domain::ports::mocks::payload;

    fn render_with(state: &DetailState, images: &mut ImageManager) -> String {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        DetailView::new(state, images).title("#7").render(area, &mut buf);
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
        }
        out
    }

    fn render(state: &DetailState) -> String {
        render_with(state, &mut ImageManager::halfblocks())
    }

    #[test]
    fn test_loading() {
        assert!(render(&DetailState::Loading(ItemId::new())).contains("Loading…"));
    }

    #[test]
    fn test_loaded_keeps_original_protocol_until_closed() {
        let mut images = ImageManager::halfblocks();
        let state = DetailState::Loaded {
            id: ItemId::new(),
            payload: payload(30, 20),
        };
        let text = render_with(&state, &mut images);
        assert!(text.contains("#7"));
        assert!(!text.contains("Loading…"));
        assert!(images.has_original());

        render_with(&DetailState::Idle, &mut images);
        assert!(!images.has_original());
    }

    #[test]
    fn test_missing() {
        assert!(render(&DetailState::Missing(ItemId::new())).contains("No image available"));
    }

    #[test]
    fn test_failed_shows_reason() {
        let state = DetailState::Failed {
            id: ItemId::new(),
            error: GalleryError::Load(LoadError::not_found("gone")),
        };
        let text = render(&state);
        assert!(text.contains("Error unable to load image"));
        assert!(text.contains("gone"));
    }
}
