use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::presentation::events::KeyHint;

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Informational.
    Info,
    /// Success.
    Success,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl StatusLevel {
    /// Returns color for level.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Footer styling.
pub struct FooterBarStyle {
    /// Bar background.
    pub background: Style,
    /// Hint label.
    pub label_style: Style,
    /// Hint key.
    pub key_style: Style,
    /// Right-hand info text.
    pub info: Style,
}

impl Default for FooterBarStyle {
    fn default() -> Self {
        Self {
            background: Style::default(),
            label_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            key_style: Style::default().fg(Color::White).bg(Color::DarkGray),
            info: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Bottom bar with key hints and either a status message or cache info.
pub struct FooterBar<'a> {
    hints: &'a [KeyHint],
    status: Option<(StatusLevel, &'a str)>,
    right_info: Option<&'a str>,
    style: FooterBarStyle,
}

impl<'a> FooterBar<'a> {
    /// Creates a footer showing `hints`.
    #[must_use]
    pub fn new(hints: &'a [KeyHint]) -> Self {
        Self {
            hints,
            status: None,
            right_info: None,
            style: FooterBarStyle::default(),
        }
    }

    /// Shows a status message on the right, replacing the info text.
    #[must_use]
    pub const fn status(mut self, status: Option<(StatusLevel, &'a str)>) -> Self {
        self.status = status;
        self
    }

    /// Text shown on the right when there is no status message.
    #[must_use]
    pub const fn right_info(mut self, info: Option<&'a str>) -> Self {
        self.right_info = info;
        self
    }

    /// Replaces the default styling.
    #[must_use]
    pub const fn style(mut self, style: FooterBarStyle) -> Self {
        self.style = style;
        self
    }

    fn build_left_spans(&self) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!(" {} ", hint.label), self.style.label_style));
            spans.push(Span::styled(format!(" {} ", hint.key), self.style.key_style));
        }
        spans
    }

    fn right_span(&self) -> Option<Span<'a>> {
        if let Some((level, message)) = self.status {
            return Some(Span::styled(
                format!(" {message} "),
                Style::default()
                    .fg(level.color())
                    .add_modifier(Modifier::BOLD),
            ));
        }
        self.right_info
            .map(|info| Span::styled(format!(" {info} "), self.style.info))
    }
}

impl Widget for FooterBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        for x in area.left()..area.right() {
            buf[(x, area.y)]
                .set_char(' ')
                .set_style(self.style.background);
        }

        let left_line = Line::from(self.build_left_spans());
        let left_width = (left_line.width() as u16).min(area.width);
        Paragraph::new(left_line).render(Rect::new(area.x, area.y, left_width, 1), buf);

        if let Some(span) = self.right_span() {
            let width = span.width() as u16;
            if width < area.width.saturating_sub(left_width) {
                let x = area.right().saturating_sub(width);
                Paragraph::new(Line::from(span)).render(Rect::new(x, area.y, width, 1), buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::events::grid_hints;

    fn render(footer: FooterBar<'_>) -> (Buffer, String) {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        footer.render(area, &mut buf);
        let text = (0..area.width).map(|x| buf[(x, 0)].symbol()).collect();
        (buf, text)
    }

    #[test]
    fn test_hints_rendered() {
        let (_, text) = render(FooterBar::new(grid_hints(false)));
        assert!(text.contains(" Open "));
        assert!(text.contains(" Enter "));
    }

    #[test]
    fn test_status_replaces_info() {
        let footer = FooterBar::new(&[])
            .right_info(Some("Cache: 2 images"))
            .status(Some((StatusLevel::Error, "Delete failed")));
        let (buf, text) = render(footer);

        assert!(text.contains("Delete failed"));
        assert!(!text.contains("Cache"));
        assert_eq!(buf[(118, 0)].fg, Color::Red);
    }

    #[test]
    fn test_info_shown_without_status() {
        let (_, text) = render(FooterBar::new(&[]).right_info(Some("Cache: 2 images")));
        assert!(text.contains("Cache: 2 images"));
    }
}
