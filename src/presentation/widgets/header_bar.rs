use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::application::GridSnapshot;

/// Header styling.
pub struct HeaderBarStyle {
    /// Bar background.
    pub background: Style,
    /// Title on the left.
    pub title: Style,
    /// Idle button.
    pub button: Style,
    /// Button of the active mode.
    pub button_active: Style,
    /// Button that cannot be used right now.
    pub disabled: Style,
    /// Column stepper.
    pub stepper: Style,
}

impl Default for HeaderBarStyle {
    fn default() -> Self {
        Self {
            background: Style::default(),
            title: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            button: Style::default().fg(Color::White).bg(Color::DarkGray),
            button_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            disabled: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
            stepper: Style::default().fg(Color::Yellow),
        }
    }
}

/// Top bar of the grid: title, column stepper, edit and add buttons.
pub struct HeaderBar<'a> {
    title: &'a str,
    editing: bool,
    can_add: bool,
    columns_title: &'a str,
    style: HeaderBarStyle,
}

impl<'a> HeaderBar<'a> {
    /// Creates a header titled `title`.
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            editing: false,
            can_add: true,
            columns_title: "",
            style: HeaderBarStyle::default(),
        }
    }

    /// Takes edit mode and stepper state from a grid snapshot.
    #[must_use]
    pub fn snapshot(mut self, snapshot: &'a GridSnapshot) -> Self {
        self.editing = snapshot.editing;
        self.can_add = snapshot.can_add_photo();
        self.columns_title = &snapshot.columns_title;
        self
    }

    /// Replaces the default styling.
    #[must_use]
    pub const fn style(mut self, style: HeaderBarStyle) -> Self {
        self.style = style;
        self
    }

    fn right_spans(&self) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        if self.editing && !self.columns_title.is_empty() {
            spans.push(Span::styled(
                format!(" − {} + ", self.columns_title),
                self.style.stepper,
            ));
            spans.push(Span::raw(" "));
        }

        let (edit_label, edit_style) = if self.editing {
            (" Done ", self.style.button_active)
        } else {
            (" Edit ", self.style.button)
        };
        spans.push(Span::styled(edit_label, edit_style));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            " + ",
            if self.can_add {
                self.style.button
            } else {
                self.style.disabled
            },
        ));
        spans
    }
}

impl Widget for HeaderBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        for x in area.left()..area.right() {
            buf[(x, area.y)]
                .set_char(' ')
                .set_style(self.style.background);
        }

        let left_line = Line::from(Span::styled(format!(" {} ", self.title), self.style.title));
        let left_width = (left_line.width() as u16).min(area.width);
        Paragraph::new(left_line).render(Rect::new(area.x, area.y, left_width, 1), buf);

        let right_line = Line::from(self.right_spans());
        let right_width = right_line.width() as u16;
        if right_width < area.width.saturating_sub(left_width) {
            let right_x = area.right().saturating_sub(right_width);
            Paragraph::new(right_line).render(Rect::new(right_x, area.y, right_width, 1), buf);
        }
    }
}
