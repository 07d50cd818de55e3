//! Thumbnail grid widget.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};
use ratatui_image::{Resize, StatefulImage};

use super::image_state::{ImageManager, fitted_area};
use crate::application::{CellState, GridSnapshot};
use crate::presentation::events::Direction;

const LOADING_TEXT: &str = "Loading…";
const ERROR_TEXT: &str = "Error unable to load image";
const DELETE_MARKER: &str = "✕";
const MIN_CELL_HEIGHT: u16 = 3;

/// Selection and scroll position of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridViewState {
    selected: usize,
    offset_row: usize,
}

impl GridViewState {
    /// Index of the selected cell.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// First visible row.
    #[must_use]
    pub const fn offset_row(&self) -> usize {
        self.offset_row
    }

    /// Keeps the selection inside a grid of `len` cells.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Moves the selection, staying inside a grid of `len` cells laid out in
    /// `columns` columns.
    pub fn move_selection(&mut self, direction: Direction, columns: usize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let columns = columns.max(1);
        let last = len - 1;
        self.selected = match direction {
            Direction::Left => self.selected.saturating_sub(1),
            Direction::Right => (self.selected + 1).min(last),
            Direction::Up => self.selected.checked_sub(columns).unwrap_or(self.selected),
            Direction::Down => {
                let next = self.selected + columns;
                if next <= last { next } else { self.selected }
            }
        };
    }

    fn scroll_into_view(&mut self, columns: usize, visible_rows: usize) {
        let row = self.selected / columns;
        let visible_rows = visible_rows.max(1);
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + visible_rows {
            self.offset_row = row + 1 - visible_rows;
        }
    }
}

/// Grid styling.
pub struct GridViewStyle {
    /// Border of unselected cells.
    pub border: Style,
    /// Border of the selected cell.
    pub selected_border: Style,
    /// Cell title.
    pub label: Style,
    /// Loading placeholder text.
    pub loading: Style,
    /// Inline error indicator.
    pub error: Style,
    /// Delete marker shown in edit mode.
    pub delete_marker: Style,
    /// Text of an empty grid.
    pub empty: Style,
}

impl Default for GridViewStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            selected_border: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            loading: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            delete_marker: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            empty: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Renders a [`GridSnapshot`] as bordered cells.
///
/// Loaded thumbnails are drawn through the protocols held by an
/// [`ImageManager`].
pub struct GridView<'a> {
    snapshot: &'a GridSnapshot,
    images: &'a mut ImageManager,
    style: GridViewStyle,
}

impl<'a> GridView<'a> {
    /// Creates a grid over `snapshot`, drawing thumbnails with `images`.
    #[must_use]
    pub fn new(snapshot: &'a GridSnapshot, images: &'a mut ImageManager) -> Self {
        Self {
            snapshot,
            images,
            style: GridViewStyle::default(),
        }
    }

    /// Replaces the default styling.
    #[must_use]
    pub fn style(mut self, style: GridViewStyle) -> Self {
        self.style = style;
        self
    }

    fn render_cell(&mut self, index: usize, selected: bool, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let cell = &snapshot.cells[index];
        let border_style = if selected {
            self.style.selected_border
        } else {
            self.style.border
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border_style)
            .title(Span::styled(cell.item.label(), self.style.label));
        let inner = block.inner(area);
        block.render(area, buf);

        match &cell.state {
            CellState::Loaded(payload) if !inner.is_empty() => {
                let protocol = self.images.thumbnail(cell.item.id, payload);
                let image_area = fitted_area(protocol, inner);
                StatefulImage::default()
                    .resize(Resize::Fit(None))
                    .render(image_area, buf, protocol);
            }
            CellState::Loaded(_) => {}
            CellState::Loading => centered(LOADING_TEXT, self.style.loading, inner, buf),
            CellState::Failed(_) => centered(ERROR_TEXT, self.style.error, inner, buf),
        }

        if snapshot.editing && area.width >= 3 {
            let x = area.right() - 2;
            buf.set_string(x, area.y, DELETE_MARKER, self.style.delete_marker);
        }
    }
}

fn centered(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
        return;
    }
    let y = area.y + area.height.saturating_sub(1) / 2;
    let line_area = Rect::new(area.x, y, area.width, area.bottom() - y);
    Paragraph::new(Line::from(Span::styled(text.to_string(), style)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(line_area, buf);
}

impl StatefulWidget for GridView<'_> {
    type State = GridViewState;

    fn render(mut self, area: Rect, buf: &mut Buffer, state: &mut GridViewState) {
        self.images.retain_thumbnails(self.snapshot);
        if area.is_empty() {
            return;
        }
        if self.snapshot.is_empty() {
            centered("No photos", self.style.empty, area, buf);
            return;
        }

        let columns = usize::from(self.snapshot.columns.max(1));
        let cell_width = (area.width / u16::from(self.snapshot.columns.max(1))).max(1);
        let cell_height = (cell_width / 2).max(MIN_CELL_HEIGHT).min(area.height);
        let visible_rows = usize::from(area.height / cell_height);

        state.clamp(self.snapshot.len());
        state.scroll_into_view(columns, visible_rows);

        let first = state.offset_row * columns;
        let last = (first + visible_rows * columns).min(self.snapshot.len());
        for index in first..last {
            let slot = index - first;
            #[allow(clippy::cast_possible_truncation)]
            let (col, row) = ((slot % columns) as u16, (slot / columns) as u16);
            let cell_area = Rect::new(
                area.x + col * cell_width,
                area.y + row * cell_height,
                cell_width,
                cell_height,
            )
            .intersection(area);
            self.render_cell(index, index == state.selected, cell_area, buf);
        }
    }
}
