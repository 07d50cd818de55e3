//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User command decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Exit the application.
    Quit,
    /// Move the selection.
    Move(Direction),
    /// Open the selected item full size.
    Open,
    /// Leave the detail view.
    Back,
    /// Toggle edit mode.
    ToggleEdit,
    /// Add a grid column.
    MoreColumns,
    /// Remove a grid column.
    FewerColumns,
    /// Delete the selected item.
    Delete,
    /// Pick and add a photo.
    AddPhoto,
    /// Refetch the gallery.
    Refresh,
    /// Drop every cached thumbnail.
    ClearCache,
}

/// Selection movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Previous row.
    Up,
    /// Next row.
    Down,
    /// Previous cell.
    Left,
    /// Next cell.
    Right,
}

/// A key shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    /// Key label, e.g. `Enter`.
    pub key: &'static str,
    /// What the key does.
    pub label: &'static str,
}

impl KeyHint {
    const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

const GRID_HINTS: &[KeyHint] = &[
    KeyHint::new("Enter", "Open"),
    KeyHint::new("e", "Edit"),
    KeyHint::new("a", "Add"),
    KeyHint::new("r", "Refresh"),
    KeyHint::new("c", "Clear"),
    KeyHint::new("q", "Quit"),
];

const EDIT_HINTS: &[KeyHint] = &[
    KeyHint::new("+/-", "Columns"),
    KeyHint::new("d", "Delete"),
    KeyHint::new("e", "Done"),
    KeyHint::new("q", "Quit"),
];

const DETAIL_HINTS: &[KeyHint] = &[KeyHint::new("Esc", "Back"), KeyHint::new("q", "Quit")];

const fn is_press(key: &KeyEvent) -> bool {
    matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Decodes a key pressed on the grid screen.
#[must_use]
pub fn grid_command(key: &KeyEvent) -> Option<Command> {
    if !is_press(key) {
        return None;
    }
    if is_ctrl_c(key) {
        return Some(Command::Quit);
    }
    Some(match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Up | KeyCode::Char('k') => Command::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Command::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Command::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Command::Move(Direction::Right),
        KeyCode::Enter => Command::Open,
        KeyCode::Char('e') => Command::ToggleEdit,
        KeyCode::Char('+' | '=') => Command::MoreColumns,
        KeyCode::Char('-') => Command::FewerColumns,
        KeyCode::Char('d') | KeyCode::Delete => Command::Delete,
        KeyCode::Char('a') => Command::AddPhoto,
        KeyCode::Char('r') => Command::Refresh,
        KeyCode::Char('c') => Command::ClearCache,
        _ => return None,
    })
}

/// Decodes a key pressed on the detail screen.
#[must_use]
pub fn detail_command(key: &KeyEvent) -> Option<Command> {
    if !is_press(key) {
        return None;
    }
    if is_ctrl_c(key) {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            Some(Command::Back)
        }
        _ => None,
    }
}

/// Footer hints for the grid screen.
#[must_use]
pub const fn grid_hints(editing: bool) -> &'static [KeyHint] {
    if editing { EDIT_HINTS } else { GRID_HINTS }
}

/// Footer hints for the detail screen.
#[must_use]
pub const fn detail_hints() -> &'static [KeyHint] {
    DETAIL_HINTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test_case(KeyCode::Char('q'), Some(Command::Quit) ; "quit")]
    #[test_case(KeyCode::Char('j'), Some(Command::Move(Direction::Down)) ; "vim_down")]
    #[test_case(KeyCode::Left, Some(Command::Move(Direction::Left)) ; "arrow_left")]
    #[test_case(KeyCode::Enter, Some(Command::Open) ; "open")]
    #[test_case(KeyCode::Char('='), Some(Command::MoreColumns) ; "plus_without_shift")]
    #[test_case(KeyCode::Delete, Some(Command::Delete) ; "delete_key")]
    #[test_case(KeyCode::Char('x'), None ; "unbound")]
    fn test_grid_command(code: KeyCode, expected: Option<Command>) {
        assert_eq!(grid_command(&press(code)), expected);
    }

    #[test_case(KeyCode::Esc, Some(Command::Back) ; "escape")]
    #[test_case(KeyCode::Backspace, Some(Command::Back) ; "backspace")]
    #[test_case(KeyCode::Enter, None ; "enter_unbound")]
    fn test_detail_command(code: KeyCode, expected: Option<Command>) {
        assert_eq!(detail_command(&press(code)), expected);
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(grid_command(&key), Some(Command::Quit));
        assert_eq!(detail_command(&key), Some(Command::Quit));
    }

    #[test]
    fn test_release_is_ignored() {
        let key = KeyEvent::new_with_kind(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(grid_command(&key), None);
    }

    #[test]
    fn test_hints_follow_edit_mode() {
        assert!(grid_hints(false).iter().any(|h| h.label == "Add"));
        assert!(grid_hints(true).iter().all(|h| h.label != "Add"));
    }
}
