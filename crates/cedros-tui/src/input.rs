use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::layout::ROW_UNITS;

/// Document units scrolled by one wheel notch or `j`/`k`
pub const WHEEL_STEP: f64 = 3.0 * ROW_UNITS;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    /// Relative scroll in document units
    ScrollBy(f64),
    PageDown,
    PageUp,
    JumpToTop,
    JumpToBottom,
    /// Carousel index-select (zero based)
    SelectItem(usize),
    PrevItem,
    NextItem,
    /// Stand-in for the platform reduced-motion change event
    ToggleReducedMotion,
    PointerDown { col: u16, row: u16 },
    PointerDrag { col: u16, row: u16 },
    PointerUp,
    PointerMove { col: u16, row: u16 },
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Scrolling
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            Action::ScrollBy(WHEEL_STEP)
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            Action::ScrollBy(-WHEEL_STEP)
        }
        (KeyCode::PageDown, _) | (KeyCode::Char(' '), KeyModifiers::NONE) => Action::PageDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::Char('f'), KeyModifiers::CONTROL) => Action::PageDown,
        (KeyCode::Char('b'), KeyModifiers::CONTROL) => Action::PageUp,
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::JumpToTop,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::JumpToBottom,

        // Carousel
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::SelectItem(c as usize - '1' as usize)
        }
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => Action::PrevItem,
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => Action::NextItem,

        // Accessibility
        (KeyCode::Char('m'), KeyModifiers::NONE) => Action::ToggleReducedMotion,

        _ => Action::None,
    }
}

/// Handle a mouse event and return the corresponding action
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::ScrollBy(WHEEL_STEP),
        MouseEventKind::ScrollUp => Action::ScrollBy(-WHEEL_STEP),
        MouseEventKind::Down(MouseButton::Left) => Action::PointerDown { col, row },
        MouseEventKind::Drag(MouseButton::Left) => Action::PointerDrag { col, row },
        MouseEventKind::Up(MouseButton::Left) => Action::PointerUp,
        MouseEventKind::Moved => Action::PointerMove { col, row },
        _ => Action::None,
    }
}
