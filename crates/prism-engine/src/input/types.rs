use std::fmt;

/// Pointer move in logical pixels (top-left origin).
///
/// `movement_*` is the delta from the previous move event; zero for the first
/// event after the pointer enters the surface.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub movement_x: f32,
    pub movement_y: f32,
}

impl PointerEvent {
    #[inline]
    pub const fn at(x: f32, y: f32) -> Self {
        Self { x, y, movement_x: 0.0, movement_y: 0.0 }
    }
}

/// Keyboard key identifier.
///
/// Only keys the engine's consumers bind are named; everything else maps to
/// `Key::Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

impl Key {
    /// `Digit1..=Digit9` as `Some(0..=8)`.
    pub fn digit_index(self) -> Option<usize> {
        let idx = match self {
            Key::Digit1 => 0,
            Key::Digit2 => 1,
            Key::Digit3 => 2,
            Key::Digit4 => 3,
            Key::Digit5 => 4,
            Key::Digit6 => 5,
            Key::Digit7 => 6,
            Key::Digit8 => 7,
            Key::Digit9 => 8,
            _ => return None,
        };
        Some(idx)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved(PointerEvent),

    /// Pointer left the window surface.
    PointerLeft,

    Key {
        key: Key,
        state: KeyState,
        /// True when the event is a key-repeat.
        repeat: bool,
    },

    Focused(bool),
}
