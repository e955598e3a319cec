use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, PointerEvent};

/// Current input state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Last pointer position in logical pixels; `None` while outside the surface.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Builds a move event at `(x, y)` with movement relative to the last known
    /// position.
    pub fn pointer_event_at(&self, x: f32, y: f32) -> PointerEvent {
        let (movement_x, movement_y) = match self.pointer_pos {
            Some((px, py)) => (x - px, y - py),
            None => (0.0, 0.0),
        };
        PointerEvent { x, y, movement_x, movement_y }
    }

    /// Applies an event to the current state and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::PointerMoved(p) => {
                self.pointer_pos = Some((p.x, p.y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Release events are not delivered while unfocused.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
