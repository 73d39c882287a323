use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState};

/// Current input state for a single window.
///
/// Holds "is down" information and the current pointer position. The winit
/// adapter reads it to fill in positions and modifiers that winit does not
/// carry on every event.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys/buttons when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y, .. } => self.pointer_pos = Some((*x, *y)),

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => {
                        self.keys_down.insert(*key);
                    }
                    KeyState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }

            InputEvent::PointerButton(b) => {
                self.pointer_pos = Some((b.x, b.y));
                self.modifiers = b.modifiers;
                match b.state {
                    MouseButtonState::Pressed => {
                        self.buttons_down.insert(b.button);
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(&b.button);
                    }
                }
            }

            InputEvent::DoubleClick(_) => {}

            InputEvent::MouseWheel { modifiers, .. } => self.modifiers = *modifiers,
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButtonEvent;

    fn press(button: MouseButton, state: MouseButtonState) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state,
            x: 3.0,
            y: 4.0,
            modifiers: Modifiers::default(),
        })
    }

    #[test]
    fn button_press_and_release() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Left, MouseButtonState::Pressed));
        assert!(s.button_down(MouseButton::Left));
        assert_eq!(s.pointer_pos, Some((3.0, 4.0)));
        s.apply_event(&press(MouseButton::Left, MouseButtonState::Released));
        assert!(!s.button_down(MouseButton::Left));
    }

    #[test]
    fn focus_loss_clears_held() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Right, MouseButtonState::Pressed));
        s.apply_event(&InputEvent::Focused(false));
        assert!(s.buttons_down.is_empty());
    }
}
