use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps platform keycodes into these variants where possible.
/// Unsupported keys become `Key::Unknown(u32)` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers as keys (useful for focus/navigation policies)
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Vertical delta in wheel notches; pixel deltas count 40 px per notch.
    pub fn notches(&self) -> f32 {
        match *self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / 40.0,
        }
    }
}

/// Pointer button event in logical pixels relative to the window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// Stable platform code when available (e.g. scancode).
        code: u32,
        /// Text produced by the key press, if any.
        text: Option<String>,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    PointerMoved { x: f32, y: f32, modifiers: Modifiers },
    PointerButton(PointerButtonEvent),

    /// Second press of the same button within the double-click window.
    /// Delivered after the corresponding `PointerButton` press.
    DoubleClick(PointerButtonEvent),

    MouseWheel {
        delta: MouseWheelDelta,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}