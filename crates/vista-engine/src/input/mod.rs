//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform::winit` translates window events into `InputEvent`s.

mod click;
mod state;
mod types;

pub mod platform;

pub use click::ClickTracker;
pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
};
