//! Platform event adapters.

mod winit_events;

pub use winit_events::{translate_window_event, WinitInput};
