use std::time::Instant;

use winit::window::WindowId;

use crate::input::InputEvent;
use crate::window::RuntimeCtx;

use super::ctx::{FrameCtx, WindowCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime only redraws on request: callbacks ask for a frame through
/// [`RuntimeCtx::request_redraw`]. Between events the runtime sleeps until the
/// instant returned by [`App::on_idle`].
pub trait App {
    /// Called for every translated input event.
    fn on_input(
        &mut self,
        window: &WindowCtx<'_>,
        event: &InputEvent,
        runtime: &mut RuntimeCtx,
    ) -> AppControl;

    /// Called after the surface was resized; `size` is in logical pixels.
    fn on_resize(
        &mut self,
        window: &WindowCtx<'_>,
        size: (f32, f32),
        runtime: &mut RuntimeCtx,
    ) -> AppControl {
        let _ = (window, size);
        runtime.request_redraw(window.id);
        AppControl::Continue
    }

    /// Called when the user asks to close a window. Returning `Continue`
    /// keeps the window open.
    fn on_close_requested(&mut self, window_id: WindowId, runtime: &mut RuntimeCtx) -> AppControl {
        runtime.close_window(window_id);
        AppControl::Continue
    }

    /// Called when the event queue drains. Returns the next instant the app
    /// needs to run again (timers), or `None` to sleep until the next event.
    fn on_idle(&mut self, runtime: &mut RuntimeCtx) -> Option<Instant> {
        let _ = runtime;
        None
    }

    /// Called once per requested frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
