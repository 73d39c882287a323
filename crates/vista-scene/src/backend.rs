//! Contract between a figure and the window toolkit that hosts it.

use vista_engine::coords::Rect;
use vista_engine::device::GpuCaps;
use vista_engine::scene::DrawList;

use crate::error::Result;

/// Services a figure needs from its window.
///
/// Implemented by the winit adapter in [`crate::app`] and by test doubles.
/// Events travel the other way: the host calls the figure's `mouse`, `key`,
/// `resize`, `paint` and `close` entry points.
pub trait Backend {
    /// Makes this window's drawing context current. Called before every
    /// paint and once per destroy.
    fn make_current(&mut self) -> Result<()>;

    /// Presents the frame that was just painted. The list carries the
    /// frame's texture ops ahead of its draws.
    fn swap_buffers(&mut self, frame: DrawList);

    /// Asks the toolkit for a paint on the UI thread.
    fn post_redraw(&mut self);

    /// Pumps one round of toolkit events.
    fn process_events(&mut self);

    /// Window geometry in logical pixels.
    fn position(&self) -> Rect;

    fn set_position(&mut self, rect: Rect);

    fn set_title(&mut self, title: &str) {
        let _ = title;
    }

    fn close(&mut self);

    /// Capabilities of the device behind the window.
    fn caps(&self) -> GpuCaps;
}
