use winit::window::{Window, WindowId};

use crate::coords::Vec2;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys  = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
        (logi.width as f32, logi.height as f32)
    }

    /// Window position on the desktop in logical pixels, when the platform reports it.
    pub fn logical_position(&self) -> Option<(f32, f32)> {
        let scale = self.window.scale_factor();
        self.window
            .outer_position()
            .ok()
            .map(|p| {
                let l: winit::dpi::LogicalPosition<f64> = p.to_logical(scale);
                (l.x as f32, l.y as f32)
            })
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:  WindowCtx<'a>,
    pub gpu:     &'a mut Gpu<'w>,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the next surface texture, calls `draw` with a ready
    /// [`RenderCtx`] and [`RenderTarget`], then presents the frame.
    ///
    /// Surface loss is handled here; a fatal surface error ends the app.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let (w, h) = self.window.logical_size();
        let scale_factor = self.window.window.scale_factor() as f32;

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("surface error is fatal; exiting");
                    return AppControl::Exit;
                }
                if action == SurfaceErrorAction::Reconfigured {
                    self.runtime.request_redraw(self.window.id);
                }
                return AppControl::Continue;
            }
        };

        let size = self.gpu.size();
        let rctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            surface_format: self.gpu.surface_format(),
            depth_format: self.gpu.depth_format(),
            viewport: Vec2::new(w, h),
            scale_factor,
            surface_size: (size.width, size.height),
            caps: self.gpu.caps(),
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, &frame.depth_view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
