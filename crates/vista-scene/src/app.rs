use std::cell::RefCell;
use std::rc::Rc;

use winit::dpi::LogicalSize;
use winit::window::WindowId;

use vista_engine::coords::Rect;
use vista_engine::core::{App as EngineApp, AppControl, FrameCtx, WindowCtx};
use vista_engine::device::{GpuCaps, GpuInit};
use vista_engine::input::{InputEvent, KeyState, MouseButtonState, PointerButtonEvent};
use vista_engine::logging::{init_logging, LoggingConfig};
use vista_engine::paint::Color;
use vista_engine::render::Renderer;
use vista_engine::scene::DrawList;
use vista_engine::window::{Runtime, RuntimeConfig, RuntimeCtx};

use crate::backend::Backend;
use crate::config::FigureConfig;
use crate::error::{Result, VistaError};
use crate::events::EventKind;
use crate::figure::{Figure, MouseInput};

// ── WinitBackend ──────────────────────────────────────────────────────────

/// Window state shared between the backend a figure talks to and the host
/// that owns the window. The backend records requests; the host applies
/// them to the runtime after every callback.
#[derive(Default)]
struct Shared {
    window: Option<WindowId>,
    caps: Option<GpuCaps>,
    rect: Rect,
    frame: Option<DrawList>,
    redraw: bool,
    title: Option<String>,
    geometry: Option<Rect>,
    close: bool,
}

/// [`Backend`] over one window of the engine runtime.
///
/// winit pumps its own queue, so `process_events` has nothing to do, and
/// there is one wgpu device per window, so `make_current` only checks that
/// the window is still open.
pub struct WinitBackend {
    shared: Rc<RefCell<Shared>>,
}

impl Backend for WinitBackend {
    fn make_current(&mut self) -> Result<()> {
        if self.shared.borrow().close {
            return Err(VistaError::ContextUnavailable("window is closed".to_string()));
        }
        Ok(())
    }

    fn swap_buffers(&mut self, frame: DrawList) {
        self.shared.borrow_mut().frame = Some(frame);
    }

    fn post_redraw(&mut self) {
        self.shared.borrow_mut().redraw = true;
    }

    fn process_events(&mut self) {}

    fn position(&self) -> Rect {
        self.shared.borrow().rect
    }

    fn set_position(&mut self, rect: Rect) {
        let mut s = self.shared.borrow_mut();
        s.rect = rect;
        s.geometry = Some(rect);
    }

    fn set_title(&mut self, title: &str) {
        self.shared.borrow_mut().title = Some(title.to_string());
    }

    fn close(&mut self) {
        self.shared.borrow_mut().close = true;
    }

    fn caps(&self) -> GpuCaps {
        self.shared.borrow().caps.unwrap_or_else(GpuCaps::desktop)
    }
}

// ── Host ──────────────────────────────────────────────────────────────────

struct FigureHost {
    figure: Figure,
    shared: Rc<RefCell<Shared>>,
    renderer: Renderer,
}

impl FigureHost {
    /// Hands the backend's recorded requests to the runtime.
    fn flush(&mut self, runtime: &mut RuntimeCtx) {
        let mut s = self.shared.borrow_mut();
        let Some(id) = s.window else { return };
        if std::mem::take(&mut s.redraw) {
            runtime.request_redraw(id);
        }
        if let Some(title) = s.title.take() {
            runtime.set_title(id, title);
        }
        if let Some(r) = s.geometry.take() {
            runtime.set_geometry(id, r.x, r.y, r.w, r.h);
        }
        if s.close {
            runtime.close_window(id);
        }
    }

    fn track(&mut self, window: &WindowCtx<'_>) {
        let mut s = self.shared.borrow_mut();
        s.window = Some(window.id);
        let (w, h) = window.logical_size();
        let (x, y) = window.logical_position().unwrap_or((s.rect.x, s.rect.y));
        s.rect = Rect::new(x, y, w, h);
    }

    fn button(&mut self, e: &PointerButtonEvent, kind: EventKind) {
        let input = MouseInput::at(e.x, e.y).button(e.button).modifiers(e.modifiers);
        self.figure.mouse(kind, input);
    }
}

impl EngineApp for FigureHost {
    fn on_input(&mut self, window: &WindowCtx<'_>, event: &InputEvent, runtime: &mut RuntimeCtx) -> AppControl {
        self.track(window);
        match event {
            InputEvent::PointerMoved { x, y, modifiers } => {
                self.figure.mouse(EventKind::Motion, MouseInput::at(*x, *y).modifiers(*modifiers));
            }
            InputEvent::PointerButton(e) => {
                let kind = match e.state {
                    MouseButtonState::Pressed => EventKind::MouseDown,
                    MouseButtonState::Released => EventKind::MouseUp,
                };
                self.button(e, kind);
            }
            InputEvent::DoubleClick(e) => self.button(e, EventKind::DoubleClick),
            InputEvent::MouseWheel { delta, x, y, modifiers } => {
                let input = MouseInput::at(*x, *y).modifiers(*modifiers).wheel(delta.notches());
                self.figure.mouse(EventKind::Wheel, input);
            }
            InputEvent::Key { key, state, modifiers, text, .. } => {
                let kind = match state {
                    KeyState::Pressed => EventKind::KeyDown,
                    KeyState::Released => EventKind::KeyUp,
                };
                self.figure.key(kind, Some(*key), text.clone(), *modifiers);
            }
            InputEvent::ModifiersChanged(_) | InputEvent::PointerLeft | InputEvent::Focused(_) => {}
        }
        self.flush(runtime);
        AppControl::Continue
    }

    fn on_resize(&mut self, window: &WindowCtx<'_>, size: (f32, f32), runtime: &mut RuntimeCtx) -> AppControl {
        self.track(window);
        self.figure.resize(size.0, size.1);
        runtime.request_redraw(window.id);
        self.flush(runtime);
        AppControl::Continue
    }

    fn on_close_requested(&mut self, window_id: WindowId, runtime: &mut RuntimeCtx) -> AppControl {
        self.shared.borrow_mut().window = Some(window_id);
        self.figure.close();
        self.flush(runtime);
        AppControl::Continue
    }

    fn on_idle(&mut self, runtime: &mut RuntimeCtx) -> Option<std::time::Instant> {
        self.figure.process_events();
        self.flush(runtime);
        self.figure.next_wakeup()
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.track(&ctx.window);
        self.shared.borrow_mut().caps = Some(ctx.gpu.caps());

        if let Err(e) = self.figure.paint() {
            log::debug!("frame skipped: {e}");
        }
        let frame = self.shared.borrow_mut().frame.take();
        let mut control = AppControl::Continue;
        if let Some(mut list) = frame {
            let Self { figure, renderer, .. } = self;
            control = ctx.render(|rctx, target| renderer.render(rctx, target, &mut list, figure.fonts()));
        }
        self.flush(ctx.runtime);
        control
    }
}

// ── Application ───────────────────────────────────────────────────────────

/// Opens one figure window and runs the event loop.
///
/// ```rust,ignore
/// Application::new()
///     .title("sine")
///     .size(640.0, 480.0)
///     .font(include_bytes!("font.ttf").to_vec())
///     .run(|figure| {
///         let axes = figure.add_axes()?;
///         figure.add_object(axes, Line::new(&points))?;
///         figure.set_limits(axes, 0.02)
///     })?;
/// ```
pub struct Application {
    config: FigureConfig,
    fonts: Vec<Vec<u8>>,
    logging: LoggingConfig,
    gpu: GpuInit,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        Self {
            config: FigureConfig::default(),
            fonts: Vec::new(),
            logging: LoggingConfig::default(),
            gpu: GpuInit::default(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.config.size = (width, height);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.config.background = color;
        self
    }

    /// Text font (TrueType or OpenType bytes). The last font that loads is
    /// used.
    pub fn font(mut self, bytes: Vec<u8>) -> Self {
        self.fonts.push(bytes);
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn config(mut self, config: FigureConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the figure, lets `setup` populate it and runs until the
    /// window closes.
    pub fn run<F>(self, setup: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Figure) -> Result<()>,
    {
        init_logging(self.logging);

        let (w, h) = self.config.size;
        let shared = Rc::new(RefCell::new(Shared { rect: Rect::new(0.0, 0.0, w, h), ..Shared::default() }));
        let backend = WinitBackend { shared: shared.clone() };
        let runtime = RuntimeConfig { title: self.config.title.clone(), initial_size: LogicalSize::new(w as f64, h as f64) };

        let mut figure = Figure::new(Box::new(backend), self.config);
        for bytes in &self.fonts {
            if let Err(e) = figure.set_font(bytes) {
                log::warn!("{e}");
            }
        }
        setup(&mut figure)?;
        // The runtime owns the title from here on.
        shared.borrow_mut().title = None;

        let host = FigureHost { figure, shared, renderer: Renderer::new() };
        Runtime::run(runtime, self.gpu, host)
    }
}
