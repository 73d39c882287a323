use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::collections::HashMap;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::WinitInput;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vista".to_string(),
            initial_size: LogicalSize::new(560.0, 420.0),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    /// Schedules one frame for `id`. Requests within one callback coalesce.
    pub fn request_redraw(&mut self, id: WindowId) {
        if !self.commands.iter().any(|c| matches!(c, Command::Redraw(w) if *w == id)) {
            self.commands.push(Command::Redraw(id));
        }
    }

    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(id, title.into()));
    }

    /// Moves and resizes the window (logical pixels).
    pub fn set_geometry(&mut self, id: WindowId, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(Command::SetGeometry(id, x, y, w, h));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::CloseWindow(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

enum Command {
    Redraw(WindowId),
    SetTitle(WindowId, String),
    SetGeometry(WindowId, f32, f32, f32, f32),
    CloseWindow(WindowId),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input: WinitInput,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    windows: HashMap<WindowId, WindowEntry>,
    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            windows: HashMap::new(),
            exit_requested: false,
            fatal: None,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window_entry(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: RuntimeConfig,
    ) -> Result<WindowId> {
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            input: WinitInput::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
            .try_build()
            .context("GPU initialization failed for window")?;

        self.windows.insert(id, entry);
        Ok(id)
    }

    fn destroy_window_entry(&mut self, id: WindowId) {
        self.windows.remove(&id);
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                Command::Redraw(id) => {
                    if let Some(entry) = self.windows.get(&id) {
                        entry.with_window(|w| w.request_redraw());
                    }
                }
                Command::SetTitle(id, title) => {
                    if let Some(entry) = self.windows.get(&id) {
                        entry.with_window(|w| w.set_title(&title));
                    }
                }
                Command::SetGeometry(id, x, y, w, h) => {
                    if let Some(entry) = self.windows.get(&id) {
                        entry.with_window(|win| {
                            win.set_outer_position(LogicalPosition::new(x as f64, y as f64));
                            let _ = win.request_inner_size(LogicalSize::new(w as f64, h as f64));
                        });
                    }
                }
                Command::CloseWindow(id) => self.destroy_window_entry(id),
                Command::Exit => self.request_exit(),
            }
        }

        if self.windows.is_empty() {
            self.request_exit();
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn handle_control(&mut self, control: AppControl, runtime: &mut RuntimeCtx) {
        if control == AppControl::Exit {
            runtime.exit();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop, self.initial.clone()) {
            log::error!("failed to create initial window: {e:#}");
            self.fatal = Some(e);
            self.request_exit();
            event_loop.exit();
            return;
        }

        for entry in self.windows.values() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let mut runtime_ctx = RuntimeCtx::default();
        let wake_at = self.app.on_idle(&mut runtime_ctx);
        self.apply_commands(event_loop, runtime_ctx);

        match wake_at {
            Some(at) if at <= Instant::now() => event_loop.set_control_flow(ControlFlow::Poll),
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, windows) = (&mut self.app, &mut self.windows);

        let Some(entry) = windows.get_mut(&window_id) else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                control = app.on_close_requested(window_id, &mut runtime_ctx);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| {
                    let ctx = WindowCtx { id: window_id, window: w };
                    let size = ctx.logical_size();
                    control = app.on_resize(&ctx, size, &mut runtime_ctx);
                });
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| {
                    let ctx = WindowCtx { id: window_id, window: w };
                    let size = ctx.logical_size();
                    control = app.on_resize(&ctx, size, &mut runtime_ctx);
                });
            }

            WindowEvent::RedrawRequested => {
                entry.with_mut(|fields| {
                    let mut ctx = FrameCtx {
                        window: WindowCtx { id: window_id, window: fields.window },
                        gpu: fields.gpu,
                        runtime: &mut runtime_ctx,
                    };
                    control = app.on_frame(&mut ctx);
                });
            }

            _ => {
                entry.with_mut(|fields| {
                    let events = fields.input.translate(fields.window, &event);
                    let ctx = WindowCtx { id: window_id, window: fields.window };
                    for ev in &events {
                        if app.on_input(&ctx, ev, &mut runtime_ctx) == AppControl::Exit {
                            control = AppControl::Exit;
                            break;
                        }
                    }
                });
            }
        }

        self.handle_control(control, &mut runtime_ctx);
        self.apply_commands(event_loop, runtime_ctx);
    }
}
