//! The figure: root of a scene tree bound to one window.
//!
//! A figure owns the tree, the timers and the per-window resources (fonts,
//! sprite and colormap caches, the pick buffer). The host forwards window
//! events to [`Figure::mouse`], [`Figure::key`], [`Figure::resize`],
//! [`Figure::paint`] and [`Figure::close`], and calls
//! [`Figure::process_events`] when idle.
//!
//! Every paint runs the shape pass first: hit-testable nodes are drawn in
//! colors encoding their draw ids and rasterized into the pick buffer. The
//! visible frame is drawn next and handed to the backend.

use std::rc::Rc;
use std::time::Instant;

use glam::DVec3;
use vista_engine::coords::Rect;
use vista_engine::device::GpuCaps;
use vista_engine::input::{Key, Modifiers, MouseButton};
use vista_engine::paint::Color;
use vista_engine::render::{PickBuffer, PickRasterizer};
use vista_engine::scene::{DrawList, TextureOp};
use vista_engine::text::{FontId, FontSystem};
use vista_math::Range;

use crate::axis::Axis;
use crate::backend::Backend;
use crate::config::FigureConfig;
use crate::draw::{draw_tree, DrawContext, DrawPass, Resources};
use crate::error::{Result, VistaError};
use crate::events::{Event, EventKind};
use crate::node::{Behavior, Bounds, NodeId, Pattern, Position, Requests, Scene};
use crate::picking::{assign_draw_ids, hit_chain, IdCodec};
use crate::timer::{Clock, SystemClock, TimerAction, TimerId, TimerQueue, TimerSpec};
use crate::widgets::{axes_position, Axes, AxesContainer};

/// Fraction of the data range added around automatic limits.
pub const LIMIT_MARGIN: f64 = 0.02;

/// Redraw request waiting for the next paint.
#[derive(Debug, Copy, Clone, Default)]
struct PendingDraw {
    /// Latched: once a fast draw is requested the next paint is fast.
    fast: bool,
    /// A full draw was requested while the fast flag was latched.
    full_wanted: bool,
}

/// Pointer state kept between events.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseInput {
    pub x: f32,
    pub y: f32,
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
    /// Wheel notches, positive away from the user.
    pub wheel: f32,
}

impl MouseInput {
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, button: None, modifiers: Modifiers::default(), wheel: 0.0 }
    }

    pub fn button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn wheel(mut self, notches: f32) -> Self {
        self.wheel = notches;
        self
    }
}

/// Root of a scene tree and its window.
pub struct Figure {
    backend: Box<dyn Backend>,
    config: FigureConfig,
    scene: Scene,
    clock: Rc<dyn Clock>,
    timers: TimerQueue,
    fonts: FontSystem,
    font: FontId,
    resources: Resources,
    rasterizer: PickRasterizer,
    /// Releases to apply ahead of the next frame.
    released: Vec<TextureOp>,
    pick: Option<PickBuffer>,
    codec: Option<IdCodec>,
    pending: Option<PendingDraw>,
    redraw_timer: Option<TimerId>,
    hover: Vec<NodeId>,
    pressed: Vec<NodeId>,
    frames: u64,
    context_logged: bool,
    closed: bool,
}

impl Figure {
    pub fn new(backend: Box<dyn Backend>, config: FigureConfig) -> Self {
        Self::with_clock(backend, config, Rc::new(SystemClock))
    }

    /// Figure whose timers and redraw coalescing read `clock`.
    pub fn with_clock(mut backend: Box<dyn Backend>, config: FigureConfig, clock: Rc<dyn Clock>) -> Self {
        let rect = backend.position();
        let size = if rect.w > 0.0 && rect.h > 0.0 { (rect.w, rect.h) } else { config.size };
        backend.set_title(&config.title);
        Self {
            backend,
            config,
            scene: Scene::new(None, size),
            clock,
            timers: TimerQueue::new(),
            fonts: FontSystem::new(),
            font: FontId::default(),
            resources: Resources::default(),
            rasterizer: PickRasterizer::new(),
            released: Vec::new(),
            pick: None,
            codec: None,
            pending: None,
            redraw_timer: None,
            hover: Vec::new(),
            pressed: Vec::new(),
            frames: 0,
            context_logged: false,
            closed: false,
        }
    }

    pub fn config(&self) -> &FigureConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn root(&self) -> NodeId {
        self.scene.root()
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    /// Loads a font and makes it the figure's text font.
    pub fn set_font(&mut self, bytes: &[u8]) -> Result<FontId> {
        let id = self.fonts.load_font(bytes).map_err(|e| VistaError::invalid(format!("font: {}", e.0)))?;
        self.font = id;
        Ok(id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of frames painted.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
        self.backend.set_title(&self.config.title);
    }

    // ── tree ──────────────────────────────────────────────────────────────

    /// Adds an axes filling the figure: an [`AxesContainer`] holding the
    /// axes and its [`Axis`]. Returns the axes.
    pub fn add_axes(&mut self) -> Result<NodeId> {
        let root = self.scene.root();
        self.add_axes_in(root, Position::fill())
    }

    /// Adds an axes whose container sits at `position` inside `parent`.
    pub fn add_axes_in(&mut self, parent: NodeId, position: Position) -> Result<NodeId> {
        let container = self.scene.add_widget(parent, position, Box::new(AxesContainer::new()))?;
        let mut axes = Axes::new().with_fly_interval(self.config.fly_tick);
        axes.axis_style_mut().min_tick_pixels = self.config.min_tick_pixels;
        let id = self.scene.add_widget(container, axes_position(), Box::new(axes))?;
        self.scene.set_hit_test(id, true)?;
        self.scene.set_background(id, Color::WHITE)?;
        self.scene.set_edge(id, Color::BLACK, 1.0)?;
        self.scene.add_world(id, Box::new(Axis::new()))?;
        self.sync_axes_size(id);
        Ok(id)
    }

    /// Adds a world object to an axes.
    pub fn add_object(&mut self, axes: NodeId, behavior: impl Behavior) -> Result<NodeId> {
        if self.scene.behavior::<Axes>(axes).is_none() {
            return Err(VistaError::invalid(format!("{axes} is not an axes")));
        }
        let id = self.scene.add_world(axes, Box::new(behavior))?;
        self.draw(false);
        Ok(id)
    }

    /// Adds a widget.
    pub fn add_widget(&mut self, parent: NodeId, position: Position, behavior: impl Behavior) -> Result<NodeId> {
        let id = self.scene.add_widget(parent, position, Box::new(behavior))?;
        self.draw(false);
        Ok(id)
    }

    pub fn axes(&self, id: NodeId) -> Result<&Axes> {
        self.scene.behavior::<Axes>(id).ok_or(VistaError::DestroyedNode(id))
    }

    pub fn axes_mut(&mut self, id: NodeId) -> Result<&mut Axes> {
        self.scene.behavior_mut::<Axes>(id).ok_or(VistaError::DestroyedNode(id))
    }

    /// Sets automatic limits from the bounds of the axes' world objects,
    /// widened by `margin`. An empty axes gets the unit cube.
    pub fn set_limits(&mut self, axes: NodeId, margin: f64) -> Result<()> {
        let bounds = self.scene.world_bounds(axes);
        self.sync_axes_size(axes);
        let a = self.axes_mut(axes)?;
        match bounds {
            Some(b) => a.fit(b, margin),
            None => a.set_limits([Range::new(0.0, 1.0); 3]),
        }
        self.draw(false);
        Ok(())
    }

    /// Sets explicit limits; a `None` z keeps the current one.
    pub fn set_limits_to(&mut self, axes: NodeId, x: Range, y: Range, z: Option<Range>) -> Result<()> {
        self.sync_axes_size(axes);
        let a = self.axes_mut(axes)?;
        let z = z.unwrap_or(a.limits()[2]);
        a.set_limits([x.normalized(), y.normalized(), z.normalized()]);
        self.draw(false);
        Ok(())
    }

    pub fn reset_camera(&mut self, axes: NodeId) -> Result<()> {
        self.sync_axes_size(axes);
        self.axes_mut(axes)?.reset_camera();
        self.draw(false);
        Ok(())
    }

    /// Figure pixel of a data point in an axes, with depth in `[0, 1]`.
    pub fn world_to_screen(&self, axes: NodeId, p: DVec3) -> Option<DVec3> {
        let r = self.scene.rect(axes);
        let s = self.axes(axes).ok()?.world_to_screen(p)?;
        Some(DVec3::new(s.x + r.x as f64, s.y + r.y as f64, s.z))
    }

    /// Data point under a figure pixel of an axes.
    pub fn screen_to_world(&self, axes: NodeId, x: f32, y: f32) -> Option<DVec3> {
        let r = self.scene.rect(axes);
        Some(self.axes(axes).ok()?.screen_to_world((x - r.x) as f64, (y - r.y) as f64))
    }

    /// Hit chain under a figure pixel as of the last paint, root first.
    pub fn pick_at(&self, x: f32, y: f32) -> Vec<NodeId> {
        match &self.codec {
            Some(codec) => hit_chain(&self.scene, codec, self.pick.as_ref(), x, y),
            None => vec![self.scene.root()],
        }
    }

    /// Pick buffer of the last paint.
    pub fn pick_buffer(&self) -> Option<&PickBuffer> {
        self.pick.as_ref()
    }

    fn sync_axes_size(&mut self, axes: NodeId) {
        let r = self.scene.rect(axes);
        if let Some(a) = self.scene.behavior_mut::<Axes>(axes) {
            a.set_size((r.w as f64, r.h as f64));
        }
    }

    /// Destroys a node and its subtree. Destroying an axes takes its
    /// container along. Returns the destroyed nodes, children first; a dead
    /// node or the root gives an empty list.
    pub fn destroy(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.scene.contains(id) || id == self.scene.root() {
            return Vec::new();
        }
        if let Err(e) = self.backend.make_current() {
            log::warn!("destroying {id} without a current context: {e}");
        }
        let target = match self.scene.parent(id) {
            Some(p) if self.scene.behavior::<Axes>(id).is_some() && self.scene.behavior::<AxesContainer>(p).is_some() => p,
            _ => id,
        };
        let gone = self.scene.destroy(target);
        for n in &gone {
            self.timers.cancel_owner(*n);
        }
        self.hover.retain(|n| !gone.contains(n));
        self.pressed.retain(|n| !gone.contains(n));
        self.released.extend(self.scene.take_released());
        self.draw(false);
        gone
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Asks for a redraw. Requests are coalesced: while one is already due
    /// within the coalescing window nothing new is scheduled. A fast request
    /// makes the next paint fast.
    pub fn draw(&mut self, fast: bool) {
        if self.closed {
            return;
        }
        let p = self.pending.get_or_insert_with(PendingDraw::default);
        if fast {
            p.fast = true;
        } else if p.fast {
            p.full_wanted = true;
        }
        let now = self.clock.now();
        let horizon = now + self.config.redraw_coalesce;
        if self.redraw_timer.and_then(|t| self.timers.due_at(t)).is_some_and(|due| due <= horizon) {
            return;
        }
        let spec = TimerSpec::oneshot(self.config.redraw_coalesce);
        self.redraw_timer = Some(self.timers.start(now, spec, None, TimerAction::Redraw));
    }

    /// Paints right away: drops the scheduled redraw, pumps the toolkit
    /// once and paints.
    pub fn draw_now(&mut self) -> Result<()> {
        if let Some(t) = self.redraw_timer.take() {
            self.timers.stop(t);
        }
        self.backend.process_events();
        self.paint()
    }

    /// Whether a redraw is waiting for a paint.
    pub fn needs_paint(&self) -> bool {
        self.pending.is_some()
    }

    /// Paints one frame: shape pass into the pick buffer, then the normal
    /// or fast pass, presented through the backend. Fires `AfterDraw` on
    /// the root.
    pub fn paint(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if let Err(e) = self.backend.make_current() {
            return Err(self.context_error(e));
        }
        let caps = self.backend.caps();
        if caps.color_bits.contains(&0) {
            let e = VistaError::ContextUnavailable(format!("color channel bits {:?}", caps.color_bits));
            return Err(self.context_error(e));
        }
        let pending = self.pending.take().unwrap_or_default();
        let codec = IdCodec::new(caps.color_bits);
        let skipped = assign_draw_ids(&mut self.scene, &codec);
        if skipped > 0 {
            log::warn!("{skipped} node(s) exceed the pick id range and cannot be picked");
        }

        let root = self.scene.rect(self.scene.root());
        let size = (root.w.max(0.0).round() as u32, root.h.max(0.0).round() as u32);
        let mut failed = Vec::new();

        let mut shape = DrawList::new();
        failed.extend(self.run_pass(&mut shape, caps, DrawPass::Shape, &codec));
        self.pick = Some(self.rasterizer.render(&mut shape, size, &self.fonts, Color::BLACK));
        self.codec = Some(codec);

        let mut frame = DrawList::new();
        frame.set_clear_color(self.config.background);
        for op in self.released.drain(..).chain(shape.take_texture_ops()) {
            frame.push_texture_op(op);
        }
        let pass = if pending.fast { DrawPass::Fast } else { DrawPass::Normal };
        for id in self.run_pass(&mut frame, caps, pass, &codec) {
            if !failed.contains(&id) {
                failed.push(id);
            }
        }

        self.backend.swap_buffers(frame);
        self.frames += 1;
        log::trace!("painted frame {} ({:?})", self.frames, pass);

        for id in failed {
            self.destroy(id);
        }
        let root_id = self.scene.root();
        self.dispatch(root_id, &Event::new(EventKind::AfterDraw, root_id));
        if pending.full_wanted {
            self.draw(false);
        }
        Ok(())
    }

    fn run_pass(&mut self, list: &mut DrawList, caps: GpuCaps, pass: DrawPass, codec: &IdCodec) -> Vec<NodeId> {
        let mut ctx = DrawContext::new(list, &mut self.resources, &self.fonts, self.font, caps, pass);
        draw_tree(&mut self.scene, &mut ctx, &|d| codec.encode(d))
    }

    fn context_error(&mut self, e: VistaError) -> VistaError {
        if !self.context_logged {
            log::error!("cannot paint: {e}");
            self.context_logged = true;
        }
        e
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Pumps the toolkit and fires due timers.
    pub fn process_events(&mut self) {
        self.backend.process_events();
        let now = self.clock.now();
        let scene = &self.scene;
        let fired = self.timers.poll(now, |id| scene.contains(id));
        for (id, action) in fired {
            match action {
                TimerAction::Redraw => {
                    if self.redraw_timer == Some(id) {
                        self.redraw_timer = None;
                    }
                    self.backend.post_redraw();
                }
                TimerAction::FlyStep(axes) => {
                    if self.scene.behavior_mut::<Axes>(axes).is_some_and(|a| a.fly_step()) {
                        self.draw(true);
                    }
                }
                TimerAction::Callback(f) => (f.borrow_mut())(),
            }
        }
    }

    /// When the next timer is due; the host sleeps until then.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Fires an event on one node: bound handlers first, newest first, then
    /// the behavior if it wants the kind. Returns whether it was consumed.
    pub fn dispatch(&mut self, id: NodeId, event: &Event) -> bool {
        let r = self.scene.rect(id);
        let e = event.retarget(id, (r.x, r.y));
        if self.scene.fire(id, &e) {
            return true;
        }
        let mut requests = Requests::default();
        let consumed = self
            .scene
            .with_behavior(id, |b, cx| b.wants(e.kind) && b.on_event(cx, &e, &mut requests))
            .unwrap_or(false);
        self.apply(id, requests);
        consumed
    }

    fn apply(&mut self, owner: NodeId, requests: Requests) {
        if requests.stop_timers {
            self.timers.cancel_owner(owner);
        }
        if !requests.timers.is_empty() {
            let now = self.clock.now();
            for (spec, action) in requests.timers {
                self.timers.start(now, spec, Some(owner), action);
            }
        }
        if let Some(fast) = requests.draw {
            self.draw(fast);
        }
    }

    fn pointer_event(&self, kind: EventKind, input: &MouseInput) -> Event {
        let mut e = Event::new(kind, self.scene.root());
        e.abs_x = input.x;
        e.abs_y = input.y;
        e.button = input.button;
        e.modifiers = input.modifiers;
        e.wheel = input.wheel;
        e
    }

    /// Routes a pointer event from the window.
    ///
    /// `Motion` updates the hover chain (leave, then enter from the top
    /// down), then goes to the root and to every other node listening for
    /// motion. `MouseDown`, `DoubleClick` and `Wheel` go to the deepest hit
    /// node that listens and climb until consumed; every node that saw the
    /// press gets the matching `MouseUp`.
    pub fn mouse(&mut self, kind: EventKind, input: MouseInput) {
        if self.closed {
            return;
        }
        let event = self.pointer_event(kind, &input);
        match kind {
            EventKind::Motion => self.motion(&event, &input),
            EventKind::MouseDown | EventKind::DoubleClick | EventKind::Wheel => {
                let chain = self.pick_at(input.x, input.y);
                for &id in chain.iter().rev() {
                    if !self.scene.node(id).is_ok_and(|n| n.listens(kind)) {
                        continue;
                    }
                    if kind == EventKind::MouseDown && !self.pressed.contains(&id) {
                        self.pressed.push(id);
                    }
                    if self.dispatch(id, &event) {
                        break;
                    }
                }
            }
            EventKind::MouseUp => {
                for id in std::mem::take(&mut self.pressed) {
                    if self.scene.contains(id) {
                        self.dispatch(id, &event);
                    }
                }
            }
            other => log::debug!("{other:?} is not a pointer event; ignored"),
        }
    }

    fn motion(&mut self, event: &Event, input: &MouseInput) {
        let chain = self.pick_at(input.x, input.y);
        let previous = std::mem::replace(&mut self.hover, chain.clone());
        for &id in previous.iter().rev().filter(|id| !chain.contains(id)) {
            if self.scene.contains(id) {
                self.dispatch(id, &Event { kind: EventKind::Leave, ..event.clone() });
            }
        }
        for &id in chain.iter().filter(|id| !previous.contains(id)) {
            self.dispatch(id, &Event { kind: EventKind::Enter, ..event.clone() });
        }
        let root = self.scene.root();
        self.dispatch(root, event);
        let listeners: Vec<NodeId> = self
            .scene
            .preorder(root)
            .into_iter()
            .filter(|&id| id != root && self.scene.node(id).is_ok_and(|n| n.listens(EventKind::Motion)))
            .collect();
        for id in listeners {
            self.dispatch(id, event);
        }
    }

    /// Broadcasts a key event to every node listening for it.
    pub fn key(&mut self, kind: EventKind, key: Option<Key>, text: Option<String>, modifiers: Modifiers) {
        if self.closed || !matches!(kind, EventKind::KeyDown | EventKind::KeyUp) {
            return;
        }
        let root = self.scene.root();
        let mut e = Event::new(kind, root);
        e.key = key;
        e.text = text;
        e.modifiers = modifiers;
        let listeners: Vec<NodeId> =
            self.scene.preorder(root).into_iter().filter(|&id| self.scene.node(id).is_ok_and(|n| n.listens(kind))).collect();
        for id in listeners {
            self.dispatch(id, &e);
        }
    }

    /// The window was resized to `w x h` logical pixels.
    pub fn resize(&mut self, w: f32, h: f32) {
        let moved = self.scene.set_root_size(w, h);
        for id in moved {
            self.sync_axes_size(id);
        }
        self.draw(false);
    }

    /// Moves and resizes the window.
    pub fn set_position(&mut self, rect: Rect) {
        self.backend.set_position(rect);
        self.resize(rect.w, rect.h);
    }

    /// The window is closing: fires `Close` on the root, tears the tree
    /// down and closes the window. A second call does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let root = self.scene.root();
        self.dispatch(root, &Event::new(EventKind::Close, root));
        for c in self.scene.children(root).to_vec() {
            self.destroy(c);
        }
        self.pending = None;
        self.timers = TimerQueue::new();
        self.redraw_timer = None;
        self.closed = true;
        self.backend.close();
    }

    /// Axes ids in the tree, in pre-order.
    pub fn all_axes(&self) -> Vec<NodeId> {
        self.scene.find_objects(self.scene.root(), &Pattern::of::<Axes>())
    }

    /// Union of the data bounds in an axes.
    pub fn data_bounds(&self, axes: NodeId) -> Option<Bounds> {
        self.scene.world_bounds(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    use crate::timer::ManualClock;

    #[derive(Default)]
    struct Log {
        frames: Vec<DrawList>,
        redraws: usize,
        pumps: usize,
        closed: bool,
    }

    struct Stub {
        log: Rc<RefCell<Log>>,
        caps: GpuCaps,
    }

    impl Backend for Stub {
        fn make_current(&mut self) -> Result<()> {
            Ok(())
        }

        fn swap_buffers(&mut self, frame: DrawList) {
            self.log.borrow_mut().frames.push(frame);
        }

        fn post_redraw(&mut self) {
            self.log.borrow_mut().redraws += 1;
        }

        fn process_events(&mut self) {
            self.log.borrow_mut().pumps += 1;
        }

        fn position(&self) -> Rect {
            Rect::new(0.0, 0.0, 400.0, 300.0)
        }

        fn set_position(&mut self, _rect: Rect) {}

        fn close(&mut self) {
            self.log.borrow_mut().closed = true;
        }

        fn caps(&self) -> GpuCaps {
            self.caps
        }
    }

    fn figure() -> (Figure, Rc<RefCell<Log>>, ManualClock) {
        let log = Rc::new(RefCell::new(Log::default()));
        let clock = ManualClock::new();
        let backend = Stub { log: log.clone(), caps: GpuCaps::desktop() };
        let fig = Figure::with_clock(Box::new(backend), FigureConfig::default(), Rc::new(clock.clone()));
        (fig, log, clock)
    }

    // ── throttling ────────────────────────────────────────────────────────

    #[test]
    fn draws_within_the_window_coalesce() {
        let (mut fig, log, clock) = figure();
        fig.draw(false);
        clock.advance(Duration::from_millis(3));
        fig.draw(false);
        fig.draw(true);
        clock.advance(Duration::from_millis(10));
        fig.process_events();
        assert_eq!(log.borrow().redraws, 1);
        fig.process_events();
        assert_eq!(log.borrow().redraws, 1);
    }

    #[test]
    fn fast_flag_is_latched_until_paint() {
        let (mut fig, _log, _clock) = figure();
        fig.draw(true);
        fig.draw(false);
        assert!(fig.pending.is_some_and(|p| p.fast && p.full_wanted));
        fig.paint().unwrap();
        // The full request survives as a new draw.
        assert!(fig.pending.is_some_and(|p| !p.fast));
    }

    #[test]
    fn draw_now_paints_and_pumps() {
        let (mut fig, log, _clock) = figure();
        fig.draw(false);
        fig.draw_now().unwrap();
        assert_eq!(log.borrow().pumps, 1);
        assert_eq!(log.borrow().frames.len(), 1);
        assert!(fig.redraw_timer.is_none());
    }

    // ── paint ─────────────────────────────────────────────────────────────

    #[test]
    fn zero_channel_bits_is_fatal() {
        let log = Rc::new(RefCell::new(Log::default()));
        let caps = GpuCaps { color_bits: [8, 0, 8], ..GpuCaps::desktop() };
        let mut fig = Figure::new(Box::new(Stub { log: log.clone(), caps }), FigureConfig::default());
        assert!(matches!(fig.paint(), Err(VistaError::ContextUnavailable(_))));
        assert!(log.borrow().frames.is_empty());
    }

    #[test]
    fn frame_clears_to_background_and_fires_after_draw() {
        let (mut fig, log, _clock) = figure();
        let fired = Rc::new(RefCell::new(0));
        let f = fired.clone();
        let root = fig.root();
        fig.scene_mut()
            .bind(root, EventKind::AfterDraw, None, Box::new(move |_| {
                *f.borrow_mut() += 1;
                false
            }))
            .unwrap();
        fig.paint().unwrap();
        assert_eq!(log.borrow().frames[0].clear_color(), Some(fig.config().background));
        assert_eq!(*fired.borrow(), 1);
    }

    // ── tree ──────────────────────────────────────────────────────────────

    #[test]
    fn add_axes_builds_container_axes_and_axis() {
        let (mut fig, _log, _clock) = figure();
        let axes = fig.add_axes().unwrap();
        let container = fig.scene().parent(axes).unwrap();
        assert_eq!(fig.scene().parent(container), Some(fig.root()));
        assert_eq!(fig.scene().rect(axes), Rect::new(40.0, 20.0, 340.0, 240.0));
        assert_eq!(fig.scene().children(axes).len(), 1);
        assert!(fig.scene().node(axes).unwrap().hit_test());
        assert_eq!(fig.axes(axes).unwrap().size(), (340.0, 240.0));
    }

    #[test]
    fn destroying_axes_removes_container_and_second_destroy_is_noop() {
        let (mut fig, _log, _clock) = figure();
        let axes = fig.add_axes().unwrap();
        let container = fig.scene().parent(axes).unwrap();
        let gone = fig.destroy(axes);
        assert_eq!(gone.last(), Some(&container));
        assert!(fig.scene().children(fig.root()).is_empty());
        assert!(fig.destroy(axes).is_empty());
    }

    #[test]
    fn empty_axes_gets_unit_limits() {
        let (mut fig, _log, _clock) = figure();
        let axes = fig.add_axes().unwrap();
        fig.set_limits(axes, LIMIT_MARGIN).unwrap();
        assert_eq!(fig.axes(axes).unwrap().limits()[0], Range::new(0.0, 1.0));
    }

    #[test]
    fn close_fires_once_and_closes_the_window() {
        let (mut fig, log, _clock) = figure();
        fig.add_axes().unwrap();
        fig.close();
        fig.close();
        assert!(log.borrow().closed);
        assert!(fig.is_closed());
        assert!(fig.scene().children(fig.root()).is_empty());
        fig.draw(false);
        assert!(fig.pending.is_none());
    }

    #[test]
    fn resize_updates_axes_size() {
        let (mut fig, _log, _clock) = figure();
        let axes = fig.add_axes().unwrap();
        fig.resize(600.0, 400.0);
        assert_eq!(fig.axes(axes).unwrap().size(), (540.0, 340.0));
    }
}
