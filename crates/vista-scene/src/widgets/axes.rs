use std::time::Duration;

use glam::{DMat4, DVec3};
use vista_math::Range;

use crate::axis::{AxisStyle, PolarState};
use crate::camera::{Camera, CameraKind, Cameras, Ortho2d, View, ViewParams};
use crate::draw::DrawContext;
use crate::error::{Result, VistaError};
use crate::events::{Event, EventKind};
use crate::node::{Behavior, Bounds, NodeCx, Position, Requests};
use crate::timer::{TimerAction, TimerSpec};

use super::boxes::paint_box;

/// Place of an axes inside its container: room for tick labels on the left
/// and bottom, a small margin on the other sides.
pub fn axes_position() -> Position {
    Position::new(40.0, 20.0, -60.0, -60.0)
}

/// Widget that hosts one axes and the labels around it.
#[derive(Debug, Default)]
pub struct AxesContainer;

impl AxesContainer {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for AxesContainer {
    fn type_name(&self) -> &'static str {
        "AxesContainer"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        Ok(())
    }
}

/// A widget with a data space.
///
/// Holds one camera of every kind, the data aspect ratio and the axis
/// style. World children are drawn through the current camera; in polar
/// mode a 2-D view fitted to the outer circle is used instead and the mouse
/// drives the polar window.
#[derive(Debug)]
pub struct Axes {
    cameras: Cameras,
    daspect: DVec3,
    daspect_auto: bool,
    polar: PolarState,
    is_polar: bool,
    axis_style: AxisStyle,
    size: (f64, f64),
    depth: f64,
    fly_interval: Duration,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            cameras: Cameras::default(),
            daspect: DVec3::ONE,
            daspect_auto: false,
            polar: PolarState::default(),
            is_polar: false,
            axis_style: AxisStyle::default(),
            size: (1.0, 1.0),
            depth: 100_000.0,
            fly_interval: Duration::from_millis(50),
        }
    }
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fly_interval(mut self, interval: Duration) -> Self {
        self.fly_interval = interval;
        self
    }

    // ── cameras ───────────────────────────────────────────────────────────

    pub fn cameras(&self) -> &Cameras {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut Cameras {
        &mut self.cameras
    }

    pub fn camera(&self) -> &dyn Camera {
        self.cameras.current()
    }

    pub fn camera_kind(&self) -> CameraKind {
        self.cameras.kind()
    }

    pub fn set_camera_kind(&mut self, kind: CameraKind) {
        self.cameras.set_kind(kind);
    }

    /// Selects the camera by name: `"2d"`, `"3d"` or `"fly"`.
    pub fn set_camera_type(&mut self, name: &str) -> Result<()> {
        self.set_camera_kind(name.parse()?);
        Ok(())
    }

    /// Axes state handed to the cameras.
    pub fn view(&self) -> View {
        View { size: self.size, daspect: self.daspect, daspect_auto: self.daspect_auto, depth: self.depth }
    }

    /// Axes size in pixels as of the last frame or resize.
    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn set_size(&mut self, size: (f64, f64)) {
        self.size = (size.0.max(1.0), size.1.max(1.0));
    }

    pub fn reset_camera(&mut self) {
        let view = self.view();
        self.cameras.current_mut().reset(&view);
    }

    /// Limits of the current camera, or the square around the outer circle
    /// in polar mode.
    pub fn limits(&self) -> Bounds {
        if self.is_polar { self.polar.limits() } else { self.cameras.current().limits() }
    }

    /// Sets the limits of every camera and resets the current one.
    pub fn set_limits(&mut self, limits: Bounds) {
        self.cameras.set_limits(limits);
        self.reset_camera();
    }

    /// Fits the limits to `bounds` grown by `margin` (a fraction of each
    /// range; x and y are widened even when flat). In polar mode only the
    /// outer radius follows.
    pub fn fit(&mut self, bounds: Bounds, margin: f64) {
        if self.is_polar {
            let r = bounds[0].max.abs().max(bounds[1].max.abs()) * (1.0 + margin);
            if r > self.polar.radial.min && r.is_finite() {
                self.polar.radial = Range::new(self.polar.radial.min, r);
            }
            return;
        }
        let [x, y, z] = bounds;
        let z = if z.range() > 0.0 { z.with_margin(margin) } else { z };
        self.set_limits([x.with_margin(margin), y.with_margin(margin), z]);
    }

    /// Data extent on screen of the 2-D camera; other cameras report their
    /// limits.
    pub fn visible_limits(&self) -> Bounds {
        let limits = self.cameras.current().limits();
        if self.camera_kind() != CameraKind::TwoD {
            return limits;
        }
        let cam = &self.cameras.two_d;
        let (fx, fy) = cam.zoom;
        let hx = fx / 2.0 / self.daspect.x.abs();
        let hy = fy / 2.0 / self.daspect.y.abs();
        [Range::new(cam.loc.x - hx, cam.loc.x + hx), Range::new(cam.loc.y - hy, cam.loc.y + hy), limits[2]]
    }

    pub fn view_params(&self) -> ViewParams {
        self.cameras.current().view_params(&self.view())
    }

    /// Restores a view; the camera kind and aspect ratio come from `params`.
    pub fn set_view_params(&mut self, params: &ViewParams) {
        self.cameras.set_kind(params.kind);
        if valid_daspect(params.daspect) {
            self.daspect = params.daspect;
        }
        self.cameras.current_mut().set_view_params(params);
    }

    /// Advances the fly camera by one step.
    pub fn fly_step(&mut self) -> bool {
        let view = self.view();
        self.cameras.fly.step(&view)
    }

    pub fn screen_to_world(&self, x: f64, y: f64) -> DVec3 {
        self.cameras.current().screen_to_world(x, y, &self.view())
    }

    pub fn world_to_screen(&self, p: DVec3) -> Option<DVec3> {
        self.cameras.current().world_to_screen(p, &self.view())
    }

    // ── aspect ────────────────────────────────────────────────────────────

    pub fn daspect(&self) -> DVec3 {
        self.daspect
    }

    /// Every component must be finite and non-zero; negative flips the axis.
    pub fn set_daspect(&mut self, daspect: DVec3) -> Result<()> {
        if !valid_daspect(daspect) {
            return Err(VistaError::invalid(format!("daspect must be finite and non-zero, got {daspect}")));
        }
        self.daspect = daspect;
        Ok(())
    }

    pub fn daspect_auto(&self) -> bool {
        self.daspect_auto
    }

    pub fn set_daspect_auto(&mut self, auto: bool) {
        self.daspect_auto = auto;
    }

    // ── polar ─────────────────────────────────────────────────────────────

    pub fn is_polar(&self) -> bool {
        self.is_polar
    }

    pub fn set_polar(&mut self, polar: bool) {
        self.is_polar = polar;
        if polar {
            self.cameras.set_kind(CameraKind::TwoD);
        }
    }

    pub fn polar(&self) -> &PolarState {
        &self.polar
    }

    pub fn polar_mut(&mut self) -> &mut PolarState {
        &mut self.polar
    }

    // ── axis ──────────────────────────────────────────────────────────────

    pub fn axis_style(&self) -> &AxisStyle {
        &self.axis_style
    }

    pub fn axis_style_mut(&mut self) -> &mut AxisStyle {
        &mut self.axis_style
    }

    /// Projection and modelview for the world children.
    fn matrices(&self) -> (DMat4, DMat4) {
        let view = self.view();
        if self.is_polar {
            let mut cam = Ortho2d::default();
            cam.set_limits(self.polar.limits());
            cam.reset(&view);
            return (cam.projection(&view), cam.modelview(&view));
        }
        let cam = self.cameras.current();
        (cam.projection(&view), cam.modelview(&view))
    }

    fn press(&mut self, event: &Event, requests: &mut Requests) -> bool {
        let Some(button) = event.button else { return false };
        let (x, y) = (event.x as f64, event.y as f64);
        if self.is_polar {
            self.polar.press(x, y, button, event.modifiers);
            return true;
        }
        self.cameras.current_mut().press(x, y, button, event.modifiers);
        if self.camera_kind() == CameraKind::Fly {
            requests.timers.push((TimerSpec::repeating(self.fly_interval), TimerAction::FlyStep(event.owner)));
        }
        true
    }

    fn motion(&mut self, event: &Event, requests: &mut Requests) -> bool {
        let (x, y) = (event.x as f64, event.y as f64);
        let view = self.view();
        let (dragging, changed) = if self.is_polar {
            (self.polar.is_dragging(), self.polar.drag(x, y, self.size))
        } else {
            let cam = self.cameras.current_mut();
            (cam.is_dragging(), cam.drag(x, y, &view))
        };
        if changed {
            requests.redraw(true);
        }
        dragging
    }

    fn release(&mut self, requests: &mut Requests) -> bool {
        let was = if self.is_polar { self.polar.release() } else { self.cameras.current_mut().release() };
        requests.stop_timers = true;
        if was {
            requests.redraw(false);
        }
        was
    }

    fn wheel(&mut self, notches: f64, requests: &mut Requests) -> bool {
        let changed = if self.is_polar {
            let r = self.polar.radial;
            let span = r.range() / 1.1f64.powf(notches);
            let ok = span > 0.0 && span.is_finite() && notches != 0.0;
            if ok {
                self.polar.radial = Range::new(r.min, r.min + span);
            }
            ok
        } else {
            let view = self.view();
            self.cameras.current_mut().wheel(notches, &view)
        };
        if changed {
            requests.redraw(false);
        }
        changed
    }
}

fn valid_daspect(d: DVec3) -> bool {
    d.is_finite() && d.x != 0.0 && d.y != 0.0 && d.z != 0.0
}

impl Behavior for Axes {
    fn type_name(&self) -> &'static str {
        "Axes"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        Ok(())
    }

    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        Ok(())
    }

    fn enter_world(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> bool {
        let vp = ctx.viewport();
        if vp.w <= 0.0 || vp.h <= 0.0 {
            return false;
        }
        self.set_size((vp.w as f64, vp.h as f64));
        self.depth = ctx.depth_sentinel();
        let (projection, modelview) = self.matrices();
        ctx.set_projection(projection);
        ctx.set_modelview(modelview);
        true
    }

    fn wants(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::MouseDown
                | EventKind::MouseUp
                | EventKind::Motion
                | EventKind::Wheel
                | EventKind::DoubleClick
                | EventKind::KeyDown
                | EventKind::KeyUp
        )
    }

    fn on_event(&mut self, _node: NodeCx<'_>, event: &Event, requests: &mut Requests) -> bool {
        match event.kind {
            EventKind::MouseDown => self.press(event, requests),
            EventKind::Motion => self.motion(event, requests),
            EventKind::MouseUp => self.release(requests),
            EventKind::Wheel => self.wheel(event.wheel as f64, requests),
            EventKind::DoubleClick => {
                if !self.is_polar {
                    self.reset_camera();
                }
                requests.redraw(false);
                true
            }
            EventKind::KeyDown | EventKind::KeyUp => {
                let Some(key) = event.key else { return false };
                let pressed = event.kind == EventKind::KeyDown;
                let changed = self.cameras.current_mut().key(key, pressed);
                if changed {
                    requests.redraw(false);
                }
                changed
            }
            _ => false,
        }
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "camera" | "daspect" | "limits")
    }
}
