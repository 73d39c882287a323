use glam::{DMat4, DVec3};
use vista_engine::input::{Modifiers, MouseButton};

use super::{centre, default_limits, Camera, CameraKind, Drag, View, ViewParams};
use crate::node::Bounds;

/// Orthographic camera looking down the z axis.
///
/// `zoom` holds the visible extents `(fx, fy)` in daspect-scaled units.
#[derive(Debug, Clone)]
pub struct Ortho2d {
    limits: Bounds,
    pub loc: DVec3,
    pub zoom: (f64, f64),
    drag: Option<Drag>,
}

impl Default for Ortho2d {
    fn default() -> Self {
        Self { limits: default_limits(), loc: DVec3::new(0.5, 0.5, 0.0), zoom: (1.0, 1.0), drag: None }
    }
}

/// Equalizes the world-per-pixel scale of both extents; the smaller grows.
fn fit_aspect(fx: f64, fy: f64, view: &View) -> (f64, f64) {
    let s = (fx / view.width()).max(fy / view.height());
    (s * view.width(), s * view.height())
}

impl Camera for Ortho2d {
    fn kind(&self) -> CameraKind {
        CameraKind::TwoD
    }

    fn limits(&self) -> Bounds {
        self.limits
    }

    fn set_limits(&mut self, limits: Bounds) {
        self.limits = limits;
    }

    fn reset(&mut self, view: &View) {
        let c = centre(&self.limits);
        self.loc = DVec3::new(c.x, c.y, 0.0);
        let positive = |v: f64| if v > 0.0 && v.is_finite() { v } else { 1.0 };
        let fx = positive(self.limits[0].range().abs() * view.daspect.x.abs());
        let fy = positive(self.limits[1].range().abs() * view.daspect.y.abs());
        self.zoom = if view.daspect_auto { (fx, fy) } else { fit_aspect(fx, fy, view) };
    }

    fn projection(&self, view: &View) -> DMat4 {
        let (fx, fy) = self.zoom;
        DMat4::orthographic_rh_gl(-fx / 2.0, fx / 2.0, -fy / 2.0, fy / 2.0, -view.depth, view.depth)
    }

    fn modelview(&self, view: &View) -> DMat4 {
        DMat4::from_scale(view.daspect) * DMat4::from_translation(-self.loc)
    }

    fn screen_to_world(&self, x: f64, y: f64, view: &View) -> DVec3 {
        let (fx, fy) = self.zoom;
        DVec3::new(
            self.loc.x + (x - view.width() / 2.0) * fx / view.width() / view.daspect.x,
            self.loc.y - (y - view.height() / 2.0) * fy / view.height() / view.daspect.y,
            0.0,
        )
    }

    fn press(&mut self, x: f64, y: f64, button: MouseButton, modifiers: Modifiers) {
        self.drag = Some(Drag { button, modifiers, start: (x, y), loc: self.loc, zoom: self.zoom, angles: (0.0, 0.0, 0.0) });
    }

    fn drag(&mut self, x: f64, y: f64, view: &View) -> bool {
        let Some(d) = self.drag else { return false };
        let (dx, dy) = d.delta(x, y);
        match d.button {
            MouseButton::Left => {
                let (fx, fy) = d.zoom;
                self.loc.x = d.loc.x - dx * fx / view.width() / view.daspect.x;
                self.loc.y = d.loc.y + dy * fy / view.height() / view.daspect.y;
            }
            MouseButton::Right => {
                let (gx, gy) = ((dx / view.width()).exp(), (-dy / view.height()).exp());
                let (fx, fy) = d.zoom;
                self.zoom = if view.daspect_auto { (fx / gx, fy / gy) } else { (fx / (gx * gy), fy / (gx * gy)) };
            }
            _ => return false,
        }
        true
    }

    fn release(&mut self) -> bool {
        self.drag.take().is_some()
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn wheel(&mut self, notches: f64, _view: &View) -> bool {
        let f = 1.1f64.powf(notches);
        self.zoom = (self.zoom.0 / f, self.zoom.1 / f);
        notches != 0.0
    }

    fn view_params(&self, view: &View) -> ViewParams {
        ViewParams {
            kind: CameraKind::TwoD,
            limits: self.limits,
            loc: self.loc,
            zoom: self.zoom,
            azimuth: 0.0,
            elevation: 90.0,
            roll: 0.0,
            fov: 0.0,
            daspect: view.daspect,
        }
    }

    fn set_view_params(&mut self, p: &ViewParams) {
        self.limits = p.limits;
        self.loc = p.loc;
        self.zoom = p.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_math::Range;

    fn camera(w: f64, h: f64) -> (Ortho2d, View) {
        let mut c = Ortho2d::default();
        c.set_limits([Range::new(0.0, 2.0), Range::new(0.0, 1.0), Range::new(0.0, 0.0)]);
        let view = View::new((w, h));
        c.reset(&view);
        (c, view)
    }

    // ── reset ─────────────────────────────────────────────────────────────

    #[test]
    fn reset_centres_and_fits_the_larger_range() {
        let (c, _) = camera(400.0, 400.0);
        assert!((c.loc.x - 1.0).abs() < 1e-12 && (c.loc.y - 0.5).abs() < 1e-12);
        assert_eq!(c.zoom, (2.0, 2.0));
    }

    #[test]
    fn reset_honours_rectangle_aspect() {
        let (c, _) = camera(400.0, 100.0);
        assert_eq!(c.zoom, (4.0, 1.0));
    }

    #[test]
    fn auto_daspect_fills_axes() {
        let mut c = Ortho2d::default();
        c.set_limits([Range::new(0.0, 2.0), Range::new(0.0, 1.0), Range::new(0.0, 0.0)]);
        let view = View { daspect_auto: true, ..View::new((400.0, 400.0)) };
        c.reset(&view);
        assert_eq!(c.zoom, (2.0, 1.0));
    }

    // ── interaction ───────────────────────────────────────────────────────

    #[test]
    fn left_drag_pans() {
        let (mut c, view) = camera(400.0, 400.0);
        c.press(200.0, 200.0, MouseButton::Left, Modifiers::default());
        assert!(c.drag(300.0, 200.0, &view));
        assert!((c.loc.x - (1.0 - 100.0 * 2.0 / 400.0)).abs() < 1e-12);
        assert!((c.loc.y - 0.5).abs() < 1e-12);
        assert!(c.release());
        assert!(!c.drag(0.0, 0.0, &view));
    }

    #[test]
    fn right_drag_zooms_symmetrically() {
        let (mut c, view) = camera(400.0, 400.0);
        c.press(0.0, 0.0, MouseButton::Right, Modifiers::default());
        c.drag(400.0, 0.0, &view);
        let e = std::f64::consts::E;
        assert!((c.zoom.0 - 2.0 / e).abs() < 1e-12);
        assert!((c.zoom.1 - 2.0 / e).abs() < 1e-12);
    }

    #[test]
    fn view_params_round_trip() {
        let (mut c, view) = camera(400.0, 300.0);
        let saved = c.view_params(&view);
        c.wheel(3.0, &view);
        c.loc = DVec3::new(9.0, 9.0, 0.0);
        c.set_view_params(&saved);
        assert_eq!(c.view_params(&view), saved);
    }

    #[test]
    fn view_params_report_the_data_aspect() {
        let (c, view) = camera(400.0, 300.0);
        let flipped = View { daspect: DVec3::new(1.0, -2.0, 1.0), ..view };
        assert_eq!(c.view_params(&flipped).daspect, DVec3::new(1.0, -2.0, 1.0));
    }
}
