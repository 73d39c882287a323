use glam::{DMat4, DVec3};
use vista_engine::input::{Modifiers, MouseButton};

use super::{centre, default_limits, diagonal, wrap_degrees, Camera, CameraKind, Drag, View, ViewParams};
use crate::node::Bounds;

/// Orthographic camera orbiting the view location.
///
/// `zoom` is the extent shown along the smaller side of the axes.
#[derive(Debug, Clone)]
pub struct Ortho3d {
    limits: Bounds,
    pub loc: DVec3,
    pub zoom: f64,
    pub azimuth: f64,
    pub elevation: f64,
    pub roll: f64,
    drag: Option<Drag>,
}

impl Default for Ortho3d {
    fn default() -> Self {
        Self {
            limits: default_limits(),
            loc: DVec3::splat(0.5),
            zoom: 3f64.sqrt(),
            azimuth: 30.0,
            elevation: 30.0,
            roll: 0.0,
            drag: None,
        }
    }
}

impl Ortho3d {
    fn extents(&self, view: &View) -> (f64, f64) {
        let (w, h) = (view.width(), view.height());
        if w >= h { (self.zoom * w / h, self.zoom) } else { (self.zoom, self.zoom * h / w) }
    }

    /// Orientation part of the modelview.
    pub fn rotation(&self) -> DMat4 {
        DMat4::from_rotation_z(self.roll.to_radians())
            * DMat4::from_rotation_x((270.0 + self.elevation).to_radians())
            * DMat4::from_rotation_z((-self.azimuth).to_radians())
    }
}

impl Camera for Ortho3d {
    fn kind(&self) -> CameraKind {
        CameraKind::ThreeD
    }

    fn limits(&self) -> Bounds {
        self.limits
    }

    fn set_limits(&mut self, limits: Bounds) {
        self.limits = limits;
    }

    fn reset(&mut self, view: &View) {
        self.loc = centre(&self.limits);
        self.zoom = diagonal(&self.limits, view.daspect.abs());
    }

    fn projection(&self, view: &View) -> DMat4 {
        let (fx, fy) = self.extents(view);
        DMat4::orthographic_rh_gl(-fx / 2.0, fx / 2.0, -fy / 2.0, fy / 2.0, -view.depth, view.depth)
    }

    fn modelview(&self, view: &View) -> DMat4 {
        self.rotation() * DMat4::from_scale(view.daspect) * DMat4::from_translation(-self.loc)
    }

    fn press(&mut self, x: f64, y: f64, button: MouseButton, modifiers: Modifiers) {
        self.drag = Some(Drag {
            button,
            modifiers,
            start: (x, y),
            loc: self.loc,
            zoom: (self.zoom, self.zoom),
            angles: (self.azimuth, self.elevation, self.roll),
        });
    }

    fn drag(&mut self, x: f64, y: f64, view: &View) -> bool {
        let Some(d) = self.drag else { return false };
        let (dx, dy) = d.delta(x, y);
        let (w, h) = (view.width(), view.height());
        let (az0, el0, roll0) = d.angles;
        match d.button {
            MouseButton::Left if d.modifiers.shift => {
                let saved = self.zoom;
                self.zoom = d.zoom.0;
                let (fx, fy) = self.extents(view);
                self.zoom = saved;
                let eye = DVec3::new(dx * fx / w, -dy * fy / h, 0.0);
                let world = self.rotation().inverse().transform_vector3(eye) / view.daspect;
                self.loc = d.loc - world;
            }
            MouseButton::Left if d.modifiers.ctrl => {
                self.roll = (roll0 + 90.0 * dx / w).clamp(-90.0, 90.0);
            }
            MouseButton::Left => {
                self.azimuth = wrap_degrees(az0 - 90.0 * dx / w);
                self.elevation = (el0 + 90.0 * dy / h).clamp(-90.0, 90.0);
            }
            MouseButton::Right => {
                self.zoom = d.zoom.0 / ((dx / w).exp() * (-dy / h).exp());
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
        self.zoom /= 1.1f64.powf(notches);
        notches != 0.0
    }

    fn view_params(&self, view: &View) -> ViewParams {
        ViewParams {
            kind: CameraKind::ThreeD,
            limits: self.limits,
            loc: self.loc,
            zoom: (self.zoom, self.zoom),
            azimuth: self.azimuth,
            elevation: self.elevation,
            roll: self.roll,
            fov: 0.0,
            daspect: view.daspect,
        }
    }

    fn set_view_params(&mut self, p: &ViewParams) {
        self.limits = p.limits;
        self.loc = p.loc;
        self.zoom = p.zoom.0;
        self.azimuth = wrap_degrees(p.azimuth);
        self.elevation = p.elevation.clamp(-90.0, 90.0);
        self.roll = p.roll.clamp(-90.0, 90.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    // ── orientation ───────────────────────────────────────────────────────

    #[test]
    fn zero_angles_look_along_y_with_z_up() {
        let c = Ortho3d { azimuth: 0.0, elevation: 0.0, ..Ortho3d::default() };
        let r = c.rotation();
        assert!(close(r.transform_vector3(DVec3::Z), DVec3::Y));
        assert!(close(r.transform_vector3(DVec3::Y), DVec3::NEG_Z));
    }

    #[test]
    fn top_view_at_ninety_elevation() {
        let c = Ortho3d { azimuth: 0.0, elevation: 90.0, ..Ortho3d::default() };
        assert!(close(c.rotation().transform_vector3(DVec3::Z), DVec3::Z));
    }

    #[test]
    fn reset_uses_diagonal() {
        let mut c = Ortho3d::default();
        c.reset(&View::new((100.0, 100.0)));
        assert!((c.zoom - 3f64.sqrt()).abs() < 1e-12);
        assert!(close(c.loc, DVec3::splat(0.5)));
    }

    // ── interaction ───────────────────────────────────────────────────────

    #[test]
    fn rotate_wraps_and_clamps() {
        let view = View::new((100.0, 100.0));
        let mut c = Ortho3d { azimuth: -170.0, elevation: 80.0, ..Ortho3d::default() };
        c.press(0.0, 0.0, MouseButton::Left, Modifiers::default());
        c.drag(50.0, 50.0, &view);
        assert!((c.azimuth - 145.0).abs() < 1e-9);
        assert_eq!(c.elevation, 90.0);
    }

    #[test]
    fn ctrl_drag_rolls() {
        let view = View::new((100.0, 100.0));
        let mut c = Ortho3d::default();
        let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
        c.press(0.0, 0.0, MouseButton::Left, ctrl);
        c.drag(500.0, 0.0, &view);
        assert_eq!(c.roll, 90.0);
        assert_eq!(c.azimuth, 30.0);
    }

    #[test]
    fn shift_drag_translates_in_view_plane() {
        let view = View::new((100.0, 100.0));
        let mut c = Ortho3d { azimuth: 0.0, elevation: 0.0, ..Ortho3d::default() };
        let shift = Modifiers { shift: true, ..Modifiers::default() };
        let before = c.world_to_screen(DVec3::splat(0.5), &view).unwrap();
        c.press(0.0, 0.0, MouseButton::Left, shift);
        c.drag(10.0, 0.0, &view);
        let after = c.world_to_screen(DVec3::splat(0.5), &view).unwrap();
        assert!((after.x - before.x - 10.0).abs() < 1e-9);
        assert!((after.y - before.y).abs() < 1e-9);
    }
}
