use glam::{DMat4, DVec3};
use vista_engine::input::{Key, Modifiers, MouseButton};

use super::{centre, default_limits, diagonal, wrap_degrees, Camera, CameraKind, Drag, View, ViewParams};
use crate::node::Bounds;

const NEAR: f64 = 1.0;
const FAR: f64 = 100_000.0;

/// Perspective camera moving through the scene.
///
/// `loc` is the eye position. The vertical field of view follows the axes
/// height: one degree per 50 pixels.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    limits: Bounds,
    pub loc: DVec3,
    pub azimuth: f64,
    pub elevation: f64,
    /// Forward and strafe speeds in base distances per step.
    pub speed: (f64, f64),
    drag: Option<Drag>,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            limits: default_limits(),
            loc: DVec3::new(0.5, -1.0, 0.5),
            azimuth: 0.0,
            elevation: 0.0,
            speed: (0.0, 0.0),
            drag: None,
        }
    }
}

impl FlyCamera {
    /// Vertical field of view in degrees for an axes of this size.
    pub fn fov(view: &View) -> f64 {
        view.height() / 50.0
    }

    /// Limits diagonal over 200.
    pub fn base_distance(&self) -> f64 {
        diagonal(&self.limits, DVec3::ONE) / 200.0
    }

    /// Unit viewing direction in world space.
    pub fn direction(&self) -> DVec3 {
        let (az, el) = (self.azimuth.to_radians(), self.elevation.to_radians());
        DVec3::new(-az.sin() * el.cos(), az.cos() * el.cos(), -el.sin())
    }

    fn right(&self) -> DVec3 {
        let az = self.azimuth.to_radians();
        DVec3::new(az.cos(), az.sin(), 0.0)
    }

    /// One integration step of the current speeds; returns whether the eye
    /// moved.
    pub fn step(&mut self, view: &View) -> bool {
        let (forward, strafe) = self.speed;
        if forward == 0.0 && strafe == 0.0 {
            return false;
        }
        let delta = (self.direction() * forward + self.right() * strafe) * self.base_distance();
        self.loc += delta / view.daspect;
        true
    }
}

impl Camera for FlyCamera {
    fn kind(&self) -> CameraKind {
        CameraKind::Fly
    }

    fn limits(&self) -> Bounds {
        self.limits
    }

    fn set_limits(&mut self, limits: Bounds) {
        self.limits = limits;
    }

    fn reset(&mut self, view: &View) {
        // Back off until the limits' diagonal fills the vertical view.
        let half = (Self::fov(view) / 2.0).to_radians().tan();
        let back = self.direction() * diagonal(&self.limits, DVec3::ONE) / (2.0 * half);
        self.loc = centre(&self.limits) - back / view.daspect;
        self.speed = (0.0, 0.0);
    }

    fn projection(&self, view: &View) -> DMat4 {
        DMat4::perspective_rh_gl(Self::fov(view).to_radians(), view.width() / view.height(), NEAR, FAR)
    }

    fn modelview(&self, view: &View) -> DMat4 {
        DMat4::from_rotation_x((self.elevation - 90.0).to_radians())
            * DMat4::from_rotation_z((-self.azimuth).to_radians())
            * DMat4::from_scale(view.daspect)
            * DMat4::from_translation(-self.loc)
    }

    fn press(&mut self, x: f64, y: f64, button: MouseButton, modifiers: Modifiers) {
        self.drag = Some(Drag {
            button,
            modifiers,
            start: (x, y),
            loc: self.loc,
            zoom: (0.0, 0.0),
            angles: (self.azimuth, self.elevation, 0.0),
        });
    }

    fn drag(&mut self, x: f64, y: f64, view: &View) -> bool {
        let Some(d) = self.drag else { return false };
        let (dx, dy) = d.delta(x, y);
        let (az0, el0, _) = d.angles;
        if d.button != MouseButton::Left {
            return false;
        }
        self.azimuth = wrap_degrees(az0 - 90.0 * dx / view.width());
        self.elevation = (el0 + 90.0 * dy / view.height()).clamp(-90.0, 90.0);
        true
    }

    fn release(&mut self) -> bool {
        self.drag.take().is_some()
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn wheel(&mut self, notches: f64, _view: &View) -> bool {
        self.speed.0 += notches;
        notches != 0.0
    }

    fn key(&mut self, key: Key, pressed: bool) -> bool {
        if !pressed {
            return false;
        }
        match key {
            Key::W => self.speed.0 += 1.0,
            Key::S => self.speed.0 -= 1.0,
            Key::D => self.speed.1 += 1.0,
            Key::A => self.speed.1 -= 1.0,
            Key::Space => self.speed = (0.0, 0.0),
            _ => return false,
        }
        true
    }

    fn view_params(&self, view: &View) -> ViewParams {
        ViewParams {
            kind: CameraKind::Fly,
            limits: self.limits,
            loc: self.loc,
            zoom: (view.width(), view.height()),
            azimuth: self.azimuth,
            elevation: self.elevation,
            roll: 0.0,
            fov: Self::fov(view),
            daspect: view.daspect,
        }
    }

    fn set_view_params(&mut self, p: &ViewParams) {
        self.limits = p.limits;
        self.loc = p.loc;
        self.azimuth = wrap_degrees(p.azimuth);
        self.elevation = p.elevation.clamp(-90.0, 90.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn direction_matches_modelview() {
        let view = View::new((100.0, 100.0));
        let c = FlyCamera { azimuth: 40.0, elevation: 25.0, ..FlyCamera::default() };
        let eye = c.modelview(&view).transform_vector3(c.direction()).normalize();
        assert!(close(eye, DVec3::NEG_Z));
    }

    #[test]
    fn keys_change_speed_and_step_integrates() {
        let view = View::new((100.0, 100.0));
        let mut c = FlyCamera::default();
        assert!(!c.step(&view));
        assert!(c.key(Key::W, true));
        assert!(!c.key(Key::W, false));
        let start = c.loc;
        assert!(c.step(&view));
        let moved = c.loc - start;
        assert!((moved.length() - c.base_distance()).abs() < 1e-12);
        assert!(close(moved.normalize(), c.direction()));
    }

    #[test]
    fn projection_follows_axes_height() {
        let view = View::new((500.0, 250.0));
        let c = FlyCamera::default();
        // 250 px give a 5 degree vertical angle at aspect 2.
        let f = 1.0 / 2.5f64.to_radians().tan();
        let expected = DMat4::from_cols_array(&[
            f / 2.0, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (FAR + NEAR) / (NEAR - FAR), -1.0,
            0.0, 0.0, 2.0 * FAR * NEAR / (NEAR - FAR), 0.0,
        ]);
        let got = c.projection(&view);
        for (a, b) in got.to_cols_array().iter().zip(expected.to_cols_array()) {
            assert!((a - b).abs() < 1e-9, "{got:?} != {expected:?}");
        }
        assert_eq!(FlyCamera::fov(&view), 5.0);
    }

    #[test]
    fn modelview_has_no_extra_scale() {
        let view = View::new((100.0, 100.0));
        let c = FlyCamera { loc: DVec3::new(1.0, 2.0, 3.0), ..FlyCamera::default() };
        // Unit steps in the world stay unit steps in eye space.
        let m = c.modelview(&view);
        let d = m.transform_point3(DVec3::new(2.0, 2.0, 3.0)) - m.transform_point3(c.loc);
        assert!((d.length() - 1.0).abs() < 1e-12);
        assert!(close(m.transform_point3(c.loc), DVec3::ZERO));
    }

    #[test]
    fn base_distance_is_diagonal_over_200() {
        let c = FlyCamera::default();
        assert!((c.base_distance() - 3f64.sqrt() / 200.0).abs() < 1e-15);
    }

    #[test]
    fn reset_looks_at_centre() {
        let view = View::new((100.0, 100.0));
        let mut c = FlyCamera::default();
        c.reset(&view);
        let s = c.world_to_screen(DVec3::splat(0.5), &view).unwrap();
        assert!((s.x - 50.0).abs() < 1e-6 && (s.y - 50.0).abs() < 1e-6);
    }
}
