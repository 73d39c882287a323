//! Cameras.
//!
//! Every axes holds one camera of each kind and uses the current one to
//! produce the projection and modelview for its world objects. Cameras keep
//! their own copy of the limits and the interaction state (location, zoom,
//! angles); a reset fits the limits into the axes rectangle.

mod fly;
mod ortho2d;
mod ortho3d;

use std::fmt;
use std::str::FromStr;

use glam::{DMat4, DVec3, DVec4};
use vista_engine::input::{Key, Modifiers, MouseButton};
use vista_math::Range;

use crate::error::VistaError;
use crate::node::Bounds;

pub use fly::FlyCamera;
pub use ortho2d::Ortho2d;
pub use ortho3d::Ortho3d;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CameraKind {
    #[default]
    TwoD,
    ThreeD,
    Fly,
}

impl FromStr for CameraKind {
    type Err = VistaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "2d" => Ok(CameraKind::TwoD),
            "3d" => Ok(CameraKind::ThreeD),
            "fly" => Ok(CameraKind::Fly),
            other => Err(VistaError::invalid(format!("unknown camera type {other:?}"))),
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CameraKind::TwoD => "2d",
            CameraKind::ThreeD => "3d",
            CameraKind::Fly => "fly",
        })
    }
}

/// Axes state a camera needs to build its matrices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    /// Axes size in pixels.
    pub size: (f64, f64),
    pub daspect: DVec3,
    pub daspect_auto: bool,
    /// Depth sentinel of the target.
    pub depth: f64,
}

impl View {
    pub fn new(size: (f64, f64)) -> Self {
        Self { size, daspect: DVec3::ONE, daspect_auto: false, depth: 100_000.0 }
    }

    pub(crate) fn width(&self) -> f64 {
        self.size.0.max(1.0)
    }

    pub(crate) fn height(&self) -> f64 {
        self.size.1.max(1.0)
    }
}

/// Interaction state of a camera, for saving and restoring a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    pub kind: CameraKind,
    pub limits: Bounds,
    pub loc: DVec3,
    /// Visible extents `(x, y)` for the 2-D camera; the 3-D camera stores
    /// its single extent in both.
    pub zoom: (f64, f64),
    pub azimuth: f64,
    pub elevation: f64,
    pub roll: f64,
    pub fov: f64,
    pub daspect: DVec3,
}

/// Button press that started a drag, with the camera state at that moment.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Drag {
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub start: (f64, f64),
    pub loc: DVec3,
    pub zoom: (f64, f64),
    pub angles: (f64, f64, f64),
}

impl Drag {
    pub fn delta(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.start.0, y - self.start.1)
    }
}

pub(crate) fn default_limits() -> Bounds {
    [Range::new(0.0, 1.0), Range::new(0.0, 1.0), Range::new(0.0, 1.0)]
}

/// Length of the limits' diagonal in scaled (daspect) units.
pub(crate) fn diagonal(limits: &Bounds, daspect: DVec3) -> f64 {
    let d = DVec3::new(
        limits[0].range() * daspect.x,
        limits[1].range() * daspect.y,
        limits[2].range() * daspect.z,
    )
    .length();
    if d > 0.0 && d.is_finite() { d } else { 1.0 }
}

pub(crate) fn centre(limits: &Bounds) -> DVec3 {
    DVec3::new(limits[0].center(), limits[1].center(), limits[2].center())
}

/// Wraps an angle in degrees into `(-180, 180]`.
pub(crate) fn wrap_degrees(a: f64) -> f64 {
    let mut a = a % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Projects a world point with `m = projection * modelview` to axes pixels
/// (+Y down) and depth in `[0, 1]`.
pub fn project(m: DMat4, p: DVec3, size: (f64, f64)) -> Option<DVec3> {
    let clip = m * p.extend(1.0);
    if clip.w <= f64::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(DVec3::new((ndc.x + 1.0) * 0.5 * size.0, (1.0 - ndc.y) * 0.5 * size.1, (ndc.z + 1.0) * 0.5))
}

/// Inverse of [`project`] at a given normalized-device depth.
pub fn unproject(m: DMat4, x: f64, y: f64, ndc_z: f64, size: (f64, f64)) -> Option<DVec3> {
    let ndc = DVec4::new(2.0 * x / size.0.max(1.0) - 1.0, 1.0 - 2.0 * y / size.1.max(1.0), ndc_z, 1.0);
    let p = m.inverse() * ndc;
    (p.w.abs() > f64::EPSILON && p.is_finite()).then(|| p.truncate() / p.w)
}

/// Shared camera interface.
pub trait Camera {
    fn kind(&self) -> CameraKind;

    fn limits(&self) -> Bounds;

    fn set_limits(&mut self, limits: Bounds);

    /// Fits the limits into the axes.
    fn reset(&mut self, view: &View);

    fn projection(&self, view: &View) -> DMat4;

    fn modelview(&self, view: &View) -> DMat4;

    /// World position under an axes pixel (on the plane through the view
    /// location for the orthographic cameras).
    fn screen_to_world(&self, x: f64, y: f64, view: &View) -> DVec3 {
        let m = self.projection(view) * self.modelview(view);
        unproject(m, x, y, 0.0, view.size).unwrap_or(DVec3::ZERO)
    }

    fn world_to_screen(&self, p: DVec3, view: &View) -> Option<DVec3> {
        project(self.projection(view) * self.modelview(view), p, view.size)
    }

    fn press(&mut self, x: f64, y: f64, button: MouseButton, modifiers: Modifiers);

    /// Applies pointer motion to an active drag; returns whether the view
    /// changed.
    fn drag(&mut self, x: f64, y: f64, view: &View) -> bool;

    /// Ends a drag; returns whether one was active.
    fn release(&mut self) -> bool;

    fn is_dragging(&self) -> bool;

    /// Zooms by wheel notches, positive zooming in.
    fn wheel(&mut self, notches: f64, view: &View) -> bool;

    #[allow(unused_variables)]
    fn key(&mut self, key: Key, pressed: bool) -> bool {
        false
    }

    /// Current interaction state; the data aspect is read from `view`.
    fn view_params(&self, view: &View) -> ViewParams;

    /// Restores the interaction state. The data aspect belongs to the axes,
    /// which restores it itself.
    fn set_view_params(&mut self, params: &ViewParams);
}

/// The three cameras of an axes and which one is current.
#[derive(Debug, Default)]
pub struct Cameras {
    pub two_d: Ortho2d,
    pub three_d: Ortho3d,
    pub fly: FlyCamera,
    current: CameraKind,
}

impl Cameras {
    pub fn kind(&self) -> CameraKind {
        self.current
    }

    pub fn set_kind(&mut self, kind: CameraKind) {
        self.current = kind;
    }

    pub fn current(&self) -> &dyn Camera {
        match self.current {
            CameraKind::TwoD => &self.two_d,
            CameraKind::ThreeD => &self.three_d,
            CameraKind::Fly => &self.fly,
        }
    }

    pub fn current_mut(&mut self) -> &mut dyn Camera {
        match self.current {
            CameraKind::TwoD => &mut self.two_d,
            CameraKind::ThreeD => &mut self.three_d,
            CameraKind::Fly => &mut self.fly,
        }
    }

    /// Sets the limits of all three cameras.
    pub fn set_limits(&mut self, limits: Bounds) {
        self.two_d.set_limits(limits);
        self.three_d.set_limits(limits);
        self.fly.set_limits(limits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3, tol: f64) -> bool {
        (a - b).length() < tol
    }

    // ── helpers ───────────────────────────────────────────────────────────

    #[test]
    fn camera_kind_parses() {
        assert_eq!("3D".parse::<CameraKind>().unwrap(), CameraKind::ThreeD);
        assert_eq!(CameraKind::Fly.to_string(), "fly");
        assert!("4d".parse::<CameraKind>().is_err());
    }

    #[test]
    fn wrap_into_half_open_interval() {
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-540.0), 180.0);
    }

    // ── round trip ────────────────────────────────────────────────────────

    fn round_trips(cam: &mut dyn Camera, view: &View) {
        cam.reset(view);
        let m = cam.projection(view) * cam.modelview(view);
        for p in [DVec3::new(0.2, 0.7, 0.5), DVec3::new(0.9, 0.1, 0.5)] {
            let s = cam.world_to_screen(p, view).unwrap();
            let back = unproject(m, s.x, s.y, 2.0 * s.z - 1.0, view.size).unwrap();
            assert!(close(back, p, 1e-6), "{back:?} != {p:?}");
        }
    }

    #[test]
    fn every_camera_round_trips() {
        let view = View::new((300.0, 200.0));
        let limits = [Range::new(0.0, 1.0), Range::new(0.0, 1.0), Range::new(0.0, 1.0)];
        let mut cams = Cameras::default();
        cams.set_limits(limits);
        for kind in [CameraKind::TwoD, CameraKind::ThreeD, CameraKind::Fly] {
            cams.set_kind(kind);
            round_trips(cams.current_mut(), &view);
        }
    }

    #[test]
    fn orthographic_screen_to_world_inverts_projection() {
        let view = View::new((400.0, 400.0));
        let mut cam = Ortho2d::default();
        cam.set_limits([Range::new(0.0, 2.0), Range::new(0.0, 1.0), Range::new(0.0, 0.0)]);
        cam.reset(&view);
        let s = cam.world_to_screen(DVec3::new(1.5, 0.25, 0.0), &view).unwrap();
        let w = cam.screen_to_world(s.x, s.y, &view);
        assert!((w.x - 1.5).abs() < 1e-9 && (w.y - 0.25).abs() < 1e-9);
    }
}
