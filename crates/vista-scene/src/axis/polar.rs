//! Polar axes: radial window, angular reference and their geometry.

use std::f64::consts::TAU;

use glam::{DVec2, DVec3};
use vista_engine::input::{Modifiers, MouseButton};
use vista_math::Range;

use super::cartesian::{align_for, dimension_ticks, AxisGeometry, LabelPlacement, TickMark, LABEL_GAP, TAIL_PIXELS};
use super::ticks::{pick_unit, tick_texts, TickSpec, POLAR_UNITS};
use super::AxisStyle;

/// Points on the outer circle, closing point included.
pub const CIRCLE_POINTS: usize = 61;
/// Minimum spacing of angular ticks in pixels.
pub const ANGULAR_MIN_PIXELS: f64 = 40.0;

#[derive(Debug, Copy, Clone, PartialEq)]
struct PolarDrag {
    button: MouseButton,
    shift: bool,
    start: (f64, f64),
    angular_ref: f64,
    radial: Range,
}

/// Mapping of polar data `(angle in degrees, radius)` onto the plane.
///
/// Radii are measured from the bottom of the radial window, so shifting
/// the window moves data toward or away from the centre.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarState {
    /// Direction of angle zero, in degrees counter-clockwise from +x.
    pub angular_ref: f64,
    pub radial: Range,
    pub clockwise: bool,
    drag: Option<PolarDrag>,
}

impl Default for PolarState {
    fn default() -> Self {
        Self { angular_ref: 0.0, radial: Range::new(0.0, 1.0), clockwise: false, drag: None }
    }
}

impl PolarState {
    pub fn to_cartesian(&self, angle_deg: f64, r: f64) -> (f64, f64) {
        let a = if self.clockwise { -angle_deg } else { angle_deg };
        let theta = (a + self.angular_ref).to_radians();
        let rr = (r - self.radial.min).max(0.0);
        (rr * theta.cos(), rr * theta.sin())
    }

    /// Plot radius of the outer circle.
    pub fn outer_radius(&self) -> f64 {
        self.radial.range().abs()
    }

    /// Square limits enclosing the outer circle.
    pub fn limits(&self) -> [Range; 3] {
        let r = self.outer_radius().max(f64::MIN_POSITIVE);
        [Range::new(-r, r), Range::new(-r, r), Range::new(0.0, 0.0)]
    }

    pub fn press(&mut self, x: f64, y: f64, button: MouseButton, modifiers: Modifiers) {
        self.drag = Some(PolarDrag {
            button,
            shift: modifiers.shift,
            start: (x, y),
            angular_ref: self.angular_ref,
            radial: self.radial,
        });
    }

    /// Applies a drag in an axes of `size` pixels; returns whether the
    /// mapping changed.
    ///
    /// Vertical left-drag shifts the radial window, shift-drag rotates the
    /// angular reference and right-drag scales the radial range.
    pub fn drag(&mut self, x: f64, y: f64, size: (f64, f64)) -> bool {
        let Some(d) = self.drag else { return false };
        let (dx, dy) = (x - d.start.0, y - d.start.1);
        let (w, h) = (size.0.max(1.0), size.1.max(1.0));
        match (d.button, d.shift) {
            (MouseButton::Left, false) => {
                let shift = dy / h * d.radial.range();
                self.radial = Range::new(d.radial.min + shift, d.radial.max + shift);
            }
            (MouseButton::Left, true) => {
                self.angular_ref = (d.angular_ref + 360.0 * dx / w).rem_euclid(360.0);
            }
            (MouseButton::Right, _) => {
                let range = d.radial.range() * (-dy / h).exp();
                self.radial = Range::new(d.radial.min, d.radial.min + range);
            }
            _ => return false,
        }
        true
    }

    pub fn release(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn point(&self, angle_deg: f64, r: f64) -> DVec3 {
        let (x, y) = self.to_cartesian(angle_deg, r);
        DVec3::new(x, y, 0.0)
    }

    /// Circle of data radius `r` as segments.
    fn circle(&self, r: f64) -> Vec<[DVec3; 2]> {
        let step = 360.0 / (CIRCLE_POINTS - 1) as f64;
        let pts: Vec<DVec3> = (0..CIRCLE_POINTS).map(|i| self.point(i as f64 * step, r)).collect();
        pts.windows(2).map(|w| [w[0], w[1]]).collect()
    }
}

/// Polar axis geometry: outer circle and four spokes, radial ticks along
/// every spoke with circles as grid, angular ticks around the rim with
/// spokes as grid.
pub fn generate_polar(
    state: &PolarState,
    style: &AxisStyle,
    base_pix: f64,
    project: &dyn Fn(DVec3) -> Option<DVec3>,
) -> AxisGeometry {
    let mut g = AxisGeometry::default();
    let radial = state.radial;
    if !(radial.range() > 0.0) {
        return g;
    }
    let centre = state.point(0.0, radial.min);
    let (Some(sc), Some(se)) = (project(centre), project(state.point(0.0, radial.max))) else {
        return g;
    };
    let radius_px = DVec2::new(se.x - sc.x, se.y - sc.y).length();
    if radius_px < 1.0 {
        return g;
    }

    g.ppc.extend(state.circle(radial.max));
    for k in 0..4 {
        g.ppc.push([centre, state.point(k as f64 * 90.0, radial.max)]);
    }

    // Radial ticks on every spoke; circles and the label only once.
    for k in 0..4 {
        let angle = k as f64 * 90.0;
        let Some(end) = project(state.point(angle, radial.max)) else { continue };
        let len = DVec2::new(end.x - sc.x, end.y - sc.y).length();
        if len < 1.0 {
            continue;
        }
        let spoke = DVec2::new(end.x - sc.x, end.y - sc.y) / len;
        let normal = DVec2::new(spoke.y, -spoke.x);
        let (unit, ticks) = dimension_ticks(0, radial, &style.ticks[0], radial.range(), len, base_pix);
        if k == 0 {
            g.units[0] = unit;
            g.labels.push(LabelPlacement { dim: 0, ridge: 0, anchor: (sc + end) * 0.5, normal });
        }
        let (halign, valign) = align_for(normal);
        let tail = DVec3::new(normal.x, normal.y, 0.0) * TAIL_PIXELS;
        let gap = DVec3::new(normal.x, normal.y, 0.0) * LABEL_GAP;
        for (value, text) in ticks {
            let Some(s) = project(state.point(angle, value)) else { continue };
            g.pps.push([s, s + tail]);
            g.ticks.push(TickMark { dim: 0, ridge: k, value, text, anchor: s + tail + gap, halign, valign });
            if k == 0 && style.show_grid[0] && value > radial.min {
                g.ppg.extend(state.circle(value));
            }
        }
    }

    // Angular ticks around the rim.
    let angular: Vec<(f64, String)> = match style.ticks[1].resolve(Range::new(0.0, 360.0)) {
        Some(pairs) => pairs,
        None => {
            let Some(u) = pick_unit(&POLAR_UNITS, 360.0, TAU * radius_px, ANGULAR_MIN_PIXELS) else { return g };
            g.units[1] = Some(u);
            let n = (360.0 / u).round() as usize;
            let values: Vec<f64> = (0..n).map(|k| k as f64 * u).collect();
            let texts = tick_texts(&values, u);
            values.into_iter().zip(texts).collect()
        }
    };
    for (angle, text) in angular {
        let rim = state.point(angle, radial.max);
        let Some(s) = project(rim) else { continue };
        let out = DVec2::new(s.x - sc.x, s.y - sc.y).normalize_or_zero();
        let tail = DVec3::new(out.x, out.y, 0.0) * TAIL_PIXELS;
        let gap = DVec3::new(out.x, out.y, 0.0) * LABEL_GAP;
        let (halign, valign) = align_for(out);
        g.pps.push([s, s + tail]);
        g.ticks.push(TickMark { dim: 1, ridge: 0, value: angle, text, anchor: s + tail + gap, halign, valign });
        if style.show_grid[1] {
            g.ppg.push([centre, rim]);
        }
    }
    g
}

/// Tick override helper for angular labels in compass form.
pub fn compass_ticks() -> TickSpec {
    TickSpec::Map(vec![
        (0.0, "E".into()),
        (90.0, "N".into()),
        (180.0, "W".into()),
        (270.0, "S".into()),
    ])
}
