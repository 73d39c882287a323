//! Ridges, ticks and grid of Cartesian axes.
//!
//! Generation is a pure function of the limits, the axis settings and a
//! projection from data space to axes pixels, so it can run against any
//! camera and be checked without drawing.

use glam::{DVec2, DVec3};
use vista_engine::coords::Rect;
use vista_math::Range;

use super::ticks::{min_tick_pixels, pick_unit, tick_texts, tick_units, tick_values, TickSpec};
use super::AxisStyle;
use crate::node::Bounds;
use crate::text::{HAlign, VAlign};

/// Tick tail length in pixels (2-D).
pub const TAIL_PIXELS: f64 = 5.0;
/// Tick tail length as a fraction of the perpendicular range (3-D).
pub const TAIL_FRACTION: f64 = 0.04;
/// Gap between a tail and its label.
pub const LABEL_GAP: f64 = 3.0;
/// Gap between the tick labels and the axis label.
pub const AXIS_LABEL_PAD: f64 = 4.0;
/// Minor grid lines per major unit.
pub const MINOR_DIVISIONS: f64 = 5.0;

/// A projection from data space to axes pixels (+Y down) plus depth.
pub type Project<'a> = &'a dyn Fn(DVec3) -> Option<DVec3>;

/// One tick label to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    pub dim: usize,
    /// Ridge carrying the tick when a dimension is ticked on several
    /// (the spokes of a polar axis); 0 otherwise.
    pub ridge: usize,
    pub value: f64,
    pub text: String,
    /// Pixel anchor and depth.
    pub anchor: DVec3,
    pub halign: HAlign,
    pub valign: VAlign,
}

/// Where the label of one dimension goes before its offset is known.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelPlacement {
    pub dim: usize,
    /// The label clears the tick labels of this ridge only.
    pub ridge: usize,
    /// Projected midpoint of the ticked ridge.
    pub anchor: DVec3,
    /// Unit screen normal of the ridge, pointing away from the box.
    pub normal: DVec2,
}

/// Output of one generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisGeometry {
    /// Data-space segments: ridges and, in 3-D, tick tails.
    pub ppc: Vec<[DVec3; 2]>,
    /// Pixel-space segments: ridges and tick tails in 2-D.
    pub pps: Vec<[DVec3; 2]>,
    /// Data-space grid segments.
    pub ppg: Vec<[DVec3; 2]>,
    pub minor: Vec<[DVec3; 2]>,
    pub ticks: Vec<TickMark>,
    pub labels: Vec<LabelPlacement>,
    /// Chosen unit per dimension, `None` where no ticks were generated.
    pub units: [Option<f64>; 3],
}

/// Tick values and texts for one dimension.
///
/// A user override wins; otherwise the unit is scanned from the table for
/// the ridge's world and screen lengths.
pub fn dimension_ticks(
    dim: usize,
    lim: Range,
    spec: &TickSpec,
    world_len: f64,
    screen_len: f64,
    base_pix: f64,
) -> (Option<f64>, Vec<(f64, String)>) {
    if let Some(pairs) = spec.resolve(lim) {
        return (None, pairs);
    }
    let min_pix = min_tick_pixels(base_pix, dim, lim);
    let Some(unit) = pick_unit(tick_units(), world_len, screen_len, min_pix) else {
        return (None, Vec::new());
    };
    let values = tick_values(lim, unit);
    let texts = tick_texts(&values, unit);
    (Some(unit), values.into_iter().zip(texts).collect())
}

/// Minor grid positions: subdivisions of `unit` that are not major ticks.
pub fn minor_values(lim: Range, unit: f64) -> Vec<f64> {
    let step = unit / MINOR_DIVISIONS;
    tick_values(lim, step)
        .into_iter()
        .filter(|v| {
            let k = v / unit;
            (k - k.round()).abs() > 1e-6
        })
        .collect()
}

fn xy(p: DVec3) -> DVec2 {
    DVec2::new(p.x, p.y)
}

/// Screen normal of the segment `a → b`, oriented away from `centre`.
fn outward_normal(a: DVec2, b: DVec2, centre: DVec2) -> Option<DVec2> {
    let d = b - a;
    if d.length() < 1.0 {
        return None;
    }
    let n = DVec2::new(-d.y, d.x).normalize();
    let mid = (a + b) * 0.5;
    Some(if (mid - centre).dot(n) < 0.0 { -n } else { n })
}

/// Text alignment for a label that sits on the `normal` side of its anchor.
pub fn align_for(normal: DVec2) -> (HAlign, VAlign) {
    if normal.x.abs() > normal.y.abs() {
        (if normal.x < 0.0 { HAlign::Right } else { HAlign::Left }, VAlign::Middle)
    } else {
        (HAlign::Center, if normal.y > 0.0 { VAlign::Top } else { VAlign::Bottom })
    }
}

/// Distance along `normal` from `anchor` past the far side of every rect.
pub fn label_offset(anchor: DVec2, normal: DVec2, rects: &[Rect]) -> f64 {
    rects
        .iter()
        .flat_map(|r| {
            [(r.x, r.y), (r.right(), r.y), (r.x, r.bottom()), (r.right(), r.bottom())]
                .map(|(x, y)| (DVec2::new(x as f64, y as f64) - anchor).dot(normal))
        })
        .fold(0.0, f64::max)
}

fn with(p: DVec3, dim: usize, v: f64) -> DVec3 {
    let mut q = p;
    q[dim] = v;
    q
}

/// Axis of a 2-D camera: ridges and tails in pixels, grid in data space.
pub fn generate_2d(limits: &Bounds, style: &AxisStyle, base_pix: f64, project: Project<'_>) -> AxisGeometry {
    let mut g = AxisGeometry::default();
    let (xl, yl) = (limits[0].normalized(), limits[1].normalized());
    let corner = |x: f64, y: f64| DVec3::new(x, y, 0.0);
    let world = [corner(xl.min, yl.min), corner(xl.max, yl.min), corner(xl.min, yl.max), corner(xl.max, yl.max)];
    let Some(screen) = world.iter().map(|&p| project(p)).collect::<Option<Vec<_>>>() else {
        return g;
    };
    let centre = screen.iter().map(|&p| xy(p)).sum::<DVec2>() / 4.0;

    g.pps.push([screen[0], screen[1]]);
    g.pps.push([screen[0], screen[2]]);
    if style.show_box {
        g.pps.push([screen[2], screen[3]]);
        g.pps.push([screen[1], screen[3]]);
    }

    // Ridge per dimension: bottom for x, left for y.
    let ridges = [(0usize, 0usize, 1usize, xl, yl), (1, 0, 2, yl, xl)];
    for (dim, a, b, lim, other) in ridges {
        let (sa, sb) = (screen[a], screen[b]);
        let Some(normal) = outward_normal(xy(sa), xy(sb), centre) else { continue };
        let screen_len = xy(sb - sa).length();
        let (unit, ticks) = dimension_ticks(dim, lim, &style.ticks[dim], lim.range(), screen_len, base_pix);
        g.units[dim] = unit;
        let (halign, valign) = align_for(normal);
        let tail = DVec3::new(normal.x, normal.y, 0.0) * TAIL_PIXELS;
        let gap = DVec3::new(normal.x, normal.y, 0.0) * LABEL_GAP;
        for (value, text) in ticks {
            let p = with(world[a], dim, value);
            let Some(s) = project(p) else { continue };
            g.pps.push([s, s + tail]);
            g.ticks.push(TickMark { dim, ridge: 0, value, text, anchor: s + tail + gap, halign, valign });
            if style.show_grid[dim] {
                let other_dim = 1 - dim;
                g.ppg.push([with(p, other_dim, other.min), with(p, other_dim, other.max)]);
            }
        }
        if let (Some(u), true) = (unit, style.show_minor_grid[dim]) {
            let other_dim = 1 - dim;
            for v in minor_values(lim, u) {
                let p = with(world[a], dim, v);
                g.minor.push([with(p, other_dim, other.min), with(p, other_dim, other.max)]);
            }
        }
        g.labels.push(LabelPlacement { dim, ridge: 0, anchor: (sa + sb) * 0.5, normal });
    }
    g
}

/// Corner `i` of the limits box: bit `d` of `i` selects max in dimension `d`.
pub fn box_corner(limits: &Bounds, i: usize) -> DVec3 {
    let pick = |d: usize| if i >> d & 1 == 0 { limits[d].min } else { limits[d].max };
    DVec3::new(pick(0), pick(1), pick(2))
}

/// Index of the ticked ridge of `dim` among its four candidates, as the
/// start corner (the corner with bit `dim` clear).
///
/// x and y are ticked on the ridge lowest on screen, z on the leftmost.
pub fn tick_ridge(dim: usize, screen: &[DVec3; 8]) -> usize {
    let (e1, e2) = ((dim + 1) % 3, (dim + 2) % 3);
    let mut best = 0;
    let mut best_key = f64::NEG_INFINITY;
    for bits in 0..4usize {
        let start = (bits & 1) << e1 | (bits >> 1 & 1) << e2;
        let end = start | 1 << dim;
        let mid = (screen[start] + screen[end]) * 0.5;
        let key = if dim == 2 { -mid.x } else { mid.y };
        if key > best_key + 1e-9 {
            best_key = key;
            best = start;
        }
    }
    best
}

/// Faces `(axis, max side)` of the box that face away from the viewer.
pub fn back_faces(limits: &Bounds, project: Project<'_>) -> Vec<(usize, bool)> {
    let centre = DVec3::new(limits[0].center(), limits[1].center(), limits[2].center());
    let Some(c) = project(centre) else { return Vec::new() };
    let mut out = Vec::new();
    for axis in 0..3 {
        for high in [false, true] {
            let face = with(centre, axis, if high { limits[axis].max } else { limits[axis].min });
            if project(face).is_some_and(|f| f.z > c.z + 1e-12) {
                out.push((axis, high));
            }
        }
    }
    out
}

const BOX_EDGES: [(usize, usize); 12] =
    [(0, 1), (2, 3), (4, 5), (6, 7), (0, 2), (1, 3), (4, 6), (5, 7), (0, 4), (1, 5), (2, 6), (3, 7)];

/// Axis of a 3-D camera: everything but the labels in data space; grid on
/// the back faces.
pub fn generate_3d(limits: &Bounds, style: &AxisStyle, base_pix: f64, project: Project<'_>) -> AxisGeometry {
    let mut g = AxisGeometry::default();
    let limits = limits.map(Range::normalized);
    let world: [DVec3; 8] = std::array::from_fn(|i| box_corner(&limits, i));
    let Some(screen) = world.iter().map(|&p| project(p)).collect::<Option<Vec<_>>>() else {
        return g;
    };
    let screen: [DVec3; 8] = std::array::from_fn(|i| screen[i]);
    let centre = screen.iter().map(|&p| xy(p)).sum::<DVec2>() / 8.0;
    let backs = back_faces(&limits, project);

    if style.show_box {
        g.ppc.extend(BOX_EDGES.iter().map(|&(a, b)| [world[a], world[b]]));
    }
    for dim in 0..3 {
        let start = tick_ridge(dim, &screen);
        let end = start | 1 << dim;
        if !style.show_box {
            g.ppc.push([world[start], world[end]]);
        }
        let lim = limits[dim];
        let Some(normal) = outward_normal(xy(screen[start]), xy(screen[end]), centre) else { continue };
        let screen_len = xy(screen[end] - screen[start]).length();
        let (unit, ticks) = dimension_ticks(dim, lim, &style.ticks[dim], lim.range(), screen_len, base_pix);
        g.units[dim] = unit;

        // Tail along whichever perpendicular dimension points out the most.
        let tail = [(dim + 1) % 3, (dim + 2) % 3]
            .into_iter()
            .map(|e| {
                let sign = if start >> e & 1 == 0 { -1.0 } else { 1.0 };
                let mut v = DVec3::ZERO;
                v[e] = sign * TAIL_FRACTION * limits[e].range();
                v
            })
            .max_by(|a, b| {
                let out = |v: DVec3| {
                    project(world[start] + v).map_or(f64::NEG_INFINITY, |s| (xy(s) - xy(screen[start])).dot(normal))
                };
                out(*a).total_cmp(&out(*b))
            })
            .unwrap_or(DVec3::ZERO);

        let (halign, valign) = align_for(normal);
        let gap = DVec3::new(normal.x, normal.y, 0.0) * LABEL_GAP;
        for (value, text) in ticks {
            let p = with(world[start], dim, value);
            g.ppc.push([p, p + tail]);
            let Some(s) = project(p + tail) else { continue };
            g.ticks.push(TickMark { dim, ridge: 0, value, text, anchor: s + gap, halign, valign });
        }

        let grid_lines = |values: &[f64], out: &mut Vec<[DVec3; 2]>| {
            for &(axis, high) in backs.iter().filter(|(a, _)| *a != dim) {
                let other = 3 - axis - dim;
                let side = if high { limits[axis].max } else { limits[axis].min };
                for &v in values {
                    let p = with(with(DVec3::ZERO, dim, v), axis, side);
                    out.push([with(p, other, limits[other].min), with(p, other, limits[other].max)]);
                }
            }
        };
        if style.show_grid[dim] {
            let values: Vec<f64> = g.ticks.iter().filter(|t| t.dim == dim).map(|t| t.value).collect();
            grid_lines(&values, &mut g.ppg);
        }
        if let (Some(u), true) = (unit, style.show_minor_grid[dim]) {
            grid_lines(&minor_values(lim, u), &mut g.minor);
        }
        g.labels.push(LabelPlacement { dim, ridge: 0, anchor: (screen[start] + screen[end]) * 0.5, normal });
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DMat4;

    fn unit_box() -> Bounds {
        [Range::new(0.0, 1.0), Range::new(0.0, 1.0), Range::new(0.0, 1.0)]
    }

    /// Maps `[0, 1]²` onto a 400 px square with +Y up in data space.
    fn flat(p: DVec3) -> Option<DVec3> {
        Some(DVec3::new(p.x * 400.0, 400.0 - p.y * 400.0, 0.5))
    }

    fn style() -> AxisStyle {
        AxisStyle { show_grid: [true; 3], ..AxisStyle::default() }
    }

    // ── 2-D ───────────────────────────────────────────────────────────────

    #[test]
    fn flat_axis_ticks_bottom_and_left() {
        let g = generate_2d(&unit_box(), &style(), 40.0, &flat);
        assert_eq!(g.units[0], Some(0.1));
        let xs: Vec<&TickMark> = g.ticks.iter().filter(|t| t.dim == 0).collect();
        assert_eq!(xs.len(), 11);
        assert!(xs.iter().all(|t| t.anchor.y > 400.0 && t.valign == VAlign::Top));
        let ys: Vec<&TickMark> = g.ticks.iter().filter(|t| t.dim == 1).collect();
        assert!(ys.iter().all(|t| t.anchor.x < 0.0 && t.halign == HAlign::Right));
    }

    #[test]
    fn grid_spans_the_other_dimension() {
        let g = generate_2d(&unit_box(), &style(), 40.0, &flat);
        assert_eq!(g.ppg.len(), 22);
        let [a, b] = g.ppg[3];
        assert_eq!(a.x, b.x);
        assert_eq!((a.y, b.y), (0.0, 1.0));
    }

    #[test]
    fn hidden_grid_and_box() {
        let mut s = style();
        s.show_grid = [false; 3];
        s.show_box = true;
        let g = generate_2d(&unit_box(), &s, 40.0, &flat);
        assert!(g.ppg.is_empty());
        // Two ridges, two box edges, one tail per tick.
        assert_eq!(g.pps.len(), 4 + g.ticks.len());
    }

    #[test]
    fn zero_range_makes_no_ticks() {
        let lim = [Range::new(3.0, 3.0), Range::new(0.0, 1.0), Range::new(0.0, 0.0)];
        let g = generate_2d(&lim, &style(), 40.0, &flat);
        assert!(g.ticks.iter().all(|t| t.dim == 1));
        assert_eq!(g.units[0], None);
    }

    #[test]
    fn minor_values_skip_majors() {
        let v = minor_values(Range::new(0.0, 1.0), 0.5);
        assert_eq!(v.len(), 8);
        assert!(v.iter().all(|x| (x / 0.5 - (x / 0.5).round()).abs() > 1e-6));
    }

    #[test]
    fn user_ticks_override_generation() {
        let mut s = style();
        s.ticks[0] = TickSpec::Labels(vec!["a".into(), "b".into()]);
        let g = generate_2d(&unit_box(), &s, 40.0, &flat);
        let xs: Vec<&str> = g.ticks.iter().filter(|t| t.dim == 0).map(|t| t.text.as_str()).collect();
        assert_eq!(xs, ["a", "b"]);
    }

    // ── labels ────────────────────────────────────────────────────────────

    #[test]
    fn axis_label_clears_tick_labels() {
        let anchor = DVec2::new(200.0, 400.0);
        let normal = DVec2::new(0.0, 1.0);
        let rects = [Rect::new(190.0, 408.0, 20.0, 12.0), Rect::new(90.0, 408.0, 20.0, 14.0)];
        assert_eq!(label_offset(anchor, normal, &rects), 22.0);
        assert_eq!(label_offset(anchor, normal, &[]), 0.0);
    }

    #[test]
    fn alignment_follows_the_normal() {
        assert_eq!(align_for(DVec2::new(-1.0, 0.0)), (HAlign::Right, VAlign::Middle));
        assert_eq!(align_for(DVec2::new(0.0, 1.0)), (HAlign::Center, VAlign::Top));
        assert_eq!(align_for(DVec2::new(0.2, -0.9)), (HAlign::Center, VAlign::Bottom));
    }

    // ── 3-D ───────────────────────────────────────────────────────────────

    /// Orthographic view from azimuth 30, elevation 30 onto a 400 px square.
    fn tilted(p: DVec3) -> Option<DVec3> {
        let m = DMat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, -10.0, 10.0)
            * DMat4::from_rotation_x(300f64.to_radians())
            * DMat4::from_rotation_z((-30f64).to_radians())
            * DMat4::from_translation(DVec3::splat(-0.5));
        crate::camera::project(m, p, (400.0, 400.0))
    }

    #[test]
    fn ticked_ridges_sit_low_and_left() {
        let lim = unit_box();
        let screen: [DVec3; 8] = std::array::from_fn(|i| tilted(box_corner(&lim, i)).unwrap());
        for dim in 0..2 {
            let start = tick_ridge(dim, &screen);
            let mid = (screen[start] + screen[start | 1 << dim]).y / 2.0;
            for other in 0..8usize {
                if other >> dim & 1 == 0 {
                    assert!(mid >= (screen[other] + screen[other | 1 << dim]).y / 2.0 - 1e-9);
                }
            }
        }
        let z = tick_ridge(2, &screen);
        let left = (screen[z] + screen[z | 4]).x / 2.0;
        for other in 0..4usize {
            assert!(left <= (screen[other] + screen[other | 4]).x / 2.0 + 1e-9);
        }
    }

    #[test]
    fn grid_lands_on_back_faces() {
        let lim = unit_box();
        let backs = back_faces(&lim, &tilted);
        assert_eq!(backs.len(), 3);
        // Looking down from above: the floor is behind the data.
        assert!(backs.contains(&(2, false)));
        let g = generate_3d(&lim, &style(), 40.0, &tilted);
        assert!(!g.ppg.is_empty());
        for [a, b] in &g.ppg {
            let on_back = backs.iter().any(|&(axis, high)| {
                let side = if high { 1.0 } else { 0.0 };
                a[axis] == side && b[axis] == side
            });
            assert!(on_back);
        }
    }

    #[test]
    fn three_d_labels_for_every_dimension() {
        let g = generate_3d(&unit_box(), &style(), 40.0, &tilted);
        assert_eq!(g.labels.len(), 3);
        assert!(g.units.iter().all(Option::is_some));
        // Tails live in data space with the ridges.
        assert!(g.ppc.len() >= 3 + g.ticks.len());
        assert!(g.pps.is_empty());
    }
}
