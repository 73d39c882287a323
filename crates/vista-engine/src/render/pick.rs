//! CPU rasterizer for the shape pass.
//!
//! Picking renders every visible node in a unique flat color and reads the
//! pixel under the pointer back. Rasterizing on the CPU keeps the result
//! exact (no blending, no filtering, no surface format conversions) and
//! makes it available without a presented frame.
//!
//! Coverage rules: pixel centers inside a triangle are filled; wide lines
//! become quads; points and sprites are `size` pixel squares (discs for
//! circle points); glyphs fill their advance by line-height cell. Image and
//! volume commands are expected to arrive as flat meshes in this pass.

use crate::coords::Rect;
use crate::paint::Color;
use crate::scene::{DepthMode, DrawCmd, DrawList, DrawState, GlyphsCmd, LinesCmd, PointShape};
use crate::text::FontSystem;

/// Top-down RGB8 image of one shape pass, in logical pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickBuffer {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl PickBuffer {
    pub fn new(width: u32, height: u32, clear: [u8; 3]) -> Self {
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            rgb.extend_from_slice(&clear);
        }
        Self { width, height, rgb }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw rows, top row first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgb
    }

    /// Color at `(x, y)`, `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }

    /// Colors of the `w x h` region at `(x, y)`, row-major top-down.
    /// Pixels outside the buffer are skipped.
    pub fn region(&self, x: i32, y: i32, w: u32, h: u32) -> Vec<[u8; 3]> {
        let mut out = Vec::with_capacity(w as usize * h as usize);
        for yy in y..y + h as i32 {
            for xx in x..x + w as i32 {
                if let Some(p) = self.pixel(xx, yy) {
                    out.push(p);
                }
            }
        }
        out
    }

    fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.rgb[i..i + 3].copy_from_slice(&rgb);
    }
}

/// Screen-space vertex: logical pixels plus depth in `[0, 1]`.
type ScreenVertex = (f32, f32, f32);

#[inline]
fn edge_function(a: ScreenVertex, b: ScreenVertex, c: (f32, f32)) -> f32 {
    (c.0 - a.0) * (b.1 - a.1) - (c.1 - a.1) * (b.0 - a.0)
}

/// Rasterizes a draw list into a [`PickBuffer`].
///
/// Keeps its depth buffer between passes to avoid reallocating.
#[derive(Debug, Default)]
pub struct PickRasterizer {
    depth: Vec<f32>,
}

struct Target<'a> {
    buffer: &'a mut PickBuffer,
    depth: &'a mut [f32],
    clip: (u32, u32, u32, u32),
    mode: DepthMode,
    rgb: [u8; 3],
}

impl Target<'_> {
    fn shade(&mut self, x: u32, y: u32, z: f32) {
        let (x0, y0, x1, y1) = self.clip;
        if x < x0 || y < y0 || x >= x1 || y >= y1 || !(0.0..=1.0).contains(&z) {
            return;
        }
        let i = y as usize * self.buffer.width as usize + x as usize;
        if self.mode.tests() && z > self.depth[i] {
            return;
        }
        if self.mode.writes() {
            self.depth[i] = z;
        }
        self.buffer.put(x, y, self.rgb);
    }

    fn triangle(&mut self, a: ScreenVertex, b: ScreenVertex, c: ScreenVertex) {
        let area = edge_function(a, b, (c.0, c.1));
        if area.abs() <= f32::EPSILON {
            return;
        }
        let (x0, y0, x1, y1) = self.clip;
        let min_x = (a.0.min(b.0).min(c.0).floor().max(x0 as f32)) as u32;
        let min_y = (a.1.min(b.1).min(c.1).floor().max(y0 as f32)) as u32;
        let max_x = (a.0.max(b.0).max(c.0).ceil().min(x1 as f32)) as u32;
        let max_y = (a.1.max(b.1).max(c.1).ceil().min(y1 as f32)) as u32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let wa = edge_function(b, c, p) / area;
                let wb = edge_function(c, a, p) / area;
                let wc = edge_function(a, b, p) / area;
                if wa >= 0.0 && wb >= 0.0 && wc >= 0.0 {
                    self.shade(x, y, wa * a.2 + wb * b.2 + wc * c.2);
                }
            }
        }
    }

    fn quad(&mut self, q: [ScreenVertex; 4]) {
        self.triangle(q[0], q[1], q[2]);
        self.triangle(q[0], q[2], q[3]);
    }

    /// Axis-aligned square (or disc) of side `size` centered at `p`.
    fn splat(&mut self, p: ScreenVertex, size: f32, round: bool) {
        let half = (size * 0.5).max(0.5);
        let (x0, y0, x1, y1) = self.clip;
        let min_x = ((p.0 - half).floor().max(x0 as f32)) as u32;
        let min_y = ((p.1 - half).floor().max(y0 as f32)) as u32;
        let max_x = ((p.0 + half).ceil().min(x1 as f32)) as u32;
        let max_y = ((p.1 + half).ceil().min(y1 as f32)) as u32;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let (dx, dy) = (x as f32 + 0.5 - p.0, y as f32 + 0.5 - p.1);
                let inside = if round {
                    dx * dx + dy * dy <= half * half
                } else {
                    dx.abs() <= half && dy.abs() <= half
                };
                if inside {
                    self.shade(x, y, p.2);
                }
            }
        }
    }
}

impl PickRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterizes `list` in paint order into a `size` buffer cleared to
    /// `clear`. Texture ops in the list are ignored.
    pub fn render(&mut self, list: &mut DrawList, size: (u32, u32), fonts: &FontSystem, clear: Color) -> PickBuffer {
        let (w, h) = size;
        let mut buffer = PickBuffer::new(w, h, clear.to_rgb8());
        self.depth.clear();
        self.depth.resize(w as usize * h as usize, 1.0);

        for item in list.iter_in_paint_order() {
            let Some(clip) = clip_rect(item.state.viewport, size) else { continue };
            let rgb = match &item.cmd {
                DrawCmd::Lines(c) => c.color,
                DrawCmd::Points(c) => c.color,
                DrawCmd::Sprites(c) => c.color,
                DrawCmd::Mesh(c) => c.color,
                DrawCmd::Glyphs(c) => c.color,
                DrawCmd::Image(_) | DrawCmd::Volume(_) => continue,
            }
            .to_rgb8();
            let mut target = Target { buffer: &mut buffer, depth: &mut self.depth, clip, mode: item.state.depth, rgb };
            let state = &item.state;

            match &item.cmd {
                DrawCmd::Lines(c) => raster_lines(&mut target, state, c),
                DrawCmd::Points(c) => {
                    let round = c.shape == PointShape::Circle;
                    for p in c.positions.iter().filter_map(|&p| state.project(p)) {
                        target.splat(p, c.size, round);
                    }
                }
                DrawCmd::Sprites(c) => {
                    for p in c.positions.iter().filter_map(|&p| state.project(p)) {
                        target.splat(p, c.size, false);
                    }
                }
                DrawCmd::Mesh(c) => {
                    for [a, b, d] in c.triangles() {
                        let v = (state.project(c.positions[a]), state.project(c.positions[b]), state.project(c.positions[d]));
                        if let (Some(a), Some(b), Some(d)) = v {
                            target.triangle(a, b, d);
                        }
                    }
                }
                DrawCmd::Glyphs(c) => raster_glyphs(&mut target, state, c, fonts),
                DrawCmd::Image(_) | DrawCmd::Volume(_) => {}
            }
        }
        buffer
    }
}

fn clip_rect(viewport: Rect, (w, h): (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let r = viewport.intersect(Rect::new(0.0, 0.0, w as f32, h as f32))?;
    let x0 = r.x.floor().max(0.0) as u32;
    let y0 = r.y.floor().max(0.0) as u32;
    let x1 = (r.right().ceil() as u32).min(w);
    let y1 = (r.bottom().ceil() as u32).min(h);
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

fn raster_lines(target: &mut Target<'_>, state: &DrawState, cmd: &LinesCmd) {
    let half = cmd.width.max(1.0) * 0.5;
    for (a, b) in cmd.segments() {
        let (Some(p0), Some(p1)) = (state.project(cmd.positions[a]), state.project(cmd.positions[b])) else {
            continue;
        };
        let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            target.splat(p0, cmd.width.max(1.0), false);
            continue;
        }
        let (nx, ny) = (-dy / len * half, dx / len * half);
        target.quad([
            (p0.0 + nx, p0.1 + ny, p0.2),
            (p1.0 + nx, p1.1 + ny, p1.2),
            (p1.0 - nx, p1.1 - ny, p1.2),
            (p0.0 - nx, p0.1 - ny, p0.2),
        ]);
    }
}

fn raster_glyphs(target: &mut Target<'_>, state: &DrawState, cmd: &GlyphsCmd, fonts: &FontSystem) {
    for g in &cmd.glyphs {
        let m = fonts.glyph_metrics(cmd.font, g.ch, g.size);
        if g.ch.is_whitespace() || m.advance <= 0.0 {
            continue;
        }
        let corners = [
            [g.x, g.y, cmd.z],
            [g.x + m.advance, g.y, cmd.z],
            [g.x + m.advance, g.y + m.height, cmd.z],
            [g.x, g.y + m.height, cmd.z],
        ];
        let projected: Option<Vec<ScreenVertex>> = corners.iter().map(|&c| state.project(c)).collect();
        if let Some(q) = projected {
            target.quad([q[0], q[1], q[2], q[3]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GlyphQuad, LineTopology, MeshCmd};
    use crate::text::FontId;

    const RED: [u8; 3] = [255, 0, 0];
    const GREEN: [u8; 3] = [0, 255, 0];

    fn px_state(w: f32, h: f32) -> DrawState {
        DrawState::pixels(Rect::new(0.0, 0.0, w, h), 1000.0)
    }

    fn render(list: &mut DrawList, w: u32, h: u32) -> PickBuffer {
        PickRasterizer::new().render(list, (w, h), &FontSystem::new(), Color::WHITE)
    }

    // ── triangles ─────────────────────────────────────────────────────────

    #[test]
    fn quad_covers_its_pixels() {
        let mut l = DrawList::new();
        l.push_quad(
            px_state(20.0, 20.0),
            [[5.0, 5.0, 0.0], [15.0, 5.0, 0.0], [15.0, 15.0, 0.0], [5.0, 15.0, 0.0]],
            Color::from_rgb8(RED),
        );
        let b = render(&mut l, 20, 20);
        assert_eq!(b.pixel(10, 10), Some(RED));
        assert_eq!(b.pixel(5, 5), Some(RED));
        assert_eq!(b.pixel(4, 10), Some([255, 255, 255]));
        assert_eq!(b.pixel(15, 15), Some([255, 255, 255]));
    }

    #[test]
    fn later_item_paints_over_without_depth() {
        let mut l = DrawList::new();
        let s = px_state(10.0, 10.0);
        let full = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]];
        l.push_quad(s, full, Color::from_rgb8(RED));
        l.push_quad(s, full, Color::from_rgb8(GREEN));
        assert_eq!(render(&mut l, 10, 10).pixel(3, 3), Some(GREEN));
    }

    #[test]
    fn depth_test_keeps_nearest() {
        let mut l = DrawList::new();
        let s = px_state(10.0, 10.0).with_depth(DepthMode::TestWrite);
        // pixel-space z maps larger values nearer
        let quad = |z: f32| [[0.0, 0.0, z], [10.0, 0.0, z], [10.0, 10.0, z], [0.0, 10.0, z]];
        l.push_quad(s, quad(10.0), Color::from_rgb8(RED));
        l.push_quad(s, quad(-10.0), Color::from_rgb8(GREEN));
        assert_eq!(render(&mut l, 10, 10).pixel(5, 5), Some(RED));
    }

    #[test]
    fn viewport_clips() {
        let mut l = DrawList::new();
        let s = DrawState::pixels(Rect::new(0.0, 0.0, 5.0, 10.0), 1.0);
        l.push_mesh(
            s,
            MeshCmd {
                positions: vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]],
                normals: None,
                indices: vec![0, 1, 2, 0, 2, 3],
                color: Color::from_rgb8(RED),
                lit: false,
            },
        );
        let b = render(&mut l, 10, 10);
        assert_eq!(b.pixel(2, 5), Some(RED));
        assert_eq!(b.pixel(7, 5), Some([255, 255, 255]));
    }

    // ── lines / points ────────────────────────────────────────────────────

    #[test]
    fn wide_line_covers_across() {
        let mut l = DrawList::new();
        l.push_lines(
            px_state(20.0, 20.0),
            vec![[2.0, 10.0, 0.0], [18.0, 10.0, 0.0]],
            Color::from_rgb8(RED),
            4.0,
            None,
            LineTopology::Strip,
        );
        let b = render(&mut l, 20, 20);
        assert_eq!(b.pixel(10, 8), Some(RED));
        assert_eq!(b.pixel(10, 11), Some(RED));
        assert_eq!(b.pixel(10, 13), Some([255, 255, 255]));
    }

    #[test]
    fn circle_point_skips_corners() {
        let mut l = DrawList::new();
        l.push_points(px_state(20.0, 20.0), vec![[10.0, 10.0, 0.0]], Color::from_rgb8(RED), 10.0, PointShape::Circle);
        let b = render(&mut l, 20, 20);
        assert_eq!(b.pixel(10, 10), Some(RED));
        assert_eq!(b.pixel(5, 5), Some([255, 255, 255]));
    }

    // ── glyphs ────────────────────────────────────────────────────────────

    #[test]
    fn glyph_fills_fallback_cell() {
        let mut l = DrawList::new();
        l.push_glyphs(
            px_state(40.0, 40.0),
            GlyphsCmd {
                font: FontId::default(),
                color: Color::from_rgb8(GREEN),
                z: 0.0,
                glyphs: vec![GlyphQuad { ch: 'A', size: 10.0, x: 10.0, y: 10.0, skew: 0.0, bold: false }],
            },
        );
        let b = render(&mut l, 40, 40);
        // fallback cell is 6 x 12
        assert_eq!(b.pixel(12, 15), Some(GREEN));
        assert_eq!(b.pixel(17, 15), Some([255, 255, 255]));
    }

    // ── buffer ────────────────────────────────────────────────────────────

    #[test]
    fn region_skips_outside() {
        let b = PickBuffer::new(4, 4, [1, 2, 3]);
        assert_eq!(b.region(2, 2, 4, 4).len(), 4);
        assert_eq!(b.pixel(-1, 0), None);
    }
}
