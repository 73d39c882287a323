//! Marker styles and the sprite cache.
//!
//! Markers other than plain discs and squares are drawn as point sprites:
//! alpha patches generated on demand, one face patch and one edge patch per
//! style, diameter and edge width.

use std::collections::HashMap;

use vista_engine::scene::{DrawList, TexelFormat, TextureData, TextureDesc, TextureDim, TextureId, TextureOp};

use crate::error::{Result, VistaError};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum MarkerStyle {
    #[default]
    None,
    /// `.`
    Point,
    /// `o`
    Circle,
    /// `s`
    Square,
    /// `d`
    Diamond,
    /// `^`
    TriangleUp,
    /// `v`
    TriangleDown,
    /// `<`
    TriangleLeft,
    /// `>`
    TriangleRight,
    /// `+`
    Plus,
    /// `x`
    Cross,
    /// `*`
    Star,
    /// `h`
    Hexagon,
}

impl MarkerStyle {
    pub fn from_code(code: char) -> Option<Self> {
        let m = match code {
            '.' => MarkerStyle::Point,
            'o' => MarkerStyle::Circle,
            's' => MarkerStyle::Square,
            'd' => MarkerStyle::Diamond,
            '^' => MarkerStyle::TriangleUp,
            'v' => MarkerStyle::TriangleDown,
            '<' => MarkerStyle::TriangleLeft,
            '>' => MarkerStyle::TriangleRight,
            '+' => MarkerStyle::Plus,
            'x' => MarkerStyle::Cross,
            '*' => MarkerStyle::Star,
            'h' => MarkerStyle::Hexagon,
            _ => return None,
        };
        Some(m)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(MarkerStyle::None),
            (Some(c), None) => Self::from_code(c).ok_or_else(|| VistaError::invalid(format!("unknown marker style {c:?}"))),
            _ => Err(VistaError::invalid(format!("unknown marker style {text:?}"))),
        }
    }

    /// Strokes without an interior.
    pub fn is_stroke(self) -> bool {
        matches!(self, MarkerStyle::Plus | MarkerStyle::Cross)
    }

    /// Outline in unit coordinates (radius 1, +Y down), for filled shapes.
    fn outline(self) -> Vec<[f32; 2]> {
        let ngon = |n: usize, phase: f32, radius: f32| -> Vec<[f32; 2]> {
            (0..n)
                .map(|i| {
                    let a = phase + i as f32 * std::f32::consts::TAU / n as f32;
                    [radius * a.cos(), radius * a.sin()]
                })
                .collect()
        };
        match self {
            MarkerStyle::Point | MarkerStyle::Circle => ngon(32, 0.0, 1.0),
            MarkerStyle::Square => vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
            MarkerStyle::Diamond => vec![[0.0, -1.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]],
            MarkerStyle::TriangleUp => vec![[0.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
            MarkerStyle::TriangleDown => vec![[-1.0, -1.0], [1.0, -1.0], [0.0, 1.0]],
            MarkerStyle::TriangleLeft => vec![[-1.0, 0.0], [1.0, -1.0], [1.0, 1.0]],
            MarkerStyle::TriangleRight => vec![[-1.0, -1.0], [1.0, 0.0], [-1.0, 1.0]],
            MarkerStyle::Hexagon => ngon(6, std::f32::consts::FRAC_PI_6, 1.0),
            MarkerStyle::Star => {
                let outer = ngon(5, -std::f32::consts::FRAC_PI_2, 1.0);
                let inner = ngon(5, -std::f32::consts::FRAC_PI_2 + std::f32::consts::PI / 5.0, 0.4);
                outer.into_iter().zip(inner).flat_map(|(a, b)| [a, b]).collect()
            }
            MarkerStyle::None | MarkerStyle::Plus | MarkerStyle::Cross => Vec::new(),
        }
    }

    /// Segments of the outline (closed) or of the strokes.
    fn segments(self) -> Vec<([f32; 2], [f32; 2])> {
        match self {
            MarkerStyle::Plus => vec![([-1.0, 0.0], [1.0, 0.0]), ([0.0, -1.0], [0.0, 1.0])],
            MarkerStyle::Cross => vec![([-0.7, -0.7], [0.7, 0.7]), ([-0.7, 0.7], [0.7, -0.7])],
            _ => {
                let o = self.outline();
                (0..o.len()).map(|i| (o[i], o[(i + 1) % o.len()])).collect()
            }
        }
    }
}

fn inside(poly: &[[f32; 2]], p: [f32; 2]) -> bool {
    let mut hit = false;
    let mut j = poly.len().wrapping_sub(1);
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0] {
            hit = !hit;
        }
        j = i;
    }
    hit
}

fn segment_distance(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 { (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let (qx, qy) = (a[0] + t * dx - p[0], a[1] + t * dy - p[1]);
    (qx * qx + qy * qy).sqrt()
}

/// Alpha patches of one sprite, `side × side` bytes each.
#[derive(Debug, Clone, PartialEq)]
pub struct SpritePatches {
    pub side: u32,
    /// `None` for stroke-only styles.
    pub face: Option<Vec<u8>>,
    /// `None` when the edge width is zero.
    pub edge: Option<Vec<u8>>,
}

const SUPERSAMPLE: usize = 4;

/// Rasterizes the face and edge patches of a marker of `diameter` pixels.
pub fn rasterize(style: MarkerStyle, diameter: u32, edge_width: f32) -> SpritePatches {
    let diameter = diameter.max(1);
    let pad = edge_width.max(1.0).ceil() as u32;
    let side = diameter + 2 * pad;
    let radius = diameter as f32 / 2.0;
    let centre = side as f32 / 2.0;
    let outline: Vec<[f32; 2]> = style.outline().iter().map(|p| [centre + p[0] * radius, centre + p[1] * radius]).collect();
    let segments: Vec<([f32; 2], [f32; 2])> = style
        .segments()
        .iter()
        .map(|(a, b)| ([centre + a[0] * radius, centre + a[1] * radius], [centre + b[0] * radius, centre + b[1] * radius]))
        .collect();
    let half_edge = if style.is_stroke() { edge_width.max(1.0) / 2.0 } else { edge_width / 2.0 };

    let n = (side * side) as usize;
    let mut face = vec![0u8; n];
    let mut edge = vec![0u8; n];
    let samples = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    for y in 0..side as usize {
        for x in 0..side as usize {
            let (mut f, mut e) = (0u32, 0u32);
            for sy in 0..SUPERSAMPLE {
                for sx in 0..SUPERSAMPLE {
                    let p = [
                        x as f32 + (sx as f32 + 0.5) / SUPERSAMPLE as f32,
                        y as f32 + (sy as f32 + 0.5) / SUPERSAMPLE as f32,
                    ];
                    if !outline.is_empty() && inside(&outline, p) {
                        f += 1;
                    }
                    if half_edge > 0.0 && segments.iter().any(|(a, b)| segment_distance(p, *a, *b) <= half_edge) {
                        e += 1;
                    }
                }
            }
            face[y * side as usize + x] = (f as f32 / samples * 255.0).round() as u8;
            edge[y * side as usize + x] = (e as f32 / samples * 255.0).round() as u8;
        }
    }
    SpritePatches {
        side,
        face: (!style.is_stroke()).then_some(face),
        edge: (half_edge > 0.0).then_some(edge),
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct SpriteKey {
    style: MarkerStyle,
    diameter: u32,
    /// Edge width in tenths of a pixel.
    edge: u32,
}

/// Resident sprite textures of one marker configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    /// Patch side in pixels; the point size to draw with.
    pub side: u32,
    pub face: Option<TextureId>,
    pub edge: Option<TextureId>,
}

/// Per-root cache of sprite textures.
#[derive(Debug, Default)]
pub struct SpriteCache {
    sprites: HashMap<SpriteKey, Sprite>,
}

impl SpriteCache {
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Sprite for a configuration, uploading its patches on first use.
    pub fn get(
        &mut self,
        list: &mut DrawList,
        alloc: &mut dyn FnMut() -> TextureId,
        style: MarkerStyle,
        diameter: f32,
        edge_width: f32,
    ) -> Sprite {
        let key = SpriteKey {
            style,
            diameter: diameter.round().max(1.0) as u32,
            edge: (edge_width.max(0.0) * 10.0).round() as u32,
        };
        if let Some(s) = self.sprites.get(&key) {
            return *s;
        }
        let patches = rasterize(style, key.diameter, key.edge as f32 / 10.0);
        let mut upload = |data: Vec<u8>| {
            let id = alloc();
            let desc = TextureDesc {
                dim: TextureDim::D2,
                size: [patches.side, patches.side, 1],
                format: TexelFormat::R8,
                linear: true,
            };
            list.push_texture_op(TextureOp::Create { id, desc, data: TextureData::U8(data) });
            id
        };
        let sprite = Sprite {
            side: patches.side,
            face: patches.face.clone().map(&mut upload),
            edge: patches.edge.clone().map(&mut upload),
        };
        log::debug!("generated {style:?} sprite of {} px", sprite.side);
        self.sprites.insert(key, sprite);
        sprite
    }

    /// Destroy ops for every cached texture; empties the cache.
    pub fn release(&mut self, out: &mut Vec<TextureOp>) {
        for s in self.sprites.drain().map(|(_, s)| s) {
            out.extend(s.face.into_iter().chain(s.edge).map(|id| TextureOp::Destroy { id }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── styles ────────────────────────────────────────────────────────────

    #[test]
    fn codes_round_trip_through_parse() {
        for c in ['.', 'o', 's', 'd', '^', 'v', '<', '>', '+', 'x', '*', 'h'] {
            assert!(MarkerStyle::from_code(c).is_some(), "{c}");
        }
        assert_eq!(MarkerStyle::parse("").unwrap(), MarkerStyle::None);
        assert!(MarkerStyle::parse("q").is_err());
    }

    // ── rasterize ─────────────────────────────────────────────────────────

    #[test]
    fn square_face_covers_its_centre_not_its_corner_padding() {
        let p = rasterize(MarkerStyle::Square, 8, 1.0);
        assert_eq!(p.side, 10);
        let face = p.face.unwrap();
        assert_eq!(face[5 * 10 + 5], 255);
        assert_eq!(face[0], 0);
    }

    #[test]
    fn edge_runs_along_the_outline() {
        let p = rasterize(MarkerStyle::Circle, 16, 2.0);
        let edge = p.edge.unwrap();
        let side = p.side as usize;
        let c = side / 2;
        assert_eq!(edge[c * side + c], 0);
        // Leftmost point of the circle is at x = pad.
        assert!(edge[c * side + 2] > 100);
    }

    #[test]
    fn strokes_have_no_face() {
        let p = rasterize(MarkerStyle::Plus, 9, 0.0);
        assert!(p.face.is_none());
        assert!(p.edge.is_some());
    }

    #[test]
    fn zero_edge_width_gives_no_edge_patch() {
        assert!(rasterize(MarkerStyle::Diamond, 9, 0.0).edge.is_none());
    }

    // ── cache ─────────────────────────────────────────────────────────────

    #[test]
    fn sprites_are_uploaded_once_per_configuration() {
        let mut cache = SpriteCache::default();
        let mut list = DrawList::new();
        let mut next = 0u64;
        let mut alloc = || {
            next += 1;
            TextureId(next)
        };
        let a = cache.get(&mut list, &mut alloc, MarkerStyle::Star, 10.0, 1.0);
        let b = cache.get(&mut list, &mut alloc, MarkerStyle::Star, 10.2, 1.0);
        assert_eq!(a, b);
        assert_eq!(list.texture_ops().len(), 2);
        cache.get(&mut list, &mut alloc, MarkerStyle::Star, 12.0, 1.0);
        assert_eq!(cache.len(), 2);
        let mut ops = Vec::new();
        cache.release(&mut ops);
        assert_eq!(ops.len(), 4);
        assert!(cache.is_empty());
    }
}
