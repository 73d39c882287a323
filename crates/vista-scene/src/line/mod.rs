//! Lines and markers in data space.

pub mod markers;

use vista_engine::paint::Color;
use vista_engine::scene::{BlendMode, DepthMode, DrawState, LineTopology, PointShape};
use vista_math::{Point, Pointset, Range};

use crate::widgets::Axes;
use crate::color;
use crate::draw::DrawContext;
use crate::error::{Result, VistaError};
use crate::node::{Behavior, Bounds, NodeCx};

pub use markers::{MarkerStyle, Sprite, SpriteCache};

/// Depth at which 2-D data is placed, above images at zero.
pub const Z_2D: f32 = 0.1;

/// Extra width of lines in the shape pass so thin strokes stay pickable.
const SHAPE_EXTRA_WIDTH: f32 = 4.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dotted,
    Dashed,
    DashDot,
    /// No line, markers only.
    None,
}

impl LineStyle {
    pub fn stipple(self) -> Option<u16> {
        match self {
            LineStyle::Dotted => Some(0xAAAA),
            LineStyle::Dashed => Some(0xF0F0),
            LineStyle::DashDot => Some(0xE4E4),
            LineStyle::Solid | LineStyle::None => None,
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        match text {
            "-" => Ok(LineStyle::Solid),
            ":" => Ok(LineStyle::Dotted),
            "--" => Ok(LineStyle::Dashed),
            "-." => Ok(LineStyle::DashDot),
            "" => Ok(LineStyle::None),
            _ => Err(VistaError::invalid(format!("unknown line style {text:?}"))),
        }
    }
}

/// Parsed `"r--o"`-style format string.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LineFormat {
    pub color: Option<Color>,
    pub line: Option<LineStyle>,
    pub marker: Option<MarkerStyle>,
}

impl LineFormat {
    /// Accepts at most one color code, line style and marker, in any order.
    pub fn parse(text: &str) -> Result<Self> {
        let mut f = LineFormat::default();
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            if c == '-' {
                let (style, used) = match next {
                    Some('-') => (LineStyle::Dashed, 2),
                    Some('.') => (LineStyle::DashDot, 2),
                    _ => (LineStyle::Solid, 1),
                };
                f.line = Some(style);
                i += used;
                continue;
            }
            if c == ':' {
                f.line = Some(LineStyle::Dotted);
            } else if let Some(col) = color::from_code(c) {
                f.color = Some(col);
            } else if let Some(m) = MarkerStyle::from_code(c) {
                f.marker = Some(m);
            } else {
                return Err(VistaError::invalid(format!("unknown format character {c:?} in {text:?}")));
            }
            i += 1;
        }
        Ok(f)
    }
}

/// A polyline with optional markers at its vertices.
///
/// Polar data (angle in degrees, radius) is mapped through the hosting
/// axes' polar state when that axes is in polar mode.
#[derive(Debug, Clone)]
pub struct Line {
    points: Pointset,
    polar: Option<Vec<(f64, f64)>>,
    pub line_style: LineStyle,
    pub line_width: f32,
    pub line_color: Color,
    pub marker: MarkerStyle,
    pub marker_size: f32,
    pub marker_color: Color,
    pub marker_edge_color: Color,
    pub marker_edge_width: f32,
    alpha: f32,
}

impl Line {
    pub fn new(points: &Pointset) -> Self {
        Self {
            points: points.to_3d(Z_2D),
            polar: None,
            line_style: LineStyle::Solid,
            line_width: 1.0,
            line_color: Color::rgb(0.0, 0.0, 1.0),
            marker: MarkerStyle::None,
            marker_size: 7.0,
            marker_color: Color::rgb(0.0, 0.0, 1.0),
            marker_edge_color: Color::BLACK,
            marker_edge_width: 1.0,
            alpha: 1.0,
        }
    }

    /// Line from `(angle_deg, radius)` pairs.
    pub fn polar(samples: &[(f64, f64)]) -> Result<Self> {
        let flat: Vec<Point> = samples.iter().map(|&(a, r)| Point::new2(a, r)).collect();
        let points = Pointset::from_points(2, &flat)?;
        Ok(Self { polar: Some(samples.to_vec()), ..Self::new(&points) })
    }

    pub fn with_format(mut self, format: &str) -> Result<Self> {
        let f = LineFormat::parse(format)?;
        if let Some(c) = f.color {
            self.line_color = c;
            self.marker_color = c;
        }
        if let Some(m) = f.marker {
            self.marker = m;
            // A marker alone means no connecting line.
            self.line_style = f.line.unwrap_or(LineStyle::None);
        } else if let Some(l) = f.line {
            self.line_style = l;
        }
        Ok(self)
    }

    pub fn points(&self) -> &Pointset {
        &self.points
    }

    pub fn set_points(&mut self, points: &Pointset) {
        self.points = points.to_3d(Z_2D);
        self.polar = None;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(VistaError::OutOfRange(format!("alpha {alpha} outside [0, 1]")));
        }
        self.alpha = alpha;
        Ok(())
    }

    fn positions(&self, node: &NodeCx<'_>) -> Vec<[f32; 3]> {
        if let Some(samples) = &self.polar {
            if let Some((_, axes)) = node.ancestor::<Axes>() {
                if axes.is_polar() {
                    let p = axes.polar();
                    return samples
                        .iter()
                        .map(|&(a, r)| {
                            let (x, y) = p.to_cartesian(a, r);
                            [x as f32, y as f32, Z_2D]
                        })
                        .collect();
                }
            }
        }
        self.points.as_flat().chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
    }

    fn stroke_state(&self, ctx: &DrawContext<'_>) -> DrawState {
        let state = ctx.world_state();
        if self.alpha < 1.0 && ctx.caps().constant_alpha {
            state.with_blend(BlendMode::ConstantAlpha(self.alpha)).with_depth(DepthMode::Off)
        } else {
            state
        }
    }

    fn draw_markers(&self, ctx: &mut DrawContext<'_>, state: DrawState, positions: &[[f32; 3]]) {
        if self.marker == MarkerStyle::None {
            return;
        }
        let plain = match self.marker {
            MarkerStyle::Point => Some((PointShape::Circle, self.marker_size.min(5.0))),
            MarkerStyle::Circle if self.marker_edge_width == 0.0 => Some((PointShape::Circle, self.marker_size)),
            MarkerStyle::Square if self.marker_edge_width == 0.0 => Some((PointShape::Square, self.marker_size)),
            // Without sprite support every marker degrades to a smooth point.
            _ if !ctx.caps().shaders => Some((PointShape::Circle, self.marker_size)),
            _ => None,
        };
        if let Some((shape, size)) = plain {
            ctx.list.push_points(state, positions.to_vec(), self.marker_color, size, shape);
            return;
        }
        let sprite = ctx.sprite(self.marker, self.marker_size, self.marker_edge_width);
        let side = sprite.side as f32;
        if let Some(face) = sprite.face {
            ctx.list.push_sprites(state, positions.to_vec(), self.marker_color, side, face);
        }
        if let Some(edge) = sprite.edge {
            ctx.list.push_sprites(state, positions.to_vec(), self.marker_edge_color, side, edge);
        }
    }
}

impl Behavior for Line {
    fn type_name(&self) -> &'static str {
        "Line"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let positions = self.positions(&node);
        let state = self.stroke_state(ctx);
        if self.line_style != LineStyle::None {
            let color = self.line_color.with_alpha(self.line_color.a * self.alpha);
            ctx.list.push_lines(
                state,
                positions.clone(),
                color,
                self.line_width,
                self.line_style.stipple(),
                LineTopology::Strip,
            );
        }
        self.draw_markers(ctx, state, &positions);
        Ok(())
    }

    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let positions = self.positions(&node);
        let state = ctx.world_state();
        let color = ctx.shape_color();
        if self.line_style != LineStyle::None {
            ctx.list.push_lines(
                state,
                positions.clone(),
                color,
                self.line_width + SHAPE_EXTRA_WIDTH,
                None,
                LineTopology::Strip,
            );
        }
        let size = if self.marker == MarkerStyle::None { self.line_width + SHAPE_EXTRA_WIDTH } else { self.marker_size };
        ctx.list.push_points(state, positions, color, size, PointShape::Square);
        Ok(())
    }

    fn bounds(&self) -> Option<Bounds> {
        if self.points.is_empty() {
            return None;
        }
        let r = |d| self.points.bounding_range(d).unwrap_or(Range::new(0.0, 0.0));
        if let Some(samples) = &self.polar {
            // Polar data spans the radial extent in every direction.
            let rmax = samples.iter().map(|s| s.1.abs()).fold(0.0, f64::max);
            let rr = Range::new(-rmax, rmax);
            return Some([rr, rr, r(2)]);
        }
        Some([r(0), r(1), r(2)])
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "points" | "line_style" | "marker" | "alpha")
    }
}
