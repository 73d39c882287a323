//! Axis drawing.
//!
//! Every axes owns one [`Axis`] world object. Each frame it asks the axes
//! for its limits and camera, generates the ridges, ticks and grid through
//! [`cartesian`] or [`polar`], draws the data-space parts with the world
//! objects and the pixel parts and labels in the screen phase.

pub mod cartesian;
pub mod polar;
pub mod ticks;

use std::collections::HashMap;

use glam::{DVec2, DVec3};
use vista_engine::coords::Rect;
use vista_engine::paint::Color;
use vista_engine::scene::LineTopology;

use crate::camera::CameraKind;
use crate::draw::DrawContext;
use crate::error::Result;
use crate::line::LineStyle;
use crate::node::{Behavior, NodeCx};
use crate::text::Text;
use crate::widgets::Axes;

pub use cartesian::{AxisGeometry, LabelPlacement, TickMark};
pub use polar::PolarState;
pub use ticks::TickSpec;

/// Appearance and tick configuration of an axes' axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    pub show_axis: bool,
    /// Draw all box edges instead of the ticked ridges only.
    pub show_box: bool,
    pub color: Color,
    pub line_width: f32,
    pub font_size: f32,
    pub grid_style: LineStyle,
    pub grid_color: Color,
    pub show_grid: [bool; 3],
    pub show_minor_grid: [bool; 3],
    pub ticks: [TickSpec; 3],
    pub labels: [String; 3],
    /// Base minimum tick spacing in pixels.
    pub min_tick_pixels: f64,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            show_axis: true,
            show_box: true,
            color: Color::BLACK,
            line_width: 1.0,
            font_size: 9.0,
            grid_style: LineStyle::Dotted,
            grid_color: Color::rgb(0.6, 0.6, 0.6),
            show_grid: [false; 3],
            show_minor_grid: [false; 3],
            ticks: Default::default(),
            labels: Default::default(),
            min_tick_pixels: 40.0,
        }
    }
}

fn flatten(segments: &[[DVec3; 2]]) -> Vec<[f32; 3]> {
    segments.iter().flat_map(|s| s.map(|p| p.as_vec3().to_array())).collect()
}

/// The axis of one axes.
///
/// Tick texts are cached by dimension and text, so labels that stay put
/// while panning keep their compiled layout from frame to frame.
#[derive(Debug, Default)]
pub struct Axis {
    geometry: AxisGeometry,
    style: AxisStyle,
    cache: HashMap<String, Text>,
    labels: [Option<Text>; 3],
}

impl Axis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry of the last frame.
    pub fn geometry(&self) -> &AxisGeometry {
        &self.geometry
    }

    /// Number of cached tick texts.
    pub fn cached_labels(&self) -> usize {
        self.cache.len()
    }

    fn label_text(&mut self, dim: usize) -> Option<&mut Text> {
        let source = self.style.labels[dim].as_str();
        if source.is_empty() {
            self.labels[dim] = None;
            return None;
        }
        let size = self.style.font_size + 1.0;
        let slot = &mut self.labels[dim];
        if slot.as_ref().is_none_or(|t| t.source() != source) {
            *slot = Some(Text::new(source, size));
        }
        slot.as_mut()
    }
}

impl Behavior for Axis {
    fn type_name(&self) -> &'static str {
        "Axis"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        self.geometry = AxisGeometry::default();
        let Some((_, axes)) = node.ancestor::<Axes>() else { return Ok(()) };
        self.style = axes.axis_style().clone();
        if !self.style.show_axis {
            return Ok(());
        }
        let base = self.style.min_tick_pixels;
        let geometry = {
            let project = |p: DVec3| ctx.project(p);
            if axes.is_polar() {
                polar::generate_polar(axes.polar(), &self.style, base, &project)
            } else if axes.camera_kind() == CameraKind::TwoD {
                cartesian::generate_2d(&axes.visible_limits(), &self.style, base, &project)
            } else {
                cartesian::generate_3d(&axes.limits(), &self.style, base, &project)
            }
        };
        self.geometry = geometry;

        let state = ctx.world_state();
        let style = &self.style;
        ctx.list.push_lines(
            state,
            flatten(&self.geometry.minor),
            style.grid_color.with_alpha(0.5),
            style.line_width,
            LineStyle::Dotted.stipple(),
            LineTopology::List,
        );
        ctx.list.push_lines(
            state,
            flatten(&self.geometry.ppg),
            style.grid_color,
            style.line_width,
            style.grid_style.stipple(),
            LineTopology::List,
        );
        ctx.list.push_lines(state, flatten(&self.geometry.ppc), style.color, style.line_width, None, LineTopology::List);
        Ok(())
    }

    fn on_draw_screen(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        if !self.style.show_axis {
            return Ok(());
        }
        let state = ctx.pixel_state();
        let pps: Vec<[f32; 3]> = self
            .geometry
            .pps
            .iter()
            .flat_map(|s| s.map(|p| [p.x as f32, p.y as f32, ctx.depth_to_z(p.z)]))
            .collect();
        ctx.list.push_lines(state, pps, self.style.color, self.style.line_width, None, LineTopology::List);

        // Tick labels first: the axis labels keep clear of their boxes.
        let mut previous = std::mem::take(&mut self.cache);
        let mut rects: Vec<(usize, usize, Rect)> = Vec::with_capacity(self.geometry.ticks.len());
        for t in &self.geometry.ticks {
            let key = format!("{}:{}:{}", t.dim, t.ridge, t.text);
            let mut text = previous.remove(&key).unwrap_or_else(|| Text::new(t.text.as_str(), self.style.font_size));
            text.set_size(self.style.font_size);
            text.color = self.style.color;
            text.halign = t.halign;
            text.valign = t.valign;
            let z = ctx.depth_to_z(t.anchor.z);
            rects.push((t.dim, t.ridge, text.push(ctx, state, t.anchor.x as f32, t.anchor.y as f32, z)));
            self.cache.insert(key, text);
        }

        let placements = self.geometry.labels.clone();
        let color = self.style.color;
        for lp in placements {
            let anchor = DVec2::new(lp.anchor.x, lp.anchor.y);
            let dim_rects: Vec<Rect> =
                rects.iter().filter(|(d, k, _)| *d == lp.dim && *k == lp.ridge).map(|(_, _, r)| *r).collect();
            let offset = cartesian::label_offset(anchor, lp.normal, &dim_rects) + cartesian::AXIS_LABEL_PAD;
            let at = anchor + lp.normal * offset;
            let (halign, valign) = cartesian::align_for(lp.normal);
            let z = ctx.depth_to_z(lp.anchor.z);
            let Some(text) = self.label_text(lp.dim) else { continue };
            text.color = color;
            text.halign = halign;
            text.valign = valign;
            text.push(ctx, state, at.x as f32, at.y as f32, z);
        }
        Ok(())
    }
}
