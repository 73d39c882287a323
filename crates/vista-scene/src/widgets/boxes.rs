use vista_engine::coords::Rect;
use vista_engine::paint::Color;
use vista_engine::scene::LineTopology;

use crate::draw::DrawContext;
use crate::error::Result;
use crate::node::{Behavior, Field, NodeCx, Position};
use crate::text::{HAlign, Text, VAlign};

/// Height of a [`Title`] strip in pixels.
pub const TITLE_HEIGHT: f32 = 20.0;

/// Paints a widget's box: background and edge in drawing passes, the full
/// rectangle in the shape pass so empty space still picks the widget.
pub fn paint_box(node: NodeCx<'_>, ctx: &mut DrawContext<'_>) {
    let Some(data) = node.node().and_then(|n| n.widget()) else { return };
    let vp = ctx.viewport();
    let state = ctx.pixel_state();
    let (w, h) = (vp.w, vp.h);
    let corners = [[0.0, 0.0, 0.0], [w, 0.0, 0.0], [w, h, 0.0], [0.0, h, 0.0]];

    if ctx.is_shape() {
        let color = ctx.shape_color();
        ctx.list.push_quad(state, corners, color);
        return;
    }
    if data.background.a > 0.0 {
        ctx.list.push_quad(state, corners, data.background);
    }
    if data.edge_width > 0.0 && data.edge_color.a > 0.0 {
        // Inset by half the width so the edge stays inside the viewport.
        let i = data.edge_width / 2.0;
        let edge = vec![[i, i, 0.0], [w - i, i, 0.0], [w - i, h - i, 0.0], [i, h - i, 0.0], [i, i, 0.0]];
        ctx.list.push_lines(state, edge, data.edge_color, data.edge_width, None, LineTopology::Strip);
    }
}

/// Plain rectangle with background and edge.
#[derive(Debug, Default)]
pub struct BoxWidget;

impl BoxWidget {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for BoxWidget {
    fn type_name(&self) -> &'static str {
        "Box"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        Ok(())
    }

    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        Ok(())
    }
}

/// Text inside a box.
///
/// The text is placed against the box edge its alignment names, with a
/// margin of [`Label::PADDING`] pixels.
#[derive(Debug)]
pub struct Label {
    text: Text,
    last_rect: Option<Rect>,
}

impl Label {
    pub const PADDING: f32 = 3.0;

    pub fn new(text: impl Into<String>, size: f32) -> Self {
        Self { text: Text::new(text, size), last_rect: None }
    }

    pub fn align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.text.halign = halign;
        self.text.valign = valign;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.text.color = color;
        self
    }

    pub fn text(&self) -> &Text {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut Text {
        &mut self.text
    }

    pub fn set_text(&mut self, source: impl Into<String>) {
        self.text.set_source(source);
    }

    /// Text box of the last frame, relative to the label.
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }

    fn anchor(&self, w: f32, h: f32) -> (f32, f32) {
        let p = Self::PADDING;
        let x = match self.text.halign {
            HAlign::Left => p,
            HAlign::Center => w / 2.0,
            HAlign::Right => w - p,
        };
        let y = match self.text.valign {
            VAlign::Top => p,
            VAlign::Middle => h / 2.0,
            VAlign::Bottom => h - p,
        };
        (x, y)
    }
}

impl Behavior for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        let vp = ctx.viewport();
        let (x, y) = self.anchor(vp.w, vp.h);
        let state = ctx.pixel_state();
        self.last_rect = Some(self.text.push(ctx, state, x, y, 0.0));
        Ok(())
    }

    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        paint_box(node, ctx);
        Ok(())
    }

    fn has_attribute(&self, name: &str) -> bool {
        name == "text"
    }
}

/// Label docked along the top of its parent.
#[derive(Debug)]
pub struct Title {
    label: Label,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { label: Label::new(text, 12.0).align(HAlign::Center, VAlign::Middle) }
    }

    /// Full width of the parent, [`TITLE_HEIGHT`] high.
    pub fn position() -> Position {
        Position::from_fields([Field::Pixels(0.0), Field::Pixels(0.0), Field::Fraction(1.0), Field::Pixels(TITLE_HEIGHT)])
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn set_text(&mut self, source: impl Into<String>) {
        self.label.set_text(source);
    }
}

impl Behavior for Title {
    fn type_name(&self) -> &'static str {
        "Title"
    }

    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        self.label.on_draw(node, ctx)
    }

    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        self.label.on_draw_shape(node, ctx)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.label.has_attribute(name)
    }
}
