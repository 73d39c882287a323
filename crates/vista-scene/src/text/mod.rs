//! Text: markup compilation, glyph layout and the world-anchored text
//! object.

pub mod compile;

use glam::DVec3;
use vista_engine::coords::Rect;
use vista_engine::paint::Color;
use vista_engine::scene::{DrawState, GlyphQuad, GlyphsCmd};
use vista_engine::text::{FontId, FontSystem};

use crate::draw::DrawContext;
use crate::error::Result;
use crate::node::{Behavior, NodeCx};

pub use compile::{compile, escape, Script, Style, StyledChar};

/// Size of sub- and superscripts relative to the base size.
pub const SCRIPT_SCALE: f32 = 0.7;
/// Baseline shift of a superscript, in base sizes (up is negative).
pub const SUPER_SHIFT: f32 = -0.4;
pub const SUB_SHIFT: f32 = 0.25;
/// Horizontal shear of italic glyphs per pixel of cell height.
pub const ITALIC_SKEW: f32 = 0.25;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Glyphs of one line of text, positioned relative to the top-left of its
/// bounding box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub glyphs: Vec<GlyphQuad>,
    pub width: f32,
    pub height: f32,
}

impl TextLayout {
    /// Glyphs translated by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Vec<GlyphQuad> {
        self.glyphs.iter().map(|g| GlyphQuad { x: g.x + dx, y: g.y + dy, ..*g }).collect()
    }
}

/// Lays out compiled text at `size` pixels.
pub fn layout(chars: &[StyledChar], fonts: &FontSystem, font: FontId, size: f32) -> TextLayout {
    let base = fonts.ascent(font, size);
    let mut glyphs = Vec::with_capacity(chars.len());
    let mut pen = 0.0f32;
    let (mut top, mut bottom) = (0.0f32, fonts.line_height(font, size));
    for sc in chars {
        let (s, shift) = match sc.style.script {
            Script::Normal => (size, 0.0),
            Script::Super => (size * SCRIPT_SCALE, SUPER_SHIFT * size),
            Script::Sub => (size * SCRIPT_SCALE, SUB_SHIFT * size),
        };
        let y = base + shift - fonts.ascent(font, s);
        top = top.min(y);
        bottom = bottom.max(y + fonts.line_height(font, s));
        glyphs.push(GlyphQuad {
            ch: sc.ch,
            size: s,
            x: pen,
            y,
            skew: if sc.style.italic { ITALIC_SKEW } else { 0.0 },
            bold: sc.style.bold,
        });
        pen += fonts.glyph_metrics(font, sc.ch, s).advance;
    }
    // Superscripts may rise above the line; keep the box origin at the top.
    for g in &mut glyphs {
        g.y -= top;
    }
    TextLayout { glyphs, width: pen, height: bottom - top }
}

/// A piece of styled text with its alignment.
///
/// The compiled form and the layout are cached; setters invalidate them.
#[derive(Debug, Clone)]
pub struct Text {
    source: String,
    compiled: Vec<StyledChar>,
    size: f32,
    pub color: Color,
    pub halign: HAlign,
    pub valign: VAlign,
    cache: Option<(FontId, TextLayout)>,
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.size == other.size
            && self.color == other.color
            && self.halign == other.halign
            && self.valign == other.valign
    }
}

impl Text {
    pub fn new(source: impl Into<String>, size: f32) -> Self {
        let source = source.into();
        Self {
            compiled: compile(&source),
            source,
            size,
            color: Color::BLACK,
            halign: HAlign::Left,
            valign: VAlign::Top,
            cache: None,
        }
    }

    pub fn with_align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Characters after markup compilation.
    pub fn plain(&self) -> String {
        self.compiled.iter().map(|c| c.ch).collect()
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        if source != self.source {
            self.compiled = compile(&source);
            self.source = source;
            self.cache = None;
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        if size != self.size {
            self.size = size;
            self.cache = None;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn layout(&mut self, fonts: &FontSystem, font: FontId) -> &TextLayout {
        if self.cache.as_ref().is_some_and(|(f, _)| *f != font) {
            self.cache = None;
        }
        let (compiled, size) = (&self.compiled, self.size);
        &self.cache.get_or_insert_with(|| (font, layout(compiled, fonts, font, size))).1
    }

    /// Box of the text when anchored at `(x, y)` under its alignment.
    pub fn rect_at(&mut self, fonts: &FontSystem, font: FontId, x: f32, y: f32) -> Rect {
        let (halign, valign) = (self.halign, self.valign);
        let l = self.layout(fonts, font);
        let left = match halign {
            HAlign::Left => x,
            HAlign::Center => x - l.width / 2.0,
            HAlign::Right => x - l.width,
        };
        let top = match valign {
            VAlign::Top => y,
            VAlign::Middle => y - l.height / 2.0,
            VAlign::Bottom => y - l.height,
        };
        Rect::new(left.round(), top.round(), l.width, l.height)
    }

    /// Records the glyphs anchored at `(x, y)` in `state`'s pixel space.
    /// Returns the occupied box.
    pub fn push(&mut self, ctx: &mut DrawContext<'_>, state: DrawState, x: f32, y: f32, z: f32) -> Rect {
        let (fonts, font) = (ctx.fonts(), ctx.font());
        let r = self.rect_at(fonts, font, x, y);
        if self.is_empty() {
            return r;
        }
        if ctx.is_shape() {
            let (a, b) = ([r.x, r.y, z], [r.right(), r.bottom(), z]);
            let color = ctx.shape_color();
            ctx.list.push_quad(state, [a, [b[0], a[1], z], b, [a[0], b[1], z]], color);
            return r;
        }
        let glyphs = self.layout(fonts, font).translated(r.x, r.y);
        ctx.list.push_glyphs(state, GlyphsCmd { font, color: self.color, z, glyphs });
        r
    }
}

/// Text anchored at a point of an axes' data space.
///
/// Drawn in the screen phase so it keeps its pixel size under any camera.
#[derive(Debug, Clone)]
pub struct TextObject {
    pub text: Text,
    pub anchor: DVec3,
    last_rect: Option<Rect>,
}

impl TextObject {
    pub fn new(text: Text, anchor: DVec3) -> Self {
        Self { text, anchor, last_rect: None }
    }

    /// Pixel box of the last draw, relative to the axes viewport.
    pub fn last_rect(&self) -> Option<Rect> {
        self.last_rect
    }
}

impl Behavior for TextObject {
    fn type_name(&self) -> &'static str {
        "Text"
    }

    fn on_draw_screen(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        self.last_rect = None;
        let Some(p) = ctx.project(self.anchor) else { return Ok(()) };
        let z = ctx.depth_to_z(p.z);
        let state = ctx.pixel_state();
        self.last_rect = Some(self.text.push(ctx, state, p.x as f32, p.y as f32, z));
        Ok(())
    }

    fn on_draw_shape(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        let Some(p) = ctx.project(self.anchor) else { return Ok(()) };
        let z = ctx.depth_to_z(p.z);
        let state = ctx.pixel_state();
        self.text.push(ctx, state, p.x as f32, p.y as f32, z);
        Ok(())
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "text" | "anchor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> FontSystem {
        FontSystem::new()
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn plain_layout_is_fixed_pitch_without_fonts() {
        let l = layout(&compile("abc"), &fonts(), FontId::default(), 10.0);
        assert_eq!(l.width, 18.0);
        assert_eq!(l.height, 12.0);
        assert_eq!(l.glyphs[1].x, 6.0);
        assert_eq!(l.glyphs[0].y, 0.0);
    }

    #[test]
    fn superscript_rises_and_shrinks() {
        let l = layout(&compile("x^2"), &fonts(), FontId::default(), 10.0);
        let (x, two) = (l.glyphs[0], l.glyphs[1]);
        assert_eq!(two.size, 7.0);
        // Base cell top 0, script cell top 10 - 4 - 7 = -1, then lifted.
        assert!((x.y - 1.0).abs() < 1e-5);
        assert!(two.y.abs() < 1e-5);
        assert!((l.height - 13.0).abs() < 1e-5);
    }

    #[test]
    fn subscript_drops_below() {
        let l = layout(&compile("x_i"), &fonts(), FontId::default(), 10.0);
        assert!(l.glyphs[1].y > l.glyphs[0].y);
        assert!(l.height >= 12.0);
    }

    #[test]
    fn italic_glyphs_are_sheared() {
        let l = layout(&compile(r"\ia b"), &fonts(), FontId::default(), 10.0);
        assert_eq!(l.glyphs[0].skew, ITALIC_SKEW);
        assert_eq!(l.glyphs[2].skew, 0.0);
    }

    // ── alignment ─────────────────────────────────────────────────────────

    #[test]
    fn alignment_moves_the_box() {
        let fs = fonts();
        let mut t = Text::new("abcd", 10.0).with_align(HAlign::Center, VAlign::Middle);
        let r = t.rect_at(&fs, FontId::default(), 100.0, 50.0);
        assert_eq!((r.x, r.y, r.w, r.h), (88.0, 44.0, 24.0, 12.0));
        t.halign = HAlign::Right;
        t.valign = VAlign::Bottom;
        let r = t.rect_at(&fs, FontId::default(), 100.0, 50.0);
        assert_eq!((r.x, r.y), (76.0, 38.0));
    }

    #[test]
    fn setters_invalidate_the_layout() {
        let fs = fonts();
        let mut t = Text::new("ab", 10.0);
        assert_eq!(t.layout(&fs, FontId::default()).width, 12.0);
        t.set_source("abc");
        assert_eq!(t.layout(&fs, FontId::default()).width, 18.0);
        t.set_size(20.0);
        assert_eq!(t.layout(&fs, FontId::default()).width, 36.0);
        assert_eq!(t.plain(), "abc");
    }
}
