use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, DrawState};
use crate::text::FontId;

/// One positioned glyph of compiled text.
///
/// `x, y` is the top-left of the glyph cell in logical pixels, relative to
/// the draw state's viewport. `skew` shears the glyph horizontally by
/// `skew * (cell bottom - y)` pixels (italic); `bold` draws it twice with a
/// one pixel offset.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub ch: char,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub skew: f32,
    pub bold: bool,
}

/// A run of glyphs sharing font and color. `z` orders the run against
/// other pixel-space geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphsCmd {
    pub font: FontId,
    pub color: Color,
    pub z: f32,
    pub glyphs: Vec<GlyphQuad>,
}

impl DrawList {
    pub fn push_glyphs(&mut self, state: DrawState, run: GlyphsCmd) {
        if run.glyphs.is_empty() {
            return;
        }
        self.push(state, DrawCmd::Glyphs(run));
    }
}
