use std::fmt;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct FontId(pub(crate) usize);

/// Horizontal metrics of one glyph at a given pixel size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphMetrics {
    /// Pen advance in logical pixels.
    pub advance: f32,
    /// Height of the glyph cell (ascent + descent) in logical pixels.
    pub height: f32,
}

/// Share of the size used as advance when no font is loaded.
const FALLBACK_ADVANCE: f32 = 0.6;
/// Line height as a multiple of the pixel size when no font is loaded.
const FALLBACK_LINE: f32 = 1.2;

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. Without any loaded font, metrics fall
/// back to a fixed-pitch estimate so layout stays deterministic; glyphs are
/// then not rasterized.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    ///
    /// Returns the `FontId` that identifies the font in draw commands.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {:?} as {id:?}", font_name(self.fonts.last()));
        Ok(id)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Returns the underlying `fontdue::Font`, if `id` is valid.
    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Metrics of `ch` at `size` logical pixels.
    ///
    /// Characters missing from the font use the font's replacement glyph.
    pub fn glyph_metrics(&self, id: FontId, ch: char, size: f32) -> GlyphMetrics {
        let Some(font) = self.get(id) else {
            return GlyphMetrics { advance: size * FALLBACK_ADVANCE, height: size * FALLBACK_LINE };
        };
        let m = font.metrics(ch, size);
        GlyphMetrics { advance: m.advance_width, height: self.line_height(id, size) }
    }

    /// Distance from the top of a glyph cell to the baseline.
    pub fn ascent(&self, id: FontId, size: f32) -> f32 {
        self.get(id)
            .and_then(|f| f.horizontal_line_metrics(size))
            .map_or(size, |lm| lm.ascent)
    }

    pub fn line_height(&self, id: FontId, size: f32) -> f32 {
        self.get(id)
            .and_then(|f| f.horizontal_line_metrics(size))
            .map_or(size * FALLBACK_LINE, |lm| lm.ascent - lm.descent)
    }

    /// Width of `text` laid out on one line without escapes.
    pub fn measure(&self, id: FontId, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.glyph_metrics(id, c, size).advance).sum()
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn font_name(font: Option<&fontdue::Font>) -> &str {
    font.and_then(|f| f.name()).unwrap_or("<unnamed>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_metrics_are_fixed_pitch() {
        let fs = FontSystem::new();
        let m = fs.glyph_metrics(FontId::default(), 'W', 10.0);
        assert_eq!(m.advance, 6.0);
        assert_eq!(fs.measure(FontId::default(), "abc", 10.0), 18.0);
        assert_eq!(fs.line_height(FontId::default(), 10.0), 12.0);
    }

    #[test]
    fn invalid_bytes_fail_to_load() {
        let mut fs = FontSystem::new();
        assert!(fs.load_font(b"not a font").is_err());
        assert!(fs.is_empty());
    }
}
