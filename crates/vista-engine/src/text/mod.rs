//! Font loading and glyph metrics.
//!
//! The scene graph lays out text with [`FontSystem::glyph_metrics`]; the
//! glyph renderer rasterizes from the same fonts.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem, GlyphMetrics};
