use std::time::Duration;

use vista_engine::paint::Color;

/// Settings of one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub size: (f32, f32),
    pub background: Color,
    /// A `draw()` inside this window of an already scheduled redraw is
    /// dropped.
    pub redraw_coalesce: Duration,
    /// Step interval of the fly camera while a button is held.
    pub fly_tick: Duration,
    /// Base minimum tick spacing in pixels for new axes.
    pub min_tick_pixels: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            title: "vista".to_string(),
            size: (560.0, 420.0),
            background: Color::rgb(0.8, 0.8, 0.8),
            redraw_coalesce: Duration::from_millis(10),
            fly_tick: Duration::from_millis(50),
            min_tick_pixels: 40.0,
        }
    }
}

impl FigureConfig {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = (w, h);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }
}
