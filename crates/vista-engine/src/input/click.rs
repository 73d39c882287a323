use std::time::{Duration, Instant};

use super::MouseButton;

/// Detects double clicks from a stream of button presses.
///
/// Two presses of the same button count as a double click when they are
/// closer than `interval` in time and `slop` logical pixels in space. A
/// detected double click resets the tracker, so a triple click reports one.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    pub interval: Duration,
    pub slop: f32,
    last: Option<(MouseButton, Instant, f32, f32)>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self { interval: Duration::from_millis(300), slop: 4.0, last: None }
    }
}

impl ClickTracker {
    /// Registers a press; returns true when it completes a double click.
    pub fn press(&mut self, button: MouseButton, at: Instant, x: f32, y: f32) -> bool {
        let is_double = match self.last {
            Some((b, t, lx, ly)) => {
                b == button
                    && at.saturating_duration_since(t) <= self.interval
                    && (x - lx).abs() <= self.slop
                    && (y - ly).abs() <= self.slop
            }
            None => false,
        };
        self.last = if is_double { None } else { Some((button, at, x, y)) };
        is_double
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_second_press_is_double() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        assert!(!c.press(MouseButton::Left, t0, 10.0, 10.0));
        assert!(c.press(MouseButton::Left, t0 + Duration::from_millis(120), 11.0, 10.0));
    }

    #[test]
    fn slow_or_far_press_is_single() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        c.press(MouseButton::Left, t0, 0.0, 0.0);
        assert!(!c.press(MouseButton::Left, t0 + Duration::from_millis(500), 0.0, 0.0));
        assert!(!c.press(MouseButton::Left, t0 + Duration::from_millis(600), 20.0, 0.0));
    }

    #[test]
    fn triple_click_reports_once() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        c.press(MouseButton::Left, t0, 0.0, 0.0);
        assert!(c.press(MouseButton::Left, t0 + Duration::from_millis(100), 0.0, 0.0));
        assert!(!c.press(MouseButton::Left, t0 + Duration::from_millis(200), 0.0, 0.0));
    }

    #[test]
    fn different_button_is_single() {
        let mut c = ClickTracker::default();
        let t0 = Instant::now();
        c.press(MouseButton::Left, t0, 0.0, 0.0);
        assert!(!c.press(MouseButton::Right, t0, 0.0, 0.0));
    }
}
