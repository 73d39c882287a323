use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, DrawState};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LineTopology {
    /// Consecutive vertices are joined.
    Strip,
    /// Vertices are consumed in pairs.
    List,
}

/// Line draw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LinesCmd {
    pub positions: Vec<[f32; 3]>,
    pub color: Color,
    /// Stroke width in logical pixels.
    pub width: f32,
    /// 16-bit stipple mask, one bit per pixel along the stroke (LSB first).
    /// `None` draws a solid stroke.
    pub stipple: Option<u16>,
    pub topology: LineTopology,
}

impl LinesCmd {
    /// Segment endpoints as index pairs.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.positions.len();
        let (step, count) = match self.topology {
            LineTopology::Strip => (1, n.saturating_sub(1)),
            LineTopology::List => (2, n / 2),
        };
        (0..count).map(move |i| (i * step, i * step + 1))
    }
}

/// Whether bit `distance` of a repeating 16-pixel stipple pattern is set.
///
/// `distance` is measured in logical pixels from the start of the stroke.
#[inline]
pub fn stipple_bit(mask: u16, distance: f32) -> bool {
    let bit = (distance.max(0.0) as u32) % 16;
    mask & (1 << bit) != 0
}

impl DrawList {
    /// Records a polyline or a set of independent segments.
    pub fn push_lines(
        &mut self,
        state: DrawState,
        positions: Vec<[f32; 3]>,
        color: Color,
        width: f32,
        stipple: Option<u16>,
        topology: LineTopology,
    ) {
        if positions.len() < 2 || width <= 0.0 {
            return;
        }
        self.push(state, DrawCmd::Lines(LinesCmd { positions, color, width, stipple, topology }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(n: usize, topology: LineTopology) -> LinesCmd {
        LinesCmd {
            positions: (0..n).map(|i| [i as f32, 0.0, 0.0]).collect(),
            color: Color::BLACK,
            width: 1.0,
            stipple: None,
            topology,
        }
    }

    // ── segments ──────────────────────────────────────────────────────────

    #[test]
    fn strip_joins_consecutive() {
        let s: Vec<_> = cmd(4, LineTopology::Strip).segments().collect();
        assert_eq!(s, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn list_drops_odd_tail() {
        let s: Vec<_> = cmd(5, LineTopology::List).segments().collect();
        assert_eq!(s, vec![(0, 1), (2, 3)]);
    }

    // ── stipple ───────────────────────────────────────────────────────────

    #[test]
    fn stipple_repeats_every_16_pixels() {
        let mask = 0b0000_0000_1111_1111;
        assert!(stipple_bit(mask, 3.5));
        assert!(!stipple_bit(mask, 9.0));
        assert!(stipple_bit(mask, 16.0 + 2.0));
    }
}
