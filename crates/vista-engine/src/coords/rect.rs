use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Overlap of two rects, `None` when they do not overlap.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 > x0 && y1 > y0 { Some(Rect::new(x0, y0, x1 - x0, y1 - y0)) } else { None }
    }

    /// Physical-pixel rect `(x, y, w, h)` clamped to a `surface` of the given size.
    ///
    /// Returns `None` for a zero-area result.
    pub fn to_physical(self, scale: f32, surface: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
        let (sw, sh) = surface;
        let x0 = ((self.x * scale).max(0.0) as u32).min(sw);
        let y0 = ((self.y * scale).max(0.0) as u32).min(sh);
        let x1 = ((self.right() * scale).max(0.0).round() as u32).min(sw);
        let y1 = ((self.bottom() * scale).max(0.0).round() as u32).min(sh);
        let (w, h) = (x1.saturating_sub(x0), y1.saturating_sub(y0));
        if w == 0 || h == 0 { None } else { Some((x0, y0, w, h)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let i = r(0.0, 0.0, 10.0, 10.0).intersect(r(5.0, 5.0, 10.0, 10.0));
        assert_eq!(i, Some(r(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn intersect_touching_edges_is_none() {
        assert_eq!(r(0.0, 0.0, 10.0, 10.0).intersect(r(10.0, 0.0, 5.0, 5.0)), None);
    }

    // ── to_physical ───────────────────────────────────────────────────────

    #[test]
    fn physical_is_scaled_and_clamped() {
        let p = r(10.0, 10.0, 100.0, 100.0).to_physical(2.0, (150, 400));
        assert_eq!(p, Some((20, 20, 130, 200)));
    }

    #[test]
    fn physical_offscreen_is_none() {
        assert_eq!(r(-50.0, 0.0, 20.0, 20.0).to_physical(1.0, (100, 100)), None);
    }
}
