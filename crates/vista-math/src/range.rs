/// Half-open numeric interval `[min, max)`.
///
/// Used for axis limits, contrast limits (clim) and data extents. `range()`
/// may be zero (degenerate limits) or negative (reversed limits); callers
/// that need a positive width call [`Range::normalized`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    #[inline]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Signed width `max - min`.
    #[inline]
    pub fn range(self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn center(self) -> f64 {
        0.5 * (self.min + self.max)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns a copy with `min <= max`.
    #[inline]
    pub fn normalized(self) -> Self {
        if self.min <= self.max { self } else { Self::new(self.max, self.min) }
    }

    /// Half-open containment on the normalized interval.
    #[inline]
    pub fn contains(self, v: f64) -> bool {
        let r = self.normalized();
        v >= r.min && v < r.max
    }

    /// Grows the range to include `v`.
    #[inline]
    pub fn include(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    /// Smallest range containing both.
    #[inline]
    pub fn union(self, other: Range) -> Range {
        Range::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Widens both ends by `fraction * range()`.
    ///
    /// A zero-width range is widened by `fraction` absolute units on each side
    /// so the result is always usable as camera limits.
    pub fn with_margin(self, fraction: f64) -> Range {
        let r = self.normalized();
        let w = r.range();
        let pad = if w > 0.0 { w * fraction } else { fraction.max(0.5) };
        Range::new(r.min - pad, r.max + pad)
    }

    /// An inverted (empty) accumulator range; `include` makes it valid.
    #[inline]
    pub const fn empty() -> Self {
        Self { min: f64::INFINITY, max: f64::NEG_INFINITY }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !(self.min <= self.max)
    }
}
