use crate::error::MathError;
use crate::point::Point;
use crate::range::Range;

/// A contiguous list of 2-D or 3-D points stored as `f32`.
///
/// The backing buffer grows in powers of two (starting from one slot) and
/// halves when fewer than a quarter of its slots are used, so `append` is
/// amortised O(1) and the capacity (in points) of a non-empty set stays
/// within `[len, 4 * len]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointset {
    ndim: usize,
    len: usize,
    data: Vec<f32>,
}

impl Pointset {
    /// Creates an empty set of `ndim`-dimensional points (`ndim` is 2 or 3).
    pub fn new(ndim: usize) -> Result<Self, MathError> {
        if !(1..=3).contains(&ndim) {
            return Err(MathError::invalid(format!("pointset ndim must be 1..=3, got {ndim}")));
        }
        Ok(Self { ndim, len: 0, data: Vec::new() })
    }

    /// Builds a set from a flat row-major `f32` buffer of `ndim`-tuples.
    pub fn from_flat(ndim: usize, flat: &[f32]) -> Result<Self, MathError> {
        let mut ps = Self::new(ndim)?;
        if flat.len() % ndim != 0 {
            return Err(MathError::invalid(format!(
                "flat buffer of {} values is not a multiple of ndim {ndim}",
                flat.len()
            )));
        }
        let n = flat.len() / ndim;
        ps.reserve(n);
        ps.data[..flat.len()].copy_from_slice(flat);
        ps.len = n;
        Ok(ps)
    }

    pub fn from_points(ndim: usize, points: &[Point]) -> Result<Self, MathError> {
        let mut ps = Self::new(ndim)?;
        ps.extend(points.iter().copied());
        Ok(ps)
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots, counted in points.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len() / self.ndim
    }

    /// The used part of the buffer, `len * ndim` floats.
    #[inline]
    pub fn as_flat(&self) -> &[f32] {
        &self.data[..self.len * self.ndim]
    }

    pub fn append(&mut self, p: Point) {
        self.reserve(self.len + 1);
        let off = self.len * self.ndim;
        self.write(off, p);
        self.len += 1;
    }

    pub fn extend<I: IntoIterator<Item = Point>>(&mut self, points: I) {
        for p in points {
            self.append(p);
        }
    }

    /// Inserts before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, p: Point) -> Result<(), MathError> {
        if index > self.len {
            return Err(MathError::out_of_range(format!("insert index {index} > len {}", self.len)));
        }
        self.reserve(self.len + 1);
        let nd = self.ndim;
        let start = index * nd;
        let end = self.len * nd;
        self.data.copy_within(start..end, start + nd);
        self.write(start, p);
        self.len += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Point> {
        if self.len == 0 {
            return None;
        }
        let p = self.read(self.len - 1);
        self.len -= 1;
        self.maybe_shrink();
        Some(p)
    }

    pub fn remove(&mut self, index: usize) -> Result<Point, MathError> {
        if index >= self.len {
            return Err(MathError::out_of_range(format!("remove index {index} >= len {}", self.len)));
        }
        let p = self.read(index);
        let nd = self.ndim;
        self.data.copy_within((index + 1) * nd..self.len * nd, index * nd);
        self.len -= 1;
        self.maybe_shrink();
        Ok(p)
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.maybe_shrink();
    }

    pub fn get(&self, index: usize) -> Result<Point, MathError> {
        if index >= self.len {
            return Err(MathError::out_of_range(format!("index {index} >= len {}", self.len)));
        }
        Ok(self.read(index))
    }

    pub fn set(&mut self, index: usize, p: Point) -> Result<(), MathError> {
        if index >= self.len {
            return Err(MathError::out_of_range(format!("index {index} >= len {}", self.len)));
        }
        let off = index * self.ndim;
        self.write(off, p);
        Ok(())
    }

    /// Exact membership test after `f32` rounding.
    pub fn contains(&self, p: Point) -> bool {
        let nd = self.ndim;
        let want = [p.x as f32, p.y as f32, p.z as f32];
        self.as_flat().chunks_exact(nd).any(|c| c == &want[..nd])
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len).map(move |i| self.read(i))
    }

    /// Finite extent along one dimension; `None` when no finite value exists.
    pub fn bounding_range(&self, dim: usize) -> Option<Range> {
        if dim >= self.ndim {
            return None;
        }
        let mut r = Range::empty();
        for c in self.as_flat().chunks_exact(self.ndim) {
            r.include(c[dim] as f64);
        }
        (!r.is_empty()).then_some(r)
    }

    /// Returns a 3-D copy; 2-D sets get `z` filled in.
    pub fn to_3d(&self, z: f32) -> Pointset {
        if self.ndim == 3 {
            return self.clone();
        }
        let mut flat = Vec::with_capacity(self.len * 3);
        for c in self.as_flat().chunks_exact(self.ndim) {
            flat.push(c[0]);
            flat.push(if self.ndim > 1 { c[1] } else { 0.0 });
            flat.push(z);
        }
        let mut out = Pointset { ndim: 3, len: 0, data: Vec::new() };
        out.reserve(self.len);
        out.data[..flat.len()].copy_from_slice(&flat);
        out.len = self.len;
        out
    }

    fn read(&self, index: usize) -> Point {
        let c = &self.data[index * self.ndim..(index + 1) * self.ndim];
        match self.ndim {
            1 => Point::from_slice(&[c[0] as f64]),
            2 => Point::new2(c[0] as f64, c[1] as f64),
            _ => Point::new(c[0] as f64, c[1] as f64, c[2] as f64),
        }
    }

    fn write(&mut self, off: usize, p: Point) {
        for d in 0..self.ndim {
            self.data[off + d] = p.get(d) as f32;
        }
    }

    fn reserve(&mut self, points: usize) {
        let mut cap = self.capacity();
        if points <= cap {
            return;
        }
        while cap < points {
            cap = (cap * 2).max(1);
        }
        self.data.resize(cap * self.ndim, 0.0);
    }

    fn maybe_shrink(&mut self) {
        let mut cap = self.capacity();
        while cap > 1 && self.len < cap / 4 {
            cap /= 2;
        }
        if cap != self.capacity() {
            self.data.truncate(cap * self.ndim);
            self.data.shrink_to_fit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2(x: f64, y: f64) -> Point {
        Point::new2(x, y)
    }

    // ── growth ────────────────────────────────────────────────────────────

    #[test]
    fn capacity_stays_within_four_times_len() {
        let mut ps = Pointset::new(3).unwrap();
        for i in 0..1000 {
            ps.append(Point::new(i as f64, 0.0, 0.0));
            let n = ps.len();
            assert!(ps.capacity() >= n);
            assert!(ps.capacity() <= 4 * n, "cap {} len {}", ps.capacity(), n);
        }
        assert!(ps.capacity().is_power_of_two());
    }

    #[test]
    fn small_sets_hold_the_capacity_bound() {
        for n in 1..=64 {
            let mut ps = Pointset::new(2).unwrap();
            for i in 0..n {
                ps.append(p2(i as f64, 0.0));
            }
            let cap = ps.capacity();
            assert!(n <= cap && cap <= 4 * n, "n {n} cap {cap}");
        }
    }

    #[test]
    fn pops_keep_the_capacity_bound() {
        let mut ps = Pointset::new(2).unwrap();
        for i in 0..64 {
            ps.append(p2(i as f64, 0.0));
        }
        while ps.len() > 1 {
            ps.pop();
            let (n, cap) = (ps.len(), ps.capacity());
            assert!(n <= cap && cap <= 4 * n, "n {n} cap {cap}");
        }
    }

    #[test]
    fn shrink_halves_after_pops() {
        let mut ps = Pointset::new(2).unwrap();
        for i in 0..256 {
            ps.append(p2(i as f64, 0.0));
        }
        let big = ps.capacity();
        for _ in 0..250 {
            ps.pop();
        }
        assert!(ps.capacity() < big);
        assert!(ps.capacity() >= ps.len());
    }

    // ── editing ───────────────────────────────────────────────────────────

    #[test]
    fn insert_and_remove_keep_order() {
        let mut ps = Pointset::from_points(2, &[p2(0.0, 0.0), p2(2.0, 0.0)]).unwrap();
        ps.insert(1, p2(1.0, 1.0)).unwrap();
        assert_eq!(ps.get(1).unwrap(), p2(1.0, 1.0));
        assert_eq!(ps.remove(0).unwrap(), p2(0.0, 0.0));
        assert_eq!(ps.as_flat(), &[1.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let ps = Pointset::new(2).unwrap();
        assert!(matches!(ps.get(0), Err(MathError::OutOfRange(_))));
    }

    #[test]
    fn contains_and_bounds() {
        let ps = Pointset::from_points(2, &[p2(0.0, 0.0), p2(1.0, 1.0), p2(2.0, 0.0)]).unwrap();
        assert!(ps.contains(p2(1.0, 1.0)));
        assert!(!ps.contains(p2(1.0, 0.0)));
        assert_eq!(ps.bounding_range(0), Some(Range::new(0.0, 2.0)));
        assert_eq!(ps.bounding_range(2), None);
    }

    #[test]
    fn to_3d_fills_z() {
        let ps = Pointset::from_points(2, &[p2(1.0, 2.0)]).unwrap().to_3d(0.1);
        assert_eq!(ps.ndim(), 3);
        assert_eq!(ps.as_flat(), &[1.0, 2.0, 0.1]);
    }

    #[test]
    fn bad_flat_length_is_rejected() {
        assert!(Pointset::from_flat(3, &[1.0, 2.0]).is_err());
        assert!(Pointset::new(4).is_err());
    }
}
