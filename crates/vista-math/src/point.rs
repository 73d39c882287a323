use core::ops::{Add, Mul, Neg, Sub};

/// A 2-D or 3-D point (or vector) in double precision.
///
/// `ndim` records whether the point was built as 2-D; 2-D points still carry
/// `z = 0` so arithmetic between 2-D and 3-D points is well defined.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    ndim: u8,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, ndim: 3 }
    }

    #[inline]
    pub const fn new2(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0, ndim: 2 }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Builds a point from 1 to 3 coordinates; missing coordinates are zero.
    pub fn from_slice(v: &[f64]) -> Self {
        match v.len() {
            0 => Self::zero(),
            1 => Self { x: v[0], y: 0.0, z: 0.0, ndim: 1 },
            2 => Self::new2(v[0], v[1]),
            _ => Self::new(v[0], v[1], v[2]),
        }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim.max(1) as usize
    }

    /// Coordinate by dimension index (0 = x).
    #[inline]
    pub fn get(&self, dim: usize) -> f64 {
        match dim {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    pub fn set(&mut self, dim: usize, v: f64) {
        match dim {
            0 => self.x = v,
            1 => self.y = v,
            _ => self.z = v,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Promotes to 3-D, keeping `z`.
    #[inline]
    pub fn to_3d(self) -> Self {
        Self::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// `a - b`, spelled out so the operand order is never ambiguous.
    #[inline]
    pub fn sub(a: Point, b: Point) -> Point {
        Point { x: a.x - b.x, y: a.y - b.y, z: a.z - b.z, ndim: a.ndim.max(b.ndim) }
    }

    #[inline]
    pub fn add(a: Point, b: Point) -> Point {
        Point { x: a.x + b.x, y: a.y + b.y, z: a.z + b.z, ndim: a.ndim.max(b.ndim) }
    }

    #[inline]
    pub fn scale(self, s: f64) -> Point {
        Point { x: self.x * s, y: self.y * s, z: self.z * s, ndim: self.ndim }
    }

    /// Component-wise product.
    #[inline]
    pub fn mul_elem(self, o: Point) -> Point {
        Point { x: self.x * o.x, y: self.y * o.y, z: self.z * o.z, ndim: self.ndim.max(o.ndim) }
    }

    /// Component-wise quotient. Division by zero yields infinities, as for `f64`.
    #[inline]
    pub fn div_elem(self, o: Point) -> Point {
        Point { x: self.x / o.x, y: self.y / o.y, z: self.z / o.z, ndim: self.ndim.max(o.ndim) }
    }

    #[inline]
    pub fn dot(self, o: Point) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    #[inline]
    pub fn cross(self, o: Point) -> Point {
        Point::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector; the zero vector stays zero.
    pub fn normalize(self) -> Point {
        let n = self.norm();
        if n > 0.0 { self.scale(1.0 / n) } else { self }
    }

    #[inline]
    pub fn distance(self, o: Point) -> f64 {
        Point::sub(self, o).norm()
    }

    /// Unsigned angle between two vectors in radians.
    pub fn angle(self, o: Point) -> f64 {
        let d = self.norm() * o.norm();
        if d == 0.0 {
            return 0.0;
        }
        (self.dot(o) / d).clamp(-1.0, 1.0).acos()
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::add(self, rhs)
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::sub(self, rhs)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f64) -> Point {
        self.scale(rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        self.scale(-1.0)
    }
}
