use crate::point::Point;

/// Rotation quaternion `w + xi + yj + zk`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle_deg` degrees about `axis` (need not be unit length).
    pub fn from_axis_angle(axis: Point, angle_deg: f64) -> Self {
        let a = axis.normalize();
        if a.norm() == 0.0 {
            return Self::IDENTITY;
        }
        let half = angle_deg.to_radians() * 0.5;
        let s = half.sin();
        Self::new(half.cos(), a.x * s, a.y * s, a.z * s)
    }

    /// `(axis, angle_deg)`; the identity reports the z axis and 0 degrees.
    pub fn to_axis_angle(self) -> (Point, f64) {
        let q = self.normalize();
        let s = (1.0 - q.w * q.w).max(0.0).sqrt();
        let angle = 2.0 * q.w.clamp(-1.0, 1.0).acos();
        if s < 1e-12 {
            return (Point::new(0.0, 0.0, 1.0), 0.0);
        }
        (Point::new(q.x / s, q.y / s, q.z / s), angle.to_degrees())
    }

    /// Intrinsic rotation about x, then y, then z (degrees).
    pub fn from_euler(rx_deg: f64, ry_deg: f64, rz_deg: f64) -> Self {
        let qx = Self::from_axis_angle(Point::new(1.0, 0.0, 0.0), rx_deg);
        let qy = Self::from_axis_angle(Point::new(0.0, 1.0, 0.0), ry_deg);
        let qz = Self::from_axis_angle(Point::new(0.0, 0.0, 1.0), rz_deg);
        qz.mul(qy).mul(qx)
    }

    /// Inverse of [`Quaternion::from_euler`], in degrees.
    pub fn to_euler(self) -> (f64, f64, f64) {
        let q = self.normalize();
        let sinr = 2.0 * (q.w * q.x + q.y * q.z);
        let cosr = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
        let rx = sinr.atan2(cosr);
        let sinp = (2.0 * (q.w * q.y - q.z * q.x)).clamp(-1.0, 1.0);
        let ry = sinp.asin();
        let siny = 2.0 * (q.w * q.z + q.x * q.y);
        let cosy = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
        let rz = siny.atan2(cosy);
        (rx.to_degrees(), ry.to_degrees(), rz.to_degrees())
    }

    /// Hamilton product `self * o` (apply `o` first).
    pub fn mul(self, o: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        )
    }

    #[inline]
    pub fn conjugate(self) -> Quaternion {
        Quaternion::new(self.w, -self.x, -self.y, -self.z)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(self) -> Quaternion {
        let n = self.norm();
        if n == 0.0 {
            return Self::IDENTITY;
        }
        Quaternion::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    pub fn inverse(self) -> Quaternion {
        let n2 = self.norm().powi(2);
        if n2 == 0.0 {
            return Self::IDENTITY;
        }
        let c = self.conjugate();
        Quaternion::new(c.w / n2, c.x / n2, c.y / n2, c.z / n2)
    }

    pub fn rotate_point(self, p: Point) -> Point {
        let v = Quaternion::new(0.0, p.x, p.y, p.z);
        let r = self.mul(v).mul(self.inverse());
        Point::new(r.x, r.y, r.z)
    }

    /// Column-major 4x4 rotation matrix.
    pub fn to_matrix(self) -> [f64; 16] {
        let q = self.normalize();
        let (w, x, y, z) = (q.w, q.x, q.y, q.z);
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y + w * z),
            2.0 * (x * z - w * y),
            0.0,
            2.0 * (x * y - w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z + w * x),
            0.0,
            2.0 * (x * z + w * y),
            2.0 * (y * z - w * x),
            1.0 - 2.0 * (x * x + y * y),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quarter_turn_about_z() {
        let q = Quaternion::from_axis_angle(Point::new(0.0, 0.0, 1.0), 90.0);
        let p = q.rotate_point(Point::new(1.0, 0.0, 0.0));
        assert!(close(p.x, 0.0) && close(p.y, 1.0) && close(p.z, 0.0));
    }

    #[test]
    fn axis_angle_round_trip() {
        let (axis, angle) = Quaternion::from_axis_angle(Point::new(0.0, 2.0, 0.0), 30.0).to_axis_angle();
        assert!(close(angle, 30.0));
        assert!(close(axis.y, 1.0));
    }

    #[test]
    fn euler_round_trip() {
        let (x, y, z) = Quaternion::from_euler(10.0, 20.0, 30.0).to_euler();
        assert!(close(x, 10.0) && close(y, 20.0) && close(z, 30.0));
    }

    #[test]
    fn inverse_undoes_rotation() {
        let q = Quaternion::from_euler(15.0, -40.0, 70.0);
        let r = q.mul(q.inverse());
        assert!(close(r.w, 1.0) && close(r.x, 0.0));
    }

    #[test]
    fn matrix_matches_rotate_point() {
        let q = Quaternion::from_axis_angle(Point::new(1.0, 1.0, 0.0), 50.0);
        let m = q.to_matrix();
        let p = Point::new(0.3, -1.0, 2.0);
        let r = q.rotate_point(p);
        let mx = m[0] * p.x + m[4] * p.y + m[8] * p.z;
        let my = m[1] * p.x + m[5] * p.y + m[9] * p.z;
        assert!(close(mx, r.x) && close(my, r.y));
    }
}
