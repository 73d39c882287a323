use glam::{DMat4, DVec3};

/// One entry of a world object's transformation list.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Transform {
    Translate(DVec3),
    Scale(DVec3),
    /// Rotation about `axis` by `angle` degrees (right-handed).
    Rotate { axis: DVec3, angle: f64 },
}

impl Transform {
    pub fn matrix(&self) -> DMat4 {
        match *self {
            Transform::Translate(d) => DMat4::from_translation(d),
            Transform::Scale(s) => DMat4::from_scale(s),
            Transform::Rotate { axis, angle } => {
                let axis = axis.normalize_or_zero();
                if axis == DVec3::ZERO {
                    DMat4::IDENTITY
                } else {
                    DMat4::from_axis_angle(axis, angle.to_radians())
                }
            }
        }
    }
}

/// Composes a list; the last entry is applied to the geometry first.
pub fn compose(list: &[Transform]) -> DMat4 {
    list.iter().fold(DMat4::IDENTITY, |m, t| m * t.matrix())
}
