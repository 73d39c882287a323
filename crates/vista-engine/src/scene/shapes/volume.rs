use crate::scene::{DrawCmd, DrawList, DrawState, TextureId};

/// Raycasting kernel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VolumeStyle {
    /// Maximum intensity projection.
    Mip,
    /// First crossing of `threshold`, shaded by the local gradient.
    Iso,
    /// Front-to-back compositing through the colormap's RGBA.
    Ray,
}

impl VolumeStyle {
    pub(crate) fn code(self) -> u32 {
        match self {
            VolumeStyle::Mip => 0,
            VolumeStyle::Iso => 1,
            VolumeStyle::Ray => 2,
        }
    }
}

/// 3-D texture raycast through the box `[box_min, box_max]` (model space).
///
/// Texture coordinates are `(p - box_min) / (box_max - box_min) * uv_scale`.
/// `shape` is the texel extent in texture order `(x, y, z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeCmd {
    pub texture: TextureId,
    pub colormap: Option<TextureId>,
    pub box_min: [f32; 3],
    pub box_max: [f32; 3],
    pub shape: [f32; 3],
    pub uv_scale: [f32; 3],
    pub clim_scale: f32,
    pub clim_bias: f32,
    pub style: VolumeStyle,
    /// Iso threshold in normalized `[0, 1]` texture units.
    pub threshold: f32,
    /// Sampling density relative to one step per texel.
    pub step_ratio: f32,
}

impl VolumeCmd {
    /// Corners of the bounding box, `x` fastest.
    pub fn corners(&self) -> [[f32; 3]; 8] {
        let (a, b) = (self.box_min, self.box_max);
        let mut out = [[0.0; 3]; 8];
        for (i, c) in out.iter_mut().enumerate() {
            *c = [
                if i & 1 == 0 { a[0] } else { b[0] },
                if i & 2 == 0 { a[1] } else { b[1] },
                if i & 4 == 0 { a[2] } else { b[2] },
            ];
        }
        out
    }

    /// Box faces as counter-clockwise (outward) triangles into [`corners`].
    ///
    /// [`corners`]: VolumeCmd::corners
    pub const FACE_INDICES: [u32; 36] = [
        0, 2, 3, 0, 3, 1, // -z
        4, 5, 7, 4, 7, 6, // +z
        0, 1, 5, 0, 5, 4, // -y
        2, 6, 7, 2, 7, 3, // +y
        0, 4, 6, 0, 6, 2, // -x
        1, 3, 7, 1, 7, 5, // +x
    ];
}

impl DrawList {
    pub fn push_volume(&mut self, state: DrawState, volume: VolumeCmd) {
        self.push(state, DrawCmd::Volume(volume));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vol() -> VolumeCmd {
        VolumeCmd {
            texture: TextureId(1),
            colormap: None,
            box_min: [0.0, 0.0, 0.0],
            box_max: [2.0, 3.0, 4.0],
            shape: [2.0, 3.0, 4.0],
            uv_scale: [1.0; 3],
            clim_scale: 1.0,
            clim_bias: 0.0,
            style: VolumeStyle::Mip,
            threshold: 0.5,
            step_ratio: 1.0,
        }
    }

    #[test]
    fn corners_x_fastest() {
        let c = vol().corners();
        assert_eq!(c[0], [0.0, 0.0, 0.0]);
        assert_eq!(c[1], [2.0, 0.0, 0.0]);
        assert_eq!(c[2], [0.0, 3.0, 0.0]);
        assert_eq!(c[7], [2.0, 3.0, 4.0]);
    }

    #[test]
    fn faces_point_outward() {
        let c = vol().corners();
        let center = [1.0f32, 1.5, 2.0];
        for t in VolumeCmd::FACE_INDICES.chunks_exact(3) {
            let (a, b, d) = (c[t[0] as usize], c[t[1] as usize], c[t[2] as usize]);
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let v = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
            let n = [u[1] * v[2] - u[2] * v[1], u[2] * v[0] - u[0] * v[2], u[0] * v[1] - u[1] * v[0]];
            let out = [a[0] - center[0], a[1] - center[1], a[2] - center[2]];
            assert!(n[0] * out[0] + n[1] * out[1] + n[2] * out[2] > 0.0);
        }
    }
}
