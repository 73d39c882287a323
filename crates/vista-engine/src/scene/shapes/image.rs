use crate::scene::{DrawCmd, DrawList, DrawState, TextureId};

/// Textured quad for 2-D data.
///
/// `corners` run `(u0,v0) (u1,v0) (u1,v1) (u0,v1)` where texture coordinates
/// span `[0, uv_scale]`; `uv_scale < 1` addresses the valid part of a padded
/// texture.
///
/// Sampled values are windowed as `clamp((v + clim_bias) * clim_scale, 0, 1)`
/// and looked up in `colormap` when present (luminance data), otherwise used
/// directly as gray or RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCmd {
    pub texture: TextureId,
    pub colormap: Option<TextureId>,
    pub corners: [[f32; 3]; 4],
    pub uv_scale: [f32; 2],
    pub clim_scale: f32,
    pub clim_bias: f32,
    /// Anti-alias kernel: normalized weights for offsets 0..=3 and the
    /// number of taps on each side (0 disables smoothing).
    pub aa_weights: [f32; 4],
    pub aa_taps: u32,
    /// Size of one texel in texture coordinates.
    pub texel: [f32; 2],
    /// Draw with the minimal program (no kernel, no colormap).
    pub plain: bool,
}

impl DrawList {
    pub fn push_image(&mut self, state: DrawState, image: ImageCmd) {
        self.push(state, DrawCmd::Image(image));
    }
}
