//! Data textures: upload pipeline, colormaps, 2-D images and volumes.

pub mod colormap;
pub mod image;
pub mod upload;
pub mod volume;

pub use colormap::{Colormap, ColormapSpec, COLORMAP_SIZE};
pub use image::Texture2D;
pub use upload::{DataTexture, HostImage, TextureSource, UploadState, Uploaded, MAX_DOWNSAMPLES};
pub use volume::{RaySample, Texture3D};

/// Largest smoothing kernel half-width (`aa3`).
pub const MAX_AA: u32 = 3;

/// Kernel weights for offsets `0..=3`, normalized so the symmetric kernel
/// of `taps` half-width sums to one.
///
/// `sigma` is the kernel width in texels; widths that small leave a single
/// unit weight.
pub fn aa_weights(sigma: f64, taps: u32) -> [f32; 4] {
    let taps = taps.min(MAX_AA) as usize;
    if !(sigma > 0.0) || taps == 0 {
        return [1.0, 0.0, 0.0, 0.0];
    }
    let mut w = [0.0f64; 4];
    for (k, wk) in w.iter_mut().enumerate().take(taps + 1) {
        *wk = (-(k as f64) / (2.0 * sigma * sigma)).exp();
    }
    let total = w[0] + 2.0 * w[1..].iter().sum::<f64>();
    w.map(|v| (v / total) as f32)
}

/// Kernel width for a texel that covers `pixels_per_texel` screen pixels.
pub fn aa_sigma(pixels_per_texel: f64) -> f64 {
    if pixels_per_texel > 0.0 { 0.7 / pixels_per_texel } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        for taps in 1..=3 {
            let w = aa_weights(1.5, taps);
            let sum = w[0] + 2.0 * (w[1] + w[2] + w[3]);
            assert!((sum - 1.0).abs() < 1e-6);
            assert!(w[0] > w[1]);
        }
        assert_eq!(aa_weights(1.0, 1)[2], 0.0);
    }

    #[test]
    fn narrow_or_disabled_kernels_are_identity() {
        assert_eq!(aa_weights(0.0, 3), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(aa_weights(2.0, 0), [1.0, 0.0, 0.0, 0.0]);
        let w = aa_weights(0.01, 2);
        assert!((w[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zooming_in_narrows_the_kernel() {
        assert!(aa_sigma(4.0) < aa_sigma(0.5));
        assert_eq!(aa_sigma(0.0), 0.0);
    }
}
