/// Capability gates detected from the adapter and the chosen formats.
///
/// The scene graph consults these instead of querying the device directly,
/// which keeps it testable with hand-built values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GpuCaps {
    /// Bits per channel of the shape-pass target (red, green, blue).
    pub color_bits: [u8; 3],
    /// Precision of the depth attachment.
    pub depth_bits: u8,
    pub max_texture_1d: u32,
    pub max_texture_2d: u32,
    pub max_texture_3d: u32,
    /// Non-power-of-two textures can be allocated; otherwise uploads are padded.
    pub npot_textures: bool,
    pub textures_3d: bool,
    /// Programmable shading is available (shader wrapper, point sprites).
    pub shaders: bool,
    /// Blending against a constant alpha is available.
    pub constant_alpha: bool,
    /// `R32Float` / `Rgba32Float` can be sampled with linear filtering.
    pub float32_filterable: bool,
}

impl GpuCaps {
    /// Derives the caps from adapter limits, downlevel flags and formats.
    pub fn detect(
        adapter: &wgpu::Adapter,
        device_features: wgpu::Features,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let limits = adapter.limits();
        let downlevel = adapter.get_downlevel_capabilities();

        Self {
            color_bits: [8, 8, 8],
            depth_bits: depth_bits_of(depth_format),
            max_texture_1d: limits.max_texture_dimension_1d,
            max_texture_2d: limits.max_texture_dimension_2d,
            max_texture_3d: limits.max_texture_dimension_3d,
            npot_textures: downlevel
                .flags
                .contains(wgpu::DownlevelFlags::NON_POWER_OF_TWO_MIPMAPPED_TEXTURES),
            textures_3d: limits.max_texture_dimension_3d > 0,
            shaders: true,
            constant_alpha: true,
            float32_filterable: device_features.contains(wgpu::Features::FLOAT32_FILTERABLE),
        }
    }

    /// Caps of a typical desktop adapter; used when no device exists yet.
    pub const fn desktop() -> Self {
        Self {
            color_bits: [8, 8, 8],
            depth_bits: 24,
            max_texture_1d: 8192,
            max_texture_2d: 8192,
            max_texture_3d: 2048,
            npot_textures: true,
            textures_3d: true,
            shaders: true,
            constant_alpha: true,
            float32_filterable: false,
        }
    }

    /// Largest allocatable extent for a texture of `ndim` spatial dimensions.
    pub fn max_texture(&self, ndim: usize) -> u32 {
        match ndim {
            1 => self.max_texture_1d,
            2 => self.max_texture_2d,
            _ => self.max_texture_3d,
        }
    }
}

impl Default for GpuCaps {
    fn default() -> Self {
        Self::desktop()
    }
}

pub(crate) fn depth_bits_of(format: wgpu::TextureFormat) -> u8 {
    match format {
        wgpu::TextureFormat::Depth16Unorm => 16,
        wgpu::TextureFormat::Depth32Float | wgpu::TextureFormat::Depth32FloatStencil8 => 32,
        _ => 24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_bits_follow_format() {
        assert_eq!(depth_bits_of(wgpu::TextureFormat::Depth16Unorm), 16);
        assert_eq!(depth_bits_of(wgpu::TextureFormat::Depth24Plus), 24);
    }

    #[test]
    fn max_texture_by_dimension() {
        let caps = GpuCaps { max_texture_2d: 16384, ..GpuCaps::desktop() };
        assert_eq!(caps.max_texture(2), 16384);
        assert_eq!(caps.max_texture(3), 2048);
    }
}
