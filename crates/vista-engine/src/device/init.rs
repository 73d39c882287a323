/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    ///
    /// `FLOAT32_FILTERABLE` is added on top of these when the adapter offers it,
    /// so float data textures can be linearly interpolated.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// Texture dimension limits are raised to whatever the adapter supports so
    /// large volumes do not hit the conservative defaults.
    pub required_limits: wgpu::Limits,

    /// Depth attachment format. `Depth24Plus` reports 24 depth bits,
    /// `Depth16Unorm` reports 16.
    pub depth_format: wgpu::TextureFormat,

    /// Desired maximum frame latency for the surface.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth24Plus,
            desired_maximum_frame_latency: 2,
        }
    }
}
