use crate::coords::Vec2;
use crate::device::GpuCaps;

/// Renderer-facing context (device/queue + formats + viewport).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Window size in logical pixels.
    pub viewport: Vec2,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
    /// Render target size in physical pixels.
    pub surface_size: (u32, u32),
    pub caps: GpuCaps,
}

/// Target for drawing (encoder + color and depth views).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        depth_view: &'a wgpu::TextureView,
    ) -> Self {
        Self { encoder, color_view, depth_view }
    }
}
