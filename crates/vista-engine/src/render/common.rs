//! Shared GPU types and utilities used by all renderers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Rect;
use crate::scene::{BlendMode, CullMode, DepthMode, DrawState};

use super::RenderCtx;

// ── pipeline key ──────────────────────────────────────────────────────────

/// Fixed-function state that selects a pipeline variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    pub depth: DepthMode,
    pub blend: u8,
    pub cull: CullMode,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

impl PipelineKey {
    pub fn new(ctx: &RenderCtx<'_>, state: &DrawState) -> Self {
        Self {
            depth: state.depth,
            blend: state.blend.kind(),
            cull: state.cull,
            color_format: ctx.surface_format,
            depth_format: ctx.depth_format,
        }
    }
}

// ── blend / depth / cull ──────────────────────────────────────────────────

pub(crate) fn blend_state(kind: u8) -> Option<wgpu::BlendState> {
    match kind {
        0 => None,
        2 => Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Constant,
                dst_factor: wgpu::BlendFactor::OneMinusConstant,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        }),
        _ => Some(wgpu::BlendState::ALPHA_BLENDING),
    }
}

pub(crate) fn depth_stencil(format: wgpu::TextureFormat, depth: DepthMode) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: depth.writes(),
        depth_compare: if depth.tests() {
            wgpu::CompareFunction::LessEqual
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(crate) fn cull_face(cull: CullMode) -> Option<wgpu::Face> {
    match cull {
        CullMode::None => None,
        CullMode::Back => Some(wgpu::Face::Back),
        CullMode::Front => Some(wgpu::Face::Front),
    }
}

/// Describes the variant-independent parts of a render pipeline.
pub(crate) struct PipelineSpec<'a> {
    pub label: &'a str,
    pub module: &'a wgpu::ShaderModule,
    pub layout: &'a wgpu::PipelineLayout,
    pub buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
}

pub(crate) fn build_pipeline(
    device: &wgpu::Device,
    spec: &PipelineSpec<'_>,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: spec.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.color_format,
                blend: blend_state(key.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_face(key.cull),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(depth_stencil(key.depth_format, key.depth)),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

// ── error scopes ──────────────────────────────────────────────────────────

/// Runs `f` inside a validation error scope.
///
/// Returns `Err` with the validation message when the device reported an
/// error while `f` ran.
pub(crate) fn validated<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> Result<T, String> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let out = f();
    match pollster::block_on(scope.pop()) {
        Some(err) => Err(err.to_string()),
        None => Ok(out),
    }
}

// ── quad geometry ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(crate) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(crate) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Lazily created unit quad shared by the instanced renderers.
#[derive(Default)]
pub(crate) struct QuadBuffers {
    vbo: Option<wgpu::Buffer>,
    ibo: Option<wgpu::Buffer>,
}

impl QuadBuffers {
    pub fn get(&mut self, device: &wgpu::Device) -> (wgpu::Buffer, wgpu::Buffer) {
        let vbo = self
            .vbo
            .get_or_insert_with(|| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("vista quad vbo"),
                    contents: bytemuck::cast_slice(&QUAD_VERTICES),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })
            .clone();
        let ibo = self
            .ibo
            .get_or_insert_with(|| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("vista quad ibo"),
                    contents: bytemuck::cast_slice(&QUAD_INDICES),
                    usage: wgpu::BufferUsages::INDEX,
                })
            })
            .clone();
        (vbo, ibo)
    }
}

// ── buffers ───────────────────────────────────────────────────────────────

pub(crate) fn uniform_buffer<T: Pod>(device: &wgpu::Device, label: &str, value: &T) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM,
    })
}

pub(crate) fn vertex_buffer<T: Pod>(device: &wgpu::Device, label: &str, data: &[T]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

pub(crate) fn index_buffer(device: &wgpu::Device, label: &str, data: &[u32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::INDEX,
    })
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn texture_entry(binding: u32, dim: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dim,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

// ── prepared draw ─────────────────────────────────────────────────────────

/// How a prepared draw issues its primitives.
#[derive(Debug, Clone)]
pub(crate) enum DrawCall {
    Vertices { count: u32, instances: u32 },
    Indexed { index: wgpu::Buffer, format: wgpu::IndexFormat, count: u32, instances: u32 },
}

/// Everything needed to record one command into the shared render pass.
///
/// Renderers build these during the prepare phase; the frame then replays
/// them in paint order inside a single pass.
pub(crate) struct PreparedDraw {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_groups: Vec<wgpu::BindGroup>,
    pub vertex_buffers: Vec<wgpu::Buffer>,
    pub call: DrawCall,
    /// Physical `(x, y, w, h)`, used for both viewport and scissor.
    pub viewport: (u32, u32, u32, u32),
    pub blend_constant: Option<f32>,
}

impl PreparedDraw {
    pub fn record(&self, rpass: &mut wgpu::RenderPass<'_>) {
        let (x, y, w, h) = self.viewport;
        rpass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
        rpass.set_scissor_rect(x, y, w, h);
        if let Some(a) = self.blend_constant {
            let a = a as f64;
            rpass.set_blend_constant(wgpu::Color { r: a, g: a, b: a, a });
        }
        rpass.set_pipeline(&self.pipeline);
        for (i, bg) in self.bind_groups.iter().enumerate() {
            rpass.set_bind_group(i as u32, bg, &[]);
        }
        for (i, vb) in self.vertex_buffers.iter().enumerate() {
            rpass.set_vertex_buffer(i as u32, vb.slice(..));
        }
        match &self.call {
            DrawCall::Vertices { count, instances } => rpass.draw(0..*count, 0..*instances),
            DrawCall::Indexed { index, format, count, instances } => {
                rpass.set_index_buffer(index.slice(..), *format);
                rpass.draw_indexed(0..*count, 0, 0..*instances);
            }
        }
    }
}

/// Physical viewport of a draw state, `None` when it is off screen or empty.
pub(crate) fn physical_viewport(ctx: &RenderCtx<'_>, viewport: Rect) -> Option<(u32, u32, u32, u32)> {
    viewport.to_physical(ctx.scale_factor, ctx.surface_size)
}

pub(crate) fn blend_constant(state: &DrawState) -> Option<f32> {
    match state.blend {
        BlendMode::ConstantAlpha(a) => Some(a.clamp(0.0, 1.0)),
        _ => None,
    }
}

pub(crate) fn mat4_cols(m: glam::Mat4) -> [[f32; 4]; 4] {
    m.to_cols_array_2d()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_has_no_blend() {
        assert!(blend_state(BlendMode::Opaque.kind()).is_none());
        assert!(blend_state(BlendMode::Alpha.kind()).is_some());
    }

    #[test]
    fn constant_alpha_uses_constant_factor() {
        let b = blend_state(BlendMode::ConstantAlpha(0.5).kind()).unwrap();
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::Constant);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusConstant);
    }

    #[test]
    fn depth_off_always_passes() {
        let d = depth_stencil(wgpu::TextureFormat::Depth24Plus, DepthMode::Off);
        assert_eq!(d.depth_compare, wgpu::CompareFunction::Always);
        assert!(!d.depth_write_enabled);
        let d = depth_stencil(wgpu::TextureFormat::Depth24Plus, DepthMode::Test);
        assert_eq!(d.depth_compare, wgpu::CompareFunction::LessEqual);
        assert!(!d.depth_write_enabled);
    }
}
