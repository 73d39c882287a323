use bytemuck::{Pod, Zeroable};

use crate::scene::{DrawState, ImageCmd};

use super::common::{
    blend_constant, index_buffer, mat4_cols, physical_viewport, sampler_entry, texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawCall, PipelineKey, PreparedDraw,
};
use super::program::ProgramPipelines;
use super::{RenderCtx, TexturePool};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ImageUniform {
    transform: [[f32; 4]; 4],
    clim: [f32; 4],
    texel: [f32; 4],
    weights: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ImageVertex {
    pos: [f32; 3],
    uv: [f32; 2],
}

impl ImageVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImageVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Largest kernel half-width the image program evaluates.
pub const MAX_AA_TAPS: u32 = 3;

fn quad_vertices(cmd: &ImageCmd) -> [ImageVertex; 4] {
    let [su, sv] = cmd.uv_scale;
    let uvs = [[0.0, 0.0], [su, 0.0], [su, sv], [0.0, sv]];
    std::array::from_fn(|i| ImageVertex { pos: cmd.corners[i], uv: uvs[i] })
}

/// Renderer for `DrawCmd::Image`.
///
/// The full program applies the smoothing kernel and colormap. When it
/// fails to build, or the command asks for it, the plain program samples
/// the data directly.
pub(crate) struct ImageRenderer {
    main: ProgramPipelines,
    plain: ProgramPipelines,
    warned_missing: bool,
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self {
            main: ProgramPipelines::new("vista image", include_str!("shaders/image.wgsl")),
            plain: ProgramPipelines::new("vista image plain", include_str!("shaders/image_plain.wgsl")),
            warned_missing: false,
        }
    }
}

impl ImageRenderer {
    /// The full program has failed and images are drawn plain.
    pub fn is_degraded(&self) -> bool {
        self.main.program.is_dead()
    }

    pub fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        pool: &mut TexturePool,
        state: &DrawState,
        cmd: &ImageCmd,
    ) -> Option<PreparedDraw> {
        let viewport = physical_viewport(ctx, state.viewport)?;
        let Some(tex) = pool.get(cmd.texture) else {
            if !self.warned_missing {
                log::warn!("image texture {:?} is not resident; image skipped", cmd.texture);
                self.warned_missing = true;
            }
            return None;
        };
        let data_view = tex.view.clone();
        let data_linear = tex.desc.linear;
        let channels = tex.desc.format.channels();
        let cmap = cmd.colormap.and_then(|id| pool.get(id)).map(|t| (t.view.clone(), t.desc.linear));

        let group0 = [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)];
        let group1 = [
            texture_entry(0, wgpu::TextureViewDimension::D2),
            sampler_entry(1),
            texture_entry(2, wgpu::TextureViewDimension::D2),
            sampler_entry(3),
        ];
        let groups: [&[wgpu::BindGroupLayoutEntry]; 2] = [&group0, &group1];
        let key = PipelineKey::new(ctx, state);
        let buffers = [ImageVertex::layout()];
        let topology = wgpu::PrimitiveTopology::TriangleList;

        let mut use_plain = cmd.plain || self.main.program.is_dead();
        let mut pipeline = None;
        if !use_plain {
            pipeline = self.main.pipeline(ctx.device, key, &groups, &buffers, topology);
            if pipeline.is_none() {
                log::warn!("image program unavailable; falling back to plain sampling");
                use_plain = true;
            }
        }
        if use_plain {
            pipeline = self.plain.pipeline(ctx.device, key, &groups, &buffers, topology);
        }
        let pipeline = pipeline?;

        let taps = cmd.aa_taps.min(MAX_AA_TAPS);
        let uniform = ImageUniform {
            transform: mat4_cols(state.transform),
            clim: [cmd.clim_scale, cmd.clim_bias, taps as f32, channels as f32],
            texel: [cmd.texel[0], cmd.texel[1], if cmap.is_some() { 1.0 } else { 0.0 }, 0.0],
            weights: cmd.aa_weights,
        };
        let ubo = uniform_buffer(ctx.device, "vista image ubo", &uniform);

        let data_sampler = pool.sampler(ctx.device, data_linear);
        let (cmap_view, cmap_linear) = match cmap {
            Some(c) => c,
            None => (pool.white_2d(ctx), false),
        };
        let cmap_sampler = pool.sampler(ctx.device, cmap_linear);

        let layouts = if use_plain {
            self.plain.groups(ctx.device, &groups)
        } else {
            self.main.groups(ctx.device, &groups)
        };
        let uniforms = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista image ubo bind group"),
            layout: &layouts[0],
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });
        let textures = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista image texture bind group"),
            layout: &layouts[1],
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&data_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&data_sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&cmap_view) },
                wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::Sampler(&cmap_sampler) },
            ],
        });

        Some(PreparedDraw {
            pipeline,
            bind_groups: vec![uniforms, textures],
            vertex_buffers: vec![vertex_buffer(ctx.device, "vista image vertices", &quad_vertices(cmd))],
            call: DrawCall::Indexed {
                index: index_buffer(ctx.device, "vista image indices", &[0, 1, 2, 0, 2, 3]),
                format: wgpu::IndexFormat::Uint32,
                count: 6,
                instances: 1,
            },
            viewport,
            blend_constant: blend_constant(state),
        })
    }
}
