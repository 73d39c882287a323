use bytemuck::{Pod, Zeroable};

use crate::scene::{CullMode, DrawState, TextureDim, VolumeCmd};

use super::common::{
    blend_constant, index_buffer, mat4_cols, physical_viewport, sampler_entry, texture_entry,
    uniform_buffer, uniform_entry, vertex_buffer, DrawCall, PipelineKey, PreparedDraw,
};
use super::program::ProgramPipelines;
use super::{RenderCtx, TexturePool};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct VolumeUniform {
    transform: [[f32; 4]; 4],
    inverse: [[f32; 4]; 4],
    viewport: [f32; 4],
    box_min: [f32; 4],
    box_max: [f32; 4],
    shape: [f32; 4],
    uv_scale: [f32; 4],
    clim: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BoxVertex {
    pos: [f32; 3],
}

impl BoxVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BoxVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Renderer for `DrawCmd::Volume`.
///
/// Rasterizes the front faces of the bounding box; the fragment program
/// reconstructs the view ray by unprojecting the fragment at the near and
/// far planes.
pub(crate) struct VolumeRenderer {
    pipelines: ProgramPipelines,
    warned_missing: bool,
}

impl Default for VolumeRenderer {
    fn default() -> Self {
        Self {
            pipelines: ProgramPipelines::new("vista volume", include_str!("shaders/volume.wgsl")),
            warned_missing: false,
        }
    }
}

impl VolumeRenderer {
    pub fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        pool: &mut TexturePool,
        state: &DrawState,
        cmd: &VolumeCmd,
    ) -> Option<PreparedDraw> {
        if !ctx.caps.textures_3d {
            return None;
        }
        let viewport = physical_viewport(ctx, state.viewport)?;
        let tex = match pool.get(cmd.texture) {
            Some(t) if t.desc.dim == TextureDim::D3 => t,
            _ => {
                if !self.warned_missing {
                    log::warn!("volume texture {:?} is not a resident 3-D texture; skipped", cmd.texture);
                    self.warned_missing = true;
                }
                return None;
            }
        };
        let data_view = tex.view.clone();
        let data_linear = tex.desc.linear;
        let cmap = cmd.colormap.and_then(|id| pool.get(id)).map(|t| (t.view.clone(), t.desc.linear));

        let inverse = state.transform.inverse();
        if !inverse.is_finite() {
            return None;
        }

        let group0 = [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)];
        let group1 = [
            texture_entry(0, wgpu::TextureViewDimension::D3),
            sampler_entry(1),
            texture_entry(2, wgpu::TextureViewDimension::D2),
            sampler_entry(3),
        ];
        let groups: [&[wgpu::BindGroupLayoutEntry]; 2] = [&group0, &group1];
        // Front faces only; a mirrored transform asks for Front explicitly.
        let cull = if state.cull == CullMode::None { CullMode::Back } else { state.cull };
        let key = PipelineKey { cull, ..PipelineKey::new(ctx, state) };
        let pipeline = self.pipelines.pipeline(
            ctx.device,
            key,
            &groups,
            &[BoxVertex::layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )?;

        let (vx, vy, vw, vh) = viewport;
        let [bx, by, bz] = cmd.box_min;
        let [cx, cy, cz] = cmd.box_max;
        let [sx, sy, sz] = cmd.shape;
        let [ux, uy, uz] = cmd.uv_scale;
        let uniform = VolumeUniform {
            transform: mat4_cols(state.transform),
            inverse: mat4_cols(inverse),
            viewport: [vx as f32, vy as f32, vw as f32, vh as f32],
            box_min: [bx, by, bz, cmd.step_ratio],
            box_max: [cx, cy, cz, cmd.threshold],
            shape: [sx.max(1.0), sy.max(1.0), sz.max(1.0), cmd.style.code() as f32],
            uv_scale: [ux, uy, uz, if cmap.is_some() { 1.0 } else { 0.0 }],
            clim: [cmd.clim_scale, cmd.clim_bias, 0.0, 0.0],
        };
        let ubo = uniform_buffer(ctx.device, "vista volume ubo", &uniform);

        let data_sampler = pool.sampler(ctx.device, data_linear);
        let (cmap_view, cmap_linear) = match cmap {
            Some(c) => c,
            None => (pool.white_2d(ctx), false),
        };
        let cmap_sampler = pool.sampler(ctx.device, cmap_linear);

        let layouts = self.pipelines.groups(ctx.device, &groups);
        let uniforms = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista volume ubo bind group"),
            layout: &layouts[0],
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });
        let textures = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista volume texture bind group"),
            layout: &layouts[1],
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&data_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&data_sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&cmap_view) },
                wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::Sampler(&cmap_sampler) },
            ],
        });

        let vertices: Vec<BoxVertex> = cmd.corners().iter().map(|&pos| BoxVertex { pos }).collect();

        Some(PreparedDraw {
            pipeline,
            bind_groups: vec![uniforms, textures],
            vertex_buffers: vec![vertex_buffer(ctx.device, "vista volume box", &vertices)],
            call: DrawCall::Indexed {
                index: index_buffer(ctx.device, "vista volume box indices", &VolumeCmd::FACE_INDICES),
                format: wgpu::IndexFormat::Uint32,
                count: VolumeCmd::FACE_INDICES.len() as u32,
                instances: 1,
            },
            viewport,
            blend_constant: blend_constant(state),
        })
    }
}
