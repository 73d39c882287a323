use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::scene::{DrawState, PointShape, PointsCmd, SpritesCmd};

use super::common::{
    blend_constant, mat4_cols, physical_viewport, sampler_entry, texture_entry, uniform_buffer,
    uniform_entry, vertex_buffer, DrawCall, PipelineKey, PreparedDraw, QuadBuffers, QuadVertex,
};
use super::program::ProgramPipelines;
use super::{RenderCtx, TexturePool};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PointUniform {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
    viewport: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PointInstance {
    pos: [f32; 3],
}

impl PointInstance {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

const SHAPE_SQUARE: f32 = 0.0;
const SHAPE_CIRCLE: f32 = 1.0;
const SHAPE_SPRITE: f32 = 2.0;

/// Renderer for `DrawCmd::Points` and `DrawCmd::Sprites`.
///
/// Both share one program; plain points bind the white stand-in texture.
pub(crate) struct PointRenderer {
    pipelines: ProgramPipelines,
    quad: QuadBuffers,
    warned_missing_sprite: bool,
}

impl Default for PointRenderer {
    fn default() -> Self {
        Self {
            pipelines: ProgramPipelines::new("vista points", include_str!("shaders/points.wgsl")),
            quad: QuadBuffers::default(),
            warned_missing_sprite: false,
        }
    }
}

struct PointBatch<'a> {
    positions: &'a [[f32; 3]],
    color: Color,
    size: f32,
    shape: f32,
    sprite: Option<(wgpu::TextureView, bool)>,
}

impl PointRenderer {
    pub fn prepare_points(
        &mut self,
        ctx: &RenderCtx<'_>,
        pool: &mut TexturePool,
        state: &DrawState,
        cmd: &PointsCmd,
    ) -> Option<PreparedDraw> {
        let shape = match cmd.shape {
            PointShape::Square => SHAPE_SQUARE,
            PointShape::Circle => SHAPE_CIRCLE,
        };
        let batch = PointBatch { positions: &cmd.positions, color: cmd.color, size: cmd.size, shape, sprite: None };
        self.prepare(ctx, pool, state, batch)
    }

    pub fn prepare_sprites(
        &mut self,
        ctx: &RenderCtx<'_>,
        pool: &mut TexturePool,
        state: &DrawState,
        cmd: &SpritesCmd,
    ) -> Option<PreparedDraw> {
        let Some(tex) = pool.get(cmd.sprite) else {
            if !self.warned_missing_sprite {
                log::warn!("sprite texture {:?} is not resident; sprites skipped", cmd.sprite);
                self.warned_missing_sprite = true;
            }
            return None;
        };
        let sprite = Some((tex.view.clone(), tex.desc.linear));
        let batch = PointBatch {
            positions: &cmd.positions,
            color: cmd.color,
            size: cmd.size,
            shape: SHAPE_SPRITE,
            sprite,
        };
        self.prepare(ctx, pool, state, batch)
    }

    fn prepare(
        &mut self,
        ctx: &RenderCtx<'_>,
        pool: &mut TexturePool,
        state: &DrawState,
        batch: PointBatch<'_>,
    ) -> Option<PreparedDraw> {
        let viewport = physical_viewport(ctx, state.viewport)?;

        let group0 = [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)];
        let group1 = [texture_entry(0, wgpu::TextureViewDimension::D2), sampler_entry(1)];
        let pipeline = self.pipelines.pipeline(
            ctx.device,
            PipelineKey::new(ctx, state),
            &[&group0, &group1],
            &[QuadVertex::layout(), PointInstance::layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )?;

        let uniform = PointUniform {
            transform: mat4_cols(state.transform),
            color: batch.color.to_array(),
            viewport: [viewport.2 as f32, viewport.3 as f32, batch.size, ctx.scale_factor],
            params: [batch.shape, 0.0, 0.0, 0.0],
        };
        let ubo = uniform_buffer(ctx.device, "vista points ubo", &uniform);
        let (view, linear) = match batch.sprite {
            Some(s) => s,
            None => (pool.white_2d(ctx), false),
        };
        let sampler = pool.sampler(ctx.device, linear);

        let layouts = self.pipelines.groups(ctx.device, &[&group0, &group1]);
        let uniforms = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista points ubo bind group"),
            layout: &layouts[0],
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });
        let textures = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista points texture bind group"),
            layout: &layouts[1],
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        let instances: Vec<PointInstance> = batch.positions.iter().map(|&pos| PointInstance { pos }).collect();
        let (quad_vbo, quad_ibo) = self.quad.get(ctx.device);
        let instance_vbo = vertex_buffer(ctx.device, "vista points instances", &instances);

        Some(PreparedDraw {
            pipeline,
            bind_groups: vec![uniforms, textures],
            vertex_buffers: vec![quad_vbo, instance_vbo],
            call: DrawCall::Indexed {
                index: quad_ibo,
                format: wgpu::IndexFormat::Uint16,
                count: 6,
                instances: instances.len() as u32,
            },
            viewport,
            blend_constant: blend_constant(state),
        })
    }
}
