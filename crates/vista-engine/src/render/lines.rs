use bytemuck::{Pod, Zeroable};

use crate::scene::{DrawState, LinesCmd};

use super::common::{
    blend_constant, mat4_cols, physical_viewport, uniform_buffer, uniform_entry, vertex_buffer,
    DrawCall, PipelineKey, PreparedDraw, QuadBuffers, QuadVertex,
};
use super::program::ProgramPipelines;
use super::RenderCtx;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LineUniform {
    transform: [[f32; 4]; 4],
    color: [f32; 4],
    viewport: [f32; 4],
    params: [f32; 4],
}

/// One segment instance: endpoints and the stroke distance at `p0`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct SegmentInstance {
    pub p0: [f32; 3],
    pub p1: [f32; 3],
    pub dist0: f32,
}

impl SegmentInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x3, // p0
        2 => Float32x3, // p1
        3 => Float32     // dist0
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SegmentInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Builds segment instances with cumulative stroke distance in logical pixels.
///
/// Strips accumulate along the polyline; independent segments restart at 0.
/// Endpoints behind the eye contribute no length.
pub(crate) fn segment_instances(state: &DrawState, cmd: &LinesCmd) -> Vec<SegmentInstance> {
    let continuous = matches!(cmd.topology, crate::scene::LineTopology::Strip);
    let mut dist = 0.0f32;
    cmd.segments()
        .map(|(a, b)| {
            let (p0, p1) = (cmd.positions[a], cmd.positions[b]);
            if !continuous {
                dist = 0.0;
            }
            let seg = SegmentInstance { p0, p1, dist0: dist };
            if let (Some(s0), Some(s1)) = (state.project(p0), state.project(p1)) {
                dist += ((s1.0 - s0.0).powi(2) + (s1.1 - s0.1).powi(2)).sqrt();
            }
            seg
        })
        .collect()
}

/// Renderer for `DrawCmd::Lines`.
///
/// Each segment is an instanced quad expanded to the stroke width in the
/// vertex shader; the stipple pattern is evaluated per fragment.
pub(crate) struct LineRenderer {
    pipelines: ProgramPipelines,
    quad: QuadBuffers,
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self {
            pipelines: ProgramPipelines::new("vista lines", include_str!("shaders/lines.wgsl")),
            quad: QuadBuffers::default(),
        }
    }
}

impl LineRenderer {
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, state: &DrawState, cmd: &LinesCmd) -> Option<PreparedDraw> {
        let viewport = physical_viewport(ctx, state.viewport)?;
        let instances = segment_instances(state, cmd);
        if instances.is_empty() {
            return None;
        }

        let entries = [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)];
        let pipeline = self.pipelines.pipeline(
            ctx.device,
            PipelineKey::new(ctx, state),
            &[&entries],
            &[QuadVertex::layout(), SegmentInstance::layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )?;

        let uniform = LineUniform {
            transform: mat4_cols(state.transform),
            color: cmd.color.to_array(),
            viewport: [viewport.2 as f32, viewport.3 as f32, cmd.width, ctx.scale_factor],
            params: [
                f32::from(cmd.stipple.unwrap_or(0xFFFF)),
                if cmd.stipple.is_some() { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        };
        let ubo = uniform_buffer(ctx.device, "vista lines ubo", &uniform);
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista lines bind group"),
            layout: &self.pipelines.groups(ctx.device, &[&entries])[0],
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });

        let (quad_vbo, quad_ibo) = self.quad.get(ctx.device);
        let instance_vbo = vertex_buffer(ctx.device, "vista lines instances", &instances);

        Some(PreparedDraw {
            pipeline,
            bind_groups: vec![bind_group],
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;
    use crate::scene::LineTopology;

    fn cmd(positions: Vec<[f32; 3]>, topology: LineTopology) -> LinesCmd {
        LinesCmd { positions, color: Color::BLACK, width: 1.0, stipple: Some(0x00FF), topology }
    }

    #[test]
    fn strip_distance_accumulates() {
        let s = DrawState::pixels(Rect::new(0.0, 0.0, 100.0, 100.0), 1.0);
        let c = cmd(vec![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0], [3.0, 14.0, 0.0]], LineTopology::Strip);
        let inst = segment_instances(&s, &c);
        assert_eq!(inst.len(), 2);
        assert!((inst[0].dist0 - 0.0).abs() < 1e-4);
        assert!((inst[1].dist0 - 5.0).abs() < 1e-4);
    }

    #[test]
    fn list_segments_restart() {
        let s = DrawState::pixels(Rect::new(0.0, 0.0, 100.0, 100.0), 1.0);
        let c = cmd(vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 5.0, 0.0], [10.0, 5.0, 0.0]], LineTopology::List);
        let inst = segment_instances(&s, &c);
        assert_eq!(inst.len(), 2);
        assert_eq!(inst[1].dist0, 0.0);
    }
}
