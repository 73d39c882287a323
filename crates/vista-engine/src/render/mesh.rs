use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

use crate::scene::{DrawState, MeshCmd};

use super::common::{
    blend_constant, index_buffer, mat4_cols, physical_viewport, uniform_buffer, uniform_entry,
    vertex_buffer, DrawCall, PipelineKey, PreparedDraw,
};
use super::program::ProgramPipelines;
use super::RenderCtx;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshUniform {
    transform: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshVertex {
    pos: [f32; 3],
    normal: [f32; 3],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x3  // normal
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Transforms normals consistently with `transform`.
pub(crate) fn normal_matrix(transform: Mat4) -> Mat4 {
    let m = Mat3::from_mat4(transform);
    if m.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(m.inverse().transpose())
}

/// Renderer for `DrawCmd::Mesh`.
pub(crate) struct MeshRenderer {
    pipelines: ProgramPipelines,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self { pipelines: ProgramPipelines::new("vista mesh", include_str!("shaders/mesh.wgsl")) }
    }
}

impl MeshRenderer {
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, state: &DrawState, cmd: &MeshCmd) -> Option<PreparedDraw> {
        let viewport = physical_viewport(ctx, state.viewport)?;
        let indices: Vec<u32> = cmd.triangles().flatten().map(|i| i as u32).collect();
        if indices.is_empty() {
            return None;
        }

        let entries = [uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)];
        let pipeline = self.pipelines.pipeline(
            ctx.device,
            PipelineKey::new(ctx, state),
            &[&entries],
            &[MeshVertex::layout()],
            wgpu::PrimitiveTopology::TriangleList,
        )?;

        let normals = cmd.normals.as_deref().filter(|n| n.len() == cmd.positions.len());
        let vertices: Vec<MeshVertex> = cmd
            .positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| MeshVertex { pos, normal: normals.map_or([0.0; 3], |n| n[i]) })
            .collect();

        let lit = cmd.lit && normals.is_some();
        let uniform = MeshUniform {
            transform: mat4_cols(state.transform),
            normal_matrix: mat4_cols(normal_matrix(state.transform)),
            color: cmd.color.to_array(),
            params: [if lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        };
        let ubo = uniform_buffer(ctx.device, "vista mesh ubo", &uniform);
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vista mesh bind group"),
            layout: &self.pipelines.groups(ctx.device, &[&entries])[0],
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });

        Some(PreparedDraw {
            pipeline,
            bind_groups: vec![bind_group],
            vertex_buffers: vec![vertex_buffer(ctx.device, "vista mesh vertices", &vertices)],
            call: DrawCall::Indexed {
                index: index_buffer(ctx.device, "vista mesh indices", &indices),
                format: wgpu::IndexFormat::Uint32,
                count: indices.len() as u32,
                instances: 1,
            },
            viewport,
            blend_constant: blend_constant(state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(m).transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn singular_transform_keeps_normals() {
        let m = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(normal_matrix(m), Mat4::IDENTITY);
    }
}
