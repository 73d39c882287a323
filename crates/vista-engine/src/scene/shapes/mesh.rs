use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, DrawState};

/// Indexed triangle mesh with a uniform color.
///
/// With `lit` set and normals present, a single head light is applied;
/// otherwise the mesh is flat shaded (the shape pass relies on this).
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCmd {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub indices: Vec<u32>,
    pub color: Color,
    pub lit: bool,
}

impl MeshCmd {
    /// Triangles as index triples; a trailing partial triangle is ignored,
    /// as are triangles referencing missing vertices.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let n = self.positions.len();
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
            .filter(move |t| t.iter().all(|&i| i < n))
    }
}

impl DrawList {
    pub fn push_mesh(&mut self, state: DrawState, mesh: MeshCmd) {
        if mesh.indices.len() < 3 || mesh.positions.is_empty() {
            return;
        }
        self.push(state, DrawCmd::Mesh(mesh));
    }

    /// Flat quad from four corners given in order around the perimeter.
    pub fn push_quad(&mut self, state: DrawState, corners: [[f32; 3]; 4], color: Color) {
        self.push_mesh(
            state,
            MeshCmd {
                positions: corners.to_vec(),
                normals: None,
                indices: vec![0, 1, 2, 0, 2, 3],
                color,
                lit: false,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangles_skip_out_of_range() {
        let m = MeshCmd {
            positions: vec![[0.0; 3]; 3],
            normals: None,
            indices: vec![0, 1, 2, 0, 1, 9, 2],
            color: Color::BLACK,
            lit: false,
        };
        let t: Vec<_> = m.triangles().collect();
        assert_eq!(t, vec![[0, 1, 2]]);
    }
}
