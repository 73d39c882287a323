use crate::scene::shapes::{
    GlyphsCmd, ImageCmd, LinesCmd, MeshCmd, PointsCmd, SpritesCmd, VolumeCmd,
};

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a new shape module under `scene::shapes::*`
/// - add a new variant here
/// - implement push helpers inside that shape module
/// - add a matching renderer under `render::*` and teach `render::pick` about it
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Lines(LinesCmd),
    Points(PointsCmd),
    Sprites(SpritesCmd),
    Mesh(MeshCmd),
    Image(ImageCmd),
    Volume(VolumeCmd),
    Glyphs(GlyphsCmd),
}

impl DrawCmd {
    pub fn name(&self) -> &'static str {
        match self {
            DrawCmd::Lines(_) => "lines",
            DrawCmd::Points(_) => "points",
            DrawCmd::Sprites(_) => "sprites",
            DrawCmd::Mesh(_) => "mesh",
            DrawCmd::Image(_) => "image",
            DrawCmd::Volume(_) => "volume",
            DrawCmd::Glyphs(_) => "glyphs",
        }
    }
}
