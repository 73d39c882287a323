pub(crate) mod glyphs;
pub(crate) mod image;
pub(crate) mod lines;
pub(crate) mod mesh;
pub(crate) mod points;
pub(crate) mod volume;

pub use glyphs::{GlyphQuad, GlyphsCmd};
pub use image::ImageCmd;
pub use lines::{LineTopology, LinesCmd};
pub use mesh::MeshCmd;
pub use points::{PointShape, PointsCmd, SpritesCmd};
pub use volume::{VolumeCmd, VolumeStyle};
