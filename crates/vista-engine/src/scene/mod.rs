//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands with their captured [`DrawState`]
//! - provide deterministic ordering (layer + insertion order)
//! - carry texture mutations that must land before the frame's draws
//! - keep shape-specific helpers isolated per shape file under `scene::shapes`

mod cmd;
mod key;
mod list;
mod state;
mod texture;

pub mod shapes;

pub use cmd::DrawCmd;
pub use key::{SortKey, ZIndex};
pub use list::{DrawItem, DrawList};
pub use shapes::{
    GlyphQuad, GlyphsCmd, ImageCmd, LineTopology, LinesCmd, MeshCmd, PointShape, PointsCmd,
    SpritesCmd, VolumeCmd, VolumeStyle,
};
pub use shapes::lines::stipple_bit;
pub use state::{BlendMode, CullMode, DepthMode, DrawState};
pub use texture::{TexelFormat, TextureData, TextureDesc, TextureDim, TextureId, TextureOp};
