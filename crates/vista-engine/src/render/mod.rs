//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw streams and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - every command carries its own transform to clip space and viewport
//! - all commands of a frame are recorded into a single render pass
//! - the shape pass used for picking is rasterized on the CPU ([`PickRasterizer`])

mod common;
mod ctx;
mod frame;
mod glyphs;
mod image;
mod lines;
mod mesh;
mod pick;
mod points;
mod program;
mod textures;
mod volume;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::Renderer;
pub use image::MAX_AA_TAPS;
pub use pick::{PickBuffer, PickRasterizer};
pub use program::{ProgramState, ShaderProgram};
pub use textures::{GpuTexture, TexturePool};
