//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and its depth buffer
//! - reporting the capability gates the scene graph consults ([`GpuCaps`])
//! - acquiring frames and providing encoders/views for rendering

mod caps;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use caps::GpuCaps;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
