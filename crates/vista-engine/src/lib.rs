//! Vista engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the scene graph:
//! the winit loop, the wgpu device, a renderer-agnostic draw stream and the
//! renderers that consume it.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod scene;
pub mod text;
