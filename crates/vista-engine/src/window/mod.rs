//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and windows, wires them to the GPU layer and
//! drives the application on demand.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
