//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop)
//! and higher layers (the scene graph, the studio binary).

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
