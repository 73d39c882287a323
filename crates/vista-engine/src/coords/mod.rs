//! Coordinate types shared across engine renderers and the scene graph.
//!
//! Canonical CPU space for rects:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! World geometry is never expressed in these units; draw commands carry a
//! transform to clip space plus the viewport rect they render into.

mod rect;

pub use glam::Vec2;
pub use rect::Rect;
