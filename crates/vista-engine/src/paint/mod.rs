//! Paint model shared between the scene graph and renderers.

pub mod color;

pub use color::Color;
