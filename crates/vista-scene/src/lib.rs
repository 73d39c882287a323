//! Vista scene: interactive scientific figures on top of `vista-engine`.
//!
//! A [`Figure`] owns one window and a tree of nodes. Widgets occupy
//! rectangles of the window; an [`Axes`](widgets::Axes) widget hosts world
//! objects (lines, images, volumes, text) viewed through a camera.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use vista_scene::prelude::*;
//!
//! Application::new()
//!     .title("sine")
//!     .font(include_bytes!("my_font.ttf").to_vec())
//!     .run(|figure| {
//!         let flat: Vec<f32> = (0..200)
//!             .flat_map(|i| { let x = i as f32 * 0.05; [x, x.sin()] })
//!             .collect();
//!         let points = Pointset::from_flat(2, &flat)?;
//!         let axes = figure.add_axes()?;
//!         figure.add_object(axes, Line::new(&points).with_format("r-o")?)?;
//!         figure.set_limits(axes, LIMIT_MARGIN)
//!     })
//! ```
//!
//! # Custom objects
//!
//! Implement [`Behavior`](node::Behavior) and add the value with
//! [`Figure::add_object`] (world objects) or [`Figure::add_widget`]
//! (screen-space widgets).

pub mod app;
pub mod axis;
pub mod backend;
pub mod camera;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod events;
pub mod figure;
pub mod line;
pub mod node;
pub mod picking;
pub mod text;
pub mod texture;
pub mod timer;
pub mod widgets;

pub use app::Application;
pub use config::FigureConfig;
pub use error::{Result, VistaError};
pub use figure::{Figure, MouseInput, LIMIT_MARGIN};

/// Common imports for building figures.
pub mod prelude {
    pub use crate::app::Application;
    pub use crate::axis::{Axis, AxisStyle};
    pub use crate::backend::Backend;
    pub use crate::camera::{Camera, CameraKind, ViewParams};
    pub use crate::config::FigureConfig;
    pub use crate::draw::{DrawContext, DrawPass};
    pub use crate::error::{Result, VistaError};
    pub use crate::events::{Event, EventKind};
    pub use crate::figure::{Figure, MouseInput, LIMIT_MARGIN};
    pub use crate::line::{Line, LineStyle, MarkerStyle};
    pub use crate::node::{Behavior, Bounds, Field, NodeCx, NodeId, Position, Transform};
    pub use crate::text::{HAlign, Text, TextObject, VAlign};
    pub use crate::texture::{Colormap, ColormapSpec, Texture2D, Texture3D, TextureSource};
    pub use crate::widgets::{Axes, BoxWidget, Label, Title};

    pub use vista_engine::paint::Color;
    pub use vista_math::{Pointset, Range};
}
