//! Screen-space widgets: boxes, labels and the axes that host world
//! objects.

mod axes;
mod boxes;

pub use axes::{axes_position, Axes, AxesContainer};
pub use boxes::{paint_box, BoxWidget, Label, Title, TITLE_HEIGHT};
