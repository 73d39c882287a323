//! Scene tree nodes.
//!
//! Nodes live in a generational arena owned by [`Scene`]. A node is either a
//! widget (positioned in pixels inside its parent) or a world object (placed
//! in an axes' data space through its transformation list). Each node may
//! carry a [`Behavior`] that draws it and reacts to events.

mod position;
mod scene;
mod transform;

use std::any::Any;
use std::fmt;

use vista_engine::coords::Rect;
use vista_engine::paint::Color;
use vista_engine::scene::TextureOp;
use vista_math::Range;

use crate::draw::DrawContext;
use crate::error::Result;
use crate::events::{Event, EventKind, Handlers};
use crate::timer::{TimerAction, TimerSpec};

pub use position::{Field, Position};
pub use scene::{Pattern, Scene};
pub use transform::{compose, Transform};

/// Generational handle of a node. A stale handle never aliases a newer node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Pixel placement and box paint of a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetData {
    pub position: Position,
    pub background: Color,
    pub edge_color: Color,
    /// Zero draws no edge.
    pub edge_width: f32,
}

impl WidgetData {
    pub fn new(position: Position) -> Self {
        Self { position, background: Color::TRANSPARENT, edge_color: Color::BLACK, edge_width: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldData {
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Widget(WidgetData),
    World(WorldData),
}

/// Data-space extent of a world object, one range per axis (x, y, z).
pub type Bounds = [Range; 3];

/// Upcasting helper so behaviors can be downcast by concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Read access to a node and the tree around it while one of its hooks runs.
///
/// The running node's own behavior is checked out of the tree for the
/// duration of the hook, so lookups of it through `scene` return `None`.
#[derive(Copy, Clone)]
pub struct NodeCx<'a> {
    pub id: NodeId,
    pub scene: &'a Scene,
}

impl<'a> NodeCx<'a> {
    pub fn node(&self) -> Option<&'a Node> {
        self.scene.node(self.id).ok()
    }

    /// Absolute rectangle of the node, or of the nearest widget above a
    /// world object.
    pub fn rect(&self) -> Rect {
        self.scene.rect(self.id)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.scene.parent(self.id)
    }

    pub fn children(&self) -> &'a [NodeId] {
        self.scene.children(self.id)
    }

    /// Nearest ancestor whose behavior is a `T`.
    pub fn ancestor<T: Behavior>(&self) -> Option<(NodeId, &'a T)> {
        let mut cur = self.scene.parent(self.id);
        while let Some(id) = cur {
            if let Some(b) = self.scene.behavior::<T>(id) {
                return Some((id, b));
            }
            cur = self.scene.parent(id);
        }
        None
    }
}

/// Side effects an event hook asks the figure to carry out.
#[derive(Debug, Default)]
pub struct Requests {
    /// `Some(fast)` schedules a redraw.
    pub draw: Option<bool>,
    pub timers: Vec<(TimerSpec, TimerAction)>,
    /// Stop every timer owned by the handling node.
    pub stop_timers: bool,
}

impl Requests {
    pub fn redraw(&mut self, fast: bool) {
        // A full redraw wins over a fast one.
        self.draw = Some(match self.draw {
            Some(prev) => prev && fast,
            None => fast,
        });
    }
}

/// Node behavior: drawing, event reaction and teardown.
///
/// Every hook has a default so a behavior implements only what it needs.
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    fn type_name(&self) -> &'static str;

    /// Normal and fast passes.
    fn on_draw(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Shape pass: draw the silhouette in [`DrawContext::shape_color`].
    fn on_draw_shape(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Screen pass: pixel overlays anchored at projected world positions.
    fn on_draw_screen(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// A widget hosting world children sets up the world projection here and
    /// returns `true`; returning `false` skips the world children.
    fn enter_world(&mut self, node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> bool {
        false
    }

    /// Event kinds this behavior wants routed to it without a handler bound.
    fn wants(&self, kind: EventKind) -> bool {
        false
    }

    /// Returns `true` to consume the event.
    fn on_event(&mut self, node: NodeCx<'_>, event: &Event, requests: &mut Requests) -> bool {
        false
    }

    /// Queues release of GPU resources; runs before [`Behavior::on_destroy`].
    fn on_destroy_gpu(&mut self, releases: &mut Vec<TextureOp>) {}

    fn on_destroy(&mut self) {}

    /// Data extent for automatic limits; `None` does not contribute.
    fn bounds(&self) -> Option<Bounds> {
        None
    }

    fn has_attribute(&self, name: &str) -> bool {
        false
    }
}

/// One slot of the tree.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) visible: bool,
    pub(crate) hit_test: bool,
    pub(crate) draw_id: Option<u32>,
    pub(crate) kind: NodeKind,
    pub(crate) handlers: Handlers,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) draw_failed: bool,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("visible", &self.visible)
            .field("hit_test", &self.hit_test)
            .field("draw_id", &self.draw_id)
            .field("behavior", &self.behavior.as_deref().map(|b| b.type_name()))
            .finish()
    }
}

impl Node {
    pub(crate) fn new(kind: NodeKind, behavior: Option<Box<dyn Behavior>>) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            visible: true,
            hit_test: false,
            draw_id: None,
            kind,
            handlers: Handlers::default(),
            behavior,
            draw_failed: false,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hit_test(&self) -> bool {
        self.hit_test
    }

    /// Picking id from the last frame, if one was assigned.
    pub fn draw_id(&self) -> Option<u32> {
        self.draw_id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_widget(&self) -> bool {
        matches!(self.kind, NodeKind::Widget(_))
    }

    pub fn is_world(&self) -> bool {
        matches!(self.kind, NodeKind::World(_))
    }

    pub fn widget(&self) -> Option<&WidgetData> {
        match &self.kind {
            NodeKind::Widget(w) => Some(w),
            NodeKind::World(_) => None,
        }
    }

    pub fn transforms(&self) -> &[Transform] {
        match &self.kind {
            NodeKind::World(w) => &w.transforms,
            NodeKind::Widget(_) => &[],
        }
    }

    pub fn behavior(&self) -> Option<&dyn Behavior> {
        self.behavior.as_deref()
    }

    pub fn type_name(&self) -> &'static str {
        self.behavior.as_deref().map_or("node", |b| b.type_name())
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Whether an event of `kind` has anyone to go to on this node.
    pub fn listens(&self, kind: EventKind) -> bool {
        self.handlers.has(kind) || self.behavior.as_deref().is_some_and(|b| b.wants(kind))
    }
}
