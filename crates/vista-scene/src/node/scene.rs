use std::cell::RefCell;
use std::collections::HashSet;

use glam::{DMat4, DVec3};
use vista_engine::coords::Rect;
use vista_engine::paint::Color;
use vista_engine::scene::TextureOp;
use vista_math::Range;

use crate::error::{Result, VistaError};
use crate::events::{Event, EventKind, HandlerFn, HandlerId};

use super::{compose, Behavior, Bounds, Node, NodeCx, NodeId, NodeKind, Position, Transform, WidgetData, WorldData};

/// Selector for [`Scene::find_objects`].
pub enum Pattern<'a> {
    /// Behavior type test, usually built with [`Pattern::of`].
    Type(fn(&dyn Behavior) -> bool),
    Predicate(&'a dyn Fn(NodeId, &Node) -> bool),
    /// Behaviors exposing the named attribute.
    Attribute(&'a str),
}

impl Pattern<'static> {
    pub fn of<T: Behavior>() -> Self {
        Pattern::Type(|b| b.as_any().is::<T>())
    }
}

impl Pattern<'_> {
    fn matches(&self, id: NodeId, node: &Node) -> bool {
        match self {
            Pattern::Type(test) => node.behavior.as_deref().is_some_and(test),
            Pattern::Predicate(f) => f(id, node),
            Pattern::Attribute(name) => node.behavior.as_deref().is_some_and(|b| b.has_attribute(name)),
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena holding the node tree of one figure.
///
/// Lookups through a stale [`NodeId`] fail with
/// [`VistaError::DestroyedNode`]; the first such lookup per id is logged.
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    warned: RefCell<HashSet<NodeId>>,
    released: Vec<TextureOp>,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene").field("root", &self.root).field("nodes", &self.len()).finish()
    }
}

fn zero_rect() -> Rect {
    Rect::new(0.0, 0.0, 0.0, 0.0)
}

fn root_position(w: f32, h: f32) -> Position {
    use super::Field::Pixels;
    Position::from_fields([Pixels(0.0), Pixels(0.0), Pixels(w), Pixels(h)])
}

impl Scene {
    /// Creates a scene whose root widget spans `size` pixels.
    pub fn new(root: Option<Box<dyn Behavior>>, size: (f32, f32)) -> Self {
        let mut scene =
            Self { slots: Vec::new(), free: Vec::new(), root: NodeId::from_raw(0, 0), warned: RefCell::default(), released: Vec::new() };
        let kind = NodeKind::Widget(WidgetData::new(root_position(size.0, size.1)));
        scene.root = scene.alloc(Node::new(kind, root));
        scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::from_raw(index, slot.generation)
        } else {
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId::from_raw((self.slots.len() - 1) as u32, 0)
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn stale(&self, id: NodeId) -> VistaError {
        if self.warned.borrow_mut().insert(id) {
            log::warn!("access to destroyed node {id}");
        }
        VistaError::DestroyedNode(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or_else(|| self.stale(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        if self.get(id).is_none() {
            return Err(self.stale(id));
        }
        self.get_mut(id).ok_or(VistaError::DestroyedNode(id))
    }

    // ── structure ─────────────────────────────────────────────────────────

    fn insert(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.alloc(node);
        self.attach(id, parent);
        Ok(id)
    }

    fn attach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(n) = self.get_mut(id) {
            n.parent = Some(parent);
        }
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else { return };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
    }

    /// Adds a widget under a widget parent.
    pub fn add_widget(&mut self, parent: NodeId, position: Position, behavior: Box<dyn Behavior>) -> Result<NodeId> {
        if !self.node(parent)?.is_widget() {
            return Err(VistaError::invalid(format!("widget {} needs a widget parent", behavior.type_name())));
        }
        self.insert(parent, Node::new(NodeKind::Widget(WidgetData::new(position)), Some(behavior)))
    }

    /// Adds a world object under a world object or under a widget hosting
    /// a world (an axes).
    pub fn add_world(&mut self, parent: NodeId, behavior: Box<dyn Behavior>) -> Result<NodeId> {
        self.insert(parent, Node::new(NodeKind::World(WorldData::default()), Some(behavior)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| &n.children)
    }

    /// Moves `id` under `parent`, or detaches it with `None`. A detached
    /// node stays alive but is not drawn.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        if id == self.root {
            return Err(VistaError::invalid("the root cannot be reparented"));
        }
        let is_widget = self.node(id)?.is_widget();
        if let Some(p) = parent {
            let pnode = self.node(p)?;
            if is_widget && !pnode.is_widget() {
                return Err(VistaError::invalid("a widget cannot live under a world object"));
            }
            if p == id || self.is_ancestor(id, p) {
                return Err(VistaError::invalid("reparenting would create a cycle"));
            }
        }
        let before = self.snapshot_rects(id);
        self.detach(id);
        if let Some(p) = parent {
            self.attach(id, p);
        }
        self.invalidate_subtree(id);
        self.fire_moved(before);
        Ok(())
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// `start` and its live descendants in pre-order.
    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(n) = self.get(id) else { continue };
            out.push(id);
            stack.extend(n.children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `start` (excluding it) matching `pattern`, in pre-order.
    pub fn find_objects(&self, start: NodeId, pattern: &Pattern<'_>) -> Vec<NodeId> {
        self.preorder(start)
            .into_iter()
            .skip(1)
            .filter(|&id| self.get(id).is_some_and(|n| pattern.matches(id, n)))
            .collect()
    }

    // ── flags ─────────────────────────────────────────────────────────────

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_hit_test(&mut self, id: NodeId, hit_test: bool) -> Result<()> {
        self.node_mut(id)?.hit_test = hit_test;
        Ok(())
    }

    pub(crate) fn set_draw_id(&mut self, id: NodeId, draw_id: Option<u32>) {
        if let Some(n) = self.get_mut(id) {
            n.draw_id = draw_id;
        }
    }

    // ── behaviors ─────────────────────────────────────────────────────────

    pub fn behavior<T: Behavior>(&self, id: NodeId) -> Option<&T> {
        self.get(id)?.behavior.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn behavior_mut<T: Behavior>(&mut self, id: NodeId) -> Option<&mut T> {
        self.get_mut(id)?.behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Runs `f` with the node's behavior checked out of the tree.
    pub fn with_behavior<R>(&mut self, id: NodeId, f: impl FnOnce(&mut dyn Behavior, NodeCx<'_>) -> R) -> Option<R> {
        let mut b = self.get_mut(id)?.behavior.take()?;
        let out = f(b.as_mut(), NodeCx { id, scene: &*self });
        if let Some(n) = self.get_mut(id) {
            n.behavior = Some(b);
        }
        Some(out)
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Binds a handler. Binding an input kind makes the node hit-testable.
    pub fn bind(&mut self, id: NodeId, kind: EventKind, owner: Option<NodeId>, callback: HandlerFn) -> Result<HandlerId> {
        let node = self.node_mut(id)?;
        if kind.is_pointer() {
            node.hit_test = true;
        }
        Ok(node.handlers.bind(kind, owner, callback))
    }

    pub fn unbind(&mut self, id: NodeId, handler: HandlerId) -> Result<bool> {
        Ok(self.node_mut(id)?.handlers.unbind(handler))
    }

    /// Fires the node's handlers for `event.kind`; returns whether one
    /// consumed it.
    pub fn fire(&mut self, id: NodeId, event: &Event) -> bool {
        let Some(mut handlers) = self.get_mut(id).map(|n| std::mem::take(&mut n.handlers)) else {
            return false;
        };
        let consumed = handlers.fire(event, |owner| self.contains(owner));
        if let Some(n) = self.get_mut(id) {
            n.handlers = handlers;
        }
        consumed
    }

    // ── world objects ─────────────────────────────────────────────────────

    pub fn set_transforms(&mut self, id: NodeId, transforms: Vec<Transform>) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::World(w) => {
                w.transforms = transforms;
                Ok(())
            }
            NodeKind::Widget(_) => Err(VistaError::invalid("widgets have no transformation list")),
        }
    }

    /// Union of the bounds of every world object below `id`, each mapped
    /// through its transformation chain.
    pub fn world_bounds(&self, id: NodeId) -> Option<Bounds> {
        let mut acc = [Range::empty(); 3];
        for &c in self.children(id) {
            if self.get(c).is_some_and(Node::is_world) {
                self.collect_bounds(c, DMat4::IDENTITY, &mut acc);
            }
        }
        acc.iter().all(|r| !r.is_empty()).then_some(acc)
    }

    fn collect_bounds(&self, id: NodeId, parent: DMat4, acc: &mut Bounds) {
        let Some(node) = self.get(id) else { return };
        let m = parent * compose(node.transforms());
        if let Some(b) = node.behavior.as_deref().and_then(|b| b.bounds()) {
            for i in 0..8 {
                let corner = DVec3::new(
                    if i & 1 == 0 { b[0].min } else { b[0].max },
                    if i & 2 == 0 { b[1].min } else { b[1].max },
                    if i & 4 == 0 { b[2].min } else { b[2].max },
                );
                let p = m.transform_point3(corner);
                acc[0].include(p.x);
                acc[1].include(p.y);
                acc[2].include(p.z);
            }
        }
        for &c in &node.children {
            self.collect_bounds(c, m, acc);
        }
    }

    // ── widgets ───────────────────────────────────────────────────────────

    pub fn widget(&self, id: NodeId) -> Result<&WidgetData> {
        self.node(id)?.widget().ok_or_else(|| VistaError::invalid("not a widget"))
    }

    fn widget_mut(&mut self, id: NodeId) -> Result<&mut WidgetData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Widget(w) => Ok(w),
            NodeKind::World(_) => Err(VistaError::invalid("not a widget")),
        }
    }

    pub fn set_background(&mut self, id: NodeId, color: Color) -> Result<()> {
        self.widget_mut(id)?.background = color;
        Ok(())
    }

    pub fn set_edge(&mut self, id: NodeId, color: Color, width: f32) -> Result<()> {
        let w = self.widget_mut(id)?;
        w.edge_color = color;
        w.edge_width = width.max(0.0);
        Ok(())
    }

    /// Absolute pixel rectangle of a widget, or of the nearest widget
    /// above a world object. Dead nodes report an empty rectangle.
    pub fn rect(&self, id: NodeId) -> Rect {
        self.abs_rect(id).unwrap_or_else(zero_rect)
    }

    /// Pixel rectangle relative to the parent widget.
    pub fn rel_rect(&self, id: NodeId) -> Rect {
        if self.abs_rect(id).is_none() {
            return zero_rect();
        }
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Widget(w)) => w.position.cached_rel().unwrap_or_else(zero_rect),
            _ => zero_rect(),
        }
    }

    fn abs_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.get(id)?;
        let NodeKind::Widget(w) = &node.kind else {
            return node.parent.and_then(|p| self.abs_rect(p));
        };
        if let Some(r) = w.position.cached_abs() {
            return Some(r);
        }
        let parent = node.parent.and_then(|p| self.abs_rect(p)).unwrap_or_else(zero_rect);
        let rel = w.position.resolve(parent.w, parent.h);
        let abs = Rect::new(parent.x + rel.x, parent.y + rel.y, rel.w, rel.h);
        w.position.store(rel, abs);
        Some(abs)
    }

    fn invalidate_subtree(&self, id: NodeId) {
        for n in self.preorder(id) {
            if let Some(NodeKind::Widget(w)) = self.get(n).map(|n| &n.kind) {
                w.position.invalidate();
            }
        }
    }

    fn snapshot_rects(&self, id: NodeId) -> Vec<(NodeId, Rect)> {
        self.preorder(id)
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(Node::is_widget))
            .map(|n| (n, self.rect(n)))
            .collect()
    }

    /// Fires `Position` on every widget whose rectangle differs from its
    /// snapshot; returns those widgets.
    fn fire_moved(&mut self, before: Vec<(NodeId, Rect)>) -> Vec<NodeId> {
        let mut moved = Vec::new();
        for (id, old) in before {
            let new = self.rect(id);
            if new != old {
                moved.push(id);
                let mut e = Event::new(EventKind::Position, id);
                e.abs_x = new.x;
                e.abs_y = new.y;
                let e = e.retarget(id, (new.x, new.y));
                self.fire(id, &e);
            }
        }
        moved
    }

    pub fn position(&self, id: NodeId) -> Result<&Position> {
        Ok(&self.widget(id)?.position)
    }

    /// Replaces a widget's position; descendants are re-laid out. Returns
    /// the widgets whose rectangle changed, each of which got a `Position`
    /// event.
    pub fn set_position(&mut self, id: NodeId, position: Position) -> Result<Vec<NodeId>> {
        if id == self.root {
            return Err(VistaError::invalid("the root follows the window size"));
        }
        let before = self.snapshot_rects(id);
        self.widget_mut(id)?.position = position;
        self.invalidate_subtree(id);
        Ok(self.fire_moved(before))
    }

    /// Resizes the root. Fires `Position` events only when the size changed.
    pub fn set_root_size(&mut self, w: f32, h: f32) -> Vec<NodeId> {
        let root = self.root;
        let current = self.rect(root);
        if !self.contains(root) || (current.w == w && current.h == h) {
            return Vec::new();
        }
        let before = self.snapshot_rects(root);
        if let Ok(data) = self.widget_mut(root) {
            data.position = root_position(w, h);
        }
        self.invalidate_subtree(root);
        self.fire_moved(before)
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Destroys `id` and its subtree, children first. Each behavior queues
    /// its GPU releases and then runs its destroy hook exactly once; the
    /// node detaches from its parent last. Returns the teardown order.
    /// Destroying a dead node does nothing.
    pub fn destroy(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut order = Vec::new();
        self.teardown(id, &mut order);
        self.detach(id);
        for &dead in &order {
            let slot = &mut self.slots[dead.index()];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(dead.index() as u32);
        }
        log::debug!("destroyed {} node(s) under {id}", order.len());
        order
    }

    fn teardown(&mut self, id: NodeId, order: &mut Vec<NodeId>) {
        let children = self.children(id).to_vec();
        for c in children {
            self.teardown(c, order);
        }
        let Some(node) = self.get_mut(id) else { return };
        let behavior = node.behavior.take();
        node.handlers.clear();
        if let Some(mut b) = behavior {
            b.on_destroy_gpu(&mut self.released);
            b.on_destroy();
        }
        order.push(id);
    }

    /// GPU releases queued by destroyed behaviors since the last call.
    pub fn take_released(&mut self) -> Vec<TextureOp> {
        std::mem::take(&mut self.released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        bounds: Option<Bounds>,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn Behavior> {
            Box::new(Probe { name, log: log.clone(), bounds: None })
        }
    }

    impl Behavior for Probe {
        fn type_name(&self) -> &'static str {
            "Probe"
        }

        fn on_destroy_gpu(&mut self, _releases: &mut Vec<TextureOp>) {
            self.log.borrow_mut().push(format!("gpu:{}", self.name));
        }

        fn on_destroy(&mut self) {
            self.log.borrow_mut().push(format!("destroy:{}", self.name));
        }

        fn bounds(&self) -> Option<Bounds> {
            self.bounds
        }

        fn has_attribute(&self, name: &str) -> bool {
            name == self.name
        }
    }

    struct Other;

    impl Behavior for Other {
        fn type_name(&self) -> &'static str {
            "Other"
        }
    }

    fn scene() -> (Scene, Rc<RefCell<Vec<String>>>) {
        (Scene::new(None, (400.0, 300.0)), Rc::new(RefCell::new(Vec::new())))
    }

    // ── structure ─────────────────────────────────────────────────────────

    #[test]
    fn child_lists_match_parent_links() {
        let (mut s, log) = scene();
        let a = s.add_widget(s.root(), Position::fill(), Probe::boxed("a", &log)).unwrap();
        let b = s.add_world(a, Probe::boxed("b", &log)).unwrap();
        assert_eq!(s.children(s.root()), &[a]);
        assert_eq!(s.parent(b), Some(a));
        assert!(s.is_ancestor(s.root(), b));
    }

    #[test]
    fn widget_under_world_is_rejected() {
        let (mut s, log) = scene();
        let w = s.add_world(s.root(), Probe::boxed("w", &log)).unwrap();
        let err = s.add_widget(w, Position::fill(), Probe::boxed("x", &log)).unwrap_err();
        assert!(matches!(err, VistaError::InvalidArgument(_)));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let (mut s, log) = scene();
        let a = s.add_widget(s.root(), Position::fill(), Probe::boxed("a", &log)).unwrap();
        let b = s.add_widget(a, Position::fill(), Probe::boxed("b", &log)).unwrap();
        assert!(s.set_parent(a, Some(b)).is_err());
        s.set_parent(b, None).unwrap();
        assert!(s.children(a).is_empty());
        assert!(s.contains(b));
    }

    #[test]
    fn find_objects_in_preorder() {
        let (mut s, log) = scene();
        let a = s.add_widget(s.root(), Position::fill(), Probe::boxed("a", &log)).unwrap();
        let a1 = s.add_world(a, Probe::boxed("a1", &log)).unwrap();
        let _o = s.add_world(a, Box::new(Other)).unwrap();
        let b = s.add_widget(s.root(), Position::fill(), Probe::boxed("b", &log)).unwrap();
        assert_eq!(s.find_objects(s.root(), &Pattern::of::<Probe>()), vec![a, a1, b]);
        assert_eq!(s.find_objects(s.root(), &Pattern::Attribute("a1")), vec![a1]);
        let is_world = |_: NodeId, n: &Node| n.is_world();
        assert_eq!(s.find_objects(a, &Pattern::Predicate(&is_world)).len(), 2);
    }

    #[test]
    fn behavior_downcast() {
        let (mut s, log) = scene();
        let a = s.add_world(s.root(), Probe::boxed("a", &log)).unwrap();
        assert!(s.behavior::<Other>(a).is_none());
        assert_eq!(s.behavior::<Probe>(a).map(|p| p.name), Some("a"));
        let seen = s.with_behavior(a, |b, cx| (b.type_name(), cx.scene.behavior::<Probe>(a).is_none()));
        assert_eq!(seen, Some(("Probe", true)));
        assert!(s.behavior::<Probe>(a).is_some());
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn destroy_runs_children_first_once() {
        let (mut s, log) = scene();
        let a = s.add_widget(s.root(), Position::fill(), Probe::boxed("a", &log)).unwrap();
        let b = s.add_world(a, Probe::boxed("b", &log)).unwrap();
        let order = s.destroy(a);
        assert_eq!(order, vec![b, a]);
        assert_eq!(*log.borrow(), vec!["gpu:b", "destroy:b", "gpu:a", "destroy:a"]);
        assert!(s.destroy(a).is_empty());
        assert_eq!(log.borrow().len(), 4);
        assert!(s.children(s.root()).is_empty());
    }

    #[test]
    fn stale_ids_fail_lookup() {
        let (mut s, log) = scene();
        let a = s.add_world(s.root(), Probe::boxed("a", &log)).unwrap();
        s.destroy(a);
        assert_eq!(s.node(a).unwrap_err(), VistaError::DestroyedNode(a));
        let b = s.add_world(s.root(), Probe::boxed("b", &log)).unwrap();
        assert_eq!(a.index(), b.index());
        assert!(!s.contains(a));
        assert!(s.contains(b));
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn absolute_rect_accumulates_offsets() {
        let (mut s, log) = scene();
        let a = s.add_widget(s.root(), Position::new(10.0, 20.0, 200.0, 100.0), Probe::boxed("a", &log)).unwrap();
        let b = s.add_widget(a, Position::new(0.5, 0.0, 0.5, 1.0), Probe::boxed("b", &log)).unwrap();
        assert_eq!(s.rect(b), Rect::new(110.0, 20.0, 100.0, 100.0));
        assert_eq!(s.rel_rect(b), Rect::new(100.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn root_resize_rescales_fractional_children_and_fires_once() {
        let (mut s, log) = scene();
        let a = s.add_widget(s.root(), Position::new(0.0, 0.0, 0.5, 0.5), Probe::boxed("a", &log)).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        s.bind(a, EventKind::Position, None, Box::new(move |_| {
            *h.borrow_mut() += 1;
            false
        }))
        .unwrap();
        let w0 = s.rect(a).w;
        let moved = s.set_root_size(800.0, 600.0);
        assert!(moved.contains(&a));
        assert_eq!(s.rect(a).w, 2.0 * w0);
        assert!(s.set_root_size(800.0, 600.0).is_empty());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn pointer_binding_enables_hit_test() {
        let (mut s, log) = scene();
        let a = s.add_world(s.root(), Probe::boxed("a", &log)).unwrap();
        assert!(!s.node(a).unwrap().hit_test());
        s.bind(a, EventKind::Position, None, Box::new(|_| false)).unwrap();
        assert!(!s.node(a).unwrap().hit_test());
        s.bind(a, EventKind::MouseDown, None, Box::new(|_| false)).unwrap();
        assert!(s.node(a).unwrap().hit_test());
    }

    // ── bounds ────────────────────────────────────────────────────────────

    #[test]
    fn world_bounds_apply_transforms() {
        let (mut s, log) = scene();
        let b = [Range::new(0.0, 1.0), Range::new(0.0, 2.0), Range::new(0.0, 0.0)];
        let w = s.add_world(s.root(), Box::new(Probe { name: "w", log: log.clone(), bounds: Some(b) })).unwrap();
        s.set_transforms(w, vec![Transform::Translate(DVec3::new(5.0, 0.0, 0.0))]).unwrap();
        let got = s.world_bounds(s.root()).unwrap();
        assert_eq!(got[0], Range::new(5.0, 6.0));
        assert_eq!(got[1], Range::new(0.0, 2.0));
    }
}
