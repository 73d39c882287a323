//! Event channels.
//!
//! Every node owns one channel per [`EventKind`]. Handlers fire newest
//! first; a handler returning `true` consumes the event. A handler may name
//! an owner node: once that node is destroyed the handler is dropped the
//! next time the channel fires.

use std::collections::HashMap;
use std::fmt;

use vista_engine::input::{Key, Modifiers, MouseButton};

use crate::node::NodeId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    Enter,
    Leave,
    MouseDown,
    MouseUp,
    Motion,
    Wheel,
    DoubleClick,
    KeyDown,
    KeyUp,
    /// The node's pixel rectangle changed.
    Position,
    /// The figure is closing.
    Close,
    /// A frame was presented.
    AfterDraw,
}

impl EventKind {
    /// Input kinds; binding one of these makes the node hit-testable.
    pub fn is_pointer(self) -> bool {
        matches!(
            self,
            EventKind::Enter
                | EventKind::Leave
                | EventKind::MouseDown
                | EventKind::MouseUp
                | EventKind::Motion
                | EventKind::Wheel
                | EventKind::DoubleClick
        )
    }
}

/// Event payload.
///
/// `x, y` are relative to the node the event fires on; `abs_x, abs_y` to the
/// figure. Key fields are set for key events only.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub owner: NodeId,
    pub x: f32,
    pub y: f32,
    pub abs_x: f32,
    pub abs_y: f32,
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
    pub key: Option<Key>,
    pub text: Option<String>,
    /// Wheel notches, positive away from the user.
    pub wheel: f32,
}

impl Event {
    pub fn new(kind: EventKind, owner: NodeId) -> Self {
        Self {
            kind,
            owner,
            x: 0.0,
            y: 0.0,
            abs_x: 0.0,
            abs_y: 0.0,
            button: None,
            modifiers: Modifiers::default(),
            key: None,
            text: None,
            wheel: 0.0,
        }
    }

    /// Copy of the event retargeted to `owner`, with relative coordinates
    /// against `origin` (the owner's absolute top-left).
    pub fn retarget(&self, owner: NodeId, origin: (f32, f32)) -> Self {
        Self { owner, x: self.abs_x - origin.0, y: self.abs_y - origin.1, ..self.clone() }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HandlerId(u64);

pub type HandlerFn = Box<dyn FnMut(&Event) -> bool>;

struct Handler {
    id: HandlerId,
    owner: Option<NodeId>,
    callback: HandlerFn,
}

/// Handlers bound to one event kind of one node.
#[derive(Default)]
pub struct EventChannel {
    handlers: Vec<Handler>,
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel").field("handlers", &self.handlers.len()).finish()
    }
}

impl EventChannel {
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Fires handlers newest first until one consumes the event. Handlers
    /// whose owner is dead are removed first.
    pub fn fire(&mut self, event: &Event, is_alive: impl Fn(NodeId) -> bool) -> bool {
        self.handlers.retain(|h| h.owner.is_none_or(&is_alive));
        for h in self.handlers.iter_mut().rev() {
            if (h.callback)(event) {
                return true;
            }
        }
        false
    }
}

/// All channels of one node.
#[derive(Debug, Default)]
pub struct Handlers {
    channels: HashMap<EventKind, EventChannel>,
    next_id: u64,
}

impl Handlers {
    pub fn bind(&mut self, kind: EventKind, owner: Option<NodeId>, callback: HandlerFn) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.channels.entry(kind).or_default().handlers.push(Handler { id, owner, callback });
        id
    }

    /// Removes one handler; returns whether it was bound.
    pub fn unbind(&mut self, id: HandlerId) -> bool {
        let mut found = false;
        for ch in self.channels.values_mut() {
            let before = ch.handlers.len();
            ch.handlers.retain(|h| h.id != id);
            found |= ch.handlers.len() != before;
        }
        found
    }

    pub fn unbind_all(&mut self, kind: EventKind) {
        self.channels.remove(&kind);
    }

    pub fn has(&self, kind: EventKind) -> bool {
        self.channels.get(&kind).is_some_and(|c| !c.is_empty())
    }

    pub fn has_pointer_handlers(&self) -> bool {
        self.channels.iter().any(|(k, c)| k.is_pointer() && !c.is_empty())
    }

    pub fn fire(&mut self, event: &Event, is_alive: impl Fn(NodeId) -> bool) -> bool {
        match self.channels.get_mut(&event.kind) {
            Some(ch) => ch.fire(event, is_alive),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn node(i: u32) -> NodeId {
        NodeId::from_raw(i, 1)
    }

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, consume: bool) -> HandlerFn {
        let log = log.clone();
        Box::new(move |_| {
            log.borrow_mut().push(name);
            consume
        })
    }

    // ── order ─────────────────────────────────────────────────────────────

    #[test]
    fn newest_handler_fires_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut h = Handlers::default();
        h.bind(EventKind::MouseDown, None, recorder(&log, "first", false));
        h.bind(EventKind::MouseDown, None, recorder(&log, "second", false));
        assert!(!h.fire(&Event::new(EventKind::MouseDown, node(0)), |_| true));
        assert_eq!(*log.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn consuming_handler_stops_propagation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut h = Handlers::default();
        h.bind(EventKind::KeyDown, None, recorder(&log, "old", false));
        h.bind(EventKind::KeyDown, None, recorder(&log, "new", true));
        assert!(h.fire(&Event::new(EventKind::KeyDown, node(0)), |_| true));
        assert_eq!(*log.borrow(), vec!["new"]);
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn dead_owner_is_pruned_on_fire() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut h = Handlers::default();
        h.bind(EventKind::Motion, Some(node(7)), recorder(&log, "dead", false));
        h.bind(EventKind::Motion, None, recorder(&log, "free", false));
        h.fire(&Event::new(EventKind::Motion, node(0)), |id| id != node(7));
        assert_eq!(*log.borrow(), vec!["free"]);
        assert_eq!(h.channels[&EventKind::Motion].len(), 1);
    }

    #[test]
    fn unbind_by_id() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut h = Handlers::default();
        let id = h.bind(EventKind::Enter, None, recorder(&log, "x", false));
        assert!(h.has_pointer_handlers());
        assert!(h.unbind(id));
        assert!(!h.unbind(id));
        assert!(!h.has(EventKind::Enter));
    }

    #[test]
    fn position_is_not_a_pointer_kind() {
        let mut h = Handlers::default();
        h.bind(EventKind::Position, None, Box::new(|_| false));
        assert!(!h.has_pointer_handlers());
    }

    #[test]
    fn retarget_makes_coordinates_relative() {
        let mut e = Event::new(EventKind::Motion, node(0));
        e.abs_x = 50.0;
        e.abs_y = 40.0;
        let r = e.retarget(node(2), (10.0, 15.0));
        assert_eq!((r.x, r.y), (40.0, 25.0));
        assert_eq!(r.owner, node(2));
    }
}
