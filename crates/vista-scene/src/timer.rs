//! Timers polled from the host's idle hook.
//!
//! Timers never run on their own thread. The host calls
//! [`crate::Figure::process_events`] (directly, or through the winit idle
//! callback) and every timer that is due fires once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::node::NodeId;

// ── Clock ─────────────────────────────────────────────────────────────────

/// Time source for timers and redraw coalescing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { base: Instant::now(), offset: Rc::new(Cell::new(Duration::ZERO)) }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

// ── Timers ────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TimerId(u64);

/// What a timer does when it fires.
#[derive(Clone)]
pub enum TimerAction {
    /// Ask the backend for a paint.
    Redraw,
    /// Advance the fly camera of an axes.
    FlyStep(NodeId),
    Callback(Rc<RefCell<dyn FnMut()>>),
}

impl fmt::Debug for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerAction::Redraw => f.write_str("Redraw"),
            TimerAction::FlyStep(id) => write!(f, "FlyStep({id:?})"),
            TimerAction::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Scheduling of a timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerSpec {
    pub interval: Duration,
    /// Stop after the first fire.
    pub oneshot: bool,
    /// Schedule the next fire at `previous + interval` instead of
    /// `now + interval`, so the mean rate holds when polls are late.
    pub no_lag: bool,
}

impl TimerSpec {
    pub fn oneshot(interval: Duration) -> Self {
        Self { interval, oneshot: true, no_lag: false }
    }

    pub fn repeating(interval: Duration) -> Self {
        Self { interval, oneshot: false, no_lag: false }
    }

    pub fn with_no_lag(mut self) -> Self {
        self.no_lag = true;
        self
    }
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    spec: TimerSpec,
    /// Node the timer belongs to; the timer dies with it.
    owner: Option<NodeId>,
    action: TimerAction,
    due: Instant,
}

/// Pending timers of one figure.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a timer; the first fire is `spec.interval` after `now`.
    pub fn start(&mut self, now: Instant, spec: TimerSpec, owner: Option<NodeId>, action: TimerAction) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer { id, spec, owner, action, due: now + spec.interval });
        id
    }

    pub fn stop(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Stops every timer owned by `owner`.
    pub fn cancel_owner(&mut self, owner: NodeId) {
        self.timers.retain(|t| t.owner != Some(owner));
    }

    pub fn is_running(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn due_at(&self, id: TimerId) -> Option<Instant> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.due)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest pending fire time.
    pub fn next_due(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Collects the actions of all due timers in due order and reschedules
    /// them. Timers whose owner is no longer alive are dropped unfired.
    pub fn poll(&mut self, now: Instant, is_alive: impl Fn(NodeId) -> bool) -> Vec<(TimerId, TimerAction)> {
        self.timers.retain(|t| t.owner.is_none_or(&is_alive));

        let mut fired: Vec<(Instant, TimerId, TimerAction)> = Vec::new();
        for t in self.timers.iter_mut().filter(|t| t.due <= now) {
            fired.push((t.due, t.id, t.action.clone()));
            t.due = if t.spec.no_lag { t.due + t.spec.interval } else { now + t.spec.interval };
        }
        let done: Vec<TimerId> = fired.iter().map(|f| f.1).collect();
        self.timers.retain(|t| !(t.spec.oneshot && done.contains(&t.id)));

        fired.sort_by_key(|f| (f.0, f.1));
        fired.into_iter().map(|(_, id, action)| (id, action)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn alive(_: NodeId) -> bool {
        true
    }

    // ── clock ─────────────────────────────────────────────────────────────

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let t0 = b.now();
        a.advance(ms(25));
        assert_eq!(b.now() - t0, ms(25));
    }

    // ── scheduling ────────────────────────────────────────────────────────

    #[test]
    fn oneshot_fires_once() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new();
        q.start(clock.now(), TimerSpec::oneshot(ms(10)), None, TimerAction::Redraw);

        assert!(q.poll(clock.now(), alive).is_empty());
        clock.advance(ms(10));
        assert_eq!(q.poll(clock.now(), alive).len(), 1);
        clock.advance(ms(10));
        assert!(q.poll(clock.now(), alive).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn lagging_timer_reschedules_from_now() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let mut q = TimerQueue::new();
        let id = q.start(t0, TimerSpec::repeating(ms(50)), None, TimerAction::Redraw);
        clock.advance(ms(70));
        q.poll(clock.now(), alive);
        assert_eq!(q.due_at(id), Some(t0 + ms(120)));
    }

    #[test]
    fn no_lag_timer_reschedules_from_previous() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let mut q = TimerQueue::new();
        let id = q.start(t0, TimerSpec::repeating(ms(50)).with_no_lag(), None, TimerAction::Redraw);
        clock.advance(ms(70));
        q.poll(clock.now(), alive);
        assert_eq!(q.due_at(id), Some(t0 + ms(100)));
    }

    #[test]
    fn next_due_is_earliest() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let mut q = TimerQueue::new();
        q.start(t0, TimerSpec::oneshot(ms(30)), None, TimerAction::Redraw);
        q.start(t0, TimerSpec::oneshot(ms(10)), None, TimerAction::Redraw);
        assert_eq!(q.next_due(), Some(t0 + ms(10)));
    }

    // ── ownership ─────────────────────────────────────────────────────────

    #[test]
    fn dead_owner_drops_timer() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new();
        let owner = NodeId::from_raw(3, 1);
        q.start(clock.now(), TimerSpec::repeating(ms(5)), Some(owner), TimerAction::FlyStep(owner));
        clock.advance(ms(5));
        assert!(q.poll(clock.now(), |_| false).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_owner_keeps_others() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new();
        let a = NodeId::from_raw(1, 1);
        let b = NodeId::from_raw(2, 1);
        q.start(clock.now(), TimerSpec::repeating(ms(5)), Some(a), TimerAction::FlyStep(a));
        let keep = q.start(clock.now(), TimerSpec::repeating(ms(5)), Some(b), TimerAction::FlyStep(b));
        q.cancel_owner(a);
        assert_eq!(q.len(), 1);
        assert!(q.is_running(keep));
    }

    #[test]
    fn callback_action_runs() {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let action = TimerAction::Callback(Rc::new(RefCell::new(move || h.set(h.get() + 1))));
        let clock = ManualClock::new();
        let mut q = TimerQueue::new();
        q.start(clock.now(), TimerSpec::oneshot(ms(1)), None, action);
        clock.advance(ms(1));
        for (_, a) in q.poll(clock.now(), alive) {
            if let TimerAction::Callback(f) = a {
                (f.borrow_mut())();
            }
        }
        assert_eq!(hits.get(), 1);
    }
}
