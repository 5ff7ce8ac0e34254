//! Scroll burst lifecycle: Idle, Active, and the settle timer between them.
//!
//! There is no "scroll finished" signal to listen for, only discrete position
//! changes. A burst starts on the first change and ends once a settle window
//! passes with no further change. The window depends on what initiated the
//! burst: programmatic steps settle fast, wheel input trails long, and the
//! value is pinned when the burst starts even if other sources extend it.
//!
//! Instead of rescheduling a timeout on every position change, the tracker
//! records the instant of the last change and runs a single [`SettleMsg`]
//! chain: when the message fires it compares real elapsed time against the
//! window and either ends the burst or re-arms itself for the remainder.
//! Observable behavior matches a retriggerable timeout with one command per
//! update.

use bubbletea_rs::{tick, Cmd, Msg};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

static LAST_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

// Settling times differ by motion source; these mirror the behavior of the
// environments this widget is modeled on.
const STEP_SETTLE: Duration = Duration::from_millis(30);
const SELECTION_SETTLE: Duration = Duration::from_millis(50);
const WHEEL_SETTLE: Duration = Duration::from_millis(100);

/// What initiated (or extended) a motion burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCause {
    /// A directional step request.
    Step,
    /// Selection auto-scroll bringing an item into view.
    Selection,
    /// Pointer-wheel input reinterpreted as horizontal motion.
    Wheel,
}

/// Message probing whether the current burst has gone quiet.
#[derive(Debug, Clone)]
pub struct SettleMsg {
    /// Id of the tracker instance the probe targets.
    pub id: usize,
    /// Burst generation; probes from ended bursts are ignored.
    pub tag: usize,
}

/// Outcome of a settle probe.
pub enum Settle {
    /// The window elapsed with no further motion; the burst is over.
    Ended,
    /// Motion happened since arming; re-armed for the remainder.
    Pending(Cmd),
}

/// Converts position-change observations into burst state.
#[derive(Debug, Clone)]
pub struct Tracker {
    id: usize,
    tag: usize,
    scrolling: bool,
    window: Duration,
    burst_window: Duration,
    override_window: Option<Duration>,
    last_motion: Instant,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    /// Creates an idle tracker. The lingering window starts at the selection
    /// value, so unattributed motion before any cause is seen settles like an
    /// into-view move.
    pub fn new() -> Self {
        Self {
            id: next_id(),
            tag: 0,
            scrolling: false,
            window: SELECTION_SETTLE,
            burst_window: SELECTION_SETTLE,
            override_window: None,
            last_motion: Instant::now(),
        }
    }

    /// Unique id of this tracker instance.
    pub fn id(&self) -> usize {
        self.id
    }

    /// True while a burst is active.
    pub fn scrolling(&self) -> bool {
        self.scrolling
    }

    /// The settle window currently lingering for the next burst.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces every per-cause settle window with a single value.
    pub fn set_override(&mut self, window: Option<Duration>) {
        self.override_window = window;
    }

    /// Records the cause about to produce motion. Updates the lingering
    /// window; the window of an already-running burst stays pinned.
    pub fn set_cause(&mut self, cause: MotionCause) {
        self.window = self.override_window.unwrap_or(match cause {
            MotionCause::Step => STEP_SETTLE,
            MotionCause::Selection => SELECTION_SETTLE,
            MotionCause::Wheel => WHEEL_SETTLE,
        });
    }

    /// Records one position change. Returns true when this change started a
    /// new burst (the caller emits the start event and arms the probe).
    pub fn note_motion(&mut self) -> bool {
        self.last_motion = Instant::now();
        if self.scrolling {
            false
        } else {
            self.scrolling = true;
            self.burst_window = self.window;
            true
        }
    }

    /// Arms the settle probe for the current burst, orphaning any probe from
    /// an earlier generation.
    pub fn arm(&mut self) -> Cmd {
        self.tag += 1;
        self.probe(self.burst_window)
    }

    /// Whether the probe belongs to the current burst generation.
    pub fn accepts(&self, msg: &SettleMsg) -> bool {
        msg.id == self.id && msg.tag == self.tag && self.scrolling
    }

    /// Answers a settle probe: either the burst ended, or motion happened in
    /// the meantime and the probe re-arms for the remainder of the window.
    pub fn settle(&mut self, now: Instant) -> Settle {
        let elapsed = now.saturating_duration_since(self.last_motion);
        if elapsed >= self.burst_window {
            self.scrolling = false;
            Settle::Ended
        } else {
            Settle::Pending(self.probe(self.burst_window - elapsed))
        }
    }

    /// Ends any burst and orphans pending probes.
    pub fn reset(&mut self) {
        self.tag += 1;
        self.scrolling = false;
        self.window = self.override_window.unwrap_or(SELECTION_SETTLE);
    }

    fn probe(&self, delay: Duration) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        tick(delay, move |_| Box::new(SettleMsg { id, tag }) as Msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_selects_window() {
        let mut t = Tracker::new();
        assert_eq!(t.window(), Duration::from_millis(50));
        t.set_cause(MotionCause::Step);
        assert_eq!(t.window(), Duration::from_millis(30));
        t.set_cause(MotionCause::Wheel);
        assert_eq!(t.window(), Duration::from_millis(100));
        t.set_cause(MotionCause::Selection);
        assert_eq!(t.window(), Duration::from_millis(50));
    }

    #[test]
    fn test_override_replaces_every_window() {
        let mut t = Tracker::new();
        t.set_override(Some(Duration::from_millis(5)));
        t.set_cause(MotionCause::Wheel);
        assert_eq!(t.window(), Duration::from_millis(5));
        t.set_cause(MotionCause::Step);
        assert_eq!(t.window(), Duration::from_millis(5));
    }

    #[test]
    fn test_first_motion_starts_burst() {
        let mut t = Tracker::new();
        assert!(!t.scrolling());
        assert!(t.note_motion());
        assert!(t.scrolling());
        assert!(!t.note_motion());
        assert!(t.scrolling());
    }

    #[test]
    fn test_settle_after_quiet_window() {
        let mut t = Tracker::new();
        t.set_cause(MotionCause::Step);
        t.note_motion();
        let _probe = t.arm();

        // probe arrives before the window is up
        match t.settle(t.last_motion + Duration::from_millis(10)) {
            Settle::Pending(_) => {}
            Settle::Ended => panic!("burst ended early"),
        }
        assert!(t.scrolling());

        // quiet for the full window
        match t.settle(t.last_motion + Duration::from_millis(31)) {
            Settle::Ended => {}
            Settle::Pending(_) => panic!("burst should have ended"),
        }
        assert!(!t.scrolling());
    }

    #[test]
    fn test_burst_window_pinned_at_start() {
        let mut t = Tracker::new();
        t.set_cause(MotionCause::Wheel);
        t.note_motion();
        let _probe = t.arm();
        // a step request mid-burst changes the lingering window only
        t.set_cause(MotionCause::Step);
        t.note_motion();

        match t.settle(t.last_motion + Duration::from_millis(50)) {
            Settle::Pending(_) => {}
            Settle::Ended => panic!("pinned wheel window should still be open"),
        }
        match t.settle(t.last_motion + Duration::from_millis(101)) {
            Settle::Ended => {}
            Settle::Pending(_) => panic!("pinned wheel window should have elapsed"),
        }

        // the next burst picks up the lingering step window
        assert!(t.note_motion());
        assert_eq!(t.burst_window, Duration::from_millis(30));
    }

    #[test]
    fn test_stale_probe_rejected() {
        let mut t = Tracker::new();
        t.note_motion();
        let _probe = t.arm();
        let stale = SettleMsg {
            id: t.id,
            tag: t.tag,
        };
        t.reset();
        assert!(!t.accepts(&stale));
        assert!(!t.scrolling());
    }

    #[test]
    fn test_probe_ignored_when_idle() {
        let mut t = Tracker::new();
        let msg = SettleMsg {
            id: t.id,
            tag: t.tag,
        };
        assert!(!t.accepts(&msg));
    }
}
