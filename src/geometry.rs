//! Overflow detection and the debounced measurement pass.
//!
//! The monitor answers one question: does the content overflow the viewport?
//! Measurements are scheduled, not run inline, so a storm of resize
//! notifications coalesces into a single pass: every scheduling bumps the
//! monitor's tag and only a [`MeasureMsg`] carrying the current tag is
//! accepted. The answer is tracked as `Option<bool>` so the very first
//! measurement always counts as a change, whatever its value.

use bubbletea_rs::{tick, Cmd, Msg};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static LAST_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

// Measured extents of styled content can disagree with the viewport by a
// fraction of a column; a strict comparison would flap.
const OVERFLOW_TOLERANCE: f64 = 1.0;

/// Message that fires a pending debounced measurement.
#[derive(Debug, Clone)]
pub struct MeasureMsg {
    /// Id of the monitor instance the measurement targets.
    pub id: usize,
    /// Scheduling generation; older generations are ignored.
    pub tag: usize,
}

/// Pure overflow decision with the measurement tolerance applied.
pub fn overflows(content: f64, viewport: f64) -> bool {
    content.floor() > viewport.ceil() + OVERFLOW_TOLERANCE
}

/// Tracks the overflow state and coalesces measurement requests.
#[derive(Debug, Clone)]
pub struct Monitor {
    id: usize,
    tag: usize,
    debounce: Option<Duration>,
    scrollable: Option<bool>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    /// Creates a monitor that has never measured.
    pub fn new() -> Self {
        Self {
            id: next_id(),
            tag: 0,
            debounce: None,
            scrollable: None,
        }
    }

    /// Unique id of this monitor instance.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Last measured overflow state; false before the first measurement.
    pub fn scrollable(&self) -> bool {
        self.scrollable.unwrap_or(false)
    }

    /// True once at least one measurement has completed.
    pub fn measured(&self) -> bool {
        self.scrollable.is_some()
    }

    /// Sets the debounce delay. `None` fires on the next runtime tick.
    pub fn set_debounce(&mut self, delay: Option<Duration>) {
        self.debounce = delay;
    }

    /// Schedules a measurement, superseding any still-pending one.
    pub fn schedule(&mut self) -> Cmd {
        self.tag += 1;
        let id = self.id;
        let tag = self.tag;
        let delay = self.debounce.unwrap_or(Duration::from_nanos(1));
        tick(delay, move |_| Box::new(MeasureMsg { id, tag }) as Msg)
    }

    /// Whether the message belongs to the current scheduling generation.
    pub fn accepts(&self, msg: &MeasureMsg) -> bool {
        msg.id == self.id && msg.tag == self.tag
    }

    /// Records a measurement. Returns `Some(new_state)` when the overflow
    /// state changed (always on the first measurement), `None` otherwise.
    pub fn observe(&mut self, content: f64, viewport: f64) -> Option<bool> {
        let overflow = overflows(content, viewport);
        if self.scrollable != Some(overflow) {
            self.scrollable = Some(overflow);
            Some(overflow)
        } else {
            None
        }
    }

    /// Forgets all measurements and orphans any pending schedule.
    pub fn reset(&mut self) {
        self.tag += 1;
        self.scrollable = None;
    }
}
