//! The scrollable surface under the strip.
//!
//! A track owns one horizontal extent: the current offset, the content width
//! behind it, and the viewport width in front of it, all in f64 display
//! columns. It is the single place offsets are mutated: instantly through
//! [`Track::move_by`] / [`Track::move_to`], or smoothly through
//! [`Track::animate_to`], which drives a critically-damped spring with
//! [`FrameMsg`] ticks at 60 FPS. Every scheduling site bumps the frame tag, so
//! frames from a superseded or torn-down animation are discarded on arrival.
//!
//! The boundary tests round with ceil/floor so sub-column differences left
//! behind by styled content count as "cannot move", matching the overflow
//! tolerance used by the geometry pass.

use bubbletea_rs::{tick, Cmd, Msg};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::item::Span;

static LAST_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

const FPS: u64 = 60;
const SPRING_FREQUENCY: f64 = 18.0;
const SPRING_DAMPING: f64 = 1.0;

// Equilibrium thresholds in display columns. Offsets snap to the target when
// both are met so boundary tests see exact edge values.
const SETTLE_DISTANCE: f64 = 0.1;
const SETTLE_VELOCITY: f64 = 0.5;

/// Direction of horizontal travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward offset zero.
    Left,
    /// Toward the maximum offset.
    Right,
}

impl Direction {
    /// Sign of travel along the offset axis: -1 for left, +1 for right.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Animation frame message driving a smooth move.
///
/// Carries the owning track's id and the tag of the animation generation that
/// scheduled it; anything else is stale and ignored.
#[derive(Debug, Clone)]
pub struct FrameMsg {
    /// Id of the track instance the frame targets.
    pub id: usize,
    /// Animation generation that scheduled the frame.
    pub tag: usize,
}

#[derive(Debug, Clone)]
struct Spring {
    frequency: f64,
    damping: f64,
    fps: f64,
}

impl Spring {
    fn new(fps: f64, frequency: f64, damping: f64) -> Self {
        Self {
            frequency,
            damping,
            fps,
        }
    }

    // frequency is the angular frequency in rad/s, damping the damping ratio
    // (1.0 = critically damped). Semi-implicit Euler keeps the integration
    // stable at 60 FPS.
    fn update(&self, position: f64, velocity: f64, target: f64) -> (f64, f64) {
        let dt = 1.0 / self.fps;
        let spring_force = -(self.frequency * self.frequency) * (position - target);
        let damping_force = -2.0 * self.damping * self.frequency * velocity;
        let acceleration = spring_force + damping_force;

        let new_velocity = velocity + acceleration * dt;
        let new_position = position + new_velocity * dt;

        (new_position, new_velocity)
    }
}

/// The scrollable surface: offset plus extents plus the smooth-move spring.
#[derive(Debug, Clone)]
pub struct Track {
    id: usize,
    tag: usize,
    offset: f64,
    content: f64,
    viewport: f64,
    target: f64,
    velocity: f64,
    animating: bool,
    spring: Spring,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    /// Creates an empty track at offset zero.
    pub fn new() -> Self {
        Self {
            id: next_id(),
            tag: 0,
            offset: 0.0,
            content: 0.0,
            viewport: 0.0,
            target: 0.0,
            velocity: 0.0,
            animating: false,
            spring: Spring::new(FPS as f64, SPRING_FREQUENCY, SPRING_DAMPING),
        }
    }

    /// Unique id of this track instance.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current offset in display columns.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Content extent in display columns.
    pub fn content(&self) -> f64 {
        self.content
    }

    /// Viewport extent in display columns.
    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    /// True while a smooth move is in flight.
    pub fn animating(&self) -> bool {
        self.animating
    }

    /// Records new extents from a measurement pass. Does not clamp; the
    /// post-measure pass decides how to resolve an out-of-range offset.
    pub fn set_extents(&mut self, content: f64, viewport: f64) {
        debug_assert!(content >= 0.0 && viewport >= 0.0);
        self.content = content;
        self.viewport = viewport;
    }

    /// Largest valid offset for the current extents.
    pub fn max_offset(&self) -> f64 {
        (self.content - self.viewport).max(0.0)
    }

    /// Boundary test: whether the track can move any further in `direction`.
    ///
    /// Left is possible only above offset zero; right compares with ceil/floor
    /// so an offset within a fraction of a column of the end counts as "at the
    /// end".
    pub fn can_move(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.offset > 0.0,
            Direction::Right => self.offset.ceil() < (self.content - self.viewport).floor(),
        }
    }

    /// Jumps instantly to `x` (clamped). Cancels any smooth move in flight.
    /// Returns true when the offset actually changed.
    pub fn move_to(&mut self, x: f64) -> bool {
        self.stop();
        let clamped = x.clamp(0.0, self.max_offset());
        if (clamped - self.offset).abs() > f64::EPSILON {
            self.offset = clamped;
            true
        } else {
            false
        }
    }

    /// Jumps instantly by `delta` columns (clamped). Returns true when the
    /// offset actually changed.
    pub fn move_by(&mut self, delta: f64) -> bool {
        self.move_to(self.offset + delta)
    }

    /// Starts (or retargets) a smooth move toward `x`. Returns the first
    /// frame command, or `None` when the clamped target is already the current
    /// offset and nothing is in flight.
    pub fn animate_to(&mut self, x: f64) -> Option<Cmd> {
        let target = x.clamp(0.0, self.max_offset());
        if !self.animating && (target - self.offset).abs() < f64::EPSILON {
            return None;
        }
        self.target = target;
        self.animating = true;
        self.tag += 1;
        Some(self.next_frame())
    }

    /// Starts the smooth move that brings `span` fully into view, aligning to
    /// the nearest edge. Returns `None` when the span is already visible.
    pub fn animate_into_view(&mut self, span: &Span) -> Option<Cmd> {
        if span.start < self.offset {
            self.animate_to(span.start)
        } else if span.end() > self.offset + self.viewport {
            self.animate_to(span.end() - self.viewport)
        } else {
            None
        }
    }

    /// Advances the spring by one frame. Returns the next frame command while
    /// the move is still in flight, `None` once it settles (the offset snaps
    /// to the target) or when the frame is stale.
    pub fn step_frame(&mut self, frame: &FrameMsg) -> Option<Cmd> {
        if frame.id != self.id || frame.tag != self.tag || !self.animating {
            return None;
        }

        let (position, velocity) = self.spring.update(self.offset, self.velocity, self.target);
        self.offset = position.clamp(0.0, self.max_offset());
        self.velocity = velocity;

        if (self.offset - self.target).abs() < SETTLE_DISTANCE
            && self.velocity.abs() < SETTLE_VELOCITY
        {
            self.offset = self.target;
            self.stop();
            return None;
        }

        Some(self.next_frame())
    }

    /// Next frame command for the current animation generation.
    pub fn next_frame(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        let duration = Duration::from_nanos(1_000_000_000 / FPS);
        tick(duration, move |_| Box::new(FrameMsg { id, tag }) as Msg)
    }

    /// Re-clamps the offset and target after extent changes. Returns true
    /// when the offset moved.
    pub fn clamp(&mut self) -> bool {
        let max = self.max_offset();
        self.target = self.target.clamp(0.0, max);
        let clamped = self.offset.clamp(0.0, max);
        if (clamped - self.offset).abs() > f64::EPSILON {
            self.offset = clamped;
            true
        } else {
            false
        }
    }

    /// Halts any smooth move without touching the offset. In-flight frames
    /// become stale.
    pub fn stop(&mut self) {
        if self.animating {
            self.animating = false;
            self.tag += 1;
        }
        self.velocity = 0.0;
    }

    /// Returns the track to offset zero with no animation in flight.
    pub fn reset(&mut self) {
        self.stop();
        self.offset = 0.0;
        self.target = 0.0;
    }
}
