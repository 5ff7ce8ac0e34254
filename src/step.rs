//! Step sizing and the shake feedback pulse.
//!
//! A directional step moves by half the viewport but never less than a fixed
//! floor, so steps stay usable in narrow viewports; hosts can swap in their
//! own distance function. When a step cannot move (blocked boundary, or
//! nothing overflows at all) the strip answers with a shake: a short jiggle
//! nudging the rendered window one column into the blocked side and back.
//! The jiggle is frame-driven with the same `{id, tag}` discipline as every
//! other timer here; its final frame clears the shake state.

use bubbletea_rs::{tick, Cmd, Msg};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::track::Direction;

static LAST_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Default floor for the step distance, in display columns.
pub const MIN_STEP: f64 = 208.0;

const SHAKE_FRAMES: usize = 6;
const SHAKE_INTERVAL: Duration = Duration::from_millis(40);

/// Custom step-distance function: viewport extent in, absolute distance out.
pub type StepFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Frame message advancing a shake jiggle.
#[derive(Debug, Clone)]
pub struct ShakeFrameMsg {
    /// Id of the step controller the frame targets.
    pub id: usize,
    /// Shake generation that scheduled the frame.
    pub tag: usize,
}

/// Computes step distances and runs the shake pulse.
#[derive(Clone)]
pub struct StepControl {
    id: usize,
    tag: usize,
    shaking: Option<Direction>,
    frame: usize,
    min_step: f64,
    custom_step: Option<StepFn>,
}

impl fmt::Debug for StepControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepControl")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("shaking", &self.shaking)
            .field("frame", &self.frame)
            .field("min_step", &self.min_step)
            .field("custom_step", &self.custom_step.is_some())
            .finish()
    }
}

impl Default for StepControl {
    fn default() -> Self {
        Self::new()
    }
}

impl StepControl {
    /// Creates a controller with the default step distance and no shake.
    pub fn new() -> Self {
        Self {
            id: next_id(),
            tag: 0,
            shaking: None,
            frame: 0,
            min_step: MIN_STEP,
            custom_step: None,
        }
    }

    /// Unique id of this controller instance.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Replaces the default distance with a custom function.
    pub fn set_custom_step(&mut self, f: Option<StepFn>) {
        self.custom_step = f;
    }

    /// Changes the distance floor used by the default computation.
    pub fn set_min_step(&mut self, min_step: f64) {
        self.min_step = min_step;
    }

    /// Signed distance a step in `direction` should travel for the given
    /// viewport extent.
    pub fn step_distance(&self, direction: Direction, viewport: f64) -> f64 {
        let magnitude = match &self.custom_step {
            Some(custom) => custom(viewport),
            None => (viewport / 2.0).max(self.min_step),
        };
        direction.sign() * magnitude
    }

    /// The direction currently shaking, if any.
    pub fn shaking(&self) -> Option<Direction> {
        self.shaking
    }

    /// Starts (or restarts) the shake pulse toward `direction` and returns
    /// the first jiggle frame command.
    pub fn start_shake(&mut self, direction: Direction) -> Cmd {
        self.shaking = Some(direction);
        self.frame = 0;
        self.tag += 1;
        self.next_shake_frame()
    }

    /// Whether the frame belongs to the current shake generation.
    pub fn accepts(&self, msg: &ShakeFrameMsg) -> bool {
        msg.id == self.id && msg.tag == self.tag && self.shaking.is_some()
    }

    /// Advances the jiggle one frame. Returns the next frame command, or
    /// `None` once the pulse completes (clearing the shake) or for stale
    /// frames.
    pub fn advance(&mut self, msg: &ShakeFrameMsg) -> Option<Cmd> {
        if !self.accepts(msg) {
            return None;
        }
        self.frame += 1;
        if self.frame >= SHAKE_FRAMES {
            self.shaking = None;
            self.frame = 0;
            return None;
        }
        Some(self.next_shake_frame())
    }

    /// Render-only nudge of the strip window, in columns: the blocked side's
    /// sign on push frames, zero on rest frames and when not shaking.
    pub fn nudge(&self) -> i64 {
        match self.shaking {
            Some(direction) if self.frame % 2 == 0 => direction.sign() as i64,
            _ => 0,
        }
    }

    /// Clears any shake and orphans pending frames.
    pub fn reset(&mut self) {
        self.shaking = None;
        self.frame = 0;
        self.tag += 1;
    }

    fn next_shake_frame(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        tick(SHAKE_INTERVAL, move |_| {
            Box::new(ShakeFrameMsg { id, tag }) as Msg
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(s: &StepControl) -> ShakeFrameMsg {
        ShakeFrameMsg {
            id: s.id,
            tag: s.tag,
        }
    }

    #[test]
    fn test_default_distance_uses_floor_in_narrow_viewports() {
        let s = StepControl::new();
        // half of 400 is 200, below the 208 floor
        assert_eq!(s.step_distance(Direction::Right, 400.0), 208.0);
        assert_eq!(s.step_distance(Direction::Left, 400.0), -208.0);
    }

    #[test]
    fn test_default_distance_half_viewport_when_wide() {
        let s = StepControl::new();
        assert_eq!(s.step_distance(Direction::Right, 600.0), 300.0);
        assert_eq!(s.step_distance(Direction::Left, 600.0), -300.0);
    }

    #[test]
    fn test_custom_distance_function() {
        let mut s = StepControl::new();
        s.set_custom_step(Some(Arc::new(|viewport| viewport / 10.0)));
        assert_eq!(s.step_distance(Direction::Right, 500.0), 50.0);
        assert_eq!(s.step_distance(Direction::Left, 500.0), -50.0);
    }

    #[test]
    fn test_shake_runs_to_completion() {
        let mut s = StepControl::new();
        let _cmd = s.start_shake(Direction::Left);
        assert_eq!(s.shaking(), Some(Direction::Left));
        assert_eq!(s.nudge(), -1);

        let mut frames = 0;
        loop {
            let f = frame(&s);
            match s.advance(&f) {
                Some(_) => frames += 1,
                None => break,
            }
            assert!(frames < SHAKE_FRAMES);
        }
        assert_eq!(s.shaking(), None);
        assert_eq!(s.nudge(), 0);
    }

    #[test]
    fn test_nudge_alternates_push_and_rest() {
        let mut s = StepControl::new();
        s.start_shake(Direction::Right);
        let mut nudges = vec![s.nudge()];
        loop {
            let f = frame(&s);
            if s.advance(&f).is_none() {
                break;
            }
            nudges.push(s.nudge());
        }
        assert_eq!(nudges, vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_stale_frame_ignored() {
        let mut s = StepControl::new();
        s.start_shake(Direction::Left);
        let old = frame(&s);
        s.start_shake(Direction::Right); // restart bumps the generation
        assert!(s.advance(&old).is_none());
        assert_eq!(s.shaking(), Some(Direction::Right));
        assert_eq!(s.frame, 0);
    }

    #[test]
    fn test_reset_clears_shake() {
        let mut s = StepControl::new();
        s.start_shake(Direction::Right);
        let pending = frame(&s);
        s.reset();
        assert_eq!(s.shaking(), None);
        assert!(!s.accepts(&pending));
    }
}
