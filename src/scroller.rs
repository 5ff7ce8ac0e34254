//! A horizontal scroll container for rows of pre-rendered items.
//!
//! This component presents an ordered strip of [`Node`]s inside a fixed-width
//! window, shows directional controls when (and only when) the strip
//! overflows, steps smoothly left and right with boundary feedback, and can
//! bring a selected item into view on its own. It is the horizontal
//! counterpart of a viewport, built for tab bars, card rails, and breadcrumb
//! strips rather than documents.
//!
//! # What the widget does for you
//!
//! - **Overflow detection**: every resize or content change schedules a
//!   debounced re-measurement; controls configured `Auto` appear and disappear
//!   with the result, and the host hears about flips through
//!   [`ScrollableChangedMsg`].
//! - **Scroll lifecycle**: all movement, whatever triggered it, feeds one
//!   burst state machine. [`ScrollStartedMsg`] fires once when motion begins
//!   and [`ScrollEndedMsg`] once after it goes quiet, tagged with the edge the
//!   strip came to rest against.
//! - **Directional steps**: keyboard (←/h, →/l by default) and the
//!   [`Model::step`] method move by half a viewport (with a floor) through a
//!   critically-damped spring; a step against a blocked edge shakes the strip
//!   instead of moving it.
//! - **Selection auto-scroll**: give each item a stable id and call
//!   [`Model::set_selected`]; after the next measurement the widget scrolls
//!   the item into view, once per distinct selection.
//!
//! # Basic usage
//!
//! ```rust
//! use bubbletea_scroller::scroller::Model;
//! use bubbletea_scroller::item::Node;
//! use bubbletea_rs::Model as BubbleTeaModel;
//!
//! let scroller = Model::new(40).with_items(vec![
//!     Node::with_id("home", " Home "),
//!     Node::with_id("docs", " Docs "),
//!     Node::with_id("about", " About "),
//! ]);
//! assert!(scroller.view().contains("Home"));
//! ```
//!
//! # Message flow
//!
//! The widget relies on seeing its own messages again: hosts must forward
//! every message to `update`, including the widget's public event messages.
//! Timer messages (`FrameMsg`, `MeasureMsg`, `SettleMsg`, `ShakeFrameMsg`)
//! carry `{id, tag}` pairs and are silently dropped when stale, so forwarding
//! a message to a widget that has been reset or replaced is always safe.

use bubbletea_rs::{tick, Cmd, KeyMsg, Model as BubbleTeaModel, Msg, WindowSizeMsg};
use crossterm::event::KeyCode;
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::activity::{MotionCause, Settle, SettleMsg, Tracker};
use crate::controls::{
    render_block, BlockPosition, ControlStyles, ControlsConfig, GlyphSet, ARROWS,
};
use crate::geometry::{MeasureMsg, Monitor};
use crate::item::{self, Node, Span};
use crate::key::{Binding, KeyMap};
use crate::step::{ShakeFrameMsg, StepControl, StepFn};
use crate::track::{Direction, FrameMsg, Track};

static LAST_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

const DEFAULT_WIDTH: usize = 80;
const DEFAULT_GAP: usize = 1;

/// Host-constructed pointer-wheel notification.
///
/// The widget owns no terminal event source; hosts that capture mouse input
/// translate wheel events into this message. A positive `delta_y` scrolls
/// right, negative left, in display columns. Diagonal input (`delta_x != 0`)
/// is swallowed whole so the strip never hijacks a scroll aimed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelMsg {
    /// Horizontal wheel delta; any non-zero value vetoes the event.
    pub delta_x: f64,
    /// Vertical wheel delta, reinterpreted as horizontal travel.
    pub delta_y: f64,
}

/// Published when the overflow decision flips, and always after the first
/// measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollableChangedMsg {
    /// Id of the widget that measured.
    pub id: usize,
    /// Whether the strip now overflows its window.
    pub scrollable: bool,
}

/// Published once per scroll burst, when motion begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollStartedMsg {
    /// Id of the widget that started scrolling.
    pub id: usize,
}

/// Published once per scroll burst, after the settle window elapses with no
/// further motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollEndedMsg {
    /// Id of the widget that stopped scrolling.
    pub id: usize,
    /// Edge the strip came to rest against: `Some(Left)` at offset zero,
    /// `Some(Right)` at the maximum offset, `None` in between. Left wins when
    /// both edges are blocked at once.
    pub edge: Option<Direction>,
}

/// Horizontal placement of the item row when it fits inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Flush left.
    #[default]
    Start,
    /// Centered, leftover column on the right.
    Center,
    /// Flush right.
    End,
}

/// Key bindings for the scroller.
///
/// The defaults pair arrows with vi keys: `←`/`h` steps left and `→`/`l`
/// steps right.
#[derive(Debug, Clone)]
pub struct ScrollerKeyMap {
    /// Step one stride toward offset zero.
    pub step_left: Binding,
    /// Step one stride toward the maximum offset.
    pub step_right: Binding,
}

impl Default for ScrollerKeyMap {
    fn default() -> Self {
        Self {
            step_left: Binding::new(vec![KeyCode::Left, KeyCode::Char('h')])
                .with_help("←/h", "scroll left"),
            step_right: Binding::new(vec![KeyCode::Right, KeyCode::Char('l')])
                .with_help("→/l", "scroll right"),
        }
    }
}

impl KeyMap for ScrollerKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.step_left, &self.step_right]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![vec![&self.step_left, &self.step_right]]
    }
}

/// The horizontal scroll container.
///
/// Owns the item tree, the scrollable track, the geometry monitor, the burst
/// tracker, and the step controller, and wires their timer messages together
/// behind a single `update`. Construct with [`Model::new`], configure with
/// the `with_*` builders, then forward every runtime message to it.
#[derive(Debug, Clone)]
pub struct Model {
    id: usize,
    items: Vec<Node>,
    width: usize,
    gap: usize,
    alignment: Alignment,
    track: Track,
    monitor: Monitor,
    activity: Tracker,
    steps: StepControl,
    controls: ControlsConfig,
    glyphs: GlyphSet,
    control_styles: ControlStyles,
    style: Style,
    keymap: ScrollerKeyMap,
    selected: Option<String>,
    last_handled: Option<String>,
    auto_width: bool,
    wheel_enabled: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl Model {
    /// Creates a scroller rendering into a window of `width` display columns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_scroller::scroller::Model;
    /// use bubbletea_scroller::item::Node;
    ///
    /// let scroller = Model::new(60)
    ///     .with_items(vec![Node::item("one"), Node::item("two")])
    ///     .with_gap(2);
    /// assert_eq!(scroller.width(), 60);
    /// ```
    pub fn new(width: usize) -> Self {
        Self {
            id: next_id(),
            items: Vec::new(),
            width,
            gap: DEFAULT_GAP,
            alignment: Alignment::default(),
            track: Track::new(),
            monitor: Monitor::new(),
            activity: Tracker::new(),
            steps: StepControl::new(),
            controls: ControlsConfig::default(),
            glyphs: ARROWS.clone(),
            control_styles: ControlStyles::default(),
            style: Style::new(),
            keymap: ScrollerKeyMap::default(),
            selected: None,
            last_handled: None,
            auto_width: true,
            wheel_enabled: true,
        }
    }

    /// Sets the initial item tree.
    pub fn with_items(mut self, items: Vec<Node>) -> Self {
        self.items = items;
        self
    }

    /// Sets the gap between adjacent items in columns.
    pub fn with_gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }

    /// Sets the style wrapping the whole rendered row.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets where the item row sits when it fits inside the window.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the controls configuration (placement and per-side policy).
    pub fn with_controls(mut self, controls: ControlsConfig) -> Self {
        self.controls = controls;
        self
    }

    /// Sets the glyph set used by controls without a per-side override.
    pub fn with_glyphs(mut self, glyphs: GlyphSet) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Sets the styles used to render controls blocks.
    pub fn with_control_styles(mut self, styles: ControlStyles) -> Self {
        self.control_styles = styles;
        self
    }

    /// Replaces the key bindings.
    pub fn with_keymap(mut self, keymap: ScrollerKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Controls whether the widget consumes `WindowSizeMsg` itself (the
    /// default). Pass `false` when the host owns layout and drives
    /// [`Model::set_width`] directly.
    pub fn with_auto_width(mut self, auto: bool) -> Self {
        self.auto_width = auto;
        self
    }

    /// Enables or disables wheel handling.
    pub fn with_wheel_enabled(mut self, enabled: bool) -> Self {
        self.wheel_enabled = enabled;
        self
    }

    /// Replaces the default step distance (`max(window / 2, 208)`) with a
    /// custom function of the window extent.
    pub fn with_step_fn(mut self, f: StepFn) -> Self {
        self.steps.set_custom_step(Some(f));
        self
    }

    /// Sets the floor for the default step distance.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.steps.set_min_step(min_step);
        self
    }

    /// Replaces every per-cause settle window with one fixed duration.
    pub fn with_settle_override(mut self, window: Duration) -> Self {
        self.activity.set_override(Some(window));
        self
    }

    /// Sets the debounce delay for resize- and content-driven measurements.
    /// Without one, a scheduled measurement fires on the next runtime tick.
    pub fn with_resize_debounce(mut self, delay: Duration) -> Self {
        self.monitor.set_debounce(Some(delay));
        self
    }

    /// Unique id of this widget, carried by every event message it publishes.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current scroll offset in display columns.
    pub fn offset(&self) -> f64 {
        self.track.offset()
    }

    /// Whether the last measurement found the strip overflowing its window.
    /// False until the first measurement completes.
    pub fn scrollable(&self) -> bool {
        self.monitor.scrollable()
    }

    /// Whether a scroll burst is in progress.
    pub fn is_scrolling(&self) -> bool {
        self.activity.scrolling()
    }

    /// Whether a step in `direction` would move the strip.
    pub fn can_step(&self, direction: Direction) -> bool {
        self.monitor.scrollable() && self.track.can_move(direction)
    }

    /// Direction of the shake in progress, if any.
    pub fn shaking(&self) -> Option<Direction> {
        self.steps.shaking()
    }

    /// Currently selected item id.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Window extent in display columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total extent of the item row, gaps included, in display columns.
    pub fn content_width(&self) -> usize {
        item::total_width(&self.items, self.gap)
    }

    /// Gap between adjacent items in columns.
    pub fn gap(&self) -> usize {
        self.gap
    }

    /// Replaces the item tree and schedules a measurement.
    pub fn set_items(&mut self, items: Vec<Node>) -> Cmd {
        self.items = items;
        self.monitor.schedule()
    }

    /// Changes the window extent and schedules a measurement.
    pub fn set_width(&mut self, width: usize) -> Cmd {
        self.width = width;
        self.monitor.schedule()
    }

    /// Changes the inter-item gap and schedules a measurement.
    pub fn set_gap(&mut self, gap: usize) -> Cmd {
        self.gap = gap;
        self.monitor.schedule()
    }

    /// Selects an item by id and schedules the measurement that will scroll
    /// it into view.
    ///
    /// The scroll fires at most once per distinct id: re-selecting the
    /// current value is a no-op, and clearing the selection scrolls nowhere.
    /// An id that matches no item is remembered but left unhandled, so the
    /// scroll still happens if the item appears in a later `set_items`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_scroller::scroller::Model;
    /// use bubbletea_scroller::item::Node;
    ///
    /// let mut scroller = Model::new(20)
    ///     .with_items(vec![Node::with_id("a", "alpha"), Node::with_id("b", "beta")]);
    /// let _cmd = scroller.set_selected(Some("b"));
    /// assert_eq!(scroller.selected(), Some("b"));
    /// ```
    pub fn set_selected(&mut self, id: Option<&str>) -> Cmd {
        self.selected = id.map(str::to_string);
        self.monitor.schedule()
    }

    /// Schedules a measurement without changing anything. Hosts running with
    /// [`Model::with_auto_width`] disabled call this after laying the widget
    /// out for the first time.
    pub fn refresh(&mut self) -> Cmd {
        self.monitor.schedule()
    }

    /// Requests one step in `direction`.
    ///
    /// When the strip does not overflow, or the step pushes against a blocked
    /// edge with no shake already running, the strip shakes instead of
    /// moving. Otherwise the step starts a smooth move of
    /// `max(window / 2, 208)` columns (or the custom step function's result),
    /// clamped to the valid range. Steps requested while a burst is already
    /// in progress are dropped so rapid presses cannot compound.
    pub fn step(&mut self, direction: Direction) -> Option<Cmd> {
        let scrollable = self.monitor.scrollable();
        if !scrollable || (!self.track.can_move(direction) && self.steps.shaking().is_none()) {
            return Some(self.steps.start_shake(direction));
        }
        if self.activity.scrolling() {
            return None;
        }
        self.activity.set_cause(MotionCause::Step);
        let distance = self.steps.step_distance(direction, self.track.viewport());
        self.track.animate_to(self.track.offset() + distance)?;
        self.activity.note_motion();
        Some(self.emit_scroll_started())
    }

    /// Starts a smooth move to absolute offset `x` (clamped). Burst
    /// semantics match any other motion; the settle window is whichever one
    /// the widget used last.
    pub fn scroll_to(&mut self, x: f64) -> Option<Cmd> {
        let frame = self.track.animate_to(x)?;
        if self.activity.note_motion() {
            return Some(self.emit_scroll_started());
        }
        Some(frame)
    }

    /// Starts a smooth move by `delta` columns (clamped).
    pub fn scroll_by(&mut self, delta: f64) -> Option<Cmd> {
        self.scroll_to(self.track.offset() + delta)
    }

    /// Returns the widget to its initial state: offset zero, no burst, no
    /// shake, overflow unmeasured, selection history cleared. Every pending
    /// timer message is orphaned and will be ignored on arrival.
    pub fn reset(&mut self) {
        self.track.reset();
        self.monitor.reset();
        self.activity.reset();
        self.steps.reset();
        self.last_handled = None;
    }

    fn emit_scrollable_changed(&self, scrollable: bool) -> Cmd {
        let id = self.id;
        tick(Duration::from_nanos(1), move |_| {
            Box::new(ScrollableChangedMsg { id, scrollable }) as Msg
        })
    }

    fn emit_scroll_started(&self) -> Cmd {
        let id = self.id;
        tick(Duration::from_nanos(1), move |_| {
            Box::new(ScrollStartedMsg { id }) as Msg
        })
    }

    fn emit_scroll_ended(&self, edge: Option<Direction>) -> Cmd {
        let id = self.id;
        tick(Duration::from_nanos(1), move |_| {
            Box::new(ScrollEndedMsg { id, edge }) as Msg
        })
    }

    // One measurement pass: record extents, then either report the overflow
    // flip (the post-measure pass runs when the change event comes back) or
    // run the post-measure pass directly.
    fn run_measure(&mut self) -> Option<Cmd> {
        let content = self.content_width() as f64;
        let viewport = self.width as f64;
        self.track.set_extents(content, viewport);
        if let Some(scrollable) = self.monitor.observe(content, viewport) {
            return Some(self.emit_scrollable_changed(scrollable));
        }
        self.post_measure()
    }

    // End of a measurement pass: serve a pending selection with a smooth
    // move-into-view, otherwise clamp the offset into the new valid range.
    // Either movement participates in the burst machinery.
    fn post_measure(&mut self) -> Option<Cmd> {
        let frame = match self.pending_selection() {
            Some(span) => {
                self.last_handled = self.selected.clone();
                self.activity.set_cause(MotionCause::Selection);
                self.track.animate_into_view(&span)
            }
            None => None,
        };
        let clamped = frame.is_none() && self.track.clamp();
        if frame.is_none() && !clamped {
            return None;
        }
        if self.activity.note_motion() {
            return Some(self.emit_scroll_started());
        }
        match frame {
            Some(cmd) => Some(cmd),
            None => Some(self.activity.arm()),
        }
    }

    // A selection is pending when it differs from the last handled value and
    // an item with that id actually exists. A missing item leaves the
    // selection pending for a later pass.
    fn pending_selection(&self) -> Option<Span> {
        let id = self.selected.as_deref()?;
        if self.last_handled.as_deref() == Some(id) {
            return None;
        }
        item::locate(&self.items, id, self.gap)
    }

    fn on_settle(&mut self, now: Instant) -> Option<Cmd> {
        match self.activity.settle(now) {
            Settle::Pending(probe) => Some(probe),
            Settle::Ended => Some(self.emit_scroll_ended(self.resting_edge())),
        }
    }

    // Left is tested first, so it wins when both edges are blocked (content
    // exactly fills the window).
    fn resting_edge(&self) -> Option<Direction> {
        if !self.track.can_move(Direction::Left) {
            Some(Direction::Left)
        } else if !self.track.can_move(Direction::Right) {
            Some(Direction::Right)
        } else {
            None
        }
    }

    fn render_strip(&self) -> String {
        let leaves = item::flatten(&self.items);
        if leaves.is_empty() {
            return " ".repeat(self.width);
        }

        let spacer = " ".repeat(self.gap);
        let mut parts: Vec<&str> = Vec::new();
        for (i, leaf) in leaves.iter().enumerate() {
            if i > 0 && self.gap > 0 {
                parts.push(&spacer);
            }
            parts.push(leaf.content());
        }
        let strip = lipgloss::join_horizontal(lipgloss::TOP, &parts);

        let start = if self.monitor.scrollable() {
            self.track.offset().round() as i64
        } else {
            let free = self.width as i64 - self.content_width() as i64;
            -match self.alignment {
                Alignment::Start => 0,
                Alignment::Center => (free / 2).max(0),
                Alignment::End => free.max(0),
            }
        };
        window(&strip, start + self.steps.nudge(), self.width)
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        (Self::default(), None)
    }

    /// Routes runtime messages to the owning component.
    ///
    /// Handles key input, window resizes, wheel notifications, the widget's
    /// internal timer messages, and the widget's own published events (their
    /// receipt drives follow-up scheduling). Returns at most one command;
    /// messages for other components or stale generations return `None`.
    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.step_left.matches(key_msg) {
                return self.step(Direction::Left);
            }
            if self.keymap.step_right.matches(key_msg) {
                return self.step(Direction::Right);
            }
            return None;
        }

        if let Some(size_msg) = msg.downcast_ref::<WindowSizeMsg>() {
            if !self.auto_width {
                return None;
            }
            self.width = size_msg.width as usize;
            return Some(self.monitor.schedule());
        }

        if let Some(wheel) = msg.downcast_ref::<WheelMsg>() {
            if !self.wheel_enabled || wheel.delta_y == 0.0 || wheel.delta_x != 0.0 {
                return None;
            }
            let direction = if wheel.delta_y > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            };
            if !self.track.can_move(direction) {
                return None;
            }
            self.activity.set_cause(MotionCause::Wheel);
            self.track.move_by(wheel.delta_y);
            if self.activity.note_motion() {
                return Some(self.emit_scroll_started());
            }
            return Some(self.activity.arm());
        }

        if let Some(measure) = msg.downcast_ref::<MeasureMsg>() {
            if !self.monitor.accepts(measure) {
                return None;
            }
            return self.run_measure();
        }

        if let Some(frame) = msg.downcast_ref::<FrameMsg>() {
            let was_animating = self.track.animating();
            let next = self.track.step_frame(frame);
            if next.is_some() {
                if self.activity.note_motion() {
                    // a pathologically short settle window ended the burst
                    // mid-animation; restart it, the start event's receipt
                    // resumes the frame chain
                    return Some(self.emit_scroll_started());
                }
                return next;
            }
            if was_animating && !self.track.animating() {
                // the spring settled on this frame; hand off to the probe
                if self.activity.note_motion() {
                    return Some(self.emit_scroll_started());
                }
                return Some(self.activity.arm());
            }
            return None;
        }

        if let Some(settle) = msg.downcast_ref::<SettleMsg>() {
            if !self.activity.accepts(settle) {
                return None;
            }
            return self.on_settle(Instant::now());
        }

        if let Some(shake) = msg.downcast_ref::<ShakeFrameMsg>() {
            return self.steps.advance(shake);
        }

        if let Some(changed) = msg.downcast_ref::<ScrollableChangedMsg>() {
            if changed.id != self.id {
                return None;
            }
            return self.post_measure();
        }

        if let Some(started) = msg.downcast_ref::<ScrollStartedMsg>() {
            if started.id != self.id {
                return None;
            }
            if self.track.animating() {
                return Some(self.track.next_frame());
            }
            if self.activity.scrolling() {
                return Some(self.activity.arm());
            }
            return None;
        }

        None
    }

    /// Renders the controls blocks and the windowed slice of the item strip
    /// as one row.
    fn view(&self) -> String {
        let overflow = self.monitor.scrollable();
        let shaking = self.steps.shaking().is_some();

        let mut parts: Vec<String> = Vec::new();
        if let Some(block) = render_block(
            &self.controls,
            &self.glyphs,
            &self.control_styles,
            BlockPosition::BeforeItems,
            overflow,
            shaking,
        ) {
            parts.push(block);
        }
        parts.push(self.render_strip());
        if let Some(block) = render_block(
            &self.controls,
            &self.glyphs,
            &self.control_styles,
            BlockPosition::AfterItems,
            overflow,
            shaking,
        ) {
            parts.push(block);
        }

        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        self.style
            .render(&lipgloss::join_horizontal(lipgloss::TOP, &refs))
    }
}

/// Cuts the display-column window `[start, start + width)` out of every line
/// of `s`, padding with spaces so each returned line is exactly `width`
/// columns. A negative `start` pads on the left, which is how the fit
/// alignments and the shake nudge overscroll the strip.
fn window(s: &str, start: i64, width: usize) -> String {
    let lines: Vec<String> = s
        .lines()
        .map(|line| window_line(line, start, width))
        .collect();
    if lines.is_empty() {
        return window_line("", start, width);
    }
    lines.join("\n")
}

// A cluster straddling either window edge is replaced by spaces for the
// columns it exposes, so double-width glyphs never leak half in.
fn window_line(line: &str, start: i64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut filled = 0usize;
    if start < 0 {
        let pad = ((-start) as usize).min(width);
        out.push_str(&" ".repeat(pad));
        filled += pad;
    }

    let skip = start.max(0) as usize;
    let mut col = 0usize;
    for grapheme in line.graphemes(true) {
        if filled >= width {
            break;
        }
        let w = UnicodeWidthStr::width(grapheme);
        let begin = col;
        col += w;
        if col <= skip {
            continue;
        }
        if begin < skip {
            let exposed = (col - skip).min(width - filled);
            out.push_str(&" ".repeat(exposed));
            filled += exposed;
            continue;
        }
        if filled + w > width {
            out.push_str(&" ".repeat(width - filled));
            filled = width;
            break;
        }
        out.push_str(grapheme);
        filled += w;
    }

    if filled < width {
        out.push_str(&" ".repeat(width - filled));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use lipgloss_extras::lipgloss::strip_ansi;

    fn three_wide_items() -> Vec<Node> {
        vec![
            Node::with_id("a", "a".repeat(30)),
            Node::with_id("b", "b".repeat(30)),
            Node::with_id("c", "c".repeat(30)),
        ]
    }

    // Runs a full measurement pass, including the post-measure work that in
    // the program loop happens when the overflow change event comes back.
    fn measure(m: &mut Model) -> Option<Cmd> {
        let first = m.run_measure();
        let follow = m.update(Box::new(ScrollableChangedMsg {
            id: m.id(),
            scrollable: m.monitor.scrollable(),
        }));
        follow.or(first)
    }

    fn end_burst(m: &mut Model) {
        let cmd = m.on_settle(Instant::now() + Duration::from_secs(1));
        assert!(cmd.is_some());
        assert!(!m.is_scrolling());
    }

    fn wheel(delta_y: f64) -> Msg {
        Box::new(WheelMsg {
            delta_x: 0.0,
            delta_y,
        })
    }

    fn key(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        })
    }

    /// Lifecycle events heard while driving the runtime loop.
    struct BurstLog {
        started: usize,
        ended: Vec<ScrollEndedMsg>,
    }

    // Awaits each produced command and feeds the message it yields back into
    // update, the way the program loop does, until the widget goes quiet.
    async fn drive(m: &mut Model, first: Option<Cmd>) -> BurstLog {
        let mut log = BurstLog {
            started: 0,
            ended: Vec::new(),
        };
        let mut cmd = first;
        let mut rounds = 0;
        while let Some(c) = cmd {
            rounds += 1;
            assert!(rounds < 2000, "widget never went quiet");
            let msg = match c.await {
                Some(msg) => msg,
                None => break,
            };
            if let Some(started) = msg.downcast_ref::<ScrollStartedMsg>() {
                if started.id == m.id() {
                    log.started += 1;
                }
            }
            if let Some(ended) = msg.downcast_ref::<ScrollEndedMsg>() {
                if ended.id == m.id() {
                    log.ended.push(*ended);
                }
            }
            cmd = m.update(msg);
        }
        log
    }

    #[test]
    fn test_first_measure_always_reports() {
        let mut m = Model::new(40).with_items(vec![Node::item("hi")]);
        assert!(m.run_measure().is_some());
        assert!(!m.scrollable());
        // same result again: no flip, no report, no motion
        assert!(m.run_measure().is_none());
    }

    #[test]
    fn test_measure_reports_only_flips() {
        let mut m = Model::new(40).with_items(vec![Node::item("hi")]);
        assert!(m.run_measure().is_some());
        let _ = m.set_items(three_wide_items());
        // content grew past the window: flip to scrollable
        assert!(m.run_measure().is_some());
        assert!(m.scrollable());
        assert!(m.run_measure().is_none());
    }

    #[test]
    fn test_exact_fit_is_not_scrollable() {
        // content 40 vs window 40: inside the one-column tolerance
        let mut m = Model::new(40).with_items(vec![Node::item("x".repeat(40))]);
        measure(&mut m);
        assert!(!m.scrollable());
        assert!(!m.can_step(Direction::Left));
        assert!(!m.can_step(Direction::Right));
    }

    #[test]
    fn test_wheel_jumps_instantly_and_starts_burst() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        assert!(m.scrollable());

        let cmd = m.update(wheel(30.0));
        assert!(cmd.is_some());
        assert_eq!(m.offset(), 30.0);
        assert!(m.is_scrolling());
    }

    #[test]
    fn test_wheel_ignores_diagonal_zero_and_disabled() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        let diagonal = Box::new(WheelMsg {
            delta_x: 3.0,
            delta_y: 30.0,
        });
        assert!(m.update(diagonal).is_none());
        assert!(m.update(wheel(0.0)).is_none());
        assert_eq!(m.offset(), 0.0);
        assert!(!m.is_scrolling());

        let mut off = Model::new(40)
            .with_items(three_wide_items())
            .with_wheel_enabled(false);
        measure(&mut off);
        assert!(off.update(wheel(30.0)).is_none());
        assert_eq!(off.offset(), 0.0);
    }

    #[test]
    fn test_wheel_ignored_against_blocked_edge() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        // at offset zero there is nothing to the left
        assert!(m.update(wheel(-10.0)).is_none());
        assert_eq!(m.offset(), 0.0);
        assert!(!m.is_scrolling());
    }

    #[test]
    fn test_step_starts_smooth_burst() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        let cmd = m.step(Direction::Right);
        assert!(cmd.is_some());
        assert!(m.is_scrolling());
        assert!(m.track.animating());
        // smooth move: nothing jumped yet
        assert_eq!(m.offset(), 0.0);
    }

    #[test]
    fn test_step_dropped_during_burst() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        assert!(m.step(Direction::Right).is_some());
        assert!(m.step(Direction::Right).is_none());
    }

    #[test]
    fn test_blocked_step_shakes_without_moving() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        let cmd = m.step(Direction::Left);
        assert!(cmd.is_some());
        assert_eq!(m.shaking(), Some(Direction::Left));
        assert_eq!(m.offset(), 0.0);
        assert!(!m.is_scrolling());
    }

    #[test]
    fn test_second_blocked_step_does_not_restart_shake() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        assert!(m.step(Direction::Left).is_some());
        // still shaking and still scrollable: the repeat step falls through
        // to the move branch and no-ops at the boundary
        assert!(m.step(Direction::Left).is_none());
        assert_eq!(m.shaking(), Some(Direction::Left));
    }

    #[test]
    fn test_unscrollable_step_restarts_shake() {
        let mut m = Model::new(40).with_items(vec![Node::item("hi")]);
        measure(&mut m);
        assert!(m.step(Direction::Right).is_some());
        assert_eq!(m.shaking(), Some(Direction::Right));
        // without overflow every step shakes, even mid-shake
        assert!(m.step(Direction::Left).is_some());
        assert_eq!(m.shaking(), Some(Direction::Left));
    }

    #[test]
    fn test_shake_clears_after_frame_sequence() {
        let mut m = Model::new(40).with_items(vec![Node::item("hi")]);
        measure(&mut m);
        assert!(m.step(Direction::Right).is_some());

        // first shake on a fresh controller runs generation 1
        let id = m.steps.id();
        for _ in 0..5 {
            let cmd = m.update(Box::new(ShakeFrameMsg { id, tag: 1 }));
            assert!(cmd.is_some());
        }
        let last = m.update(Box::new(ShakeFrameMsg { id, tag: 1 }));
        assert!(last.is_none());
        assert_eq!(m.shaking(), None);
    }

    #[test]
    fn test_key_bindings_route_to_steps() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        assert!(m.update(key(KeyCode::Right)).is_some());
        assert!(m.is_scrolling());

        let mut other = Model::new(40).with_items(three_wide_items());
        measure(&mut other);
        assert!(other.update(key(KeyCode::Char('l'))).is_some());
        assert!(other.is_scrolling());

        assert!(m.update(key(KeyCode::Char('x'))).is_none());
    }

    #[test]
    fn test_window_size_updates_width_and_schedules() {
        let mut m = Model::new(40).with_items(three_wide_items());
        let cmd = m.update(Box::new(WindowSizeMsg {
            width: 120,
            height: 24,
        }));
        assert!(cmd.is_some());
        assert_eq!(m.width(), 120);
    }

    #[test]
    fn test_window_size_ignored_when_host_owns_layout() {
        let mut m = Model::new(40)
            .with_items(three_wide_items())
            .with_auto_width(false);
        let cmd = m.update(Box::new(WindowSizeMsg {
            width: 120,
            height: 24,
        }));
        assert!(cmd.is_none());
        assert_eq!(m.width(), 40);
    }

    #[test]
    fn test_clamp_after_window_grows() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        m.update(wheel(52.0));
        assert_eq!(m.offset(), 52.0);

        let _ = m.set_width(60);
        // still overflowing, so no flip; the pass clamps 52 down to the new max
        assert!(m.run_measure().is_some());
        assert_eq!(m.offset(), 32.0);
    }

    #[test]
    fn test_selection_scrolls_once_per_distinct_id() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        m.update(wheel(52.0));
        end_burst(&mut m);

        let _ = m.set_selected(Some("a"));
        assert!(measure(&mut m).is_some());
        assert_eq!(m.last_handled.as_deref(), Some("a"));
        assert!(m.is_scrolling());

        // same id again: no new request
        let _ = m.set_selected(Some("a"));
        assert!(measure(&mut m).is_none());

        let _ = m.set_selected(Some("b"));
        assert!(measure(&mut m).is_some());
        assert_eq!(m.last_handled.as_deref(), Some("b"));

        let _ = m.set_selected(Some("a"));
        assert!(measure(&mut m).is_some());
        assert_eq!(m.last_handled.as_deref(), Some("a"));
    }

    #[test]
    fn test_selection_of_missing_item_stays_pending() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        let _ = m.set_selected(Some("zz"));
        assert!(measure(&mut m).is_none());
        assert_eq!(m.last_handled, None);

        // the item appears later and the pending selection is finally served
        let mut items = three_wide_items();
        items.push(Node::with_id("zz", "z".repeat(30)));
        let _ = m.set_items(items);
        assert!(measure(&mut m).is_some());
        assert_eq!(m.last_handled.as_deref(), Some("zz"));
    }

    #[test]
    fn test_post_measure_deferred_until_change_receipt() {
        let mut m = Model::new(40).with_items(three_wide_items());
        let _ = m.set_selected(Some("c"));

        // first measurement flips, so the pass stops at the report
        assert!(m.run_measure().is_some());
        assert_eq!(m.last_handled, None);

        // the widget hearing its own change event finishes the pass
        let cmd = m.update(Box::new(ScrollableChangedMsg {
            id: m.id(),
            scrollable: true,
        }));
        assert!(cmd.is_some());
        assert_eq!(m.last_handled.as_deref(), Some("c"));
    }

    #[test]
    fn test_change_receipt_for_other_widget_ignored() {
        let mut m = Model::new(40).with_items(three_wide_items());
        let _ = m.set_selected(Some("c"));
        assert!(m.run_measure().is_some());

        let cmd = m.update(Box::new(ScrollableChangedMsg {
            id: m.id() + 1,
            scrollable: true,
        }));
        assert!(cmd.is_none());
        assert_eq!(m.last_handled, None);
    }

    #[test]
    fn test_start_receipt_arms_probe_or_resumes_frames() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        // instant motion: receipt arms the settle probe
        m.update(wheel(30.0));
        let cmd = m.update(Box::new(ScrollStartedMsg { id: m.id() }));
        assert!(cmd.is_some());
        assert!(!m.track.animating());

        // smooth motion: receipt resumes the frame chain instead
        let mut anim = Model::new(40).with_items(three_wide_items());
        measure(&mut anim);
        anim.step(Direction::Right);
        let cmd = anim.update(Box::new(ScrollStartedMsg { id: anim.id() }));
        assert!(cmd.is_some());
        assert!(anim.track.animating());

        // someone else's start event is not ours to act on
        assert!(m.update(Box::new(ScrollStartedMsg { id: m.id() + 1 })).is_none());
    }

    #[test]
    fn test_settle_ends_burst_and_classifies_edge() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        m.update(wheel(52.0));
        assert!(m.is_scrolling());

        // quiet for longer than any window: the burst ends at the right edge
        let cmd = m.on_settle(Instant::now() + Duration::from_secs(1));
        assert!(cmd.is_some());
        assert!(!m.is_scrolling());
        assert_eq!(m.resting_edge(), Some(Direction::Right));
    }

    #[test]
    fn test_settle_rearms_while_motion_is_fresh() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        m.update(wheel(30.0));

        // probing immediately finds fresh motion and re-arms
        let cmd = m.on_settle(Instant::now());
        assert!(cmd.is_some());
        assert!(m.is_scrolling());
    }

    #[test]
    fn test_resting_edge_positions() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        assert_eq!(m.resting_edge(), Some(Direction::Left));

        m.update(wheel(20.0));
        assert_eq!(m.resting_edge(), None);

        m.update(wheel(32.0));
        assert_eq!(m.resting_edge(), Some(Direction::Right));
    }

    #[test]
    fn test_resting_edge_prefers_left_when_both_blocked() {
        let mut m = Model::new(40).with_items(vec![Node::item("x".repeat(40))]);
        measure(&mut m);
        assert_eq!(m.resting_edge(), Some(Direction::Left));
    }

    #[test]
    fn test_scroll_by_and_scroll_to() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        assert!(m.scroll_by(10.0).is_some());
        assert!(m.is_scrolling());
        assert!(m.track.animating());

        let mut idle = Model::new(40).with_items(three_wide_items());
        measure(&mut idle);
        // moving to where we already are is not a burst
        assert!(idle.scroll_to(0.0).is_none());
        assert!(!idle.is_scrolling());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);
        m.update(wheel(30.0));
        let _ = m.set_selected(Some("c"));
        measure(&mut m);

        m.reset();
        assert_eq!(m.offset(), 0.0);
        assert!(!m.is_scrolling());
        assert!(!m.scrollable());
        assert_eq!(m.shaking(), None);
        assert_eq!(m.last_handled, None);
    }

    #[test]
    fn test_view_windows_the_strip() {
        let mut m = Model::new(10).with_items(vec![
            Node::item("abcdefghij"),
            Node::item("KLMNOPQRST"),
        ]);
        measure(&mut m);
        assert!(m.scrollable());

        let text = strip_ansi(&m.view());
        assert!(text.contains("abcdefghij"));
        assert!(!text.contains('K'));

        m.update(wheel(11.0));
        let text = strip_ansi(&m.view());
        assert!(text.contains("KLMNOPQRST"));
        assert!(!text.contains('a'));
    }

    #[test]
    fn test_view_shows_controls_only_when_overflowing() {
        let mut m = Model::new(10).with_items(vec![
            Node::item("abcdefghij"),
            Node::item("KLMNOPQRST"),
        ]);
        measure(&mut m);
        let text = strip_ansi(&m.view());
        assert!(text.contains('◀'));
        assert!(text.contains('▶'));

        let mut small = Model::new(40).with_items(vec![Node::item("hi")]);
        measure(&mut small);
        let text = strip_ansi(&small.view());
        assert!(!text.contains('◀'));
        assert!(!text.contains('▶'));
    }

    #[test]
    fn test_view_fit_alignment() {
        let mut m = Model::new(10)
            .with_items(vec![Node::item("ab")])
            .with_alignment(Alignment::Center);
        measure(&mut m);
        assert_eq!(strip_ansi(&m.view()), "    ab    ");

        let mut end = Model::new(10)
            .with_items(vec![Node::item("ab")])
            .with_alignment(Alignment::End);
        measure(&mut end);
        assert_eq!(strip_ansi(&end.view()), "        ab");
    }

    #[test]
    fn test_shake_nudges_the_strip() {
        let mut m = Model::new(10).with_items(vec![Node::item("ab")]);
        measure(&mut m);
        let calm = m.view();
        m.step(Direction::Right);
        assert_ne!(m.view(), calm);
        m.reset();
        assert_eq!(m.view(), calm);
    }

    #[test]
    fn test_window_line_cuts_and_pads() {
        assert_eq!(window_line("hello world", 0, 5), "hello");
        assert_eq!(window_line("hello world", 6, 5), "world");
        assert_eq!(window_line("hi", 0, 5), "hi   ");
        assert_eq!(window_line("hello", 10, 3), "   ");
        assert_eq!(window_line("hello", -2, 5), "  hel");
    }

    #[test]
    fn test_window_line_blanks_split_wide_glyphs() {
        // 世 occupies columns 0-1; a window starting at 1 exposes half of it
        assert_eq!(window_line("世界", 1, 5), " 界  ");
        // and a window ending inside 界 blanks the overhang
        assert_eq!(window_line("世界x", 0, 3), "世 ");
    }

    #[test]
    fn test_window_keeps_multiline_shape() {
        let cut = window("abc\ndef", 1, 2);
        assert_eq!(cut, "bc\nef");
    }

    #[test]
    fn test_default_step_distance_floor() {
        let mut m = Model::new(400).with_items(vec![Node::item("x".repeat(1000))]);
        measure(&mut m);
        assert_eq!(
            m.steps.step_distance(Direction::Right, m.track.viewport()),
            208.0
        );
    }

    #[test]
    fn test_unique_widget_ids() {
        assert_ne!(Model::new(10).id(), Model::new(10).id());
    }

    #[tokio::test]
    async fn test_driven_wheel_burst_ends_at_right_edge() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        let cmd = m.update(wheel(60.0));
        assert!(m.is_scrolling());

        let log = drive(&mut m, cmd).await;
        assert_eq!(log.started, 1);
        assert_eq!(log.ended.len(), 1);
        assert_eq!(log.ended[0].edge, Some(Direction::Right));
        assert_eq!(m.offset(), 52.0);
        assert!(!m.is_scrolling());
    }

    #[tokio::test]
    async fn test_driven_step_settles_exactly_at_floor_distance() {
        let mut m = Model::new(400).with_items(vec![Node::item("x".repeat(1000))]);
        measure(&mut m);

        let cmd = m.step(Direction::Right);
        let log = drive(&mut m, cmd).await;

        // the spring lands exactly on the clamped target, max(400/2, 208)
        assert_eq!(m.offset(), 208.0);
        assert_eq!(log.started, 1);
        assert_eq!(log.ended.len(), 1);
        assert_eq!(log.ended[0].edge, None);
        assert!(!m.track.animating());
        assert!(!m.is_scrolling());
    }

    #[tokio::test]
    async fn test_driven_shrink_mid_burst_ends_at_left_edge() {
        let mut m = Model::new(40).with_items(three_wide_items());
        measure(&mut m);

        let started = m.update(wheel(60.0));
        assert_eq!(m.offset(), 52.0);

        // content shrinks to a fitting row while the burst is still open
        let shrink = Some(m.set_items(vec![Node::item("hi")]));
        let log = drive(&mut m, shrink).await;

        // the re-measure clamps to zero; the settle finds both edges blocked
        // and left wins the tie
        assert_eq!(m.offset(), 0.0);
        assert!(!m.is_scrolling());
        assert_eq!(log.ended.len(), 1);
        assert_eq!(log.ended[0].edge, Some(Direction::Left));

        // the burst's start event is still in flight; hearing it after the
        // end produces nothing
        let tail = drive(&mut m, started).await;
        assert_eq!(tail.started, 1);
        assert!(!m.is_scrolling());
    }
}
