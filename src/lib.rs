#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-scroller/")]

//! # bubbletea-scroller
//!
//! A horizontal scroll container for [bubbletea-rs](https://github.com/whit3rabbit/bubbletea-rs)
//! terminal applications: tab bars, card rails, and breadcrumb strips that are
//! wider than the window they live in.
//!
//! [![Crates.io](https://img.shields.io/crates/v/bubbletea-scroller.svg)](https://crates.io/crates/bubbletea-scroller)
//! [![Documentation](https://docs.rs/bubbletea-scroller/badge.svg)](https://docs.rs/bubbletea-scroller)
//! [![License](https://img.shields.io/badge/license-MIT-blue.svg)](https://opensource.org/licenses/MIT)
//!
//! ## Overview
//!
//! The widget follows the Elm Architecture pattern with `init()`, `update()`,
//! and `view()` methods. Hand it a row of pre-rendered items and a window
//! width; it measures overflow, shows directional controls when the row does
//! not fit, steps smoothly left and right from the keyboard, accepts wheel
//! input the host forwards, and scrolls a selected item into view on its own.
//!
//! ## Features
//!
//! - **Overflow-aware controls** that appear and disappear as content and
//!   window sizes change, with configurable placement, glyphs, and styles
//! - **Scroll lifecycle events** (`ScrollStartedMsg` / `ScrollEndedMsg`)
//!   derived from the motion itself, so wheel jumps, smooth steps, and
//!   programmatic moves all report the same way
//! - **Boundary feedback**: a step against a blocked edge shakes the strip
//!   instead of silently doing nothing
//! - **Selection auto-scroll** keyed by stable item ids, firing once per
//!   distinct selection
//! - **Type-safe key bindings** with help text, compatible with help-bar
//!   widgets from this component family
//!
//! ## The measurement lifecycle
//!
//! Nothing scrolls until the widget has measured itself. Measurements are
//! scheduled (debounced) by `WindowSizeMsg`, by every content mutator
//! (`set_items`, `set_width`, `set_gap`, `set_selected`), and by `refresh()`.
//! The commands those methods return must reach the runtime, and every
//! message the runtime produces must come back through `update`, including
//! the widget's own published events, whose receipt drives its follow-up
//! scheduling.
//!
//! ## Key Bindings
//!
//! The scroller uses the type-safe key binding system from the `key` module:
//!
//! ```rust
//! use bubbletea_scroller::key::{Binding, KeyMap};
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! // Create key bindings
//! let left = Binding::new(vec![KeyCode::Left, KeyCode::Char('h')])
//!     .with_help("←/h", "scroll left");
//!
//! let jump = Binding::new(vec![(KeyCode::Char('e'), KeyModifiers::CONTROL)])
//!     .with_help("ctrl+e", "jump to end");
//!
//! // Implement KeyMap for your component
//! struct MyKeyMap {
//!     left: Binding,
//!     jump: Binding,
//! }
//!
//! impl KeyMap for MyKeyMap {
//!     fn short_help(&self) -> Vec<&Binding> {
//!         vec![&self.left, &self.jump]
//!     }
//!
//!     fn full_help(&self) -> Vec<Vec<&Binding>> {
//!         vec![vec![&self.left], vec![&self.jump]]
//!     }
//! }
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! ```rust
//! use bubbletea_scroller::prelude::*;
//! use bubbletea_rs::{Model, Cmd, Msg};
//!
//! struct App {
//!     tabs: Scroller,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut tabs = Scroller::new(80).with_items(vec![
//!             Node::with_id("inbox", " Inbox "),
//!             Node::with_id("drafts", " Drafts "),
//!             Node::with_id("sent", " Sent "),
//!         ]);
//!         let cmd = tabs.refresh();
//!         (Self { tabs }, Some(cmd))
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         // react to the widget's events before forwarding them back in
//!         if let Some(ended) = msg.downcast_ref::<ScrollEndedMsg>() {
//!             let _at_edge = ended.edge;
//!         }
//!         self.tabs.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.tabs.view()
//!     }
//! }
//! ```
//!
//! ## Quick Start
//!
//! Add bubbletea-scroller to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bubbletea-scroller = "0.1"
//! bubbletea-rs = "0.0.7"
//! crossterm = "0.29"
//! ```
//!
//! For convenience, you can import the prelude:
//!
//! ```rust
//! use bubbletea_scroller::prelude::*;
//! ```
//!
//! ## Module Overview
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `scroller` | The composed widget: dispatch, events, rendering |
//! | `item` | The item tree: leaves, groups, width/span math |
//! | `controls` | Control visibility policy, placement routing, glyphs |
//! | `track` | Offset, boundaries, and the smooth-move spring |
//! | `geometry` | Debounced overflow measurement |
//! | `activity` | Scroll burst lifecycle and settle timing |
//! | `step` | Step distances and the blocked-edge shake |
//! | `key` | Type-safe key bindings and help metadata |

pub mod activity;
pub mod controls;
pub mod geometry;
pub mod item;
pub mod key;
pub mod scroller;
pub mod step;
pub mod track;

pub use controls::{
    Control, ControlStyles, ControlsConfig, GlyphSet, Placement, Visibility, ARROWS, CHEVRONS,
    TRIANGLES,
};
pub use item::{Item, Node, Span};
pub use key::{
    matches, matches_binding, new_binding, with_disabled, with_help, with_keys, Binding,
    Help as KeyHelp, KeyMap, KeyPress,
};
pub use scroller::{
    Alignment, Model as Scroller, ScrollEndedMsg, ScrollStartedMsg, ScrollableChangedMsg,
    ScrollerKeyMap, WheelMsg,
};
pub use track::Direction;

/// Prelude module for convenient imports.
///
/// Re-exports the types a host application touches when embedding the
/// scroller, so one `use` statement covers the common cases.
///
/// # Usage
///
/// ```rust
/// use bubbletea_scroller::prelude::*;
///
/// let tabs = Scroller::new(60)
///     .with_items(vec![Node::item(" One "), Node::item(" Two ")])
///     .with_alignment(Alignment::Center);
/// assert_eq!(tabs.width(), 60);
/// ```
pub mod prelude {
    pub use crate::controls::{
        Control, ControlStyles, ControlsConfig, GlyphSet, Placement, Visibility, ARROWS, CHEVRONS,
        TRIANGLES,
    };
    pub use crate::item::{Item, Node, Span};
    pub use crate::key::{
        matches, matches_binding, new_binding, with_disabled, with_help, with_keys, Binding,
        Help as KeyHelp, KeyMap, KeyPress,
    };
    pub use crate::scroller::{
        Alignment, Model as Scroller, ScrollEndedMsg, ScrollStartedMsg, ScrollableChangedMsg,
        ScrollerKeyMap, WheelMsg,
    };
    pub use crate::track::Direction;
}
