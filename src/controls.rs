//! Directional controls: visibility policy, placement routing, rendering.
//!
//! Whether a control shows is a pure function of its configured policy and
//! the current overflow state; nothing here owns state. Placement decides
//! where the controls block sits relative to the items, including the
//! separated layout's cross-attachment: an inner element rides in the block
//! opposite its own side's control, filling the spot that control leaves
//! empty.

use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use once_cell::sync::Lazy;

use crate::track::Direction;

/// When a directional control renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Shown only while the content overflows the viewport.
    #[default]
    Auto,
    /// Always shown, overflow or not.
    Always,
    /// Never shown.
    Never,
}

/// Where the controls block sits relative to the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Left control before the items, right control after.
    #[default]
    Separated,
    /// Both controls in one block before the items.
    BeforeContent,
    /// Both controls in one block after the items.
    AfterContent,
}

/// Block positions the renderer asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPosition {
    /// The block to the left of the strip.
    BeforeItems,
    /// The block to the right of the strip.
    AfterItems,
}

/// One renderable piece of a controls block, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    /// The directional control for a side.
    Control(Direction),
    /// The persistent inner element attached to a side.
    Inner(Direction),
}

/// Glyphs for the two directional controls.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    /// Glyph of the left control.
    pub left: String,
    /// Glyph of the right control.
    pub right: String,
}

/// Filled arrowheads, the default.
pub static ARROWS: Lazy<GlyphSet> = Lazy::new(|| GlyphSet {
    left: "◀".to_string(),
    right: "▶".to_string(),
});

/// Single angle quotes, a lighter look.
pub static CHEVRONS: Lazy<GlyphSet> = Lazy::new(|| GlyphSet {
    left: "‹".to_string(),
    right: "›".to_string(),
});

/// Small triangles.
pub static TRIANGLES: Lazy<GlyphSet> = Lazy::new(|| GlyphSet {
    left: "◂".to_string(),
    right: "▸".to_string(),
});

/// Per-side control configuration.
#[derive(Debug, Clone, Default)]
pub struct Control {
    /// When this side's control renders.
    pub visibility: Visibility,
    /// Glyph override for this side; falls back to the widget's glyph set.
    pub glyph: Option<String>,
    /// Style override for this side; falls back to the block's control style.
    pub style: Option<Style>,
    /// Persistent inline element rendered in the block regardless of the
    /// control's visibility.
    pub inner: Option<String>,
}

/// Placement plus both sides.
#[derive(Debug, Clone, Default)]
pub struct ControlsConfig {
    /// Where the controls block(s) render.
    pub placement: Placement,
    /// The left-side control.
    pub left: Control,
    /// The right-side control.
    pub right: Control,
}

impl ControlsConfig {
    fn side(&self, direction: Direction) -> &Control {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }
}

/// Styles for rendering controls blocks.
#[derive(Debug, Clone)]
pub struct ControlStyles {
    /// Style applied to control glyphs.
    pub control: Style,
    /// Style applied to control glyphs while the strip is shaking.
    pub shaking: Style,
    /// Style wrapping a whole rendered block.
    pub block: Style,
}

impl Default for ControlStyles {
    fn default() -> Self {
        Self {
            control: Style::new().padding(0, 1, 0, 1),
            shaking: Style::new()
                .padding(0, 1, 0, 1)
                .foreground(Color::from("203"))
                .bold(true),
            block: Style::new(),
        }
    }
}

/// Pure visibility decision for one side.
pub fn visible(control: &Control, overflow: bool) -> bool {
    match control.visibility {
        Visibility::Always => true,
        Visibility::Never => false,
        Visibility::Auto => overflow,
    }
}

/// Whether any controls block renders at all: at least one visible control,
/// or a persistent inner element on either side.
pub fn block_visible(config: &ControlsConfig, overflow: bool) -> bool {
    visible(&config.left, overflow)
        || visible(&config.right, overflow)
        || config.left.inner.is_some()
        || config.right.inner.is_some()
}

/// Pieces a block renders at `position` under `placement`, in order.
/// Visibility filtering happens later; routing is pure layout.
pub fn route(placement: Placement, position: BlockPosition) -> Vec<Piece> {
    match placement {
        Placement::BeforeContent => match position {
            BlockPosition::BeforeItems => vec![
                Piece::Control(Direction::Left),
                Piece::Inner(Direction::Left),
                Piece::Control(Direction::Right),
                Piece::Inner(Direction::Right),
            ],
            BlockPosition::AfterItems => Vec::new(),
        },
        Placement::AfterContent => match position {
            BlockPosition::BeforeItems => Vec::new(),
            BlockPosition::AfterItems => vec![
                Piece::Inner(Direction::Left),
                Piece::Control(Direction::Left),
                Piece::Inner(Direction::Right),
                Piece::Control(Direction::Right),
            ],
        },
        Placement::Separated => match position {
            BlockPosition::BeforeItems => vec![
                Piece::Control(Direction::Left),
                Piece::Inner(Direction::Right),
            ],
            BlockPosition::AfterItems => vec![
                Piece::Inner(Direction::Left),
                Piece::Control(Direction::Right),
            ],
        },
    }
}

/// Renders the controls block at `position`, or `None` when nothing shows
/// there.
pub fn render_block(
    config: &ControlsConfig,
    glyphs: &GlyphSet,
    styles: &ControlStyles,
    position: BlockPosition,
    overflow: bool,
    shaking: bool,
) -> Option<String> {
    if !block_visible(config, overflow) {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for piece in route(config.placement, position) {
        match piece {
            Piece::Control(direction) => {
                let side = config.side(direction);
                if !visible(side, overflow) {
                    continue;
                }
                let glyph = side.glyph.as_deref().unwrap_or(match direction {
                    Direction::Left => &glyphs.left,
                    Direction::Right => &glyphs.right,
                });
                let style = if shaking {
                    &styles.shaking
                } else {
                    side.style.as_ref().unwrap_or(&styles.control)
                };
                parts.push(style.render(glyph));
            }
            Piece::Inner(direction) => {
                if let Some(inner) = &config.side(direction).inner {
                    parts.push(inner.clone());
                }
            }
        }
    }

    if parts.is_empty() {
        return None;
    }
    let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
    Some(
        styles
            .block
            .render(&lipgloss::join_horizontal(lipgloss::TOP, &refs)),
    )
}
