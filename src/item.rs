//! Items and the node tree the scroller lays out.
//!
//! Hosts hand the widget a list of [`Node`]s: leaf [`Item`]s carrying
//! pre-rendered (possibly styled, possibly multi-line) content, or nested
//! groups. Only items matter for layout; groups are organizational and are
//! flattened before any measurement, so rebuilding the tree between updates is
//! free. Selection targets an item by its stable id, never by position, which
//! is what lets hosts reconstruct the list every update without confusing the
//! auto-scroll.
//!
//! All traversals here are pure: they borrow the tree and return owned
//! results (widths, spans, references in layout order).

use lipgloss_extras::lipgloss::width as lg_width;

/// A single entry in the strip.
///
/// The content is stored as already-rendered text; the widget never restyles
/// it. The id is optional: only items that can be targeted by selection need
/// one.
#[derive(Debug, Clone)]
pub struct Item {
    id: Option<String>,
    content: String,
}

impl Item {
    /// Creates an item without an id.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
        }
    }

    /// Creates an item carrying a stable id so selection can find it.
    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            content: content.into(),
        }
    }

    /// Returns the item's id, if it has one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the item's rendered content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Display width of the item: the widest line of its content.
    pub fn width(&self) -> usize {
        self.content.lines().map(lg_width).max().unwrap_or(0)
    }
}

/// A node in the strip: a leaf item or a nested group.
#[derive(Debug, Clone)]
pub enum Node {
    /// A leaf entry.
    Item(Item),
    /// A nested run of nodes, flattened for layout.
    Group(Vec<Node>),
}

impl From<Item> for Node {
    fn from(item: Item) -> Self {
        Node::Item(item)
    }
}

impl Node {
    /// Shorthand for a leaf without an id.
    pub fn item(content: impl Into<String>) -> Self {
        Node::Item(Item::new(content))
    }

    /// Shorthand for a leaf with an id.
    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Node::Item(Item::with_id(id, content))
    }

    /// Shorthand for a group.
    pub fn group(children: Vec<Node>) -> Self {
        Node::Group(children)
    }
}

/// Horizontal placement of one item inside the laid-out strip, in display
/// columns from the strip's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Left edge of the item.
    pub start: f64,
    /// Display width of the item.
    pub width: f64,
}

impl Span {
    /// Right edge of the item (exclusive).
    pub fn end(&self) -> f64 {
        self.start + self.width
    }
}

/// Collects the leaf items of a tree in layout order.
pub fn flatten(nodes: &[Node]) -> Vec<&Item> {
    let mut out = Vec::new();
    collect(nodes, &mut out);
    out
}

fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a Item>) {
    for node in nodes {
        match node {
            Node::Item(item) => out.push(item),
            Node::Group(children) => collect(children, out),
        }
    }
}

/// Total display width of the laid-out strip: leaf widths plus `gap` columns
/// between adjacent leaves.
pub fn total_width(nodes: &[Node], gap: usize) -> usize {
    let leaves = flatten(nodes);
    if leaves.is_empty() {
        return 0;
    }
    let widths: usize = leaves.iter().map(|item| item.width()).sum();
    widths + gap * (leaves.len() - 1)
}

/// Finds the span of the item with the given id, if present anywhere in the
/// tree. Positions account for the same `gap` used when rendering.
pub fn locate(nodes: &[Node], id: &str, gap: usize) -> Option<Span> {
    let mut x = 0usize;
    for (i, item) in flatten(nodes).into_iter().enumerate() {
        if i > 0 {
            x += gap;
        }
        let w = item.width();
        if item.id() == Some(id) {
            return Some(Span {
                start: x as f64,
                width: w as f64,
            });
        }
        x += w;
    }
    None
}
