mod tree;

pub use tree::TreeTarget;

use std::sync::mpsc;

use glob::Pattern;

use crate::error::ItemError;

/// Opaque handle to a node inside the render target. Only meaningful to the
/// target that issued it, and only until that target is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A subtree to insert into the render target
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Fragment>,
}

impl Fragment {
    pub fn new(tag: &str) -> Self {
        Fragment {
            tag: tag.to_string(),
            ..Fragment::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: Fragment) -> Self {
        self.children.push(child);
        self
    }
}

/// The narrow capability interface onto the external rendered diff view.
///
/// The host renderer's node structure is undocumented and unstable, so the
/// core only ever touches it through these queries plus a single write. All
/// queries are read-only; `insert_after` is the one mutation, and it places
/// the fragment as a sibling so the anchor's own content is never touched.
pub trait RenderTarget {
    /// Nodes whose id attribute matches the glob pattern, in tree order.
    /// Scoped to `scope`'s subtree when given, else the whole container.
    fn find_by_id_pattern(&self, scope: Option<NodeId>, pattern: &Pattern) -> Vec<NodeId>;

    /// Nodes carrying an attribute with exactly this value
    fn find_by_attr(&self, scope: Option<NodeId>, name: &str, value: &str) -> Vec<NodeId>;

    /// Nodes whose own text contains `needle`
    fn find_by_text(&self, scope: Option<NodeId>, needle: &str) -> Vec<NodeId>;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    fn id_attr(&self, node: NodeId) -> Option<String>;

    fn text(&self, node: NodeId) -> String;

    /// The row-level ancestor a fragment should be inserted after. Returns
    /// the node itself when nothing above it looks like a row.
    fn enclosing_row(&self, node: NodeId) -> NodeId;

    /// The per-file section ancestor of a node, if the target has one
    fn enclosing_section(&self, node: NodeId) -> Option<NodeId>;

    /// Insert the fragment as the next sibling of `row`. Fails with
    /// `RenderTargetGone` when the target has been torn down.
    fn insert_after(&mut self, row: NodeId, fragment: Fragment) -> Result<NodeId, ItemError>;

    /// Whether the view has finished rendering enough to be queried safely
    fn is_ready(&self) -> bool;

    /// False once the host has navigated away or removed the container
    fn is_attached(&self) -> bool;

    /// One-shot structural-change notification. The sender side fires at
    /// most once, when the target next re-renders; dropping the receiver
    /// disconnects the subscription.
    fn subscribe_change(&mut self) -> mpsc::Receiver<()>;
}
