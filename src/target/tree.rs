use std::sync::mpsc;

use glob::Pattern;
use sha2::{Digest, Sha256};

use crate::diff::{DiffIndex, LineType};
use crate::error::ItemError;
use crate::target::{Fragment, NodeId, RenderTarget};

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Node {
    fn new(tag: &str, parent: Option<usize>) -> Self {
        Node {
            tag: tag.to_string(),
            id: None,
            attrs: Vec::new(),
            text: None,
            parent,
            children: Vec::new(),
        }
    }
}

/// In-memory render target.
///
/// Stands in for the host's rendered diff view: the CLI builds one from a
/// parsed diff the way a renderer would (file sections carrying `data-path`,
/// rows carrying `data-line` and `<hash>R<n>` ids), and tests build
/// degenerate shapes by hand to exercise each placement tier.
pub struct TreeTarget {
    nodes: Vec<Node>,
    root: usize,
    ready: bool,
    attached: bool,
    change_subs: Vec<mpsc::Sender<()>>,
}

impl TreeTarget {
    pub fn new() -> Self {
        TreeTarget {
            nodes: vec![Node::new("diff-view", None)],
            root: 0,
            ready: false,
            attached: true,
            change_subs: Vec::new(),
        }
    }

    /// Build the tree a host renderer would produce for this diff
    pub fn from_diff(index: &DiffIndex) -> Self {
        let mut target = TreeTarget::new();
        let root = target.root();

        for file in index.files() {
            let section = target.append(root, "file");
            target.set_attr(section, "data-path", &file.path);
            let header = target.append(section, "header");
            target.set_text(header, &file.path);

            let hash = short_path_hash(&file.path);
            for hunk in &file.hunks {
                let hunk_row = target.append(section, "hunk-header");
                target.set_text(hunk_row, &hunk.header);

                for line in &hunk.lines {
                    let row = target.append(section, "row");
                    if let Some(n) = line.new_num {
                        target.set_attr(row, "data-line", &n.to_string());
                        target.set_id(row, &format!("{hash}R{n}"));
                    }
                    let gutter = target.append(row, "gutter");
                    let gutter_text = line
                        .new_num
                        .map(|n| format!("{n:>5}"))
                        .unwrap_or_else(|| "     ".to_string());
                    target.set_text(gutter, &gutter_text);

                    let sigil = match line.line_type {
                        LineType::Add => '+',
                        LineType::Delete => '-',
                        LineType::Context => ' ',
                    };
                    let code = target.append(row, "code");
                    target.set_text(code, &format!("{sigil}{}", line.content));
                }
            }
        }

        target.ready = true;
        target
    }

    pub fn root(&self) -> NodeId {
        NodeId(self.root)
    }

    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let idx = self.nodes.len();
        self.nodes.push(Node::new(tag, Some(parent.0)));
        self.nodes[parent.0].children.push(idx);
        NodeId(idx)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attrs
            .push((name.to_string(), value.to_string()));
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.nodes[node.0].id = Some(id.to_string());
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = Some(text.to_string());
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Simulate the host tearing the view down
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Fire the one-shot structural-change notification to all subscribers
    pub fn fire_change(&mut self) {
        for tx in self.change_subs.drain(..) {
            let _ = tx.send(());
        }
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    /// Flatten the tree back to displayable text, one line per row,
    /// with inserted suggestion fragments indented beneath their anchors
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root, &mut out);
        out
    }

    fn write_node(&self, idx: usize, out: &mut String) {
        let node = &self.nodes[idx];
        match node.tag.as_str() {
            "header" | "hunk-header" => {
                if let Some(ref text) = node.text {
                    out.push_str(text);
                    out.push('\n');
                }
            }
            "row" => {
                let mut line = String::new();
                for &child in &node.children {
                    if let Some(ref text) = self.nodes[child].text {
                        if !line.is_empty() {
                            line.push_str(" │ ");
                        }
                        line.push_str(text);
                    }
                }
                out.push_str(&line);
                out.push('\n');
            }
            "suggestion" => {
                for &child in &node.children {
                    if let Some(ref text) = self.nodes[child].text {
                        for text_line in text.lines() {
                            out.push_str("        ┃ ");
                            out.push_str(text_line);
                            out.push('\n');
                        }
                    }
                }
            }
            _ => {
                for &child in &node.children {
                    self.write_node(child, out);
                }
                return;
            }
        }
        // Structural tags above handle their own children inline; rows and
        // headers may still have fragments appended after them at the same
        // level, which the parent loop covers
    }

    fn subtree(&self, scope: Option<NodeId>) -> Vec<usize> {
        let start = scope.map(|n| n.0).unwrap_or(self.root);
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            // Push in reverse so traversal stays preorder
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    fn build_fragment(&mut self, fragment: &Fragment, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        let mut node = Node::new(&fragment.tag, parent);
        node.attrs = fragment.attrs.clone();
        node.text = fragment.text.clone();
        self.nodes.push(node);
        for child in &fragment.children {
            let child_idx = self.build_fragment(child, Some(idx));
            self.nodes[idx].children.push(child_idx);
        }
        idx
    }
}

impl Default for TreeTarget {
    fn default() -> Self {
        TreeTarget::new()
    }
}

impl RenderTarget for TreeTarget {
    fn find_by_id_pattern(&self, scope: Option<NodeId>, pattern: &Pattern) -> Vec<NodeId> {
        self.subtree(scope)
            .into_iter()
            .filter(|&idx| {
                self.nodes[idx]
                    .id
                    .as_deref()
                    .is_some_and(|id| pattern.matches(id))
            })
            .map(NodeId)
            .collect()
    }

    fn find_by_attr(&self, scope: Option<NodeId>, name: &str, value: &str) -> Vec<NodeId> {
        self.subtree(scope)
            .into_iter()
            .filter(|&idx| {
                self.nodes[idx]
                    .attrs
                    .iter()
                    .any(|(n, v)| n == name && v == value)
            })
            .map(NodeId)
            .collect()
    }

    fn find_by_text(&self, scope: Option<NodeId>, needle: &str) -> Vec<NodeId> {
        self.subtree(scope)
            .into_iter()
            .filter(|&idx| {
                self.nodes[idx]
                    .text
                    .as_deref()
                    .is_some_and(|t| t.contains(needle))
            })
            .map(NodeId)
            .collect()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes[node.0]
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn id_attr(&self, node: NodeId) -> Option<String> {
        self.nodes[node.0].id.clone()
    }

    fn text(&self, node: NodeId) -> String {
        self.nodes[node.0].text.clone().unwrap_or_default()
    }

    fn enclosing_row(&self, node: NodeId) -> NodeId {
        let mut idx = node.0;
        loop {
            if self.nodes[idx].tag == "row" {
                return NodeId(idx);
            }
            match self.nodes[idx].parent {
                Some(parent) => idx = parent,
                None => return node,
            }
        }
    }

    fn enclosing_section(&self, node: NodeId) -> Option<NodeId> {
        let mut idx = node.0;
        loop {
            if self.nodes[idx].tag == "file" {
                return Some(NodeId(idx));
            }
            idx = self.nodes[idx].parent?;
        }
    }

    fn insert_after(&mut self, row: NodeId, fragment: Fragment) -> Result<NodeId, ItemError> {
        if !self.attached {
            return Err(ItemError::RenderTargetGone);
        }
        let parent = self.nodes[row.0].parent.unwrap_or(self.root);
        let new_idx = self.build_fragment(&fragment, Some(parent));
        let pos = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == row.0)
            .map(|p| p + 1)
            .unwrap_or(self.nodes[parent].children.len());
        self.nodes[parent].children.insert(pos, new_idx);
        Ok(NodeId(new_idx))
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn subscribe_change(&mut self) -> mpsc::Receiver<()> {
        let (tx, rx) = mpsc::channel();
        self.change_subs.push(tx);
        rx
    }
}

/// Stable per-file prefix for row ids, the shape host renderers use to keep
/// line anchors unique across file sections
pub fn short_path_hash(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for byte in &digest[..8] {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
