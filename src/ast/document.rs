use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::ops::Index;

use crate::lexer::{Position, Range};

use super::node::{Node, NodeData, NodeId, NodeKind};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Arena that owns every node of one parsed (or hand-built) tree.
///
/// Slot 0 is the root, a `document` node created together with the arena.
/// Nodes are never freed individually: detaching a node only unlinks it, so
/// its id keeps pointing at the same subtree until the document is dropped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document, Position::new())],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, detached nodes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root slot exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Iterates over every slot in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.node(id).value()
    }

    pub fn position(&self, id: NodeId) -> Position {
        self.node(id).position
    }

    pub fn range(&self, id: NodeId) -> Option<Range> {
        self.node(id).range
    }

    pub fn set_range(&mut self, id: NodeId, range: Range) {
        self.nodes[id.0].range = Some(range);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn attributes(&self, id: NodeId) -> &BTreeMap<String, String> {
        &self.node(id).attributes
    }

    pub fn set_attribute(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.nodes[id.0].attributes.insert(key.into(), value.into());
    }

    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> Option<String> {
        self.nodes[id.0].attributes.remove(key)
    }

    // Arena internals

    pub(super) fn alloc(&mut self, data: NodeData, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data, position));
        id
    }

    pub(super) fn replace_data(&mut self, id: NodeId, data: NodeData) {
        self.nodes[id.0].data = data;
    }

    pub(super) fn set_position(&mut self, id: NodeId, position: Position) {
        self.nodes[id.0].position = position;
    }

    /// Unlinks `id` from its parent, if any.
    pub(super) fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Inserts `child` under `parent` at `index`, moving it out of its current
    /// parent first.
    pub(super) fn attach_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub(super) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        self.attach_at(parent, index, child);
    }

    /// Drops every slot created after the arena had `len` slots.
    ///
    /// Nodes created since then must only be linked among themselves, which
    /// holds for the parser's backtracking.
    pub(crate) fn truncate(&mut self, len: usize) {
        let len = len.max(1);
        debug_assert!(self.nodes[..len.min(self.nodes.len())].iter().all(|node| {
            node.parent.is_none_or(|parent| parent.0 < len)
                && node.children.iter().all(|child| child.0 < len)
        }));
        self.nodes.truncate(len);
    }

    // Queries

    /// Number of edges between `id` and the top of its tree.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Ids from the top of the tree down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id);
        path
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            // Linkage is acyclic, the bound only protects against a broken arena.
            if ancestors.len() > self.nodes.len() {
                break;
            }
            ancestors.push(parent);
            current = self.parent(parent);
        }
        ancestors
    }

    /// True when `ancestor` is `id` itself or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).contains(&ancestor)
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_ancestor_or_self(self.root, id)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Other children of the same parent, in order.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .filter(|&child| child != id)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .map(|previous| self.children(parent)[previous])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Every node below `id` in pre-order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            descendants.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        descendants
    }

    /// Concatenated literal text below `id`: text and code values, image alt
    /// text, and a line feed per newline node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut content = String::new();
        for node in std::iter::once(id).chain(self.descendants(id)) {
            match self.data(node) {
                NodeData::Text { value } | NodeData::Code { value } => content.push_str(value),
                NodeData::Image { alt, .. } => content.push_str(alt),
                NodeData::Newline => content.push('\n'),
                _ => {}
            }
        }
        content
    }

    /// Indented one-line-per-node rendering of the subtree at `id`.
    ///
    /// ```text
    /// document
    ///   heading level=1
    ///     text "Title"
    /// ```
    pub fn outline(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![(id, 0usize)];
        while let Some((current, depth)) = stack.pop() {
            let _ = writeln!(out, "{:indent$}{}", "", self.data(current), indent = depth * 2);
            stack.extend(
                self.children(current)
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1)),
            );
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let first = doc.text("a", Position::new());
        let second = doc.text("b", Position::new());
        let paragraph = doc.paragraph(vec![first, second], Position::new());
        let root_position = doc.position(doc.root());
        doc.document(vec![paragraph], root_position);
        (doc, paragraph, first, second)
    }

    #[test]
    fn test_new_document_has_root() {
        let doc = Document::new();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.kind(doc.root()), NodeKind::Document);
        assert_eq!(doc.parent(doc.root()), None);
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn test_queries() {
        let (doc, paragraph, first, second) = sample();
        let root = doc.root();

        assert_eq!(doc.depth(root), 0);
        assert_eq!(doc.depth(second), 2);
        assert_eq!(doc.path(second), vec![root, paragraph, second]);
        assert_eq!(doc.ancestors(first), vec![paragraph, root]);
        assert_eq!(doc.siblings(first), vec![second]);
        assert_eq!(doc.previous_sibling(second), Some(first));
        assert_eq!(doc.previous_sibling(first), None);
        assert_eq!(doc.next_sibling(first), Some(second));
        assert_eq!(doc.next_sibling(second), None);
        assert_eq!(doc.index_in_parent(second), Some(1));
        assert_eq!(doc.index_in_parent(root), None);
        assert_eq!(doc.descendants(root), vec![paragraph, first, second]);
        assert_eq!(doc.text_content(root), "ab");
        assert!(doc.is_attached(first));
    }

    #[test]
    fn test_outline_format() {
        let (doc, ..) = sample();
        assert_eq!(
            doc.outline(doc.root()),
            "document\n  paragraph\n    text \"a\"\n    text \"b\"\n"
        );
    }

    #[test]
    fn test_attributes() {
        let (mut doc, paragraph, ..) = sample();
        doc.set_attribute(paragraph, "id", "intro");
        assert_eq!(doc.attributes(paragraph).get("id").map(String::as_str), Some("intro"));
        assert_eq!(doc.remove_attribute(paragraph, "id"), Some("intro".to_string()));
        assert!(doc.attributes(paragraph).is_empty());
    }

    #[test]
    fn test_truncate_drops_new_slots() {
        let (mut doc, ..) = sample();
        let len = doc.len();
        let text = doc.text("tmp", Position::new());
        doc.paragraph(vec![text], Position::new());
        doc.truncate(len);
        assert_eq!(doc.len(), len);
    }
}
