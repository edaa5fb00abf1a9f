//! One constructor per node kind.
//!
//! Every constructor allocates the node, links the given children under it
//! and returns the new id. A child that is still attached somewhere else is
//! moved, so no node ever ends up with two parents. Children the new node
//! cannot hold (the root, unknown ids, kinds its content model rejects) are
//! dropped with a warning.
use tracing::warn;

use crate::lexer::Position;

use super::document::Document;
use super::node::{NodeData, NodeId};

impl Document {
    fn build(&mut self, data: NodeData, children: Vec<NodeId>, position: Position) -> NodeId {
        let id = self.alloc(data, position);
        self.adopt(id, children);
        id
    }

    fn adopt(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for child in children {
            match self.ensure_insertable(parent, child) {
                Ok(()) => self.link_last(parent, child),
                Err(error) => warn!(%parent, %child, %error, "child dropped"),
            }
        }
    }

    /// Populates the root with `blocks`, replacing any previous content.
    pub fn document(&mut self, blocks: Vec<NodeId>, position: Position) -> NodeId {
        let root = self.root();
        for previous in self.children(root).to_vec() {
            self.detach(previous);
        }
        self.set_position(root, position);
        self.adopt(root, blocks);
        root
    }

    /// Level is clamped to 1..=6.
    pub fn heading(&mut self, level: u8, children: Vec<NodeId>, position: Position) -> NodeId {
        let level = level.clamp(1, 6);
        self.build(NodeData::Heading { level }, children, position)
    }

    pub fn paragraph(&mut self, children: Vec<NodeId>, position: Position) -> NodeId {
        self.build(NodeData::Paragraph, children, position)
    }

    pub fn code_block(
        &mut self,
        language: Option<String>,
        code: impl Into<String>,
        position: Position,
    ) -> NodeId {
        let data = NodeData::CodeBlock {
            language,
            code: code.into(),
        };
        self.build(data, Vec::new(), position)
    }

    pub fn quote(&mut self, children: Vec<NodeId>, position: Position) -> NodeId {
        self.build(NodeData::Quote, children, position)
    }

    pub fn list(
        &mut self,
        ordered: bool,
        start: Option<u64>,
        marker: impl Into<String>,
        items: Vec<NodeId>,
        position: Position,
    ) -> NodeId {
        let data = NodeData::List {
            ordered,
            start,
            marker: marker.into(),
        };
        self.build(data, items, position)
    }

    pub fn list_item(
        &mut self,
        checked: Option<bool>,
        children: Vec<NodeId>,
        position: Position,
    ) -> NodeId {
        self.build(NodeData::ListItem { checked }, children, position)
    }

    pub fn horizontal_rule(&mut self, position: Position) -> NodeId {
        self.build(NodeData::HorizontalRule, Vec::new(), position)
    }

    pub fn text(&mut self, value: impl Into<String>, position: Position) -> NodeId {
        let data = NodeData::Text {
            value: value.into(),
        };
        self.build(data, Vec::new(), position)
    }

    pub fn bold(&mut self, children: Vec<NodeId>, position: Position) -> NodeId {
        self.build(NodeData::Bold, children, position)
    }

    pub fn italic(&mut self, children: Vec<NodeId>, position: Position) -> NodeId {
        self.build(NodeData::Italic, children, position)
    }

    pub fn code(&mut self, value: impl Into<String>, position: Position) -> NodeId {
        let data = NodeData::Code {
            value: value.into(),
        };
        self.build(data, Vec::new(), position)
    }

    pub fn link(
        &mut self,
        url: impl Into<String>,
        title: Option<String>,
        children: Vec<NodeId>,
        position: Position,
    ) -> NodeId {
        let data = NodeData::Link {
            url: url.into(),
            title,
        };
        self.build(data, children, position)
    }

    pub fn image(
        &mut self,
        url: impl Into<String>,
        alt: impl Into<String>,
        title: Option<String>,
        position: Position,
    ) -> NodeId {
        let data = NodeData::Image {
            url: url.into(),
            alt: alt.into(),
            title,
        };
        self.build(data, Vec::new(), position)
    }

    pub fn newline(&mut self, position: Position) -> NodeId {
        self.build(NodeData::Newline, Vec::new(), position)
    }
}
