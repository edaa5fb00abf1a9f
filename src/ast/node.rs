use std::collections::BTreeMap;
use std::fmt;

use crate::lexer::{Position, Range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a node inside the [`Document`](super::Document) that created it.
///
/// Ids are only meaningful for their own document. Slots are never reused, so
/// an id stays valid for the lifetime of the document even after the node has
/// been detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub(super) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    Document,
    Heading,
    Paragraph,
    CodeBlock,
    Quote,
    List,
    ListItem,
    HorizontalRule,
    Text,
    Bold,
    Italic,
    Code,
    Link,
    Image,
    Newline,
}

impl NodeKind {
    /// Stable identifier of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Heading => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::CodeBlock => "code_block",
            NodeKind::Quote => "quote",
            NodeKind::List => "list",
            NodeKind::ListItem => "list_item",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::Text => "text",
            NodeKind::Bold => "bold",
            NodeKind::Italic => "italic",
            NodeKind::Code => "code",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Newline => "newline",
        }
    }

    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Heading
                | NodeKind::Paragraph
                | NodeKind::CodeBlock
                | NodeKind::Quote
                | NodeKind::List
                | NodeKind::ListItem
                | NodeKind::HorizontalRule
        )
    }

    pub fn is_inline(self) -> bool {
        !self.is_block()
    }

    /// Content model: whether a node of this kind may hold `child` directly.
    pub fn accepts(self, child: NodeKind) -> bool {
        match self {
            NodeKind::List => child == NodeKind::ListItem,
            NodeKind::Document | NodeKind::Quote | NodeKind::ListItem => {
                child.is_block() && !matches!(child, NodeKind::Document | NodeKind::ListItem)
            }
            NodeKind::Heading | NodeKind::Paragraph | NodeKind::Bold | NodeKind::Italic => {
                child.is_inline()
            }
            NodeKind::Link => {
                child.is_inline() && !matches!(child, NodeKind::Link | NodeKind::Image)
            }
            NodeKind::CodeBlock
            | NodeKind::HorizontalRule
            | NodeKind::Text
            | NodeKind::Code
            | NodeKind::Image
            | NodeKind::Newline => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeData {
    Document,
    /// Level is always within 1..=6.
    Heading {
        level: u8,
    },
    Paragraph,
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Quote,
    /// `marker` is the bullet glyph, or `"."` for ordered lists.
    List {
        ordered: bool,
        start: Option<u64>,
        marker: String,
    },
    /// `None` for a plain item, `Some(done)` for a task item.
    ListItem {
        checked: Option<bool>,
    },
    HorizontalRule,
    Text {
        value: String,
    },
    Bold,
    Italic,
    Code {
        value: String,
    },
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Newline,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Heading { .. } => NodeKind::Heading,
            NodeData::Paragraph => NodeKind::Paragraph,
            NodeData::CodeBlock { .. } => NodeKind::CodeBlock,
            NodeData::Quote => NodeKind::Quote,
            NodeData::List { .. } => NodeKind::List,
            NodeData::ListItem { .. } => NodeKind::ListItem,
            NodeData::HorizontalRule => NodeKind::HorizontalRule,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Bold => NodeKind::Bold,
            NodeData::Italic => NodeKind::Italic,
            NodeData::Code { .. } => NodeKind::Code,
            NodeData::Link { .. } => NodeKind::Link,
            NodeData::Image { .. } => NodeKind::Image,
            NodeData::Newline => NodeKind::Newline,
        }
    }

    /// Literal content of text, code and code block nodes.
    pub fn value(&self) -> Option<&str> {
        match self {
            NodeData::Text { value } | NodeData::Code { value } => Some(value),
            NodeData::CodeBlock { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Renders the kind followed by its payload, as used by outlines.
impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().as_str())?;
        match self {
            NodeData::Heading { level } => write!(f, " level={level}"),
            NodeData::CodeBlock { language, code } => {
                if let Some(language) = language {
                    write!(f, " language={language:?}")?;
                }
                write!(f, " code={code:?}")
            }
            NodeData::List {
                ordered,
                start,
                marker,
            } => {
                write!(f, " ordered={ordered}")?;
                if let Some(start) = start {
                    write!(f, " start={start}")?;
                }
                write!(f, " marker={marker:?}")
            }
            NodeData::ListItem {
                checked: Some(checked),
            } => write!(f, " checked={checked}"),
            NodeData::Text { value } | NodeData::Code { value } => write!(f, " {value:?}"),
            NodeData::Link { url, title } => {
                write!(f, " url={url:?}")?;
                match title {
                    Some(title) => write!(f, " title={title:?}"),
                    None => Ok(()),
                }
            }
            NodeData::Image { url, alt, title } => {
                write!(f, " url={url:?} alt={alt:?}")?;
                match title {
                    Some(title) => write!(f, " title={title:?}"),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// One arena slot.
///
/// Linkage (`parent` and `children`) is only written by the owning document,
/// which keeps the two sides consistent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Node {
    pub(super) data: NodeData,
    pub(super) position: Position,
    pub(super) range: Option<Range>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) attributes: BTreeMap<String, String>,
}

impl Node {
    pub(super) fn new(data: NodeData, position: Position) -> Self {
        Self {
            data,
            position,
            range: None,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn value(&self) -> Option<&str> {
        self.data.value()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Source span, when the node came from the parser.
    pub fn range(&self) -> Option<Range> {
        self.range
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_model() {
        assert!(NodeKind::List.accepts(NodeKind::ListItem));
        assert!(!NodeKind::List.accepts(NodeKind::Paragraph));
        assert!(NodeKind::ListItem.accepts(NodeKind::List));
        assert!(!NodeKind::Quote.accepts(NodeKind::ListItem));
        assert!(!NodeKind::Document.accepts(NodeKind::Document));
        assert!(NodeKind::Paragraph.accepts(NodeKind::Link));
        assert!(!NodeKind::Paragraph.accepts(NodeKind::Paragraph));
        assert!(NodeKind::Link.accepts(NodeKind::Bold));
        assert!(!NodeKind::Link.accepts(NodeKind::Image));
        assert!(!NodeKind::Text.accepts(NodeKind::Text));
    }

    #[test]
    fn test_data_display() {
        let heading = NodeData::Heading { level: 2 };
        assert_eq!(heading.to_string(), "heading level=2");

        let list = NodeData::List {
            ordered: true,
            start: Some(3),
            marker: ".".to_string(),
        };
        assert_eq!(list.to_string(), "list ordered=true start=3 marker=\".\"");

        let item = NodeData::ListItem { checked: None };
        assert_eq!(item.to_string(), "list_item");

        let text = NodeData::Text {
            value: "say \"hi\"".to_string(),
        };
        assert_eq!(text.to_string(), "text \"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_value_accessor() {
        let block = NodeData::CodeBlock {
            language: None,
            code: "x".to_string(),
        };
        assert_eq!(block.value(), Some("x"));
        assert_eq!(NodeData::Bold.value(), None);
        assert_eq!(NodeKind::CodeBlock.as_str(), "code_block");
        assert!(NodeKind::Newline.is_inline());
    }
}
