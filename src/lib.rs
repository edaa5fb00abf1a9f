//! Markdown front end: a lossless lexer, a backtracking parser and an
//! arena-backed syntax tree with traversal, editing and outline rendering.
//!
//! ```
//! use marktree::parse_markdown;
//!
//! let doc = parse_markdown("# Hello, *World*!");
//! assert_eq!(
//!     doc.outline(doc.root()),
//!     "document\n  heading level=1\n    text \"Hello, \"\n    italic\n      text \"World\"\n    text \"!\"\n"
//! );
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Document, NodeData, NodeId, NodeKind, Visitor, traverse};
pub use error::{MarkdownError, Result};
pub use lexer::{Lexer, Position, Range, Token, TokenKind, tokenize};
pub use parser::{ParseOptions, parse, try_parse};

/// Tokenizes and parses `markdown` with default options.
///
/// # Examples
///
/// ```
/// use marktree::{NodeKind, parse_markdown};
///
/// let doc = parse_markdown("- [x] done");
/// let list = doc.children(doc.root())[0];
/// assert_eq!(doc.kind(list), NodeKind::List);
/// assert_eq!(doc.text_content(list), "done");
/// ```
pub fn parse_markdown(markdown: &str) -> Document {
    let tokens = tokenize(markdown);
    parse(&tokens, &ParseOptions::default())
}
