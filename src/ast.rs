//! Abstract syntax tree for parsed Markdown.
//!
//! A [`Document`] is an arena: it owns every node and hands out copyable
//! [`NodeId`]s. Parent links are ids as well, so the tree has a single owner
//! and no reference cycles.
//!
//! - `node`: kinds, payloads and the per-slot [`Node`]
//! - `document`: the arena, accessors, queries and [`Document::outline`]
//! - `factory`: one constructor per kind
//! - `edit`: validated structural edits and [`Document::transform`]
//! - `traverse`: the [`Visitor`] trait and [`traverse`]
mod document;
mod edit;
mod factory;
mod node;
mod traverse;

pub use document::Document;
pub use node::{Node, NodeData, NodeId, NodeKind};
pub use traverse::{
    FnVisitor, TraversalOrder, TraverseOptions, Visitor, dispatch, traverse, visit_fn,
};
