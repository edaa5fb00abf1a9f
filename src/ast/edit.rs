//! Structural edits and tree rewriting.
//!
//! Every edit validates first and only then touches linkage, so a rejected
//! edit leaves the document exactly as it was.
use std::collections::HashSet;

use tracing::warn;

use crate::error::{MarkdownError, Result};

use super::document::Document;
use super::node::{NodeData, NodeId};

impl Document {
    fn ensure_known(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(MarkdownError::transform_error(format!(
                "node {id} does not belong to this document"
            )))
        }
    }

    /// Checks that `child` may be placed directly under `parent`.
    pub(super) fn ensure_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_known(parent)?;
        self.ensure_known(child)?;
        if child == self.root() {
            return Err(MarkdownError::transform_error(
                "the document root cannot be moved",
            ));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(MarkdownError::transform_error(format!(
                "inserting {child} under {parent} would create a cycle"
            )));
        }
        let (parent_kind, child_kind) = (self.kind(parent), self.kind(child));
        if !parent_kind.accepts(child_kind) {
            return Err(MarkdownError::transform_error(format!(
                "{parent_kind} cannot contain {child_kind}"
            )));
        }
        Ok(())
    }

    /// Inserts `child` as the `index`-th child of `parent`.
    ///
    /// A child that is attached elsewhere is moved. When it already sits under
    /// `parent`, `index` counts the other children only.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.ensure_insertable(parent, child)?;
        let others = self
            .children(parent)
            .iter()
            .filter(|&&existing| existing != child)
            .count();
        if index > others {
            return Err(MarkdownError::transform_error(format!(
                "index {index} out of bounds for {parent} with {others} children"
            )));
        }
        self.detach(child);
        self.attach_at(parent, index, child);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_insertable(parent, child)?;
        self.link_last(parent, child);
        Ok(())
    }

    /// Moves `id` under `parent` at `index`. Same rules as [`insert_child`](Self::insert_child).
    pub fn move_node(&mut self, id: NodeId, parent: NodeId, index: usize) -> Result<()> {
        self.insert_child(parent, index, id)
    }

    /// Detaches `id` from its parent. The subtree stays in the arena and can
    /// be inserted again.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.ensure_known(id)?;
        if id == self.root() {
            return Err(MarkdownError::transform_error(
                "the document root cannot be removed",
            ));
        }
        if self.parent(id).is_none() {
            return Err(MarkdownError::transform_error(format!(
                "node {id} is already detached"
            )));
        }
        self.detach(id);
        Ok(())
    }

    /// Puts `new` in the place of `old`, which ends up detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.ensure_known(old)?;
        if old == new {
            return Ok(());
        }
        let Some(parent) = self.parent(old) else {
            return Err(MarkdownError::transform_error(format!(
                "node {old} is detached and has no place to fill"
            )));
        };
        self.ensure_insertable(parent, new)?;

        self.detach(new);
        let index = self.index_in_parent(old).unwrap_or(0);
        self.detach(old);
        self.attach_at(parent, index, new);
        Ok(())
    }

    /// Swaps the payload of `id`. The new payload must be of the same kind,
    /// so the node's place in the tree stays valid.
    pub fn set_data(&mut self, id: NodeId, data: NodeData) -> Result<()> {
        self.ensure_known(id)?;
        let (current, requested) = (self.kind(id), data.kind());
        if current != requested {
            return Err(MarkdownError::transform_error(format!(
                "node {id} is a {current} and cannot become a {requested}"
            )));
        }
        self.replace_data(id, data);
        Ok(())
    }

    /// Deep-copies the subtree at `id` into new, unlinked slots and returns
    /// the copy's root.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        self.ensure_known(id)?;
        let mut pending = vec![(id, None::<NodeId>)];
        let mut copy_root = None;
        while let Some((source, parent)) = pending.pop() {
            let original = self.node(source).clone();
            let copy = self.alloc(original.data, original.position);
            if let Some(range) = original.range {
                self.set_range(copy, range);
            }
            for (key, value) in original.attributes {
                self.set_attribute(copy, key, value);
            }
            match parent {
                Some(parent) => self.link_last(parent, copy),
                None => copy_root = Some(copy),
            }
            pending.extend(
                original
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, Some(copy))),
            );
        }
        copy_root.ok_or_else(|| MarkdownError::transform_error("nothing was copied"))
    }

    /// Rewrites the subtree at `id` with `f`.
    ///
    /// `f` returns the node that takes the place of its argument, or `None`
    /// to drop it. The children of every returned node are rewritten in turn
    /// and replaced by the results. Each node is handed to `f` at most once; a
    /// result that would make a node its own ancestor, or that its parent
    /// cannot contain, is dropped.
    pub fn transform<F>(&mut self, id: NodeId, f: &mut F) -> Option<NodeId>
    where
        F: FnMut(&mut Document, NodeId) -> Option<NodeId>,
    {
        let mut visited = HashSet::new();
        self.transform_node(id, f, &mut visited)
    }

    fn transform_node<F>(
        &mut self,
        id: NodeId,
        f: &mut F,
        visited: &mut HashSet<NodeId>,
    ) -> Option<NodeId>
    where
        F: FnMut(&mut Document, NodeId) -> Option<NodeId>,
    {
        if !self.contains(id) {
            return None;
        }
        if !visited.insert(id) {
            return Some(id);
        }
        let replacement = f(self, id)?;
        if !self.contains(replacement) {
            warn!(node = %replacement, "transform returned an unknown node, dropping it");
            return None;
        }
        if replacement != id && !visited.insert(replacement) {
            return Some(replacement);
        }

        let original_children = self.children(replacement).to_vec();
        let mut rebuilt = Vec::with_capacity(original_children.len());
        for child in original_children {
            if let Some(result) = self.transform_node(child, f, visited) {
                rebuilt.push(result);
            }
        }

        for child in self.children(replacement).to_vec() {
            self.detach(child);
        }
        for child in rebuilt {
            if self.is_ancestor_or_self(child, replacement) || child == self.root() {
                warn!(
                    parent = %replacement,
                    child = %child,
                    "transform result would form a cycle, dropping it"
                );
                continue;
            }
            let (parent_kind, child_kind) = (self.kind(replacement), self.kind(child));
            if !parent_kind.accepts(child_kind) {
                warn!(
                    parent = %replacement,
                    child = %child,
                    "{parent_kind} cannot contain {child_kind}, dropping it"
                );
                continue;
            }
            self.link_last(replacement, child);
        }
        Some(replacement)
    }
}
