use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use super::document::Document;
use super::node::{NodeId, NodeKind};

/// Visitor trait for read-only traversal.
///
/// One callback per node kind, each falling back to [`Visitor::visit_node`].
/// Exactly one callback runs per visited node; returning `Some` adds a value
/// to the traversal result.
pub trait Visitor {
    type Output;

    fn visit_node(&mut self, _doc: &Document, _id: NodeId) -> Option<Self::Output> {
        None
    }

    fn visit_document(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_heading(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_paragraph(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_code_block(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_quote(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_list(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_list_item(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_horizontal_rule(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_text(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_bold(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_italic(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_code(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_link(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_image(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }

    fn visit_newline(&mut self, doc: &Document, id: NodeId) -> Option<Self::Output> {
        self.visit_node(doc, id)
    }
}

/// Routes `id` to the callback for its kind.
pub fn dispatch<V: Visitor + ?Sized>(
    visitor: &mut V,
    doc: &Document,
    id: NodeId,
) -> Option<V::Output> {
    match doc.kind(id) {
        NodeKind::Document => visitor.visit_document(doc, id),
        NodeKind::Heading => visitor.visit_heading(doc, id),
        NodeKind::Paragraph => visitor.visit_paragraph(doc, id),
        NodeKind::CodeBlock => visitor.visit_code_block(doc, id),
        NodeKind::Quote => visitor.visit_quote(doc, id),
        NodeKind::List => visitor.visit_list(doc, id),
        NodeKind::ListItem => visitor.visit_list_item(doc, id),
        NodeKind::HorizontalRule => visitor.visit_horizontal_rule(doc, id),
        NodeKind::Text => visitor.visit_text(doc, id),
        NodeKind::Bold => visitor.visit_bold(doc, id),
        NodeKind::Italic => visitor.visit_italic(doc, id),
        NodeKind::Code => visitor.visit_code(doc, id),
        NodeKind::Link => visitor.visit_link(doc, id),
        NodeKind::Image => visitor.visit_image(doc, id),
        NodeKind::Newline => visitor.visit_newline(doc, id),
    }
}

/// Adapts a closure into a [`Visitor`] that handles every kind alike.
pub struct FnVisitor<F, T> {
    f: F,
    _output: PhantomData<fn() -> T>,
}

pub fn visit_fn<F, T>(f: F) -> FnVisitor<F, T>
where
    F: FnMut(&Document, NodeId) -> Option<T>,
{
    FnVisitor {
        f,
        _output: PhantomData,
    }
}

impl<F, T> Visitor for FnVisitor<F, T>
where
    F: FnMut(&Document, NodeId) -> Option<T>,
{
    type Output = T;

    fn visit_node(&mut self, doc: &Document, id: NodeId) -> Option<T> {
        (self.f)(doc, id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    /// Parents before children.
    #[default]
    PreOrder,
    /// Children before parents.
    PostOrder,
}

type NodeFilter = Box<dyn Fn(&Document, NodeId) -> bool + Send + Sync>;

/// Options for [`traverse`].
///
/// A filtered-out node gets no callback, but its children are still walked.
pub struct TraverseOptions {
    pub order: TraversalOrder,
    pub include_root: bool,
    filter: Option<NodeFilter>,
}

impl TraverseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_root(mut self, include_root: bool) -> Self {
        self.include_root = include_root;
        self
    }

    pub fn with_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Document, NodeId) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn admits(&self, doc: &Document, id: NodeId) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(doc, id))
    }
}

impl Default for TraverseOptions {
    fn default() -> Self {
        Self {
            order: TraversalOrder::PreOrder,
            include_root: true,
            filter: None,
        }
    }
}

impl fmt::Debug for TraverseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraverseOptions")
            .field("order", &self.order)
            .field("include_root", &self.include_root)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Depth-first walk of the subtree at `root`, collecting the visitor's
/// results in visiting order.
pub fn traverse<V: Visitor + ?Sized>(
    doc: &Document,
    root: NodeId,
    visitor: &mut V,
    options: &TraverseOptions,
) -> Vec<V::Output> {
    let mut results = Vec::new();
    if !doc.contains(root) {
        return results;
    }

    let mut visited = HashSet::new();
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if !expanded {
            if !visited.insert(id) {
                continue;
            }
            if options.order == TraversalOrder::PostOrder {
                stack.push((id, true));
            }
            stack.extend(doc.children(id).iter().rev().map(|&child| (child, false)));
            if options.order == TraversalOrder::PostOrder {
                continue;
            }
        }

        if (id != root || options.include_root) && options.admits(doc, id) {
            results.extend(dispatch(visitor, doc, id));
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeData;
    use crate::lexer::Position;

    fn sample() -> Document {
        let mut doc = Document::new();
        let title = doc.text("Title", Position::new());
        let heading = doc.heading(1, vec![title], Position::new());
        let plain = doc.text("plain ", Position::new());
        let inner = doc.text("bold", Position::new());
        let bold = doc.bold(vec![inner], Position::new());
        let paragraph = doc.paragraph(vec![plain, bold], Position::new());
        doc.document(vec![heading, paragraph], Position::new());
        doc
    }

    fn kinds(doc: &Document, options: &TraverseOptions) -> Vec<&'static str> {
        let mut visitor = visit_fn(|doc: &Document, id| Some(doc.kind(id).as_str()));
        traverse(doc, doc.root(), &mut visitor, options)
    }

    #[test]
    fn test_pre_order() {
        let doc = sample();
        assert_eq!(
            kinds(&doc, &TraverseOptions::new()),
            vec!["document", "heading", "text", "paragraph", "text", "bold", "text"]
        );
    }

    #[test]
    fn test_post_order_without_root() {
        let doc = sample();
        let options = TraverseOptions::new()
            .with_order(TraversalOrder::PostOrder)
            .with_root(false);
        assert_eq!(
            kinds(&doc, &options),
            vec!["text", "heading", "text", "text", "bold", "paragraph"]
        );
    }

    #[test]
    fn test_filter_still_walks_children() {
        let doc = sample();
        let options =
            TraverseOptions::new().with_filter(|doc, id| doc.kind(id) != NodeKind::Bold);
        let visited = kinds(&doc, &options);
        assert!(!visited.contains(&"bold"));
        assert_eq!(visited.iter().filter(|kind| **kind == "text").count(), 3);
    }

    #[test]
    fn test_per_kind_callbacks() {
        struct TextCollector;

        impl Visitor for TextCollector {
            type Output = String;

            fn visit_text(&mut self, doc: &Document, id: NodeId) -> Option<String> {
                match doc.data(id) {
                    NodeData::Text { value } => Some(value.clone()),
                    _ => None,
                }
            }

            fn visit_heading(&mut self, _doc: &Document, _id: NodeId) -> Option<String> {
                Some("#".to_string())
            }
        }

        let doc = sample();
        let collected = traverse(&doc, doc.root(), &mut TextCollector, &TraverseOptions::new());
        assert_eq!(collected, vec!["#", "Title", "plain ", "bold"]);
    }

    #[test]
    fn test_counting_visitor_sees_each_node_once() {
        struct Counter(usize);

        impl Visitor for Counter {
            type Output = ();

            fn visit_node(&mut self, _doc: &Document, _id: NodeId) -> Option<()> {
                self.0 += 1;
                None
            }
        }

        let doc = sample();
        let mut counter = Counter(0);
        let results = traverse(&doc, doc.root(), &mut counter, &TraverseOptions::new());
        assert!(results.is_empty());
        assert_eq!(counter.0, doc.descendants(doc.root()).len() + 1);
    }
}
