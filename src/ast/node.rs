//! The labeled tree produced by a parse
//!
//! A [`Node`] has a label, an optional scalar value, ordered children, and a
//! span. Leaves built from tokens carry the token's span. Interior nodes
//! compute their span on first request as the join of their children's spans
//! and keep it until the children change or the span is reset with
//! [`Node::set_span`].

use super::span::Span;
use crate::combos::Token;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub label: String,
    pub value: Option<String>,
    children: Vec<Node>,
    span: OnceLock<Option<Span>>,
    /// Set when the span was assigned explicitly rather than computed.
    pinned: bool,
}

impl Node {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Leaf node for a matched token: the label is the token kind's name and
    /// the value is the lexeme.
    pub fn from_token(label: impl Into<String>, token: &Token) -> Self {
        let mut node = Self::with_value(label, token.lexeme.clone());
        node.set_span(Some(token.span));
        node
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child.
    pub fn push(&mut self, kid: Node) -> &mut Self {
        self.children.push(kid);
        self.children_changed();
        self
    }

    /// Insert a child before every existing child.
    pub fn prepend(&mut self, kid: Node) -> &mut Self {
        self.children.insert(0, kid);
        self.children_changed();
        self
    }

    pub fn extend<I: IntoIterator<Item = Node>>(&mut self, kids: I) -> &mut Self {
        self.children.extend(kids);
        self.children_changed();
        self
    }

    /// Builder form of [`Node::push`].
    pub fn with_child(mut self, kid: Node) -> Self {
        self.push(kid);
        self
    }

    pub fn with_children<I: IntoIterator<Item = Node>>(mut self, kids: I) -> Self {
        self.extend(kids);
        self
    }

    /// First child carrying `label`.
    pub fn kid(&self, label: &str) -> Option<&Node> {
        self.children.iter().find(|kid| kid.label == label)
    }

    pub fn child(&self, idx: usize) -> Option<&Node> {
        self.children.get(idx)
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The node's source span.
    ///
    /// Explicit spans are returned as set. Otherwise the span is the join of
    /// every child span, computed once and cached. A node with no spanned
    /// descendants has no span.
    pub fn span(&self) -> Option<Span> {
        *self
            .span
            .get_or_init(|| Span::join(self.children.iter().filter_map(Node::span)))
    }

    /// Override the span. `None` drops any cached value so the next call to
    /// [`Node::span`] recomputes it from the children.
    pub fn set_span(&mut self, span: Option<Span>) {
        self.span = OnceLock::new();
        self.pinned = span.is_some();
        if let Some(span) = span {
            let _ = self.span.set(Some(span));
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.set_span(span);
        self
    }

    fn children_changed(&mut self) {
        if !self.pinned {
            self.span = OnceLock::new();
        }
    }

    /// Pre-order walk over this node and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Structural equality: label, value and children. Spans are ignored so a
/// tree re-parsed from rendered text compares equal to the original.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.value == other.value && self.children == other.children
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Node {} {}", self.label, self.children.len())?;
        if let Some(value) = &self.value {
            write!(f, " {:?}", value)?;
        }
        match self.span() {
            Some(span) => write!(f, " at {})", span),
            None => write!(f, ")"),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("span", &self.span())?;
        state.serialize_field("children", &self.children)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::span::Position;

    fn leaf(label: &str, span: Span) -> Node {
        Node::with_value(label, label.to_lowercase()).with_span(Some(span))
    }

    #[test]
    fn test_childless_node_has_no_span() {
        assert_eq!(Node::new("Empty").span(), None);
    }

    #[test]
    fn test_span_is_join_of_descendants() {
        let inner = Node::new("Inner")
            .with_child(leaf("A", Span::from_coords(2, 1, 2, 3)))
            .with_child(Node::new("NoSpan"));
        let outer = Node::new("Outer")
            .with_child(leaf("B", Span::from_coords(1, 1, 1, 5)))
            .with_child(inner);

        assert_eq!(outer.span(), Some(Span::from_coords(1, 1, 2, 3)));
    }

    #[test]
    fn test_explicit_span_survives_new_children() {
        let mut node = Node::new("Stmts").with_span(Some(Span::from_coords(1, 9, 1, 19)));
        node.push(leaf("A", Span::from_coords(1, 11, 1, 11)));
        assert_eq!(node.span(), Some(Span::from_coords(1, 9, 1, 19)));
    }

    #[test]
    fn test_computed_span_refreshes_after_push() {
        let mut node = Node::new("Graph").with_child(leaf("A", Span::from_coords(1, 1, 1, 7)));
        assert_eq!(node.span(), Some(Span::from_coords(1, 1, 1, 7)));

        node.push(leaf("B", Span::from_coords(3, 1, 3, 1)));
        assert_eq!(node.span(), Some(Span::from_coords(1, 1, 3, 1)));
    }

    #[test]
    fn test_set_span_none_forces_recompute() {
        let mut node = Node::new("Graph")
            .with_child(leaf("A", Span::from_coords(1, 1, 1, 7)))
            .with_span(Some(Span::from_coords(9, 9, 9, 9)));
        assert_eq!(node.span().map(|s| s.start), Some(Position::new(9, 9)));

        node.set_span(None);
        assert_eq!(node.span(), Some(Span::from_coords(1, 1, 1, 7)));
    }

    #[test]
    fn test_prepend_keeps_source_order() {
        let mut node = Node::new("Stmts").with_child(Node::new("Second"));
        node.prepend(Node::new("First"));
        let labels: Vec<_> = node.children().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second"]);
    }

    #[test]
    fn test_equality_ignores_spans() {
        let a = leaf("ID", Span::from_coords(1, 1, 1, 1));
        let b = leaf("ID", Span::from_coords(5, 5, 5, 5));
        assert_eq!(a, b);
        assert_ne!(a, Node::with_value("ID", "other"));
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = Node::new("A")
            .with_child(Node::new("B").with_child(Node::new("C")))
            .with_child(Node::new("D"));
        let labels: Vec<_> = tree.walk().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_kid_lookup() {
        let tree = Node::new("Graph")
            .with_child(Node::with_value("ID", "g"))
            .with_child(Node::new("Stmts"));
        assert_eq!(tree.kid("ID").and_then(Node::value), Some("g"));
        assert!(tree.kid("Missing").is_none());
    }

    #[test]
    fn test_serializes_computed_span() {
        let tree = Node::new("Edge").with_child(leaf("ID", Span::from_coords(1, 2, 1, 3)));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["label"], "Edge");
        assert_eq!(json["span"]["start"]["line"], 1);
        assert_eq!(json["children"][0]["value"], "id");
    }
}
