//! Line-per-node tree dump
//!
//! Each node becomes one line, in document (pre-order) order:
//!
//! ```text
//! <child-count>:<label> (<value>) @ <span>
//! ```
//!
//! The value and span parts are left out when the node has none. Meant for
//! logs and snapshot tests, not for interchange; use serde for that.

use super::node::Node;

/// Dump a tree, one line per node.
pub fn dump(root: &Node) -> String {
    root.walk().map(dump_line).collect::<Vec<_>>().join("\n")
}

fn dump_line(node: &Node) -> String {
    let mut line = format!("{}:{}", node.children().len(), node.label);
    if let Some(value) = &node.value {
        line.push_str(&format!(" ({})", value));
    }
    if let Some(span) = node.span() {
        line.push_str(&format!(" @ {}", span));
    }
    line
}

impl Node {
    pub fn dump(&self) -> String {
        dump(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::span::Span;

    #[test]
    fn test_dump_all_line_shapes() {
        let tree = Node::new("Graph")
            .with_child(Node::with_value("ID", "g").with_span(Some(Span::from_coords(1, 9, 1, 9))))
            .with_child(Node::with_value("ID", "graph1"))
            .with_child(Node::new("Stmts"));

        assert_eq!(
            tree.dump(),
            "3:Graph @ 1:9-1:9\n0:ID (g) @ 1:9-1:9\n0:ID (graph1)\n0:Stmts"
        );
    }
}
