//! Write a parsed tree back out as DOT text
//!
//! The output is canonical rather than faithful: one statement per line, two
//! space indentation, every statement terminated with `;`, attribute lists
//! merged into one, generated graph names written out. Parsing the output
//! gives a tree equal to the input tree.

use crate::ast::Node;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unexpected `{label}` node in {context}")]
    UnexpectedNode { label: String, context: &'static str },
    #[error("`{label}` node is missing child {index}")]
    MissingChild { label: String, index: usize },
}

/// Render a `Graphs` tree, or a single `Graph`, as DOT source.
pub fn render(node: &Node) -> Result<String, RenderError> {
    let mut renderer = Renderer::default();
    match node.label.as_str() {
        "Graphs" => {
            for graph in node.children() {
                renderer.top_level(graph)?;
            }
        }
        _ => renderer.top_level(node)?,
    }
    Ok(renderer.out)
}

#[derive(Default)]
struct Renderer {
    out: String,
    depth: usize,
}

impl Renderer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn top_level(&mut self, node: &Node) -> Result<(), RenderError> {
        match node.label.as_str() {
            "Graph" => self.graph(node),
            "COMMENT" => {
                self.line(value(node));
                Ok(())
            }
            _ => Err(unexpected(node, "a document")),
        }
    }

    fn graph(&mut self, node: &Node) -> Result<(), RenderError> {
        let ty = kid(node, 0)?;
        let mut head = String::new();
        if ty.kid("STRICT").is_some() {
            head.push_str("strict ");
        }
        head.push_str(value(ty));
        head.push(' ');
        head.push_str(value(kid(node, 1)?));
        head.push_str(" {");
        self.line(&head);
        self.body(kid(node, 2)?)?;
        self.line("}");
        Ok(())
    }

    fn body(&mut self, stmts: &Node) -> Result<(), RenderError> {
        self.depth += 1;
        for stmt in stmts.children() {
            self.stmt(stmt)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn stmt(&mut self, node: &Node) -> Result<(), RenderError> {
        match node.label.as_str() {
            "COMMENT" => self.line(value(node)),
            "SubGraph" => {
                self.subgraph(node)?;
                // The closing brace line takes the terminator.
                self.terminate();
            }
            "Attr" => {
                let text = format!("{}={};", value(kid(node, 0)?), value(kid(node, 1)?));
                self.line(&text);
            }
            "AttrStmt" => {
                // An attribute statement needs its brackets even when empty.
                let list = match attrs(kid(node, 1)?)? {
                    list if list.is_empty() => " []".to_string(),
                    list => list,
                };
                let text = format!("{}{};", value(kid(node, 0)?), list);
                self.line(&text);
            }
            "Node" => {
                let text = format!("{}{};", node_id(kid(node, 0)?)?, attrs(kid(node, 1)?)?);
                self.line(&text);
            }
            "Edge" => self.edge(node)?,
            _ => return Err(unexpected(node, "a statement list")),
        }
        Ok(())
    }

    fn edge(&mut self, node: &Node) -> Result<(), RenderError> {
        let op = value(node);
        let Some((attr_list, endpoints)) = node.children().split_last() else {
            return Err(missing(node, 0));
        };
        let tail = format!("{};", attrs(attr_list)?);
        if !endpoints.iter().any(|e| e.label == "SubGraph") {
            let ids = endpoints
                .iter()
                .map(node_id)
                .collect::<Result<Vec<_>, _>>()?;
            let separator = format!(" {} ", op);
            self.line(&format!("{}{}", ids.join(separator.as_str()), tail));
            return Ok(());
        }

        // Subgraph endpoints span several lines; operators go at line ends.
        let last = endpoints.len().saturating_sub(1);
        for (idx, endpoint) in endpoints.iter().enumerate() {
            let suffix = if idx == last {
                tail.clone()
            } else {
                format!(" {}", op)
            };
            if endpoint.label == "SubGraph" {
                self.subgraph(endpoint)?;
                self.append(&suffix);
            } else {
                let text = format!("{}{}", node_id(endpoint)?, suffix);
                self.line(&text);
            }
        }
        Ok(())
    }

    fn subgraph(&mut self, node: &Node) -> Result<(), RenderError> {
        let head = format!("subgraph {} {{", value(kid(node, 0)?));
        self.line(&head);
        self.body(kid(node, 1)?)?;
        self.line("}");
        Ok(())
    }

    /// Put `text` at the end of the last line written.
    fn append(&mut self, text: &str) {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn terminate(&mut self) {
        self.append(";");
    }
}

fn node_id(node: &Node) -> Result<String, RenderError> {
    if node.label != "NodeId" {
        return Err(unexpected(node, "an edge"));
    }
    let mut text = value(kid(node, 0)?).to_string();
    if let Some(port) = node.kid("Port") {
        text.push(':');
        text.push_str(value(kid(port, 0)?));
        if let Some(compass) = port.kid("Compass") {
            text.push(':');
            text.push_str(value(compass));
        }
    }
    Ok(text)
}

/// ` [k=v, k=v]`, or nothing for an empty list.
fn attrs(node: &Node) -> Result<String, RenderError> {
    if node.label != "Attrs" {
        return Err(unexpected(node, "an attribute position"));
    }
    if node.is_leaf() {
        return Ok(String::new());
    }
    let pairs = node
        .children()
        .iter()
        .map(|attr| Ok(format!("{}={}", value(kid(attr, 0)?), value(kid(attr, 1)?))))
        .collect::<Result<Vec<_>, RenderError>>()?;
    Ok(format!(" [{}]", pairs.join(", ")))
}

fn value(node: &Node) -> &str {
    node.value().unwrap_or_default()
}

fn kid(node: &Node, index: usize) -> Result<&Node, RenderError> {
    node.child(index).ok_or_else(|| missing(node, index))
}

fn missing(node: &Node, index: usize) -> RenderError {
    RenderError::MissingChild {
        label: node.label.clone(),
        index,
    }
}

fn unexpected(node: &Node, context: &'static str) -> RenderError {
    RenderError::UnexpectedNode {
        label: node.label.clone(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dot::parse;

    #[test]
    fn test_render_minimal_digraph() {
        let tree = parse("digraph { a -> b; }").unwrap();
        assert_eq!(render(&tree).unwrap(), "digraph graph1 {\n  a -> b;\n}\n");
    }

    #[test]
    fn test_render_ports_and_attrs() {
        let tree = parse("strict graph g { node [shape=box] [color=red]; a:p:ne -- b [w=1] }")
            .unwrap();
        assert_eq!(
            render(&tree).unwrap(),
            "strict graph g {\n  node [shape=box, color=red];\n  a:p:ne -- b [w=1];\n}\n"
        );
    }

    #[test]
    fn test_render_subgraph_endpoint() {
        let tree = parse("digraph { {a} -> b }").unwrap();
        assert_eq!(
            render(&tree).unwrap(),
            "digraph graph1 {\n  subgraph subgraph2 {\n    a;\n  } ->\n  b;\n}\n"
        );
    }

    #[test]
    fn test_rejects_foreign_nodes() {
        let err = render(&Node::new("Stmts")).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnexpectedNode {
                label: "Stmts".into(),
                context: "a document"
            }
        );
    }
}
