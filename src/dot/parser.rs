//! DOT parse entry points
//!
//! [`DotGrammar`] holds the production table, built once, and the options it
//! parses with. Each call lexes the text lazily and runs the grammar with a
//! fresh [`DotParser`] as the per-run user context.

use super::grammar;
use super::lexer::DotTokens;
use crate::ast::Node;
use crate::combos::{Callbacks, Grammar, ParseError};
use crate::config::DotOptions;

/// Per-run state the grammar's actions read and write.
#[derive(Debug, Clone, Default)]
pub struct DotParser {
    next_name: usize,
    /// Statements are reported through callbacks instead of collected.
    pub streaming: bool,
    /// The graph being parsed is a `digraph`.
    pub directed: bool,
    pub options: DotOptions,
}

impl DotParser {
    pub fn new(options: DotOptions, streaming: bool) -> Self {
        Self {
            next_name: 0,
            streaming,
            directed: false,
            options,
        }
    }

    /// Fresh name for an anonymous graph or subgraph: `graph1`, `subgraph2`, ...
    /// The counter is shared by every prefix.
    pub fn next_name(&mut self, prefix: &str) -> String {
        self.next_name += 1;
        format!("{}{}", prefix, self.next_name)
    }
}

pub struct DotGrammar {
    grammar: Grammar<DotParser>,
    options: DotOptions,
}

impl DotGrammar {
    pub fn new() -> Self {
        Self::with_options(DotOptions::default())
    }

    pub fn with_options(options: DotOptions) -> Self {
        let grammar = grammar::build();
        debug_assert!(grammar.validate().is_ok());
        Self { grammar, options }
    }

    pub fn options(&self) -> &DotOptions {
        &self.options
    }

    pub fn grammar(&self) -> &Grammar<DotParser> {
        &self.grammar
    }

    /// Parse a document into a `Graphs` tree.
    pub fn parse(&self, text: &str) -> Result<Node, ParseError> {
        let mut tokens = DotTokens::with_comments(text, self.options.keep_comments());
        let mut parser = DotParser::new(self.options.clone(), false);
        self.grammar.parse(&mut tokens, &mut parser)
    }

    /// Parse a document, reporting graphs, subgraphs and statements through
    /// `callbacks` instead of building the statement lists.
    pub fn stream_parse(&self, text: &str, callbacks: &mut dyn Callbacks) -> Result<(), ParseError> {
        let mut tokens = DotTokens::with_comments(text, self.options.keep_comments());
        let mut parser = DotParser::new(self.options.clone(), true);
        self.grammar.stream(&mut tokens, &mut parser, callbacks)
    }
}

impl Default for DotGrammar {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with default options.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    DotGrammar::new().parse(text)
}

/// Stream-parse with default options.
pub fn stream_parse(text: &str, callbacks: &mut dyn Callbacks) -> Result<(), ParseError> {
    DotGrammar::new().stream_parse(text, callbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::combos::ErrorKind;
    use crate::config::CommentMode;

    #[test]
    fn test_names_share_one_counter() {
        let mut parser = DotParser::default();
        assert_eq!(parser.next_name("graph"), "graph1");
        assert_eq!(parser.next_name("subgraph"), "subgraph2");
    }

    #[test]
    fn test_parse_minimal_digraph() {
        let tree = parse("digraph { a -> b; }").unwrap();
        let graph = tree.child(0).unwrap();
        assert_eq!(graph.label, "Graph");
        assert_eq!(graph.child(0).map(|n| n.label.as_str()), Some("DIGRAPH"));
        assert_eq!(graph.child(1).and_then(Node::value), Some("graph1"));

        let stmts = graph.kid("Stmts").unwrap();
        assert_eq!(stmts.span(), Some(Span::from_coords(1, 9, 1, 19)));
        let edge = stmts.child(0).unwrap();
        assert_eq!(edge.label, "Edge");
        assert_eq!(edge.value(), Some("->"));
        assert!(edge.last_child().unwrap().is_leaf());
    }

    #[test]
    fn test_grammar_runs_many_times() {
        let grammar = DotGrammar::new();
        let first = grammar.parse("graph { x -- y }").unwrap();
        let second = grammar.parse("graph { x -- y }").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_kept_comments_become_statements() {
        let grammar = DotGrammar::with_options(DotOptions {
            comments: CommentMode::Keep,
            ..DotOptions::default()
        });
        let tree = grammar.parse("// top\ngraph { /* inner */ a }").unwrap();
        assert_eq!(tree.child(0).map(|n| n.label.as_str()), Some("COMMENT"));
        let stmts = tree.child(1).and_then(|g| g.kid("Stmts")).unwrap();
        let labels: Vec<_> = stmts.children().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["COMMENT", "Node"]);
    }

    #[test]
    fn test_edge_op_validation_can_be_disabled() {
        let err = parse("digraph { a -- b }").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);

        let lenient = DotGrammar::with_options(DotOptions {
            validate_edge_ops: false,
            ..DotOptions::default()
        });
        let tree = lenient.parse("digraph { a -- b }").unwrap();
        assert_eq!(tree.walk().find(|n| n.label == "Edge").and_then(Node::value), Some("--"));
    }
}
