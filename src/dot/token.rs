//! Token definitions for the DOT language
//!
//! Tokens are produced by the logos derive macro. The variant order is the
//! token table order: a variant's discriminant is its engine token kind, and
//! [`NAMES`] gives the name the grammar and the AST use for it.

use logos::{Lexer, Logos};
use thiserror::Error;

/// Why logos could not produce a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub enum LexFault {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unclosed HTML literal")]
    UnclosedHtml,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(error = LexFault)]
pub enum DotToken {
    #[regex(r"//[^\n]*")]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    // Identifiers, numerals, quoted strings and HTML literals are all IDs.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    #[regex(r"-?(\.[0-9]+|[0-9]+(\.[0-9]*)?)")]
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[token("<", html_literal)]
    Id,

    #[token("node")]
    Node,
    #[token("edge")]
    Edge,
    #[token("graph")]
    Graph,
    #[token("digraph")]
    Digraph,
    #[token("subgraph")]
    Subgraph,
    #[token("strict")]
    Strict,

    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,
    #[token("--")]
    Dash,
}

/// Token names, indexed by kind.
pub const NAMES: [&str; 18] = [
    "COMMENT", "ID", "NODE", "EDGE", "GRAPH", "DIGRAPH", "SUBGRAPH", "STRICT", "[", "]", "{", "}",
    "=", ",", ";", ":", "->", "--",
];

/// Every token, in kind order.
pub const ALL: [DotToken; 18] = [
    DotToken::Comment,
    DotToken::Id,
    DotToken::Node,
    DotToken::Edge,
    DotToken::Graph,
    DotToken::Digraph,
    DotToken::Subgraph,
    DotToken::Strict,
    DotToken::LBracket,
    DotToken::RBracket,
    DotToken::LBrace,
    DotToken::RBrace,
    DotToken::Equals,
    DotToken::Comma,
    DotToken::Semi,
    DotToken::Colon,
    DotToken::Arrow,
    DotToken::Dash,
];

impl DotToken {
    pub fn kind(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        NAMES[self.kind()]
    }

    pub fn from_kind(kind: usize) -> Option<DotToken> {
        ALL.get(kind).copied()
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            DotToken::Node
                | DotToken::Edge
                | DotToken::Graph
                | DotToken::Digraph
                | DotToken::Subgraph
                | DotToken::Strict
        )
    }
}

/// `<` opens an HTML literal that runs to its matching `>`. Nested angle
/// brackets are counted over the raw bytes, so the literal may contain
/// anything, newlines included.
fn html_literal(lex: &mut Lexer<DotToken>) -> Result<(), LexFault> {
    let mut depth = 1usize;
    let end = lex.remainder().bytes().position(|byte| {
        match byte {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            _ => {}
        }
        depth == 0
    });
    match end {
        Some(idx) => {
            lex.bump(idx + 1);
            Ok(())
        }
        None => Err(LexFault::UnclosedHtml),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<DotToken> {
        DotToken::lexer(source).filter_map(Result::ok).collect()
    }

    #[test]
    fn test_names_follow_variant_order() {
        for (kind, token) in ALL.iter().enumerate() {
            assert_eq!(token.kind(), kind);
            assert_eq!(DotToken::from_kind(kind), Some(*token));
        }
        assert_eq!(DotToken::Arrow.name(), "->");
        assert_eq!(DotToken::from_kind(NAMES.len()), None);
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(
            kinds("digraph nodes node"),
            vec![DotToken::Digraph, DotToken::Id, DotToken::Node]
        );
    }

    #[test]
    fn test_edge_ops_and_negative_numbers() {
        assert_eq!(
            kinds("a->-1.5--b"),
            vec![
                DotToken::Id,
                DotToken::Arrow,
                DotToken::Id,
                DotToken::Dash,
                DotToken::Id
            ]
        );
    }

    #[test]
    fn test_nested_html_literal() {
        let mut lex = DotToken::lexer("<<b>bold</b>> x");
        assert_eq!(lex.next(), Some(Ok(DotToken::Id)));
        assert_eq!(lex.slice(), "<<b>bold</b>>");
        assert_eq!(lex.next(), Some(Ok(DotToken::Id)));
    }

    #[test]
    fn test_unclosed_html_literal() {
        let mut lex = DotToken::lexer("<<b>bold");
        assert_eq!(lex.next(), Some(Err(LexFault::UnclosedHtml)));
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("/* a\n * b */ x // tail\ny"),
            vec![DotToken::Comment, DotToken::Id, DotToken::Comment, DotToken::Id]
        );
    }
}
