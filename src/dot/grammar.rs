//! DOT productions
//!
//! ```text
//! Graphs     := Graph Graphs | Graph
//! Graph      := GraphStmt | COMMENT
//! GraphStmt  := GraphOpen StmtList GraphClose
//! GraphHead  := STRICT GraphType ID | STRICT GraphType | GraphType ID | GraphType
//! StmtList   := StmtItem StmtList | e
//! StmtItem   := (Stmt | COMMENT) OptSemi
//! Stmt       := Assign | EdgeStmt | NodeStmt | AttrStmt | SubGraph
//! AttrStmt   := (GRAPH | NODE | EDGE) AttrLists
//! AttrLists  := AttrList AttrLists | AttrList
//! AttrList   := "[" AList "]" | "[" "]"
//! AList      := AItem AList | AItem
//! AItem      := ID "=" ID OptSep
//! EdgeStmt   := EndPoint EdgeRHS OptAttrs
//! EdgeRHS    := EdgeOp EndPoint EdgeRHS | EdgeOp EndPoint
//! EndPoint   := NodeId | SubGraph
//! NodeStmt   := NodeId OptAttrs
//! NodeId     := ID Port | ID
//! Port       := ":" ID ":" ID | ":" ID
//! SubGraph   := SubGraphOpen StmtList SubGraphClose
//! SubGraphHead := SUBGRAPH ID | SUBGRAPH | lookahead("{")
//! ```
//!
//! Branches that share a prefix list the longer form first. The scope
//! productions (Graph, SubGraph) are memoized, so when a failed branch is
//! retried at the same position its Enter/Exit/Stmt events are not fired a
//! second time. StmtList needs no memo: its recursive branch only fails when
//! StmtItem does, before any statement event. In streaming mode StmtList
//! drops each statement after StmtItem has reported it.

use super::parser::DotParser;
use super::token::DotToken;
use crate::ast::{Node, Span};
use crate::combos::{
    alt, effect, epsilon, lookahead, memo, prod, seq, token, Consumer, ErrorKind, Grammar,
    Matched, ParseError,
};

type Rule = Consumer<DotParser>;

const COMPASS_POINTS: [&str; 10] = ["n", "ne", "e", "se", "s", "sw", "w", "nw", "c", "_"];

fn t(kind: DotToken) -> Rule {
    token(kind.kind())
}

fn p(name: &str) -> Rule {
    prod(name)
}

/// Build the DOT grammar, starting at `Graphs`.
pub fn build() -> Grammar<DotParser> {
    let mut g = Grammar::new(super::token::NAMES);
    g.start("Graphs");
    add_graph_rules(&mut g);
    add_stmt_rules(&mut g);
    add_attr_rules(&mut g);
    add_edge_rules(&mut g);
    add_subgraph_rules(&mut g);
    g
}

fn add_graph_rules(g: &mut Grammar<DotParser>) {
    g.add_rule(
        "Graphs",
        alt(vec![
            seq(vec![p("Graph"), p("Graphs")], |_, mut m| {
                let mut rest = m.take(1)?;
                rest.prepend(m.take(0)?);
                Ok(rest)
            }),
            seq(vec![p("Graph")], |_, mut m| {
                Ok(Node::new("Graphs").with_child(m.take(0)?))
            }),
        ]),
    )
    .add_rule("Graph", memo(alt(vec![p("GraphStmt"), t(DotToken::Comment)])))
    .add_rule(
        "GraphStmt",
        seq(vec![p("GraphOpen"), p("StmtList"), p("GraphClose")], |_, m| {
            close_scope(m)
        }),
    )
    .add_rule(
        "GraphOpen",
        effect(vec![p("GraphHead"), t(DotToken::LBrace)], |parser, hooks, m| {
            let Some(head) = m.get(0) else {
                return Ok(());
            };
            parser.directed = head
                .child(0)
                .map_or(false, |ty| ty.label == DotToken::Digraph.name());
            hooks.enter("Graph", head)
        }),
    )
    .add_rule(
        "GraphClose",
        effect(vec![t(DotToken::RBrace)], |_, hooks, _| hooks.exit("Graph")),
    )
    .add_rule(
        "GraphHead",
        alt(vec![
            seq(
                vec![t(DotToken::Strict), p("GraphType"), t(DotToken::Id)],
                |parser, mut m| {
                    let ty = strict_type(m.take(1)?, m.take(0)?);
                    Ok(graph_head(parser, ty, m.optional(2)))
                },
            ),
            seq(vec![t(DotToken::Strict), p("GraphType")], |parser, mut m| {
                let ty = strict_type(m.take(1)?, m.take(0)?);
                Ok(graph_head(parser, ty, None))
            }),
            seq(vec![p("GraphType"), t(DotToken::Id)], |parser, mut m| {
                let ty = m.take(0)?;
                Ok(graph_head(parser, ty, m.optional(1)))
            }),
            seq(vec![p("GraphType")], |parser, mut m| {
                Ok(graph_head(parser, m.take(0)?, None))
            }),
        ]),
    )
    .add_rule(
        "GraphType",
        alt(vec![t(DotToken::Graph), t(DotToken::Digraph)]),
    );
}

fn add_stmt_rules(g: &mut Grammar<DotParser>) {
    g.add_rule(
        "StmtList",
        alt(vec![
            // Statements are pushed last to first; close_scope restores order.
            seq(vec![p("StmtItem"), p("StmtList")], |parser, mut m| {
                let mut list = m.take(1)?;
                if parser.streaming {
                    return Ok(list);
                }
                if let Some(stmt) = m.take(0)?.into_children().into_iter().next() {
                    list.push(stmt);
                }
                Ok(list)
            }),
            epsilon(Some(Node::new("Stmts"))),
        ]),
    )
    .add_rule(
        "StmtItem",
        effect(
            vec![alt(vec![p("Stmt"), t(DotToken::Comment)]), p("OptSemi")],
            |_, hooks, m| match m.get(0) {
                Some(stmt) => hooks.stmt(stmt),
                None => Ok(()),
            },
        ),
    )
    .add_rule(
        "Stmt",
        alt(vec![
            p("Assign"),
            p("EdgeStmt"),
            p("NodeStmt"),
            p("AttrStmt"),
            p("SubGraph"),
        ]),
    )
    .add_rule(
        "Assign",
        seq(
            vec![t(DotToken::Id), t(DotToken::Equals), t(DotToken::Id)],
            |_, mut m| attr(m.take(0)?, m.take(2)?),
        ),
    )
    .add_rule(
        "AttrStmt",
        seq(
            vec![
                alt(vec![t(DotToken::Graph), t(DotToken::Node), t(DotToken::Edge)]),
                p("AttrLists"),
            ],
            |_, mut m| {
                Ok(Node::new("AttrStmt")
                    .with_child(m.take(0)?)
                    .with_child(m.take(1)?))
            },
        ),
    )
    .add_rule(
        "NodeStmt",
        seq(vec![p("NodeId"), p("OptAttrs")], |_, mut m| {
            Ok(Node::new("Node")
                .with_child(m.take(0)?)
                .with_child(m.take(1)?))
        }),
    )
    .add_rule(
        "NodeId",
        alt(vec![
            seq(vec![t(DotToken::Id), p("Port")], |_, mut m| {
                Ok(Node::new("NodeId")
                    .with_child(m.take(0)?)
                    .with_child(m.take(1)?))
            }),
            seq(vec![t(DotToken::Id)], |_, mut m| {
                Ok(Node::new("NodeId").with_child(m.take(0)?))
            }),
        ]),
    )
    .add_rule(
        "Port",
        alt(vec![
            seq(
                vec![
                    t(DotToken::Colon),
                    t(DotToken::Id),
                    t(DotToken::Colon),
                    t(DotToken::Id),
                ],
                |parser, mut m| {
                    let mut compass = m.take(3)?;
                    let point = compass.value().unwrap_or_default();
                    if parser.options.validate_compass && !COMPASS_POINTS.contains(&point) {
                        let mut err = ParseError::new(
                            ErrorKind::Semantic,
                            format!("invalid compass point `{}`", point),
                            None,
                        );
                        if let Some(span) = compass.span() {
                            err = err.with_location(span);
                        }
                        return Err(err);
                    }
                    compass.label = "Compass".to_string();
                    Ok(Node::new("Port")
                        .with_child(m.take(1)?)
                        .with_child(compass))
                },
            ),
            seq(vec![t(DotToken::Colon), t(DotToken::Id)], |_, mut m| {
                Ok(Node::new("Port").with_child(m.take(1)?))
            }),
        ]),
    )
    .add_rule("OptSemi", alt(vec![t(DotToken::Semi), epsilon(None)]));
}

fn add_attr_rules(g: &mut Grammar<DotParser>) {
    g.add_rule(
        "AttrLists",
        memo(alt(vec![
            seq(vec![p("AttrList"), p("AttrLists")], |_, mut m| {
                let first = m.take(0)?;
                let rest = m.take(1)?;
                let span = Span::join(first.span().into_iter().chain(rest.span()));
                let mut kids = first.into_children();
                kids.extend(rest.into_children());
                Ok(Node::new("Attrs").with_children(kids).with_span(span))
            }),
            p("AttrList"),
        ])),
    )
    .add_rule(
        "AttrList",
        alt(vec![
            seq(
                vec![t(DotToken::LBracket), p("AList"), t(DotToken::RBracket)],
                |_, mut m| {
                    let span = m.span();
                    Ok(m.take(1)?.with_span(span))
                },
            ),
            seq(
                vec![t(DotToken::LBracket), t(DotToken::RBracket)],
                |_, m| Ok(Node::new("Attrs").with_span(m.span())),
            ),
        ]),
    )
    .add_rule(
        "AList",
        memo(alt(vec![
            seq(vec![p("AItem"), p("AList")], |_, mut m| {
                let mut rest = m.take(1)?;
                rest.prepend(m.take(0)?);
                Ok(rest)
            }),
            seq(vec![p("AItem")], |_, mut m| {
                Ok(Node::new("Attrs").with_child(m.take(0)?))
            }),
        ])),
    )
    .add_rule(
        "AItem",
        seq(
            vec![
                t(DotToken::Id),
                t(DotToken::Equals),
                t(DotToken::Id),
                p("OptSep"),
            ],
            |_, mut m| attr(m.take(0)?, m.take(2)?),
        ),
    )
    .add_rule(
        "OptSep",
        alt(vec![t(DotToken::Semi), t(DotToken::Comma), epsilon(None)]),
    )
    .add_rule(
        "OptAttrs",
        alt(vec![p("AttrLists"), epsilon(Some(Node::new("Attrs")))]),
    );
}

fn add_edge_rules(g: &mut Grammar<DotParser>) {
    g.add_rule(
        "EdgeStmt",
        seq(
            vec![p("EndPoint"), p("EdgeRHS"), p("OptAttrs")],
            |parser, mut m| {
                let head = m.take(0)?;
                let rhs = m.take(1)?;
                let attrs = m.take(2)?;
                edge(parser, head, rhs, attrs)
            },
        ),
    )
    .add_rule(
        "EdgeRHS",
        memo(alt(vec![
            seq(vec![p("EdgeOp"), p("EndPoint"), p("EdgeRHS")], |_, mut m| {
                let mut rest = m.take(2)?;
                rest.prepend(m.take(1)?);
                rest.prepend(m.take(0)?);
                Ok(rest)
            }),
            seq(vec![p("EdgeOp"), p("EndPoint")], |_, m| {
                Ok(Node::new("EdgeRHS").with_children(m.into_nodes()))
            }),
        ])),
    )
    .add_rule("EdgeOp", alt(vec![t(DotToken::Arrow), t(DotToken::Dash)]))
    .add_rule("EndPoint", alt(vec![p("NodeId"), p("SubGraph")]));
}

fn add_subgraph_rules(g: &mut Grammar<DotParser>) {
    g.add_rule(
        "SubGraph",
        memo(seq(
            vec![p("SubGraphOpen"), p("StmtList"), p("SubGraphClose")],
            |_, m| close_scope(m),
        )),
    )
    .add_rule(
        "SubGraphOpen",
        effect(
            vec![p("SubGraphHead"), t(DotToken::LBrace)],
            |_, hooks, m| match m.get(0) {
                Some(head) => hooks.enter("SubGraph", head),
                None => Ok(()),
            },
        ),
    )
    .add_rule(
        "SubGraphClose",
        effect(vec![t(DotToken::RBrace)], |_, hooks, _| hooks.exit("SubGraph")),
    )
    .add_rule(
        "SubGraphHead",
        alt(vec![
            seq(vec![t(DotToken::Subgraph), t(DotToken::Id)], |_, mut m| {
                Ok(Node::new("SubGraph").with_child(m.take(1)?))
            }),
            seq(vec![t(DotToken::Subgraph)], |parser, _| {
                Ok(Node::new("SubGraph").with_child(generated_id(parser, "subgraph")))
            }),
            seq(
                vec![lookahead(vec![DotToken::LBrace.kind()])],
                |parser, _| {
                    Ok(Node::new("SubGraph").with_child(generated_id(parser, "subgraph")))
                },
            ),
        ]),
    );
}

/// `Open StmtList Close` where Open and Close are effect nodes wrapping
/// `[head, "{"]` and `["}"]`. The head gets the statements as its last child,
/// spanning the braces.
fn close_scope(mut m: Matched) -> Result<Node, ParseError> {
    let mut open = m.take(0)?.into_children().into_iter();
    let stmts = m.take(1)?;
    let close = m.take(2)?;
    let (Some(mut head), Some(lbrace)) = (open.next(), open.next()) else {
        return Err(ParseError::semantic("scope opened without a head"));
    };
    let rbrace = close.child(0).and_then(Node::span);
    let span = Span::join(lbrace.span().into_iter().chain(rbrace));
    let stmts = Node::new("Stmts")
        .with_children(stmts.into_children().into_iter().rev())
        .with_span(span);
    head.push(stmts);
    Ok(head)
}

fn graph_head(parser: &mut DotParser, ty: Node, id: Option<Node>) -> Node {
    let id = id.unwrap_or_else(|| generated_id(parser, "graph"));
    Node::new("Graph").with_child(ty).with_child(id)
}

fn generated_id(parser: &mut DotParser, prefix: &str) -> Node {
    Node::with_value(DotToken::Id.name(), parser.next_name(prefix))
}

/// The graph type keyword carries the `strict` keyword as a child and spans
/// both.
fn strict_type(mut ty: Node, strict: Node) -> Node {
    let span = Span::join(strict.span().into_iter().chain(ty.span()));
    ty.push(strict);
    ty.with_span(span)
}

fn attr(key: Node, value: Node) -> Result<Node, ParseError> {
    Ok(Node::new("Attr").with_child(key).with_child(value))
}

/// Build an `Edge` from its first endpoint and the flattened
/// `[op, endpoint, op, endpoint, ...]` right-hand side. The node's value is
/// the first operator.
fn edge(parser: &DotParser, head: Node, rhs: Node, attrs: Node) -> Result<Node, ParseError> {
    let mut ops = Vec::new();
    let mut endpoints = vec![head];
    for (idx, kid) in rhs.into_children().into_iter().enumerate() {
        if idx % 2 == 0 {
            ops.push(kid);
        } else {
            endpoints.push(kid);
        }
    }
    if parser.options.validate_edge_ops {
        let (expected, kind) = if parser.directed {
            (DotToken::Arrow.name(), "digraph")
        } else {
            (DotToken::Dash.name(), "graph")
        };
        if let Some(bad) = ops.iter().find(|op| op.value() != Some(expected)) {
            let mut err = ParseError::new(
                ErrorKind::Semantic,
                format!(
                    "edge operator `{}` is not allowed in a {}",
                    bad.value().unwrap_or_default(),
                    kind
                ),
                None,
            );
            if let Some(span) = bad.span() {
                err = err.with_location(span);
            }
            return Err(err);
        }
    }
    let op = ops
        .first()
        .and_then(Node::value)
        .unwrap_or(DotToken::Arrow.name())
        .to_string();
    Ok(Node::with_value("Edge", op)
        .with_children(endpoints)
        .with_child(attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_validates() {
        assert_eq!(build().validate(), Ok(()));
    }

    #[test]
    fn test_every_token_is_a_production() {
        let g = build();
        for name in super::super::token::NAMES {
            assert!(g.production(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_edge_flattens_rhs() {
        let parser = DotParser::default();
        let id = |v: &str| Node::new("NodeId").with_child(Node::with_value("ID", v));
        let rhs = Node::new("EdgeRHS")
            .with_child(Node::with_value("->", "->"))
            .with_child(id("b"))
            .with_child(Node::with_value("->", "->"))
            .with_child(id("c"));
        let mut directed = parser.clone();
        directed.directed = true;

        let node = edge(&directed, id("a"), rhs.clone(), Node::new("Attrs")).unwrap();
        assert_eq!(node.value(), Some("->"));
        assert_eq!(node.children().len(), 4);

        let err = edge(&parser, id("a"), rhs, Node::new("Attrs")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.reason(), "edge operator `->` is not allowed in a graph");
    }
}
