//! The consumer algebra
//!
//! A [`Consumer`] is one grammar step. Every variant shares a single
//! contract: on success it may advance the cursor and returns an optional
//! node; on failure it puts the cursor back exactly where it found it.
//!
//! Consumers are plain data built once with the free functions in this module
//! ([`token`], [`seq`], [`alt`], [`memo`], [`effect`], [`lookahead`],
//! [`epsilon`], [`prod`]) and registered in a [`Grammar`]. Everything that
//! changes during a run lives in the [`ParseContext`].

use super::callbacks::Hooks;
use super::context::{MemoEntry, ParseContext};
use super::error::{CallbackError, ErrorKind, ParseError};
use super::grammar::Grammar;
use super::token::TokenKind;
use crate::ast::{Node, Span};
use std::fmt;

/// Builds a sequence's result node from what its steps matched.
pub type Action<C> = Box<dyn Fn(&mut C, Matched) -> Result<Node, ParseError> + Send + Sync>;

/// Runs after a side-effect sequence matched. The hooks forward to the
/// caller's streaming callbacks, if any.
pub type Effect<C> =
    Box<dyn Fn(&mut C, &mut Hooks<'_>, &Matched) -> Result<(), CallbackError> + Send + Sync>;

pub enum Consumer<C> {
    Token(TokenKind),
    Sequence { steps: Vec<Consumer<C>>, action: Action<C> },
    Alternative(Vec<Consumer<C>>),
    Memoize(Box<Consumer<C>>),
    Effect { steps: Vec<Consumer<C>>, effect: Effect<C> },
    Lookahead(Vec<TokenKind>),
    Epsilon(Option<Node>),
    Reference(String),
}

/// The nodes produced by a sequence's steps, one slot per step. Steps that
/// produce nothing (lookahead, empty epsilon) leave their slot empty.
#[derive(Debug, Clone, Default)]
pub struct Matched {
    nodes: Vec<Option<Node>>,
}

impl Matched {
    pub fn new(nodes: Vec<Option<Node>>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    /// Move the node out of slot `idx`. A missing node is a semantic error.
    pub fn take(&mut self, idx: usize) -> Result<Node, ParseError> {
        self.optional(idx)
            .ok_or_else(|| ParseError::semantic(format!("step {} produced no node", idx)))
    }

    pub fn optional(&mut self, idx: usize) -> Option<Node> {
        self.nodes.get_mut(idx).and_then(Option::take)
    }

    /// Join of every produced node's span.
    pub fn span(&self) -> Option<Span> {
        Span::join(self.nodes.iter().flatten().filter_map(Node::span))
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes.into_iter().flatten().collect()
    }
}

impl<C> Consumer<C> {
    /// Run this consumer at the context's cursor.
    pub fn consume(
        &self,
        grammar: &Grammar<C>,
        ctx: &mut ParseContext<'_, C>,
    ) -> Result<Option<Node>, ParseError> {
        match self {
            Consumer::Token(kind) => match_token(*kind, grammar, ctx).map(Some),
            Consumer::Sequence { steps, action } => run_sequence(steps, action, grammar, ctx),
            Consumer::Alternative(options) => run_alternative(options, grammar, ctx),
            Consumer::Memoize(inner) => self.run_memoized(inner, grammar, ctx),
            Consumer::Effect { steps, effect } => run_effect(steps, effect, grammar, ctx),
            Consumer::Lookahead(kinds) => run_lookahead(kinds, grammar, ctx),
            Consumer::Epsilon(node) => Ok(node.clone()),
            Consumer::Reference(name) => run_reference(name, grammar, ctx),
        }
    }

    fn run_memoized(
        &self,
        inner: &Consumer<C>,
        grammar: &Grammar<C>,
        ctx: &mut ParseContext<'_, C>,
    ) -> Result<Option<Node>, ParseError> {
        let key = (self as *const Self as usize, ctx.cursor());
        if let Some(hit) = ctx.memo_get(key) {
            ctx.restore(hit.cursor);
            return hit.result;
        }
        let result = inner.consume(grammar, ctx);
        if !ctx.is_aborted() {
            let cursor = ctx.cursor();
            ctx.memo_put(
                key,
                MemoEntry {
                    result: result.clone(),
                    cursor,
                },
            );
        }
        result
    }
}

fn run_sequence<C>(
    steps: &[Consumer<C>],
    action: &Action<C>,
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Option<Node>, ParseError> {
    let entry = ctx.cursor();
    let matched = run_steps(steps, grammar, ctx)?;
    let span = matched.span();
    match action(&mut *ctx.user, matched) {
        Ok(node) => Ok(Some(node)),
        Err(err) => {
            ctx.restore(entry);
            let err = promote(err, span);
            Err(ctx.abort(err))
        }
    }
}

fn run_alternative<C>(
    options: &[Consumer<C>],
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Option<Node>, ParseError> {
    let entry = ctx.cursor();
    let mut best: Option<ParseError> = None;
    for option in options {
        match option.consume(grammar, ctx) {
            Ok(node) => return Ok(node),
            Err(err) => {
                ctx.restore(entry);
                if ctx.is_aborted() || err.is_fatal() {
                    return Err(err);
                }
                ctx.note_backtrack();
                ctx.record_failure(&err);
                best = Some(match best {
                    None => err,
                    Some(seen) => ParseError::furthest(seen, err),
                });
            }
        }
    }
    Err(best.unwrap_or_else(|| ParseError::end_of_input("no alternatives")))
}

fn run_effect<C>(
    steps: &[Consumer<C>],
    effect: &Effect<C>,
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Option<Node>, ParseError> {
    let entry = ctx.cursor();
    let matched = run_steps(steps, grammar, ctx)?;
    if let Err(cause) = effect(&mut *ctx.user, &mut ctx.hooks, &matched) {
        ctx.restore(entry);
        let mut err = ParseError::new(ErrorKind::SideEffect, "Side Effect Error", None);
        if let Some(span) = matched.span() {
            err = err.with_location(span);
        }
        return Err(ctx.abort(err.chain_boxed(cause)));
    }
    Ok(Some(Node::new("Effect").with_children(matched.into_nodes())))
}

fn run_lookahead<C>(
    kinds: &[TokenKind],
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Option<Node>, ParseError> {
    match ctx.peek() {
        Some(Ok(tok)) if kinds.contains(&tok.kind) => Ok(None),
        Some(Ok(tok)) => Err(ParseError::grammar(
            format!("expected one of {}", kind_names(kinds, grammar)),
            tok,
        )),
        Some(Err(lex)) => Err(ParseError::lex(lex)),
        None => Err(ParseError::end_of_input(format!(
            "ran off the end of the input, expected one of {}",
            kind_names(kinds, grammar)
        ))),
    }
}

/// Stack left before a reference hop moves onto a fresh heap segment.
const RED_ZONE: usize = 64 * 1024;
/// Size of each heap segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Right-recursive productions (statement lists, attribute lists, edge
/// chains) nest one reference per item, so depth follows input length. Every
/// hop checks the remaining stack and grows it on the heap when it runs low.
fn run_reference<C>(
    name: &str,
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Option<Node>, ParseError> {
    tracing::trace!(production = %name, cursor = ctx.cursor(), "enter production");
    match grammar.production(name) {
        Some(target) => {
            stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || target.consume(grammar, ctx))
        }
        None => Err(ctx.abort(ParseError::definition(format!(
            "undefined production `{}`",
            name
        )))),
    }
}

fn match_token<C>(
    kind: TokenKind,
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Node, ParseError> {
    let entry = ctx.cursor();
    let name = grammar.token_label(kind);
    let outcome = match ctx.next_token() {
        None => Err(ParseError::end_of_input(format!(
            "ran off the end of the input, expected {}",
            name
        ))),
        Some(Err(lex)) => Err(ParseError::lex(lex)),
        Some(Ok(tok)) if tok.kind == kind => Ok(Node::from_token(name, &tok)),
        Some(Ok(tok)) => Err(ParseError::grammar(format!("expected {}", name), tok)),
    };
    if outcome.is_err() {
        ctx.restore(entry);
    }
    outcome
}

fn run_steps<C>(
    steps: &[Consumer<C>],
    grammar: &Grammar<C>,
    ctx: &mut ParseContext<'_, C>,
) -> Result<Matched, ParseError> {
    let entry = ctx.cursor();
    let mut nodes = Vec::with_capacity(steps.len());
    for step in steps {
        match step.consume(grammar, ctx) {
            Ok(node) => nodes.push(node),
            Err(err) => {
                ctx.restore(entry);
                return Err(err);
            }
        }
    }
    Ok(Matched::new(nodes))
}

/// Action errors are never recoverable. Errors without a location point at
/// what the sequence matched.
fn promote(err: ParseError, span: Option<Span>) -> ParseError {
    let err = if err.is_fatal() {
        err
    } else {
        err.with_kind(ErrorKind::Semantic)
    };
    match (err.position(), span) {
        (None, Some(span)) => err.with_location(span),
        _ => err,
    }
}

fn kind_names<C>(kinds: &[TokenKind], grammar: &Grammar<C>) -> String {
    kinds
        .iter()
        .map(|kind| grammar.token_label(*kind))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<C> fmt::Debug for Consumer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consumer::Token(kind) => write!(f, "Token({})", kind),
            Consumer::Sequence { steps, .. } => f.debug_tuple("Sequence").field(steps).finish(),
            Consumer::Alternative(options) => f.debug_tuple("Alternative").field(options).finish(),
            Consumer::Memoize(inner) => f.debug_tuple("Memoize").field(inner).finish(),
            Consumer::Effect { steps, .. } => f.debug_tuple("Effect").field(steps).finish(),
            Consumer::Lookahead(kinds) => f.debug_tuple("Lookahead").field(kinds).finish(),
            Consumer::Epsilon(node) => f.debug_tuple("Epsilon").field(node).finish(),
            Consumer::Reference(name) => write!(f, "Reference({})", name),
        }
    }
}

pub fn token<C>(kind: TokenKind) -> Consumer<C> {
    Consumer::Token(kind)
}

pub fn seq<C, F>(steps: Vec<Consumer<C>>, action: F) -> Consumer<C>
where
    F: Fn(&mut C, Matched) -> Result<Node, ParseError> + Send + Sync + 'static,
{
    Consumer::Sequence {
        steps,
        action: Box::new(action),
    }
}

/// Ordered choice. The first branch that matches wins.
pub fn alt<C>(options: Vec<Consumer<C>>) -> Consumer<C> {
    Consumer::Alternative(options)
}

pub fn memo<C>(inner: Consumer<C>) -> Consumer<C> {
    Consumer::Memoize(Box::new(inner))
}

pub fn effect<C, F>(steps: Vec<Consumer<C>>, effect: F) -> Consumer<C>
where
    F: Fn(&mut C, &mut Hooks<'_>, &Matched) -> Result<(), CallbackError> + Send + Sync + 'static,
{
    Consumer::Effect {
        steps,
        effect: Box::new(effect),
    }
}

pub fn lookahead<C>(kinds: Vec<TokenKind>) -> Consumer<C> {
    Consumer::Lookahead(kinds)
}

pub fn epsilon<C>(node: Option<Node>) -> Consumer<C> {
    Consumer::Epsilon(node)
}

/// Lazy reference to a named production, resolved when it runs.
pub fn prod<C>(name: impl Into<String>) -> Consumer<C> {
    Consumer::Reference(name.into())
}
