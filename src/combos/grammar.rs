//! Named production table
//!
//! A [`Grammar`] is built once and then only read. Productions refer to each
//! other by name through [`prod`](super::prod), resolved when they run, so
//! rules can be registered in any order and may recurse. Each parse call gets
//! a fresh [`ParseContext`].

use super::callbacks::Callbacks;
use super::consumer::Consumer;
use super::context::ParseContext;
use super::error::{ErrorKind, GrammarError, ParseError};
use super::token::{TokenKind, TokenSource};
use crate::ast::Node;
use std::collections::HashMap;

pub struct Grammar<C> {
    token_names: Vec<String>,
    productions: HashMap<String, Consumer<C>>,
    start: Option<String>,
}

impl<C> Grammar<C> {
    /// A grammar over the given token table. Token kind `n` is named
    /// `token_names[n]`, and each name is registered as a production that
    /// matches that token.
    pub fn new<I, S>(token_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let token_names: Vec<String> = token_names.into_iter().map(Into::into).collect();
        let productions = token_names
            .iter()
            .enumerate()
            .map(|(kind, name)| (name.clone(), Consumer::Token(kind)))
            .collect();
        Self {
            token_names,
            productions,
            start: None,
        }
    }

    pub fn start(&mut self, name: impl Into<String>) -> &mut Self {
        self.start = Some(name.into());
        self
    }

    pub fn start_production(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Register a production, replacing any earlier one with the same name.
    pub fn add_rule(&mut self, name: impl Into<String>, consumer: Consumer<C>) -> &mut Self {
        self.productions.insert(name.into(), consumer);
        self
    }

    pub fn production(&self, name: &str) -> Option<&Consumer<C>> {
        self.productions.get(name)
    }

    pub fn token_names(&self) -> &[String] {
        &self.token_names
    }

    pub fn token_name(&self, kind: TokenKind) -> Option<&str> {
        self.token_names.get(kind).map(String::as_str)
    }

    pub fn token_kind(&self, name: &str) -> Option<TokenKind> {
        self.token_names.iter().position(|n| n == name)
    }

    /// Label for nodes and messages; unknown kinds print as `#<kind>`.
    pub(crate) fn token_label(&self, kind: TokenKind) -> String {
        match self.token_name(kind) {
            Some(name) => name.to_string(),
            None => format!("#{}", kind),
        }
    }

    /// Check the table is complete: a registered start production, no empty
    /// names, every reference resolvable, every token kind known.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let start = self.start.as_deref().ok_or(GrammarError::MissingStart)?;
        if !self.productions.contains_key(start) {
            return Err(GrammarError::UnknownProduction(start.to_string()));
        }
        let mut names: Vec<&String> = self.productions.keys().collect();
        names.sort();
        for name in names {
            if name.is_empty() {
                return Err(GrammarError::EmptyName);
            }
            if let Some(consumer) = self.productions.get(name) {
                self.check(consumer)?;
            }
        }
        Ok(())
    }

    fn check(&self, consumer: &Consumer<C>) -> Result<(), GrammarError> {
        let known = |kind: &TokenKind| {
            if *kind < self.token_names.len() {
                Ok(())
            } else {
                Err(GrammarError::UnknownTokenKind {
                    kind: *kind,
                    len: self.token_names.len(),
                })
            }
        };
        match consumer {
            Consumer::Token(kind) => known(kind),
            Consumer::Lookahead(kinds) => kinds.iter().try_for_each(known),
            Consumer::Sequence { steps, .. } | Consumer::Effect { steps, .. } => {
                steps.iter().try_for_each(|step| self.check(step))
            }
            Consumer::Alternative(options) => options.iter().try_for_each(|o| self.check(o)),
            Consumer::Memoize(inner) => self.check(inner),
            Consumer::Epsilon(_) => Ok(()),
            Consumer::Reference(name) if name.is_empty() => Err(GrammarError::EmptyName),
            Consumer::Reference(name) if !self.productions.contains_key(name) => {
                Err(GrammarError::UnknownProduction(name.clone()))
            }
            Consumer::Reference(_) => Ok(()),
        }
    }

    /// Parse the whole token stream into a tree.
    pub fn parse(&self, source: &mut dyn TokenSource, user: &mut C) -> Result<Node, ParseError> {
        let mut ctx = ParseContext::new(source, user);
        self.run(&mut ctx)?
            .ok_or_else(|| ParseError::semantic("start production produced no node"))
    }

    /// Parse the whole token stream, reporting structure through `callbacks`
    /// as it is recognised.
    pub fn stream(
        &self,
        source: &mut dyn TokenSource,
        user: &mut C,
        callbacks: &mut dyn Callbacks,
    ) -> Result<(), ParseError> {
        let mut ctx = ParseContext::with_callbacks(source, user, Some(callbacks));
        self.run(&mut ctx).map(|_| ())
    }

    /// Run the start production, then rank what went wrong: a fatal error
    /// first, then leftover input, then the furthest recoverable failure.
    pub fn run(&self, ctx: &mut ParseContext<'_, C>) -> Result<Option<Node>, ParseError> {
        let start = self
            .start
            .as_deref()
            .ok_or_else(|| ParseError::definition("no start production set"))?;
        let root = self.production(start).ok_or_else(|| {
            ParseError::definition(format!("undefined production `{}`", start))
        })?;
        tracing::debug!(start, streaming = ctx.is_streaming(), "parse started");

        let outcome = root.consume(self, ctx);
        let result = match ctx.take_fatal() {
            Some(fatal) => Err(fatal),
            None => match outcome {
                Ok(node) => require_exhausted(ctx).map(|()| node),
                Err(err) => Err(match ctx.take_best_failure() {
                    Some(best) => ParseError::furthest(err, best),
                    None => err,
                }),
            },
        };

        let stats = ctx.stats();
        tracing::debug!(
            ok = result.is_ok(),
            memo_hits = stats.memo_hits,
            memo_misses = stats.memo_misses,
            backtracks = stats.backtracks,
            "parse finished"
        );
        result
    }
}

/// Leftover tokens fail the run. The furthest failure seen during the run is
/// usually the real problem, so it is chained as the cause and, when it lies
/// further along, the error points at its token.
fn require_exhausted<C>(ctx: &mut ParseContext<'_, C>) -> Result<(), ParseError> {
    let leftover = match ctx.peek() {
        None => return Ok(()),
        Some(Err(lex)) => return Err(ParseError::lex(lex)),
        Some(Ok(tok)) => tok,
    };
    let mut err = ParseError::new(ErrorKind::UnconsumedInput, "unconsumed input", Some(leftover));
    if let Some(best) = ctx.take_best_failure() {
        if best.more_informative_than(&err) && best.at().is_some() {
            err.relocate(best.at().cloned());
        }
        err = err.chain(best);
    }
    Err(err)
}
