//! Parse errors and furthest-failure ordering
//!
//! A [`ParseError`] names a reason, the offending token (absent at end of
//! stream), and a chain of causes. Errors are ranked by
//! [`ParseError::more_informative_than`]: a failure that starts later in the
//! input wins, and at the same start the one with the larger end wins. Errors
//! with no location never outrank anything, so whichever was seen first is
//! kept.

use super::token::{LexError, Token};
use crate::ast::Span;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error returned by side-effect callbacks and streaming hooks.
pub type CallbackError = Box<dyn StdError + Send + Sync>;

/// A chained cause.
pub type Cause = Arc<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A consumer did not match at a position. Recoverable.
    Grammar,
    /// The tokenizer could not produce a token.
    Lex,
    /// A sequence action rejected what the grammar matched. Fatal.
    Semantic,
    /// A side-effect callback or streaming hook failed. Fatal.
    SideEffect,
    /// The start production matched but tokens were left over.
    UnconsumedInput,
    /// The grammar itself is broken, e.g. a reference to a missing production. Fatal.
    Definition,
}

impl ErrorKind {
    /// Fatal errors abort the run instead of letting an alternative try the next branch.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::Semantic | ErrorKind::SideEffect | ErrorKind::Definition
        )
    }
}

#[derive(Debug, Clone)]
pub struct ParseError {
    kind: ErrorKind,
    reason: String,
    at: Option<Token>,
    location: Option<Span>,
    causes: Vec<Cause>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, reason: impl Into<String>, at: Option<Token>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            at,
            location: None,
            causes: Vec::new(),
        }
    }

    /// Grammar failure at a token.
    pub fn grammar(reason: impl Into<String>, at: Token) -> Self {
        Self::new(ErrorKind::Grammar, reason, Some(at))
    }

    /// Grammar failure at end of stream.
    pub fn end_of_input(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Grammar, reason, None)
    }

    /// Semantic failure raised by a sequence action.
    pub fn semantic(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, reason, None)
    }

    pub fn definition(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Definition, reason, None)
    }

    /// Wrap a tokenizer error. The error keeps the lexer's location so it
    /// takes part in furthest-failure ranking.
    pub fn lex(err: LexError) -> Self {
        let span = err.span;
        Self::new(ErrorKind::Lex, "lexer error", None)
            .with_location(span)
            .chain(err)
    }

    /// Attach a location to an error that has no token, e.g. a semantic error
    /// about a node built from several tokens.
    pub fn with_location(mut self, span: Span) -> Self {
        self.location = Some(span);
        self
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a cause to the chain.
    pub fn chain<E>(self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.chain_shared(Arc::new(cause))
    }

    pub fn chain_shared(mut self, cause: Cause) -> Self {
        self.causes.push(cause);
        self
    }

    pub(crate) fn chain_boxed(self, cause: CallbackError) -> Self {
        self.chain_shared(Arc::from(cause))
    }

    pub(crate) fn relocate(&mut self, at: Option<Token>) {
        self.at = at;
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The offending token; `None` means end of stream or a location-only error.
    pub fn at(&self) -> Option<&Token> {
        self.at.as_ref()
    }

    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Where in the input the failure happened, if known.
    pub fn position(&self) -> Option<Span> {
        self.at.as_ref().map(|t| t.span).or(self.location)
    }

    /// True when `self` points strictly further into the input than `other`.
    ///
    /// Later start wins; on a tied start the larger end wins. When either
    /// side has no location the answer is `false`.
    pub fn more_informative_than(&self, other: &ParseError) -> bool {
        match (self.position(), other.position()) {
            (Some(mine), Some(theirs)) => {
                mine.start > theirs.start || (mine.start == theirs.start && mine.end > theirs.end)
            }
            _ => false,
        }
    }

    /// Pick the more informative of two errors, keeping `first` on ties.
    pub fn furthest(first: ParseError, second: ParseError) -> ParseError {
        if second.more_informative_than(&first) {
            second
        } else {
            first
        }
    }

    fn headline(&self) -> String {
        match (&self.at, self.location) {
            (Some(tok), _) => format!(
                "Parse Error @ {} ({}) : {}",
                tok.span, tok.lexeme, self.reason
            ),
            (None, Some(span)) => format!("Parse Error @ {} : {}", span, self.reason),
            (None, None) => format!("Parse Error @ EOS : {}", self.reason),
        }
    }
}

/// Causes are printed newest first, then the error's own headline.
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cause in self.causes.iter().rev() {
            writeln!(f, "{}", cause)?;
        }
        write!(f, "{}", self.headline())
    }
}

impl StdError for ParseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.causes
            .last()
            .map(|cause| cause.as_ref() as &(dyn StdError + 'static))
    }
}

/// Problems found by [`Grammar::validate`](super::Grammar::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("no start production set")]
    MissingStart,
    #[error("production names may not be empty")]
    EmptyName,
    #[error("production `{0}` is referenced but never defined")]
    UnknownProduction(String),
    #[error("token kind {kind} is outside the token table ({len} entries)")]
    UnknownTokenKind { kind: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: (usize, usize), end: (usize, usize)) -> ParseError {
        ParseError::grammar(
            "expected ID",
            Token::new(1, "}", Span::from_coords(start.0, start.1, end.0, end.1)),
        )
    }

    #[test]
    fn test_later_start_wins() {
        let early = at((1, 3), (1, 9));
        let late = at((1, 5), (1, 5));
        assert!(late.more_informative_than(&early));
        assert!(!early.more_informative_than(&late));
    }

    #[test]
    fn test_tied_start_larger_end_wins() {
        let short = at((2, 1), (2, 1));
        let long = at((2, 1), (2, 4));
        assert!(long.more_informative_than(&short));
        assert!(!short.more_informative_than(&long));
        assert!(!short.more_informative_than(&short.clone()));
    }

    #[test]
    fn test_unlocated_errors_never_rank() {
        let eos = ParseError::end_of_input("ran off the end");
        let located = at((1, 1), (1, 1));
        assert!(!eos.more_informative_than(&located));
        assert!(!located.more_informative_than(&eos));

        let kept = ParseError::furthest(eos, located);
        assert_eq!(kept.reason(), "ran off the end");
    }

    #[test]
    fn test_lex_error_is_located() {
        let err = ParseError::lex(LexError::new(
            "unclosed HTML literal",
            Span::from_coords(3, 4, 3, 4),
        ));
        assert_eq!(err.kind(), ErrorKind::Lex);
        assert_eq!(err.position(), Some(Span::from_coords(3, 4, 3, 4)));
        assert!(err.more_informative_than(&at((3, 1), (3, 2))));
    }

    #[test]
    fn test_display_lists_causes_first() {
        let err = ParseError::new(ErrorKind::SideEffect, "Side Effect Error", None)
            .chain(LexError::new("boom", Span::from_coords(1, 1, 1, 1)));
        assert_eq!(
            err.to_string(),
            "boom at 1:1-1:1\nParse Error @ EOS : Side Effect Error"
        );
    }

    #[test]
    fn test_display_with_token() {
        assert_eq!(
            at((1, 16), (1, 16)).to_string(),
            "Parse Error @ 1:16-1:16 (}) : expected ID"
        );
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(ErrorKind::Semantic.is_fatal());
        assert!(ErrorKind::SideEffect.is_fatal());
        assert!(!ErrorKind::Grammar.is_fatal());
        assert!(!ErrorKind::Lex.is_fatal());
        assert!(!ErrorKind::UnconsumedInput.is_fatal());
    }
}
