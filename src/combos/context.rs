//! Per-run parse state
//!
//! A [`ParseContext`] is created for one parse call and dropped when it
//! returns. It owns everything that changes while consumers run: the token
//! source's cursor, the furthest failure seen so far, the fatal-error slot,
//! and the packrat memo table. Keeping the memo table here ties it to exactly
//! one token source; a grammar shared between parses never carries cached
//! results from one input into another.

use super::callbacks::{Callbacks, Hooks};
use super::error::ParseError;
use super::token::{LexError, Token, TokenSource};
use crate::ast::Node;
use std::collections::HashMap;

/// Memo key: the memoized consumer's identity and the cursor it ran at.
pub(crate) type MemoKey = (usize, usize);

#[derive(Debug, Clone)]
pub(crate) struct MemoEntry {
    pub result: Result<Option<Node>, ParseError>,
    pub cursor: usize,
}

/// Packrat counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub memo_hits: usize,
    pub memo_misses: usize,
    /// Alternative branches that failed and handed over to a sibling.
    pub backtracks: usize,
}

pub struct ParseContext<'p, C> {
    source: &'p mut dyn TokenSource,
    pub(crate) user: &'p mut C,
    pub(crate) hooks: Hooks<'p>,
    best_failure: Option<ParseError>,
    fatal: Option<ParseError>,
    memo: HashMap<MemoKey, MemoEntry>,
    stats: ParseStats,
}

impl<'p, C> ParseContext<'p, C> {
    pub fn new(source: &'p mut dyn TokenSource, user: &'p mut C) -> Self {
        Self::with_callbacks(source, user, None)
    }

    pub fn with_callbacks(
        source: &'p mut dyn TokenSource,
        user: &'p mut C,
        callbacks: Option<&'p mut dyn Callbacks>,
    ) -> Self {
        Self {
            source,
            user,
            hooks: Hooks::new(callbacks),
            best_failure: None,
            fatal: None,
            memo: HashMap::new(),
            stats: ParseStats::default(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.source.cursor()
    }

    pub fn restore(&mut self, cursor: usize) {
        self.source.set_cursor(cursor);
    }

    pub(crate) fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        self.source.next_token()
    }

    /// The next token without consuming it.
    pub fn peek(&mut self) -> Option<Result<Token, LexError>> {
        let cursor = self.cursor();
        let next = self.next_token();
        self.restore(cursor);
        next
    }

    pub fn user(&mut self) -> &mut C {
        self.user
    }

    pub fn is_streaming(&self) -> bool {
        self.hooks.is_streaming()
    }

    /// Fold a recoverable failure into the run-wide furthest failure.
    pub fn record_failure(&mut self, err: &ParseError) {
        let replace = match &self.best_failure {
            None => true,
            Some(best) => err.more_informative_than(best),
        };
        if replace {
            self.best_failure = Some(err.clone());
        }
    }

    pub fn best_failure(&self) -> Option<&ParseError> {
        self.best_failure.as_ref()
    }

    pub(crate) fn take_best_failure(&mut self) -> Option<ParseError> {
        self.best_failure.take()
    }

    /// Store a fatal error. Every enclosing consumer stops on its way out and
    /// the run reports this error. The first fatal error wins.
    pub fn abort(&mut self, err: ParseError) -> ParseError {
        if self.fatal.is_none() {
            tracing::debug!(reason = err.reason(), "parse aborted");
            self.fatal = Some(err.clone());
        }
        err
    }

    pub fn is_aborted(&self) -> bool {
        self.fatal.is_some()
    }

    pub(crate) fn take_fatal(&mut self) -> Option<ParseError> {
        self.fatal.take()
    }

    pub(crate) fn memo_get(&mut self, key: MemoKey) -> Option<MemoEntry> {
        let hit = self.memo.get(&key).cloned();
        match hit {
            Some(_) => self.stats.memo_hits += 1,
            None => self.stats.memo_misses += 1,
        }
        hit
    }

    pub(crate) fn memo_put(&mut self, key: MemoKey, entry: MemoEntry) {
        self.memo.insert(key, entry);
    }

    pub(crate) fn note_backtrack(&mut self) {
        self.stats.backtracks += 1;
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::combos::token::VecTokens;

    fn tok(kind: usize, col: usize) -> Token {
        Token::new(kind, "t", Span::from_coords(1, col, 1, col))
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut source = VecTokens::new(vec![tok(0, 1), tok(1, 2)]);
        let mut user = ();
        let mut ctx = ParseContext::new(&mut source, &mut user);

        assert_eq!(ctx.peek(), Some(Ok(tok(0, 1))));
        assert_eq!(ctx.cursor(), 0);
    }

    #[test]
    fn test_record_failure_keeps_furthest() {
        let mut source = VecTokens::default();
        let mut user = ();
        let mut ctx = ParseContext::new(&mut source, &mut user);

        ctx.record_failure(&ParseError::grammar("near", tok(0, 2)));
        ctx.record_failure(&ParseError::grammar("far", tok(0, 8)));
        ctx.record_failure(&ParseError::grammar("back", tok(0, 4)));
        ctx.record_failure(&ParseError::end_of_input("eos"));

        assert_eq!(ctx.best_failure().map(ParseError::reason), Some("far"));
    }

    #[test]
    fn test_first_abort_wins() {
        let mut source = VecTokens::default();
        let mut user = ();
        let mut ctx = ParseContext::new(&mut source, &mut user);

        ctx.abort(ParseError::semantic("first"));
        ctx.abort(ParseError::semantic("second"));

        assert!(ctx.is_aborted());
        assert_eq!(ctx.take_fatal().map(|e| e.reason().to_string()), Some("first".into()));
    }
}
