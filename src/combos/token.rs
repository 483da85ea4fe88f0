//! Token stream contract
//!
//! The engine never tokenizes. It reads [`Token`]s from a [`TokenSource`]
//! that exposes a rewindable integer cursor; backtracking is nothing more
//! than saving the cursor and setting it back.

use crate::ast::Span;
use serde::Serialize;
use thiserror::Error;

/// Index of a token type in the grammar's token table.
pub type TokenKind = usize;

/// One lexical unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// A malformed token reported by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {span}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Ordered, position-addressable token sequence.
///
/// `next_token` returns `None` at end of stream. The cursor counts tokens
/// already handed out; setting it to any value previously returned by
/// [`TokenSource::cursor`] must replay the same tokens from that point.
pub trait TokenSource {
    fn next_token(&mut self) -> Option<Result<Token, LexError>>;
    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, cursor: usize);
}

/// In-memory token source over an already tokenized input.
#[derive(Debug, Clone, Default)]
pub struct VecTokens {
    tokens: Vec<Token>,
    cursor: usize,
}

impl VecTokens {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl TokenSource for VecTokens {
    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        let token = self.tokens.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Ok(token))
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.tokens.len());
    }
}
