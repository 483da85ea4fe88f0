//! Rewindable token source over DOT text
//!
//! [`DotTokens`] runs the logos lexer lazily: tokens are lexed the first time
//! the cursor reaches them and kept in a buffer, so rewinding never re-lexes.
//! A lexing failure is remembered and returned on every read at that point.

use super::token::{DotToken, LexFault};
use crate::ast::{SourceLocation, Span};
use crate::combos::{LexError, Token, TokenSource};
use logos::{Lexer, Logos};

pub struct DotTokens<'s> {
    lexer: Lexer<'s, DotToken>,
    location: SourceLocation,
    buffer: Vec<Token>,
    error: Option<LexError>,
    cursor: usize,
    keep_comments: bool,
}

impl<'s> DotTokens<'s> {
    /// Token source that drops comments.
    pub fn new(source: &'s str) -> Self {
        Self::with_comments(source, false)
    }

    pub fn with_comments(source: &'s str, keep_comments: bool) -> Self {
        Self {
            lexer: DotToken::lexer(source),
            location: SourceLocation::new(source),
            buffer: Vec::new(),
            error: None,
            cursor: 0,
            keep_comments,
        }
    }

    /// Lex one more token onto the buffer. `Ok(false)` at end of input.
    fn fill(&mut self) -> Result<bool, LexError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        loop {
            let Some(next) = self.lexer.next() else {
                return Ok(false);
            };
            let span = self.location.byte_range_to_span(&self.lexer.span());
            match next {
                Ok(DotToken::Comment) if !self.keep_comments => continue,
                Ok(tok) => {
                    self.buffer
                        .push(Token::new(tok.kind(), self.lexer.slice(), span));
                    return Ok(true);
                }
                Err(fault) => {
                    let err = lex_error(fault, span);
                    self.error = Some(err.clone());
                    return Err(err);
                }
            }
        }
    }
}

fn lex_error(fault: LexFault, span: Span) -> LexError {
    LexError::new(fault.to_string(), span)
}

impl TokenSource for DotTokens<'_> {
    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        if self.cursor == self.buffer.len() {
            match self.fill() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
        let token = self.buffer.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Ok(token))
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.buffer.len());
    }
}

/// Lex the whole input, comments included. Stops at the first error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = DotTokens::with_comments(source, true);
    let mut out = Vec::new();
    while let Some(next) = tokens.next_token() {
        out.push(next?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewind_replays_buffered_tokens() {
        let mut tokens = DotTokens::new("a -> b");
        let first = tokens.next_token();
        tokens.next_token();
        tokens.set_cursor(0);

        assert_eq!(tokens.next_token(), first);
        assert_eq!(tokens.cursor(), 1);
    }

    #[test]
    fn test_comments_skipped_by_default() {
        let mut tokens = DotTokens::new("// note\na");
        let tok = tokens.next_token().unwrap().unwrap();
        assert_eq!(tok.lexeme, "a");
        assert_eq!(tok.span, Span::from_coords(2, 1, 2, 1));
        assert!(tokens.next_token().is_none());
    }

    #[test]
    fn test_error_is_sticky() {
        let mut tokens = DotTokens::new("a <b");
        assert!(tokens.next_token().unwrap().is_ok());
        let err = tokens.next_token().unwrap().unwrap_err();
        assert_eq!(err.message, "unclosed HTML literal");
        assert_eq!(err.span, Span::from_coords(1, 3, 1, 3));
        assert_eq!(tokens.cursor(), 1);
        assert_eq!(tokens.next_token(), Some(Err(err)));
    }

    #[test]
    fn test_tokenize_keeps_comments() {
        let tokens = tokenize("/* c */ x").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![DotToken::Comment.kind(), DotToken::Id.kind()]);
    }
}
