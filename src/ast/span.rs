//! Position and span tracking for source code locations
//!
//! Positions are 1-based. A span's end position is inclusive: the span of a
//! one-character token starts and ends on the same column.
//!
//! ## Types
//!
//! - [`Position`] - A line:column position in source code
//! - [`Span`] - A start/end pair of positions
//! - [`SourceLocation`] - Utility for converting byte offsets to positions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

/// Represents a position in source code (line and column)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span in source code (start and end positions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Shorthand for `Span::new(Position::new(..), Position::new(..))`.
    pub fn from_coords(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self::new(
            Position::new(start_line, start_col),
            Position::new(end_line, end_col),
        )
    }

    /// Check if a position is contained within this span
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Check if another span overlaps with this span
    pub fn overlaps(&self, other: Span) -> bool {
        self.contains(other.start)
            || self.contains(other.end)
            || other.contains(self.start)
            || other.contains(self.end)
    }

    /// Build the smallest span covering every span in `spans`.
    ///
    /// Returns `None` for an empty iterator. The start is the minimum start
    /// position and the end is the maximum end position, compared line first
    /// and column second.
    pub fn join<I>(spans: I) -> Option<Span>
    where
        I: IntoIterator<Item = Span>,
    {
        let mut spans = spans.into_iter();
        let first = spans.next()?;
        Some(spans.fold(first, |acc, span| {
            Span::new(acc.start.min(span.start), acc.end.max(span.end))
        }))
    }

    /// Join this span with one other span.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Provides fast conversion from byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    /// Create a new SourceLocation from source code
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let column = byte_offset - self.line_starts[line];

        Position::new(line + 1, column + 1)
    }

    /// Convert a half-open byte range to a span with an inclusive end.
    pub fn byte_range_to_span(&self, range: &ByteRange<usize>) -> Span {
        let last = if range.end > range.start {
            range.end - 1
        } else {
            range.start
        };
        Span::new(self.byte_to_position(range.start), self.byte_to_position(last))
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_comparison() {
        let pos1 = Position::new(1, 5);
        let pos2 = Position::new(1, 5);
        let pos3 = Position::new(2, 3);

        assert_eq!(pos1, pos2);
        assert_ne!(pos1, pos3);
        assert!(pos1 < pos3);
    }

    #[test]
    fn test_join_of_nothing_is_none() {
        assert_eq!(Span::join(Vec::new()), None);
    }

    #[test]
    fn test_join_of_one_is_identity() {
        let span = Span::from_coords(3, 4, 3, 9);
        assert_eq!(Span::join([span]), Some(span));
    }

    #[test]
    fn test_join_across_lines() {
        let a = Span::from_coords(1, 1, 1, 5);
        let b = Span::from_coords(2, 1, 2, 3);
        assert_eq!(Span::join([a, b]), Some(Span::from_coords(1, 1, 2, 3)));
        assert_eq!(Span::join([b, a]), Some(Span::from_coords(1, 1, 2, 3)));
    }

    #[test]
    fn test_join_same_line_uses_columns() {
        let a = Span::from_coords(4, 7, 4, 9);
        let b = Span::from_coords(4, 2, 4, 3);
        assert_eq!(a.merge(b), Span::from_coords(4, 2, 4, 9));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::from_coords(1, 9, 12, 1).to_string(), "1:9-12:1");
    }

    #[test]
    fn test_contains_multiline() {
        let span = Span::from_coords(1, 5, 2, 10);

        assert!(!span.contains(Position::new(1, 4)));
        assert!(span.contains(Position::new(1, 5)));
        assert!(span.contains(Position::new(2, 0)));
        assert!(span.contains(Position::new(2, 10)));
        assert!(!span.contains(Position::new(2, 11)));
    }

    #[test]
    fn test_overlaps() {
        let span1 = Span::from_coords(1, 1, 2, 5);
        let span2 = Span::from_coords(2, 1, 3, 5);
        let span3 = Span::from_coords(4, 1, 5, 5);

        assert!(span1.overlaps(span2));
        assert!(span2.overlaps(span1));
        assert!(!span1.overlaps(span3));
    }

    #[test]
    fn test_byte_to_position_multiline() {
        let loc = SourceLocation::new("Hello\nworld\ntest");

        assert_eq!(loc.byte_to_position(0), Position::new(1, 1));
        assert_eq!(loc.byte_to_position(5), Position::new(1, 6));
        assert_eq!(loc.byte_to_position(6), Position::new(2, 1));
        assert_eq!(loc.byte_to_position(15), Position::new(3, 4));
        assert_eq!(loc.line_count(), 3);
    }

    #[test]
    fn test_byte_range_to_span_is_inclusive() {
        let loc = SourceLocation::new("digraph {");
        assert_eq!(
            loc.byte_range_to_span(&(0..7)),
            Span::from_coords(1, 1, 1, 7)
        );
        assert_eq!(
            loc.byte_range_to_span(&(8..9)),
            Span::from_coords(1, 9, 1, 9)
        );
    }
}
