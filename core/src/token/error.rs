use serde::Serialize;
use std::fmt;

/// Zero-based location in a document. `column` and `offset` count chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Editors show 1-based coordinates
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Half-open source range `[start, end)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// Smallest range covering both `self` and `other`.
    pub fn merge(&self, other: &Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True when `line`/`column` falls inside the range. The end column is
    /// inclusive so a cursor placed right after a word still hits it.
    pub fn contains(&self, line: u32, column: u32) -> bool {
        let after_start = (line, column) >= (self.start.line, self.start.column);
        let before_end = (line, column) <= (self.end.line, self.end.column);
        after_start && before_end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line + 1, self.start.column + 1, self.end.column + 1)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Hard failure of the tokenizer. Malformed text never produces one of these;
/// only the livelock guard does.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizeError {
    TooManyTokens { limit: usize, position: Position },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::TooManyTokens { limit, position } => {
                write!(f, "token limit of {} exceeded at {}", limit, position)
            }
        }
    }
}

impl std::error::Error for TokenizeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let pos = Position::new(9, 24, 100);
        assert_eq!(pos.to_string(), "10:25");
    }

    #[test]
    fn test_range_display() {
        let r1 = Range::new(Position::new(0, 4, 4), Position::new(0, 9, 9));
        assert_eq!(r1.to_string(), "1:5-10");

        let r2 = Range::new(Position::new(0, 4, 4), Position::new(2, 1, 20));
        assert_eq!(r2.to_string(), "1:5-3:2");
    }

    #[test]
    fn test_range_merge_and_contains() {
        let a = Range::new(Position::new(0, 2, 2), Position::new(0, 5, 5));
        let b = Range::new(Position::new(1, 0, 7), Position::new(1, 3, 10));
        let m = a.merge(&b);
        assert_eq!(m.start, a.start);
        assert_eq!(m.end, b.end);
        assert!(m.contains(0, 3));
        assert!(m.contains(1, 3));
        assert!(!m.contains(0, 1));
        assert!(!m.contains(2, 0));
    }

    #[test]
    fn test_tokenize_error_display() {
        let err = TokenizeError::TooManyTokens {
            limit: 10,
            position: Position::new(1, 2, 8),
        };
        assert_eq!(err.to_string(), "token limit of 10 exceeded at 2:3");
    }
}
