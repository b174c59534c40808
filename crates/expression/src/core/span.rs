//! Source spans
//!
//! Byte ranges into the expression text, used by tokens and diagnostics.

/// A byte range in the source text
///
/// Uses u32 offsets; expressions are far below 4GB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Create an empty span at a position
    pub fn at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Start offset as usize
    pub const fn start(&self) -> usize {
        self.start as usize
    }

    /// Get the length of this span
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    /// Check if this span is empty
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extract the text for this span from the source
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start as usize..self.end as usize).unwrap_or("")
    }
}

/// 1-based line and column (in characters) of a byte offset
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice_and_merge() {
        let source = "a + bc";
        let left = Span::new(0, 1);
        let right = Span::new(4, 6);
        assert_eq!(right.slice(source), "bc");
        assert_eq!(left.merge(right), Span::new(0, 6));
        assert_eq!(right.len(), 2);
        assert!(Span::at(3).is_empty());
    }

    #[test]
    fn test_line_col() {
        let source = "x +\n  yé + z";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 6), (2, 3));
        // multi-byte character counts as one column
        assert_eq!(line_col(source, 9), (2, 5));
    }
}
