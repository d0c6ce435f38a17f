//! Positions and ranges inside input files.
//!
//! Lines are 1-based, columns are 0-based character offsets within a line.
//! Highlighting, symbol references and issue locations all speak in these
//! coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single position in a file
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextPointer {
    /// 1-based line number
    pub line: u32,
    /// 0-based character offset within the line
    pub column: u32,
}

impl TextPointer {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TextPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open region of text: `start` inclusive, `end` exclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: TextPointer,
    pub end: TextPointer,
}

impl TextRange {
    pub fn new(start: TextPointer, end: TextPointer) -> Self {
        Self { start, end }
    }

    /// Range spanning `start_column..end_column` on a single line
    pub fn on_line(line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            start: TextPointer::new(line, start_column),
            end: TextPointer::new(line, end_column),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, pointer: TextPointer) -> bool {
        self.start <= pointer && pointer < self.end
    }

    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` is entirely inside this range (boundaries may touch)
    pub fn encloses(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Two ranges cross when they overlap without one enclosing the other.
    /// Nested highlighting is legal, crossing highlighting is not.
    pub fn crosses(&self, other: &TextRange) -> bool {
        self.overlaps(other) && !self.encloses(other) && !other.encloses(self)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(l1: u32, c1: u32, l2: u32, c2: u32) -> TextRange {
        TextRange::new(TextPointer::new(l1, c1), TextPointer::new(l2, c2))
    }

    #[test]
    fn test_pointer_ordering() {
        assert!(TextPointer::new(1, 5) < TextPointer::new(2, 0));
        assert!(TextPointer::new(3, 1) < TextPointer::new(3, 2));
        assert_eq!(TextPointer::new(4, 4), TextPointer::new(4, 4));
    }

    #[test]
    fn test_empty_range() {
        assert!(range(1, 3, 1, 3).is_empty());
        assert!(range(2, 5, 1, 0).is_empty());
        assert!(!range(1, 0, 1, 1).is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = range(1, 2, 1, 6);
        assert!(r.contains(TextPointer::new(1, 2)));
        assert!(r.contains(TextPointer::new(1, 5)));
        assert!(!r.contains(TextPointer::new(1, 6)));
        assert!(!r.contains(TextPointer::new(1, 1)));
    }

    #[test]
    fn test_nested_ranges_do_not_cross() {
        let outer = range(1, 0, 5, 0);
        let inner = range(2, 0, 3, 4);
        assert!(outer.overlaps(&inner));
        assert!(outer.encloses(&inner));
        assert!(!outer.crosses(&inner));
        assert!(!inner.crosses(&outer));
    }

    #[test]
    fn test_partial_overlap_crosses() {
        let a = range(1, 0, 3, 0);
        let b = range(2, 0, 4, 0);
        assert!(a.crosses(&b));
        assert!(b.crosses(&a));
    }

    #[test]
    fn test_disjoint_ranges_do_not_cross() {
        let a = range(1, 0, 2, 0);
        let b = range(2, 0, 3, 0);
        assert!(!a.overlaps(&b));
        assert!(!a.crosses(&b));
    }

    #[test]
    fn test_identical_ranges_do_not_cross() {
        let a = range(1, 0, 2, 0);
        assert!(!a.crosses(&a));
    }
}
