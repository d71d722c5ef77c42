use std::fmt;

/// A span of source text, with both byte offsets and 1-based line/column pairs.
///
/// Every token and every AST node carries one of these so diagnostics can point back at
/// the exact source text that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub offset_start: u32,
    pub offset_end: u32,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    #[must_use]
    pub fn new(
        offset_start: u32,
        offset_end: u32,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            offset_start,
            offset_end,
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// A zero-width location at the given line/column, used for synthetic nodes
    /// manufactured during error recovery.
    #[must_use]
    pub fn synthetic(line: u32, column: u32) -> Self {
        Self {
            offset_start: 0,
            offset_end: 0,
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
        }
    }

    /// Merges two locations into the smallest span covering both.
    #[must_use]
    pub fn merge(&self, other: &Location) -> Location {
        Location {
            offset_start: self.offset_start.min(other.offset_start),
            offset_end: self.offset_end.max(other.offset_end),
            start_line: self.start_line.min(other.start_line),
            start_column: if self.start_line <= other.start_line {
                self.start_column
            } else {
                other.start_column
            },
            end_line: self.end_line.max(other.end_line),
            end_column: if self.end_line >= other.end_line {
                self.end_column
            } else {
                other.end_column
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}
