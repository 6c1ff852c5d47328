//! Position tracking for the compat token stream
//!
//! The reference tokenizer reports token positions as 1-based line numbers with
//! 0-based byte columns, while the upstream lexer reports absolute byte
//! offsets. This module provides the offset index that converts between the
//! two representations with an O(log n) binary search over line starts.

use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

/// A position in source code as the reference tokenizer reports it
///
/// `line` is 1-based. `column` is a 0-based byte count within the line; it is
/// signed because the byte-order-mark fixup back-dates line-1 columns below
/// zero (see the stream driver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: isize,
}

impl Position {
    pub fn new(line: usize, column: isize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Serialize for Position {
    /// Positions serialize as the reference's `[line, column]` pair
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.line)?;
        tuple.serialize_element(&self.column)?;
        tuple.end()
    }
}

/// Fast conversion from byte offsets to line/column positions
///
/// Built once per transform from the source buffer. Line starts are strictly
/// increasing byte offsets, with the first entry always `0`.
pub struct SourceIndex {
    line_starts: Vec<usize>,
}

impl SourceIndex {
    /// Scan the source once and record the byte offset of every line start
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    ///
    /// The index of the first line start strictly greater than the offset is
    /// the 1-based line number; the column is the distance from the previous
    /// line start. Offset `0` in an empty source yields `1:0`.
    pub fn position(&self, byte_offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= byte_offset);
        let column = (byte_offset - self.line_starts[line - 1]) as isize;

        Position::new(line, column)
    }

    /// Total number of lines tracked by the index
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of a 1-based line, if it exists
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line - 1).copied()
    }
}
