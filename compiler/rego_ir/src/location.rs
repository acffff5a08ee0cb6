//! Source locations.
//!
//! A [`Location`] pins a node to the source: 1-based row and column, the
//! byte offset of its first character, the exact source text it covers,
//! and the columns of any tab characters preceding it on its line (used
//! when rendering carets under error snippets).

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

/// Position and covered text of a syntax node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// File the source was read from; empty for anonymous input.
    pub file: Arc<str>,
    /// 1-based line number.
    pub row: usize,
    /// 1-based column (in characters).
    pub col: usize,
    /// Byte offset of the first covered character.
    pub offset: usize,
    /// The exact source text covered by the node.
    pub text: String,
    /// Columns of tab characters on this line before `col`.
    pub tabs: SmallVec<[usize; 4]>,
}

impl Location {
    /// Create a location without covered text.
    pub fn new(file: Arc<str>, row: usize, col: usize, offset: usize) -> Self {
        Location {
            file,
            row,
            col,
            offset,
            text: String::new(),
            tabs: SmallVec::new(),
        }
    }

    /// Replace the covered text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Byte offset one past the last covered character.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new(Arc::from(""), 0, 0, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.row, self.col)
        } else {
            write!(f, "{}:{}", self.file, self.row)
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{} {:?}", self.row, self.col, self.offset, self.text)
    }
}
