//! Parser state and snapshots for backtracking.
//!
//! The parser backtracks freely: a production saves a [`Snapshot`], tries
//! an alternative, and restores the snapshot if the alternative fails
//! without reporting errors. Snapshots must therefore be cheap.
//!
//! # What is captured
//!
//! - the scanner (a cheap clone: shared source, copy-on-write keyword
//!   table, copied position)
//! - the current token, its literal range and location
//! - the end offset of the last non-whitespace token (`last_end`), which
//!   every node's location text is cut up to
//! - pending hints
//! - the lengths of the error and comment lists
//!
//! Errors and comments themselves live on the parser and are truncated
//! back to the recorded lengths on restore, so saving never copies them.
//!
//! # What is not captured
//!
//! The wildcard counter and the recursion depth. Wildcard names are drawn
//! from a counter that only ever increases, so a restored parse can never
//! hand out a name that is already in use elsewhere in the tree.

use std::ops::Range;
use std::sync::Arc;

use rego_ir::Location;
use rego_lexer::{Scanner, Token};

/// The live scanning state of a parser.
#[derive(Clone, Debug)]
pub(crate) struct State {
    pub(crate) scanner: Scanner,
    pub(crate) tok: Token,
    /// Byte range of the current token's literal.
    pub(crate) lit: Range<usize>,
    pub(crate) loc: Location,
    /// End offset of the current token.
    pub(crate) tok_end: usize,
    /// End offset of the last non-whitespace token before the current one.
    pub(crate) last_end: usize,
    /// A newline was skipped since the last non-whitespace token.
    pub(crate) skipped_nl: bool,
    /// Hints to attach to the next reported error.
    pub(crate) hints: Vec<String>,
}

impl State {
    pub(crate) fn new(scanner: Scanner, file: Arc<str>) -> Self {
        State {
            scanner,
            tok: Token::Illegal,
            lit: 0..0,
            loc: Location::new(file, 0, 0, 0),
            tok_end: 0,
            last_end: 0,
            skipped_nl: false,
            hints: Vec::new(),
        }
    }

    /// Literal text of the current token.
    #[inline]
    pub(crate) fn lit(&self) -> &str {
        self.scanner.text(self.lit.start, self.lit.end)
    }

    /// Source text in `offset..end` (empty if out of range).
    #[inline]
    pub(crate) fn text(&self, offset: usize, end: usize) -> &str {
        self.scanner.text(offset, end)
    }
}

/// A saved parser position.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub(crate) state: State,
    pub(crate) errors_len: usize,
    pub(crate) comments_len: usize,
}

impl Snapshot {
    /// Byte offset of the token the snapshot was taken at.
    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.state.loc.offset
    }
}
