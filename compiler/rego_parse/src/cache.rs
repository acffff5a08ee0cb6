//! Memoization of primary terms.
//!
//! Backtracking re-parses the same span repeatedly: `{a.b.c + 1}` first
//! reads `a.b.c` as a possible comprehension head, then restores and reads
//! it again as the left operand of `+`. The cache remembers, per start
//! offset, what parsing a primary term produced and where the parser ended
//! up, so the second read replays the result without touching the lexer.
//!
//! Entries are ordered by strictly increasing offset from the bottom of the
//! stack to the top. Pushing an entry drops every entry at the same or a
//! later offset: those were produced by a parse that has since been
//! abandoned. Lookup walks down from the top and gives up as soon as it
//! passes the requested offset.
//!
//! Failed parses are cached too (`term: None`), together with the errors
//! they reported, so a replayed failure is indistinguishable from a fresh
//! one.

use rego_diagnostic::ParseError;
use rego_ir::{Comment, Term};

use crate::snapshot::State;

#[derive(Clone, Debug)]
pub(crate) struct CacheEntry {
    pub(crate) offset: usize,
    pub(crate) term: Option<Term>,
    /// State to resume from on a hit.
    pub(crate) post: State,
    /// Errors reported while parsing the term.
    pub(crate) errors: Vec<ParseError>,
    /// Comments collected while parsing the term.
    pub(crate) comments: Vec<Comment>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TermCache {
    entries: Vec<CacheEntry>,
}

impl TermCache {
    /// The entry for a term starting at `offset`, if any.
    pub(crate) fn lookup(&self, offset: usize) -> Option<&CacheEntry> {
        self.entries
            .iter()
            .rev()
            .take_while(|e| e.offset >= offset)
            .find(|e| e.offset == offset)
    }

    /// Record an entry, discarding entries at or after its offset.
    ///
    /// Later entries are dropped rather than kept behind the new one: a
    /// term re-parsed at an earlier offset was reached after a restore, so
    /// entries past it belong to an abandoned alternative.
    pub(crate) fn push(&mut self, entry: CacheEntry) {
        while self
            .entries
            .last()
            .is_some_and(|top| top.offset >= entry.offset)
        {
            self.entries.pop();
        }
        self.entries.push(entry);
    }

    #[cfg(test)]
    pub(crate) fn offsets(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.offset).collect()
    }
}
