//! Token access and bookkeeping shared by all productions.
//!
//! # Scanning
//!
//! [`Parser::scan`] advances to the next token, skipping whitespace;
//! [`Parser::scan_ws`] stops on whitespace, which refs and calls use to
//! tell `a.b` from `a .b` and `f(x)` from `f (x)`. Comments are never
//! returned: they are collected as they are skipped.
//!
//! # Errors
//!
//! [`Parser::error`] records an error at a location and attaches every
//! pending hint. [`Parser::illegal`] reports the current token as
//! unexpected.

use std::mem;

use rego_diagnostic::ParseError;
use rego_ir::{Comment, Location, Term, WILDCARD_PREFIX};
use rego_lexer::{Scanned, Token};
use rego_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::snapshot::Snapshot;
use crate::{Parser, MAX_DEPTH_EXCEEDED};

impl Parser {
    // ─── Scanning ─────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn scan(&mut self) {
        self.do_scan(true);
    }

    #[inline]
    pub(crate) fn scan_ws(&mut self) {
        self.do_scan(false);
    }

    pub(crate) fn do_scan(&mut self, skip_ws: bool) {
        // Whitespace never ends a node, so it does not move `last_end`.
        if self.s.tok != Token::Whitespace {
            self.s.last_end = self.s.tok_end;
            self.s.skipped_nl = false;
        }

        loop {
            let Scanned {
                token,
                position,
                literal,
                errors,
            } = self.s.scanner.scan();
            self.tokens_scanned += 1;

            self.s.tok_end = position.end;
            self.s.lit = literal;
            self.s.loc = Location {
                file: self.file.clone(),
                row: position.row,
                col: position.col,
                offset: position.offset,
                text: self.s.text(position.offset, position.end).to_string(),
                tabs: position.tabs,
            };

            self.s.tok = if errors.is_empty() {
                token
            } else {
                for err in errors {
                    self.error(self.loc(), err.message);
                }
                Token::Illegal
            };

            if self.s.tok == Token::Whitespace {
                if self.s.lit() == "\n" {
                    self.s.skipped_nl = true;
                }
                if skip_ws {
                    continue;
                }
            }

            if self.s.tok != Token::Comment {
                break;
            }

            let text = self.s.lit().get(1..).unwrap_or_default().to_string();
            self.comments.push(Comment::new(text, self.loc()));
        }
    }

    /// Location of the current token.
    #[inline]
    pub(crate) fn loc(&self) -> Location {
        self.s.loc.clone()
    }

    /// Source text in `offset..end`, owned.
    #[inline]
    pub(crate) fn text(&self, offset: usize, end: usize) -> String {
        self.s.text(offset, end).to_string()
    }

    /// Copy `loc` onto `term` with text covering `offset..end`.
    pub(crate) fn set_loc(&self, mut term: Term, loc: &Location, offset: usize, end: usize) -> Term {
        term.location = Some(loc.clone().with_text(self.text(offset, end)));
        term
    }

    // ─── Backtracking ─────────────────────────────────────────────────

    pub(crate) fn save(&self) -> Snapshot {
        Snapshot {
            state: self.s.clone(),
            errors_len: self.errors.len(),
            comments_len: self.comments.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: &Snapshot) {
        trace!(offset = snapshot.offset(), "restore");
        self.errors.truncate(snapshot.errors_len);
        self.comments.truncate(snapshot.comments_len);
        self.s = snapshot.state.clone();
    }

    /// Run `f` from `at`, then put the parser back exactly as it is now.
    ///
    /// Unlike a save/restore pair around `f`, errors and comments recorded
    /// since `at` survive.
    pub(crate) fn probe<R>(&mut self, at: &Snapshot, f: impl FnOnce(&mut Self) -> R) -> R {
        let here = self.s.clone();
        let errors = self.errors.split_off(at.errors_len.min(self.errors.len()));
        let comments = self
            .comments
            .split_off(at.comments_len.min(self.comments.len()));
        self.s = at.state.clone();

        let result = f(self);

        self.errors.truncate(at.errors_len);
        self.errors.extend(errors);
        self.comments.truncate(at.comments_len);
        self.comments.extend(comments);
        self.s = here;
        result
    }

    /// Token after the current one, without consuming anything. Whitespace
    /// counts as a token.
    pub(crate) fn peek_ws(&mut self) -> Token {
        let s = self.save();
        self.scan_ws();
        let tok = self.s.tok;
        self.restore(&s);
        tok
    }

    // ─── Errors ───────────────────────────────────────────────────────

    pub(crate) fn error(&mut self, loc: Location, message: impl Into<String>) {
        let hints = mem::take(&mut self.s.hints);
        let err = ParseError::new(message)
            .at(loc)
            .with_hints(hints)
            .with_details_from(self.s.scanner.bytes());
        trace!(message = %err.message, "parse error");
        self.errors.push(err);
    }

    /// Queue a hint for the next error.
    pub(crate) fn hint(&mut self, hint: impl Into<String>) {
        self.s.hints.push(hint.into());
    }

    /// Report the current token as unexpected, with an optional note.
    pub(crate) fn illegal(&mut self, note: impl AsRef<str>) {
        let loc = self.loc();
        let tok = self.s.tok;
        if tok == Token::Illegal {
            self.error(loc, "illegal token");
            return;
        }

        let kind = if tok.is_keyword() || tok.is_future_keyword() {
            "keyword"
        } else {
            "token"
        };

        let note = note.as_ref();
        if note.is_empty() {
            self.error(loc, format!("unexpected {tok} {kind}"));
        } else {
            self.error(loc, format!("unexpected {tok} {kind}: {note}"));
        }
    }

    #[inline]
    pub(crate) fn illegal_token(&mut self) {
        self.illegal("");
    }

    // ─── Recursion guard ──────────────────────────────────────────────

    /// Run a production one level deeper.
    ///
    /// Fails (reporting [`MAX_DEPTH_EXCEEDED`]) once the configured ceiling
    /// is exceeded; the depth is always restored on return.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if !self.depth.enter() {
            self.error(self.loc(), MAX_DEPTH_EXCEEDED);
            return None;
        }
        let result = ensure_sufficient_stack(|| f(self));
        self.depth.leave();
        result
    }

    // ─── Names ────────────────────────────────────────────────────────

    /// A fresh wildcard name: `$0`, `$1`, ...
    pub(crate) fn gen_wildcard(&mut self) -> String {
        let name = format!("{WILDCARD_PREFIX}{}", self.wildcard);
        self.wildcard += 1;
        name
    }

    /// Whether `tok` may stand in for an identifier in a ref.
    pub(crate) fn is_allowed_ref_keyword(&self, tok: Token) -> bool {
        self.is_allowed_ref_keyword_str(tok.as_str())
    }

    pub(crate) fn is_allowed_ref_keyword_str(&self, name: &str) -> bool {
        self.capabilities
            .contains_feature(crate::FEATURE_KEYWORDS_IN_REFS)
            && (crate::is_keyword_in_version(name, self.options.effective_rego_version())
                || self.s.scanner.is_keyword(name))
    }

    /// The current token is an identifier, or a keyword allowed in refs
    /// (which is then treated as an identifier).
    pub(crate) fn is_ident_or_allowed_ref_keyword(&mut self) -> bool {
        if self.s.tok == Token::Ident {
            return true;
        }
        if self.is_allowed_ref_keyword(self.s.tok) {
            self.s.tok = Token::Ident;
            return true;
        }
        false
    }

    /// If the current token is a keyword allowed in refs and a `.` or `[`
    /// follows directly, treat it as an identifier.
    pub(crate) fn scan_ahead_ref(&mut self) -> bool {
        if self.is_allowed_ref_keyword(self.s.tok) && matches!(self.peek_ws(), Token::Dot | Token::LBrack) {
            self.s.tok = Token::Ident;
            return true;
        }
        false
    }
}
