//! Hand-written scanner.
//!
//! The scanner walks the source one character at a time, tracking the
//! 1-based row and column of the current character and the columns of tab
//! characters seen on the current line. Errors never stop scanning: they
//! are collected and returned with the token during which they occurred,
//! and the parser turns that token into [`Token::Illegal`].
//!
//! # Design
//!
//! Dispatch is on the current character. Identifiers are looked up in the
//! scanner's [`KeywordTable`] as they are produced. Comment and raw-string
//! bodies are located with `memchr` before the position bookkeeping walks
//! over them.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use crate::{KeywordTable, Token};

/// Where a token starts and ends.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset of the first character.
    pub offset: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub row: usize,
    pub col: usize,
    /// Columns of tabs on this line, up to and including the first character.
    pub tabs: SmallVec<[usize; 4]>,
}

/// A lexical error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    pub message: String,
    pub position: Position,
}

/// Result of one [`Scanner::scan`] call.
#[derive(Clone, Debug)]
pub struct Scanned {
    pub token: Token,
    pub position: Position,
    /// Byte range of the literal text. Same as the token span except for
    /// comments, which drop a trailing `\r`.
    pub literal: Range<usize>,
    pub errors: Vec<ScanError>,
}

/// The Rego scanner. Cloning is cheap: the source and keyword table are
/// shared.
#[derive(Clone)]
pub struct Scanner {
    src: Arc<str>,
    /// Byte offset of `curr`.
    pos: usize,
    curr: Option<char>,
    row: usize,
    col: usize,
    tabs: SmallVec<[usize; 4]>,
    keywords: Arc<KeywordTable>,
    errors: Vec<ScanError>,
}

impl Scanner {
    /// Create a scanner over `source`, reserving only the base keywords.
    /// A leading byte-order mark is skipped.
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        let src: Arc<str> = source.into();
        let pos = if src.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        let mut scanner = Scanner {
            src,
            pos,
            curr: None,
            row: 1,
            col: 0,
            tabs: SmallVec::new(),
            keywords: Arc::new(KeywordTable::base()),
            errors: Vec::new(),
        };
        scanner.load();
        scanner
    }

    /// Produce the next token.
    ///
    /// Returns `Token::Eof` when the source is exhausted; subsequent calls
    /// keep returning `Eof`.
    pub fn scan(&mut self) -> Scanned {
        let start = self.pos;
        let mut position = Position {
            offset: start,
            end: start,
            row: self.row,
            col: self.col,
            tabs: self.tabs.clone(),
        };
        let mut literal_end = None;

        let token = match self.curr {
            None => Token::Eof,
            Some(c) if is_whitespace(c) => {
                self.bump();
                Token::Whitespace
            }
            Some(c) if is_letter(c) => {
                self.scan_identifier();
                self.keywords
                    .get(&self.src[start..self.pos])
                    .unwrap_or(Token::Ident)
            }
            Some(c) if c.is_ascii_digit() => {
                self.scan_number();
                Token::Number
            }
            Some(c) => {
                self.bump();
                self.scan_punct(c, start, &mut literal_end)
            }
        };

        position.end = self.pos;
        Scanned {
            token,
            literal: start..literal_end.unwrap_or(self.pos),
            position,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn scan_punct(&mut self, c: char, start: usize, literal_end: &mut Option<usize>) -> Token {
        match c {
            '#' => {
                *literal_end = Some(self.scan_comment(start));
                Token::Comment
            }
            '"' => {
                self.scan_string();
                Token::String
            }
            '`' => {
                self.scan_raw_string();
                Token::String
            }
            '[' => Token::LBrack,
            ']' => Token::RBrack,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '.' => Token::Dot,
            '+' => Token::Add,
            '-' => Token::Sub,
            '*' => Token::Mul,
            '/' => Token::Quo,
            '%' => Token::Rem,
            '&' => Token::And,
            '|' => Token::Or,
            '=' => self.either('=', Token::Equal, Token::Unify),
            ':' => self.either('=', Token::Assign, Token::Colon),
            '<' => self.either('=', Token::Lte, Token::Lt),
            '>' => self.either('=', Token::Gte, Token::Gt),
            '!' => {
                if self.curr == Some('=') {
                    self.bump();
                    Token::Neq
                } else {
                    self.error("illegal ! character");
                    Token::Illegal
                }
            }
            '\0' => {
                self.error("illegal null character");
                Token::Illegal
            }
            _ => {
                self.error(format!("illegal {c} character"));
                Token::Illegal
            }
        }
    }

    /// `long` if the current character is `next` (consuming it), else `short`.
    fn either(&mut self, next: char, long: Token, short: Token) -> Token {
        if self.curr == Some(next) {
            self.bump();
            long
        } else {
            short
        }
    }

    // ─── Literals ─────────────────────────────────────────────────────

    fn scan_identifier(&mut self) {
        while self.curr.is_some_and(|c| is_letter(c) || c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn scan_number(&mut self) {
        self.eat_digits();

        if self.curr == Some('.') {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => {
                    self.bump();
                    self.eat_digits();
                }
                // `5.foo`: leave the dot for the next token.
                Some(c) if is_letter(c) => {}
                // Trailing `5.` is a complete number.
                _ => self.bump(),
            }
        }

        if matches!(self.curr, Some('e' | 'E')) {
            self.bump();
            if matches!(self.curr, Some('+' | '-')) {
                self.bump();
            }
            if !self.eat_digits() {
                self.error("expected exponent");
            }
        }

        // Swallow the rest of an invalid number so `0a2b` is one token.
        if self.curr.is_some_and(is_letter) {
            self.error("illegal number format");
            while self.curr.is_some_and(|c| is_letter(c) || c.is_ascii_digit()) {
                self.bump();
            }
        }
    }

    /// Consume a run of digits; returns whether any were consumed.
    fn eat_digits(&mut self) -> bool {
        let mut found = false;
        while self.curr.is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            found = true;
        }
        found
    }

    /// Scan the body of a `"` string; the opening quote is consumed.
    fn scan_string(&mut self) {
        loop {
            match self.curr {
                None | Some('\n') => {
                    self.error("non-terminated string");
                    return;
                }
                Some('"') => {
                    self.bump();
                    return;
                }
                Some('\\') => {
                    self.bump();
                    self.scan_escape();
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn scan_escape(&mut self) {
        match self.curr {
            Some('\\' | '"' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => self.bump(),
            Some('u') => {
                self.bump();
                for _ in 0..4 {
                    if self.curr.is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.bump();
                    } else {
                        self.error("illegal escape sequence");
                        return;
                    }
                }
            }
            _ => self.error("illegal escape sequence"),
        }
    }

    /// Scan the body of a backtick string; the opening backtick is consumed.
    fn scan_raw_string(&mut self) {
        match memchr::memchr(b'`', &self.src.as_bytes()[self.pos..]) {
            Some(i) => {
                self.advance_to(self.pos + i);
                self.bump();
            }
            None => {
                self.advance_to(self.src.len());
                self.error("non-terminated raw string");
            }
        }
    }

    /// Scan to end of line; returns the end of the literal (without `\r`).
    fn scan_comment(&mut self, start: usize) -> usize {
        let src = Arc::clone(&self.src);
        let bytes = src.as_bytes();
        let end = memchr::memchr(b'\n', &bytes[self.pos..]).map_or(bytes.len(), |i| self.pos + i);
        self.advance_to(end);
        if end > start && bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        }
    }

    // ─── Cursor ───────────────────────────────────────────────────────

    /// Load the character at `pos` into `curr` and update row/column.
    fn load(&mut self) {
        self.curr = self.src[self.pos..].chars().next();
        match self.curr {
            Some('\n') => {
                self.row += 1;
                self.col = 0;
                self.tabs.clear();
            }
            Some(c) => {
                self.col += 1;
                if c == '\t' {
                    self.tabs.push(self.col);
                }
            }
            None => {}
        }
    }

    #[inline]
    fn bump(&mut self) {
        if let Some(c) = self.curr {
            self.pos += c.len_utf8();
            self.load();
        }
    }

    fn advance_to(&mut self, target: usize) {
        while self.pos < target && self.curr.is_some() {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        let c = self.curr?;
        self.src[self.pos + c.len_utf8()..].chars().next()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ScanError {
            message: message.into(),
            position: Position {
                offset: self.pos,
                end: self.pos,
                row: self.row,
                col: self.col,
                tabs: SmallVec::new(),
            },
        });
    }

    // ─── Keywords ─────────────────────────────────────────────────────

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// The shared keyword table, for saving and later restoring.
    pub fn keyword_table(&self) -> Arc<KeywordTable> {
        Arc::clone(&self.keywords)
    }

    pub fn set_keyword_table(&mut self, table: Arc<KeywordTable>) {
        self.keywords = table;
    }

    /// A copy of this scanner that additionally reserves `kws`.
    #[must_use]
    pub fn with_keywords(&self, kws: &KeywordTable) -> Scanner {
        let mut cpy = self.clone();
        Arc::make_mut(&mut cpy.keywords).extend_from(kws);
        trace!(added = ?kws.names(), "scanner keywords extended");
        cpy
    }

    /// A copy of this scanner that does not reserve any word in `kws`,
    /// together with this scanner's table.
    #[must_use]
    pub fn without_keywords(&self, kws: &KeywordTable) -> (Scanner, Arc<KeywordTable>) {
        let mut cpy = self.clone();
        Arc::make_mut(&mut cpy.keywords).remove_all(kws);
        trace!(removed = ?kws.names(), "scanner keywords narrowed");
        (cpy, self.keyword_table())
    }

    /// Reserve `name` for all later scans.
    pub fn add_keyword(&mut self, name: &str, token: Token) {
        trace!(name, "scanner keyword added");
        Arc::make_mut(&mut self.keywords).insert(name, token);
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.contains(name)
    }

    // ─── Source access ────────────────────────────────────────────────

    pub fn bytes(&self) -> &[u8] {
        self.src.as_bytes()
    }

    /// Source text in `offset..end`, or `""` when the range is out of
    /// bounds or not on character boundaries.
    pub fn text(&self, offset: usize, end: usize) -> &str {
        if offset < self.src.len() && end >= offset && end <= self.src.len() {
            self.src.get(offset..end).unwrap_or("")
        } else {
            ""
        }
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<scanner pos={} row={} col={} curr={:?}>",
            self.pos, self.row, self.col, self.curr
        )
    }
}

#[inline]
fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
