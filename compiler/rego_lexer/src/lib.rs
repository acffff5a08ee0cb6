//! Rego lexer.
//!
//! A hand-written scanner producing one [`Token`] per call to
//! [`Scanner::scan`], together with its [`Position`] and the byte range of
//! its literal text. Whitespace and comments are real tokens; the parser
//! decides whether to skip them.
//!
//! # Keywords
//!
//! The set of reserved words is not fixed: which of `in`, `every`,
//! `contains` and `if` are keywords depends on the language version and on
//! `future.keywords` imports seen so far. Each scanner therefore owns a
//! [`KeywordTable`] that can be extended or narrowed between scans. Tables
//! are shared copy-on-write, so cloning a scanner for backtracking is cheap.

mod keywords;
mod scanner;
mod token;

pub use keywords::{KeywordTable, BASE_KEYWORDS, FUTURE_KEYWORDS_V0};
pub use scanner::{Position, ScanError, Scanned, Scanner};
pub use token::Token;
