//! The `lex` command: dump the token stream of a file.

use std::fmt::Write as _;
use std::path::Path;

use rego_lexer::{KeywordTable, Scanner, Token};

use super::{read_file, CliError};

/// Tokenize a file and list its tokens.
pub fn lex_file(path: &Path) -> Result<String, CliError> {
    let source = read_file(path)?;
    Ok(lex_source(&path.display().to_string(), &source))
}

/// One line per token (whitespace omitted), with scan errors inline.
///
/// Every future keyword is reserved, as in v1 sources.
pub fn lex_source(name: &str, source: &str) -> String {
    let mut scanner = Scanner::new(source).with_keywords(&KeywordTable::future_v0());
    let mut lines = Vec::new();
    let mut count = 0;

    loop {
        let scanned = scanner.scan();
        if scanned.token == Token::Eof {
            break;
        }
        for err in &scanned.errors {
            lines.push(format!(
                "  {}:{}  error: {}",
                err.position.row, err.position.col, err.message
            ));
        }
        if scanned.token == Token::Whitespace {
            continue;
        }
        count += 1;
        let pos = &scanned.position;
        let literal = scanner.text(scanned.literal.start, scanned.literal.end);
        lines.push(format!(
            "  {}:{}  {:?} {literal:?}",
            pos.row, pos.col, scanned.token
        ));
    }

    let mut out = String::new();
    let _ = writeln!(out, "Tokens for '{name}' ({count} tokens):");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
