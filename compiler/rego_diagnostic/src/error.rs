use std::fmt;

use rego_ir::Location;

use crate::ErrorCode;

/// A single parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    /// Human-readable description; already includes any hints.
    pub message: String,
    /// Where the error occurred. `None` for configuration errors raised
    /// before any source was read.
    pub location: Option<Location>,
    pub details: Option<ErrorDetails>,
    /// Hints attached to this error, in the order they were given.
    pub hints: Vec<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            code: ErrorCode::ParseError,
            message: message.into(),
            location: None,
            details: None,
            hints: Vec::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach hints, appending them to the message:
    /// `msg (hint: a)` for one, `msg (hints: a, b)` for several.
    #[must_use]
    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        match hints.as_slice() {
            [] => {}
            [hint] => {
                self.message.push_str(" (hint: ");
                self.message.push_str(hint);
                self.message.push(')');
            }
            many => {
                self.message.push_str(" (hints: ");
                self.message.push_str(&many.join(", "));
                self.message.push(')');
            }
        }
        self.hints = hints;
        self
    }

    /// Attach a snippet of `source` around the error location.
    #[must_use]
    pub fn with_details_from(mut self, source: &[u8]) -> Self {
        if let Some(loc) = &self.location {
            self.details = ErrorDetails::from_source(source, loc.offset);
        }
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = &self.location {
            if loc.file.is_empty() {
                write!(f, "{}:{}: ", loc.row, loc.col)?;
            } else {
                write!(f, "{}:{}: ", loc.file, loc.row)?;
            }
        }
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            let (line, caret) = details.lines();
            write!(f, "\n\t{line}\n\t{caret}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// The source line containing an error and the error's index in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDetails {
    pub line: String,
    pub idx: usize,
}

impl ErrorDetails {
    /// Extract the line around `offset`.
    ///
    /// Trailing whitespace at the offset is skipped backwards first, so an
    /// error reported at a newline points at the end of the line before it.
    pub fn from_source(source: &[u8], offset: usize) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        let mut offset = offset.min(source.len() - 1);
        while offset > 0 && source[offset].is_ascii_whitespace() {
            offset -= 1;
        }

        let mut begin = offset;
        while begin > 0 && !is_newline(source[begin]) {
            begin -= 1;
        }
        if is_newline(source[begin]) {
            begin += 1;
        }

        let mut end = offset;
        while end < source.len() && !is_newline(source[end]) {
            end += 1;
        }
        let begin = begin.min(end);

        Some(ErrorDetails {
            line: String::from_utf8_lossy(&source[begin..end]).into_owned(),
            idx: offset.saturating_sub(begin),
        })
    }

    /// The line with leading tabs stripped, and a caret under the error.
    pub fn lines(&self) -> (String, String) {
        let line = self.line.trim_start_matches('\t');
        let tabs = self.line.len() - line.len();
        let indent = self.idx.saturating_sub(tabs);
        (line.to_owned(), format!("{}^", " ".repeat(indent)))
    }
}

fn is_newline(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// An ordered list of parse errors.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    /// Messages only, for assertions and terse output.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }
}

impl From<Vec<ParseError>> for ParseErrors {
    fn from(errors: Vec<ParseError>) -> Self {
        ParseErrors(errors)
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no error(s)"),
            [only] => write!(f, "1 error occurred: {only}"),
            many => {
                write!(f, "{} errors occurred:", many.len())?;
                for e in many {
                    write!(f, "\n{e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests;
