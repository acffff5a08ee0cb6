use std::fmt;

/// Error codes for front-end diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ErrorCode {
    /// Any syntax or configuration error raised while parsing.
    #[default]
    ParseError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "parse-error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
