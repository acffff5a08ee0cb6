//! Command handlers for the `rego` CLI.
//!
//! Shared utilities like [`read_file`] and the [`CliError`] type live here
//! in the module root.

mod lex;
mod parse;

use std::io;
use std::path::{Path, PathBuf};

use rego_parse::CapabilitiesError;

pub use lex::{lex_file, lex_source};
pub use parse::{parse_files, parse_options, FileReport, ParseCommand};

/// Anything that stops a command before or instead of parsing.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{}", read_message(.path, .source))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Capabilities(#[from] CapabilitiesError),
    #[error("{0}")]
    Usage(String),
}

fn read_message(path: &Path, err: &io::Error) -> String {
    let path = path.display();
    match err.kind() {
        io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
        io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
        io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
        _ => format!("error reading '{path}': {err}"),
    }
}

/// Read a source file.
pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
