//! The `parse` command: parse Rego files and list their statements.

use std::fmt::Write as _;
use std::path::PathBuf;

use rayon::prelude::*;
use rego_diagnostic::ParseErrors;
use rego_parse::{Capabilities, ParseOutput, Parser, ParserOptions, RegoVersion};
use tracing::debug;

use super::{read_file, CliError};

/// A parsed `rego parse` command line.
#[derive(Clone, Debug, Default)]
pub struct ParseCommand {
    pub options: ParserOptions,
    pub files: Vec<PathBuf>,
}

/// Parse the arguments following `rego parse`.
///
/// Flags may appear before or after the file names.
pub fn parse_options(args: &[String]) -> Result<ParseCommand, CliError> {
    let mut cmd = ParseCommand::default();
    let mut future = Vec::new();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--v0" => cmd.options.rego_version = Some(RegoVersion::V0),
            "--v0v1" => cmd.options.rego_version = Some(RegoVersion::V0CompatV1),
            "--all-future" => cmd.options.all_future_keywords = true,
            "--annotations" => cmd.options.process_annotation = true,
            "--skip-rules" => cmd.options.skip_rules = true,
            "--future" => future.push(value_of(arg, args.next())?.to_string()),
            "--capabilities" => {
                let path = value_of(arg, args.next())?;
                cmd.options.capabilities = Some(Capabilities::load(path)?);
            }
            "--max-depth" => {
                let value = value_of(arg, args.next())?;
                cmd.options.max_recursion_depth = value.parse().map_err(|_| {
                    CliError::Usage(format!("invalid value for --max-depth: '{value}'"))
                })?;
            }
            other => {
                if let Some(kw) = other.strip_prefix("--future=") {
                    future.push(kw.to_string());
                } else if other.starts_with('-') {
                    return Err(CliError::Usage(format!("unknown option '{other}'")));
                } else {
                    cmd.files.push(PathBuf::from(other));
                }
            }
        }
    }

    if cmd.files.is_empty() {
        return Err(CliError::Usage("missing file path".to_string()));
    }

    cmd.options = cmd.options.with_future_keywords(future);
    Ok(cmd)
}

fn value_of<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, CliError> {
    value
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("missing value for {flag}")))
}

/// What parsing one file produced.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<ParseOutput, CliError>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.result.as_ref().map_or(true, ParseOutput::has_errors)
    }

    /// The listing printed for this file: a summary line, one line per
    /// statement, then any errors.
    pub fn render(&self) -> String {
        let path = self.path.display();
        let output = match &self.result {
            Ok(output) => output,
            Err(err) => return format!("{path}: error: {err}\n"),
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{path}: {} statements, {} comments",
            output.statements.len(),
            output.comments.len()
        );
        for stmt in &output.statements {
            let row = stmt.location().map_or(0, |loc| loc.row);
            let _ = writeln!(out, "  {row:>4}  {:<11} {stmt}", stmt.kind());
        }
        if output.has_errors() {
            let errors = ParseErrors(output.errors.clone());
            let _ = writeln!(out, "{errors}");
        }
        out
    }
}

/// Parse every file in `cmd`, in parallel, one parser per file.
///
/// Reports come back in the order the files were given.
pub fn parse_files(cmd: &ParseCommand) -> Vec<FileReport> {
    cmd.files
        .par_iter()
        .map(|path| {
            let result = read_file(path).map(|source| {
                let output = Parser::new(source)
                    .with_filename(path.display().to_string())
                    .with_options(cmd.options.clone())
                    .parse();
                debug!(
                    path = %path.display(),
                    statements = output.statements.len(),
                    errors = output.errors.len(),
                    "parsed file"
                );
                output
            });
            FileReport {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
