//! Recursive descent parser for Rego.
//!
//! [`Parser`] turns source text into [`Statement`]s (packages, imports,
//! rules and ad-hoc queries), the comments it skipped over, and a list of
//! [`ParseError`]s. Errors are accumulated rather than returned early:
//! every production returns `Option`, and `None` with no new errors means
//! "not this alternative" while `None` with new errors means "give up".
//!
//! # Organization
//!
//! - [`cursor`]: token access, error reporting, save/restore, depth guard
//! - [`negotiation`]: language version and future keyword selection
//! - [`grammar`]: the productions, one module per statement/term family
//! - [`annotations`]: `METADATA` comment blocks
//! - [`cache`]: memoized primary terms for cheap backtracking
//!
//! # Usage
//!
//! ```ignore
//! let output = Parser::new(source)
//!     .with_filename("policy.rego")
//!     .with_options(ParserOptions::default().with_process_annotation(true))
//!     .parse();
//! ```

mod annotations;
mod cache;
mod capabilities;
mod cursor;
mod entry;
mod grammar;
mod negotiation;
mod options;
mod snapshot;

use std::sync::Arc;

use rego_lexer::Scanner;
use rego_stack::DepthLimit;
use tracing::debug;

pub use capabilities::{
    Capabilities, CapabilitiesError, FEATURE_KEYWORDS_IN_REFS, FEATURE_REGO_V1,
    FEATURE_REGO_V1_IMPORT,
};
pub use entry::{parse_body, parse_expr, parse_ref, parse_statements, parse_term};
pub use negotiation::is_keyword_in_version;
pub use options::{ParserOptions, RegoVersion};
pub use rego_diagnostic::{ParseError, ParseErrors};
pub use rego_ir::{Comment, Statement};

use cache::TermCache;
use snapshot::State;

/// Message recorded when the depth ceiling is hit.
pub const MAX_DEPTH_EXCEEDED: &str = "max parsing recursion depth exceeded";

/// Everything a parse produces.
#[derive(Clone, Debug, Default)]
pub struct ParseOutput {
    pub statements: Vec<Statement>,
    pub comments: Vec<Comment>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parser state.
///
/// A parser is configured with the `with_*` methods and consumed by
/// [`Parser::parse`]; it is not reusable.
pub struct Parser {
    options: ParserOptions,
    /// Resolved from `options` when parsing starts.
    capabilities: Capabilities,
    file: Arc<str>,
    s: State,
    errors: Vec<ParseError>,
    comments: Vec<Comment>,
    cache: TermCache,
    depth: DepthLimit,
    /// Next wildcard number. Never restored by backtracking.
    wildcard: usize,
    /// Calls into the scanner, for observing cache behaviour.
    tokens_scanned: usize,
}

impl Parser {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        let file: Arc<str> = Arc::from("");
        let options = ParserOptions::default();
        Parser {
            capabilities: Capabilities::default(),
            s: State::new(Scanner::new(source), Arc::clone(&file)),
            depth: DepthLimit::new(options.max_recursion_depth),
            options,
            file,
            errors: Vec::new(),
            comments: Vec::new(),
            cache: TermCache::default(),
            wildcard: 0,
            tokens_scanned: 0,
        }
    }

    /// Name of the source file, recorded in every location.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<Arc<str>>) -> Self {
        self.file = filename.into();
        self.s.loc.file = Arc::clone(&self.file);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.depth = DepthLimit::new(options.max_recursion_depth);
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.options.capabilities = Some(capabilities);
        self
    }

    #[must_use]
    pub fn with_rego_version(mut self, version: RegoVersion) -> Self {
        self.options.rego_version = Some(version);
        self
    }

    #[must_use]
    pub fn with_future_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.with_future_keywords(keywords);
        self
    }

    #[must_use]
    pub fn with_all_future_keywords(mut self, yes: bool) -> Self {
        self.options.all_future_keywords = yes;
        self
    }

    #[must_use]
    pub fn with_process_annotation(mut self, yes: bool) -> Self {
        self.options.process_annotation = yes;
        self
    }

    #[must_use]
    pub fn with_skip_rules(mut self, yes: bool) -> Self {
        self.options.skip_rules = yes;
        self
    }

    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.options.max_recursion_depth = depth;
        self.depth = DepthLimit::new(depth);
        self
    }

    /// Parse the whole source.
    ///
    /// Statement kinds are tried in order (package, import, rule, query),
    /// restoring the parser between attempts. Parsing stops at end of
    /// input or at the first statement that fails with errors.
    pub fn parse(mut self) -> ParseOutput {
        let allowed = match self.negotiate_keywords() {
            Ok(allowed) => allowed,
            Err(err) => {
                return ParseOutput {
                    errors: vec![err],
                    ..ParseOutput::default()
                }
            }
        };

        // Read the first token.
        self.scan();

        let mut statements = Vec::new();

        while self.s.tok != rego_lexer::Token::Eof {
            let s = self.save();

            if let Some(pkg) = self.parse_package() {
                debug!(path = %pkg.path, "package");
                statements.push(Statement::Package(pkg));
                continue;
            } else if !self.errors.is_empty() {
                break;
            }

            self.restore(&s);

            if let Some(imp) = self.parse_import() {
                debug!(path = %imp.path, "import");
                match imp.path_ref().and_then(|r| r.head_var()).map(rego_ir::Var::as_str) {
                    Some(rego_ir::REGO_ROOT_DOCUMENT) => self.rego_v1_import(&imp),
                    Some(rego_ir::FUTURE_ROOT_DOCUMENT) => self.future_import(&imp, &allowed),
                    _ => {}
                }
                statements.push(Statement::Import(imp));
                continue;
            } else if !self.errors.is_empty() {
                break;
            }

            self.restore(&s);

            if !self.options.skip_rules {
                if let Some(rules) = self.parse_rules() {
                    debug!(count = rules.len(), "rules");
                    statements.extend(rules.into_iter().map(|r| Statement::Rule(Box::new(r))));
                    continue;
                } else if !self.errors.is_empty() {
                    break;
                }

                self.restore(&s);
            }

            if let Some(body) = self.parse_query(true, rego_lexer::Token::Eof) {
                debug!(len = body.len(), "query");
                statements.push(Statement::Body(body));
                continue;
            }

            break;
        }

        if self.options.process_annotation {
            self.parse_annotations(&mut statements);
        }

        debug!(
            file = %self.file,
            statements = statements.len(),
            errors = self.errors.len(),
            tokens = self.tokens_scanned,
            "parsed"
        );

        ParseOutput {
            statements,
            comments: self.comments,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
