//! Parser configuration.

use std::fmt;

use rego_stack::DEFAULT_MAX_DEPTH;

use crate::Capabilities;

/// Which dialect of the language to accept.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum RegoVersion {
    /// The original syntax. Future keywords must be imported.
    V0,
    /// v0 syntax that must also be valid v1 (as with `import rego.v1`).
    V0CompatV1,
    /// Future keywords are reserved without imports.
    #[default]
    V1,
}

impl RegoVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            RegoVersion::V0 => "v0",
            RegoVersion::V0CompatV1 => "v0v1",
            RegoVersion::V1 => "v1",
        }
    }
}

impl fmt::Display for RegoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a single parse.
///
/// Built with `with_*` methods:
///
/// ```ignore
/// let options = ParserOptions::default()
///     .with_rego_version(RegoVersion::V0)
///     .with_future_keywords(["in", "if"]);
/// ```
#[derive(Clone, Debug)]
pub struct ParserOptions {
    /// Defaults to [`Capabilities::for_version`] of the effective version.
    pub capabilities: Option<Capabilities>,
    /// Decode `METADATA` comment blocks into annotation statements.
    pub process_annotation: bool,
    /// Reserve every allowed future keyword, as `import future.keywords`.
    pub all_future_keywords: bool,
    /// Reserve these future keywords, as `import future.keywords.<kw>`.
    pub future_keywords: Vec<String>,
    /// Never try to parse rules; statements are packages, imports and
    /// queries only.
    pub skip_rules: bool,
    /// `None` selects [`RegoVersion::default`].
    pub rego_version: Option<RegoVersion>,
    /// Ceiling on nested productions; `0` disables the check.
    pub max_recursion_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            capabilities: None,
            process_annotation: false,
            all_future_keywords: false,
            future_keywords: Vec::new(),
            skip_rules: false,
            rego_version: None,
            max_recursion_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    #[inline]
    pub fn effective_rego_version(&self) -> RegoVersion {
        self.rego_version.unwrap_or_default()
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    #[must_use]
    pub fn with_process_annotation(mut self, yes: bool) -> Self {
        self.process_annotation = yes;
        self
    }

    #[must_use]
    pub fn with_all_future_keywords(mut self, yes: bool) -> Self {
        self.all_future_keywords = yes;
        self
    }

    #[must_use]
    pub fn with_future_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.future_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_skip_rules(mut self, yes: bool) -> Self {
        self.skip_rules = yes;
        self
    }

    #[must_use]
    pub fn with_rego_version(mut self, version: RegoVersion) -> Self {
        self.rego_version = Some(version);
        self
    }

    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}
