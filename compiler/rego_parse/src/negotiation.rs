//! Language version and future keyword selection.
//!
//! Before the first token is read, the parser decides which of the future
//! keywords (`in`, `every`, `contains`, `if`) are reserved:
//!
//! - the *allowed* set is what the capabilities permit at all, and is what
//!   later `import future.keywords...` statements are checked against;
//! - the *selected* set is what the scanner reserves from the start: every
//!   allowed keyword in v1 or with `all_future_keywords`, otherwise exactly
//!   the keywords named in the options.
//!
//! Configuration errors carry no location.

use std::mem;

use rego_diagnostic::ParseError;
use rego_lexer::{KeywordTable, BASE_KEYWORDS, FUTURE_KEYWORDS_V0};
use tracing::debug;

use crate::{Capabilities, Parser, RegoVersion, FEATURE_REGO_V1};

/// Whether `name` is reserved in `version` regardless of imports.
pub fn is_keyword_in_version(name: &str, version: RegoVersion) -> bool {
    let base = BASE_KEYWORDS.iter().any(|(kw, _)| *kw == name);
    match version {
        RegoVersion::V0 | RegoVersion::V0CompatV1 => base,
        RegoVersion::V1 => base || FUTURE_KEYWORDS_V0.iter().any(|(kw, _)| *kw == name),
    }
}

impl Parser {
    /// Resolve capabilities and reserve the selected future keywords.
    ///
    /// Returns the allowed set.
    pub(crate) fn negotiate_keywords(&mut self) -> Result<KeywordTable, ParseError> {
        let version = self.options.effective_rego_version();
        self.capabilities = self
            .options
            .capabilities
            .clone()
            .unwrap_or_else(|| Capabilities::for_version(version));

        let future_v0 = KeywordTable::future_v0();
        let mut allowed = KeywordTable::new();

        if version == RegoVersion::V1 {
            if !self.capabilities.contains_feature(FEATURE_REGO_V1) {
                return Err(ParseError::new(
                    "illegal capabilities: rego_v1 feature required for parsing v1 Rego",
                ));
            }
            // Every v0 future keyword is a plain keyword in v1; there are no
            // v1-only future keywords.
            for kw in &self.capabilities.future_keywords {
                if !future_v0.contains(kw) {
                    return Err(ParseError::new(format!(
                        "illegal capabilities: unknown keyword: {kw}"
                    )));
                }
            }
            allowed.extend_from(&future_v0);
        } else {
            for kw in &self.capabilities.future_keywords {
                match future_v0.get(kw) {
                    Some(tok) => allowed.insert(kw, tok),
                    None => {
                        return Err(ParseError::new(format!(
                            "illegal capabilities: unknown keyword: {kw}"
                        )))
                    }
                }
            }
            if self.capabilities.contains_feature(FEATURE_REGO_V1) {
                allowed.extend_from(&future_v0);
            }
        }

        let selected = if self.options.all_future_keywords || version == RegoVersion::V1 {
            for kw in &self.options.future_keywords {
                if !allowed.contains(kw) {
                    return Err(ParseError::new(format!("unknown future keyword: {kw}")));
                }
            }
            allowed.clone()
        } else {
            let mut selected = KeywordTable::new();
            for kw in &self.options.future_keywords {
                match allowed.get(kw) {
                    Some(tok) => selected.insert(kw, tok),
                    None => return Err(ParseError::new(format!("unknown future keyword: {kw}"))),
                }
            }
            selected
        };

        self.s.scanner = self.s.scanner.with_keywords(&selected);
        debug!(
            version = %version,
            allowed = ?allowed.names(),
            selected = ?selected.names(),
            "future keywords negotiated"
        );
        Ok(allowed)
    }

    /// Run `f` with every v0 future keyword reserved.
    ///
    /// Used to probe whether a failed parse would have succeeded with the
    /// keywords imported, in order to suggest the import. The term cache is
    /// set aside for the duration since keyword changes invalidate it. The
    /// caller restores the parser position.
    pub(crate) fn with_all_future_keywords_reserved<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let table = self.s.scanner.keyword_table();
        self.s.scanner = self.s.scanner.with_keywords(&KeywordTable::future_v0());
        let cache = mem::take(&mut self.cache);
        let result = f(self);
        self.cache = cache;
        self.s.scanner.set_keyword_table(table);
        result
    }

    /// Run `f` with no future keyword reserved, keeping the position it
    /// reaches.
    ///
    /// Import paths are read this way so that `import future.keywords.in`
    /// and `import data.every` lex their last segment as an identifier.
    pub(crate) fn with_present_keywords<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let (scanner, table) = self.s.scanner.without_keywords(&KeywordTable::future_v0());
        self.s.scanner = scanner;
        let cache = mem::take(&mut self.cache);
        let result = f(self);
        self.cache = cache;
        self.s.scanner.set_keyword_table(table);
        result
    }
}

#[cfg(test)]
mod tests;
