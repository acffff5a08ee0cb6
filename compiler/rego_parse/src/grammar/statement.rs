//! `package` and `import` clauses.
//!
//! Both clauses are keyword-led, but the keyword may also begin an
//! ordinary ref (`package.x := 1` when keywords are allowed in refs), so a
//! `.` or `[` directly after the keyword means "not this statement".

use rego_ir::{
    Import, Package, Ref, Term, Value, DEFAULT_ROOT_DOCUMENT, FUTURE_ROOT_DOCUMENT,
    REGO_ROOT_DOCUMENT,
};
use rego_lexer::{KeywordTable, Token};
use tracing::debug;

use crate::{is_keyword_in_version, Parser, RegoVersion, FEATURE_REGO_V1, FEATURE_REGO_V1_IMPORT};

/// Roots an import path may start with, sorted.
const IMPORT_ROOTS: [&str; 4] = [DEFAULT_ROOT_DOCUMENT, FUTURE_ROOT_DOCUMENT, "input", REGO_ROOT_DOCUMENT];

impl Parser {
    pub(crate) fn parse_package(&mut self) -> Option<Package> {
        let mut loc = self.loc();
        if self.s.tok != Token::Package {
            return None;
        }

        self.scan_ws();
        if matches!(self.s.tok, Token::Dot | Token::LBrack) {
            return None;
        }
        self.scan();

        if !self.is_ident_or_allowed_ref_keyword() {
            self.illegal_token();
            return None;
        }

        let path = match self.parse_term() {
            Some(Term {
                value: Value::Var(name),
                location,
            }) => {
                let at = location.unwrap_or_default();
                Some(Ref(vec![
                    Term::var(DEFAULT_ROOT_DOCUMENT).with_location(at.clone()),
                    Term::string(name.0).with_location(at),
                ]))
            }
            Some(Term {
                value: Value::Ref(reference),
                ..
            }) => Some(self.package_path(reference)?),
            Some(_) => {
                self.illegal_token();
                return None;
            }
            None => None,
        };

        let Some(path) = path else {
            if self.errors.is_empty() {
                self.error(self.loc(), "expected path");
            }
            return None;
        };

        loc.text = self.text(loc.offset, self.s.last_end);
        Some(Package {
            path,
            location: Some(loc),
        })
    }

    /// `a.b.c` as `data.a.b.c`, with the head turned into a string.
    fn package_path(&mut self, reference: Ref) -> Option<Ref> {
        let mut segments = reference.0.into_iter();
        let first = segments.next()?;
        let at = first.location_or_default();

        let Value::Var(head) = first.value else {
            let msg = format!("unexpected {} token: expecting var", first.value.type_name());
            self.error(at, msg);
            return None;
        };

        let mut path = vec![
            Term::var(DEFAULT_ROOT_DOCUMENT).with_location(at.clone()),
            Term::string(head.0).with_location(at),
        ];
        for segment in segments {
            if !matches!(segment.value, Value::String(_)) {
                let msg = format!("unexpected {} token: expecting string", segment.value.type_name());
                self.error(segment.location_or_default(), msg);
                return None;
            }
            path.push(segment);
        }
        Some(Ref(path))
    }

    pub(crate) fn parse_import(&mut self) -> Option<Import> {
        let mut loc = self.loc();
        if self.s.tok != Token::Import {
            return None;
        }

        self.scan_ws();
        if matches!(self.s.tok, Token::Dot | Token::LBrack) {
            return None;
        }
        self.scan();

        if !self.is_ident_or_allowed_ref_keyword() {
            self.illegal("expected ident");
            return None;
        }

        // Read the path with no future keyword reserved, so that
        // `future.keywords.in` ends in a plain name.
        let term = self.with_present_keywords(Self::parse_term);

        let (path, reference) = match term {
            Some(term) if matches!(term.value, Value::Var(_)) => {
                let at = term.location.clone();
                let reference = Ref(vec![term]);
                let mut path = Term::new(Value::Ref(reference.clone()));
                path.location = at;
                (path, reference)
            }
            Some(term) => {
                let Some(reference) = term.value.as_ref_path().cloned() else {
                    self.error(self.loc(), "expected path");
                    return None;
                };
                for segment in reference.iter().skip(1) {
                    if !matches!(segment.value, Value::String(_)) {
                        let msg = format!(
                            "unexpected {} token: expecting string",
                            segment.value.type_name()
                        );
                        self.error(segment.location_or_default(), msg);
                        return None;
                    }
                }
                (term, reference)
            }
            None => {
                if self.errors.is_empty() {
                    self.error(self.loc(), "expected path");
                }
                return None;
            }
        };

        let at = path.location_or_default();
        let root = reference.first().map(ToString::to_string).unwrap_or_default();
        if !IMPORT_ROOTS.contains(&root.as_str()) {
            self.hint("if this is unexpected, try updating your Rego tooling");
            let msg = format!(
                "unexpected import path, must begin with one of: {{{}}}, got: {root}",
                IMPORT_ROOTS.join(", ")
            );
            self.error(at, msg);
            return None;
        }

        let mut imp = Import {
            path,
            alias: None,
            location: None,
        };

        if self.s.tok == Token::As {
            self.scan();
            if self.s.tok != Token::Ident {
                self.illegal("expected var");
                return None;
            }
            match self.parse_term() {
                Some(Term {
                    value: Value::Var(alias),
                    ..
                }) => imp.alias = Some(alias),
                _ => {
                    self.illegal("expected var");
                    return None;
                }
            }
        } else if root != FUTURE_ROOT_DOCUMENT && reference.len() > 1 {
            let last = reference.last().and_then(|t| t.value.as_str()).unwrap_or_default();
            let version = self.options.effective_rego_version();
            if is_keyword_in_version(last, version) {
                self.hint("import a different path or use an alias");
                let msg = format!(
                    "unexpected import path, must not end with a keyword, got: {}",
                    imp.path
                );
                self.error(at, msg);
            }
        }

        loc.text = self.text(loc.offset, self.s.last_end);
        imp.location = Some(loc);
        Some(imp)
    }

    /// Reserve the keywords a `future.keywords` import names.
    pub(crate) fn future_import(&mut self, imp: &Import, allowed: &KeywordTable) {
        let at = imp.path.location_or_default();
        let Some(path) = imp.path_ref() else {
            return;
        };

        if path.len() == 1 || path[1].value.as_str() != Some("keywords") {
            self.error(at, "invalid import, must be `future.keywords`");
            return;
        }

        if imp.alias.is_some() {
            self.error(at, "`future` imports cannot be aliased");
            return;
        }

        let mut names: Vec<String> = allowed.names().into_iter().map(str::to_string).collect();
        names.sort_unstable();

        let imported = match path.get(2..).unwrap_or_default() {
            [] => names,
            [kw] => {
                let Some(kw) = kw.value.as_str() else {
                    self.error(
                        at,
                        "invalid import, must be `future.keywords.x`, e.g. `import future.keywords.in`",
                    );
                    return;
                };
                if !allowed.contains(kw) {
                    let msg = format!("unexpected keyword, must be one of [{}]", names.join(" "));
                    self.error(at, msg);
                    return;
                }
                vec![kw.to_string()]
            }
            _ => {
                self.error(
                    at,
                    "invalid import, must be `future.keywords.x`, e.g. `import future.keywords.in`",
                );
                return;
            }
        };

        for name in &imported {
            if let Some(tok) = allowed.get(name) {
                self.s.scanner.add_keyword(name, tok);
            }
        }
        debug!(keywords = ?imported, "future keywords imported");
    }

    /// `import rego.v1`: reserve every future keyword and require v1
    /// compatible syntax from here on.
    pub(crate) fn rego_v1_import(&mut self, imp: &Import) {
        let at = imp.path.location_or_default();

        if !self.capabilities.contains_feature(FEATURE_REGO_V1_IMPORT)
            && !self.capabilities.contains_feature(FEATURE_REGO_V1)
        {
            self.error(
                at,
                "invalid import, `rego.v1` is not supported by current capabilities",
            );
            return;
        }

        let is_rego_v1 = imp
            .path_ref()
            .is_some_and(|path| path.len() == 2 && path[1].value.as_str() == Some("v1"));
        if !is_rego_v1 {
            let msg = format!("invalid import `{}`, must be `rego.v1`", imp.path);
            self.error(at, msg);
            return;
        }

        if self.options.effective_rego_version() == RegoVersion::V1 {
            return;
        }

        if imp.alias.is_some() {
            self.error(at, "`rego` imports cannot be aliased");
            return;
        }

        for (name, tok) in KeywordTable::future_v0().iter() {
            self.s.scanner.add_keyword(name, tok);
        }
        debug!("rego.v1 imported");
    }
}
