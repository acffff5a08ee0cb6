//! Top-level module items and comments.

use std::fmt;

use crate::{Annotations, Body, Location, Ref, Rule, Term, Var};

/// `package a.b.c`, stored with its `data` root: `data.a.b.c`.
#[derive(Clone, Debug)]
pub struct Package {
    pub path: Ref,
    pub location: Option<Location>,
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Package {}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first segment after the root is a string; print it as the
        // head variable it was written as.
        let mut display = Ref(self.path.iter().skip(1).cloned().collect());
        if let Some(first) = display.first_mut() {
            if let Some(s) = first.value.as_str() {
                *first = Term::var(s);
            }
        }
        write!(f, "package {display}")
    }
}

/// `import data.x.y as z`
#[derive(Clone, Debug)]
pub struct Import {
    /// Always a ref term.
    pub path: Term,
    pub alias: Option<Var>,
    pub location: Option<Location>,
}

impl PartialEq for Import {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.alias == other.alias
    }
}

impl Eq for Import {}

impl Import {
    pub fn path_ref(&self) -> Option<&Ref> {
        self.path.value.as_ref_path()
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import {}", self.path)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

/// A source comment. `text` excludes the leading `#`.
#[derive(Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub location: Location,
}

impl Comment {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Comment {
            text: text.into(),
            location,
        }
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:?} @ {}:{}", self.text, self.location.row, self.location.col)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.text)
    }
}

/// A parsed top-level item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Package(Package),
    Import(Import),
    Rule(Box<Rule>),
    /// An ad-hoc query.
    Body(Body),
    Annotations(Box<Annotations>),
}

impl Statement {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Statement::Package(p) => p.location.as_ref(),
            Statement::Import(i) => i.location.as_ref(),
            Statement::Rule(r) => r.location.as_ref(),
            Statement::Body(b) => b.first().and_then(|e| e.location.as_ref()),
            Statement::Annotations(a) => a.location.as_ref(),
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Statement::Rule(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_body(&self) -> Option<&Body> {
        match self {
            Statement::Body(b) => Some(b),
            _ => None,
        }
    }

    /// Lower-case kind name for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Package(_) => "package",
            Statement::Import(_) => "import",
            Statement::Rule(_) => "rule",
            Statement::Body(_) => "body",
            Statement::Annotations(_) => "annotations",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Package(p) => write!(f, "{p}"),
            Statement::Import(i) => write!(f, "{i}"),
            Statement::Rule(r) => write!(f, "{r}"),
            Statement::Body(b) => write!(f, "{b}"),
            Statement::Annotations(a) => write!(f, "{a}"),
        }
    }
}
