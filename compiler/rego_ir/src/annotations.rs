//! Structured metadata decoded from `# METADATA` comment blocks.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Comment, Location, Ref};

/// One decoded `METADATA` block.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Annotations {
    pub scope: String,
    pub title: String,
    pub entrypoint: bool,
    pub description: String,
    pub organizations: Vec<String>,
    pub related_resources: Vec<RelatedResourceAnnotation>,
    pub schemas: Vec<SchemaAnnotation>,
    pub authors: Vec<AuthorAnnotation>,
    pub custom: BTreeMap<String, serde_json::Value>,
    /// Spans the whole block; `text` is the block rebuilt as comment lines.
    pub location: Option<Location>,
    /// The comments the block was decoded from (excluding the marker line).
    pub comments: Vec<Comment>,
}

impl fmt::Display for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("METADATA")?;
        if !self.scope.is_empty() {
            write!(f, " scope={}", self.scope)?;
        }
        if !self.title.is_empty() {
            write!(f, " title={:?}", self.title)?;
        }
        if self.entrypoint {
            f.write_str(" entrypoint")?;
        }
        for author in &self.authors {
            write!(f, " author={author:?}")?;
        }
        for schema in &self.schemas {
            write!(f, " schema={schema}")?;
        }
        Ok(())
    }
}

/// A link to related documentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedResourceAnnotation {
    /// The URL.
    pub reference: String,
    pub description: String,
}

/// A schema attached to a document path.
///
/// Exactly one of `schema` (a `schema.*` reference) and `definition` (an
/// inline JSON schema) is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaAnnotation {
    pub path: Ref,
    pub schema: Option<Ref>,
    pub definition: Option<serde_json::Value>,
}

impl fmt::Display for SchemaAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.schema, &self.definition) {
            (Some(schema), _) => write!(f, "{}:{}", self.path, schema),
            (None, Some(def)) => write!(f, "{}:{}", self.path, def),
            (None, None) => write!(f, "{}", self.path),
        }
    }
}

/// An author, written as `Name <email>` or `{name: .., email: ..}`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct AuthorAnnotation {
    pub name: String,
    pub email: String,
}

impl fmt::Debug for AuthorAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for AuthorAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_empty(), self.email.is_empty()) {
            (false, false) => write!(f, "{} <{}>", self.name, self.email),
            (true, false) => write!(f, "<{}>", self.email),
            _ => f.write_str(&self.name),
        }
    }
}
