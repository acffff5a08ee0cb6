//! `# METADATA` comment blocks.
//!
//! A block opens at a comment whose trimmed text starts with `METADATA` and
//! runs over the comments that follow on consecutive lines, each starting
//! in the first column. The continuation lines, with `#` and one leading
//! space removed, form a YAML document:
//!
//! ```text
//! # METADATA
//! # title: Allow admins
//! # authors:
//! # - Jane Doe <jane@example.com>
//! # schemas:
//! #   - input: schema.input
//! ```
//!
//! Each block decodes independently. A block that fails to decode records
//! one error and is otherwise skipped.

use std::collections::BTreeMap;

use rego_ir::{
    Annotations, AuthorAnnotation, Comment, Location, Ref, RelatedResourceAnnotation,
    SchemaAnnotation, Statement, Value, SCHEMA_ROOT_DOCUMENT,
};
use serde::Deserialize;
use serde_json::Value as Json;
use serde_yaml::{Mapping, Value as Yaml};
use tracing::{debug, trace};

use crate::Parser;

const MARKER: &str = "METADATA";

/// Why a block could not be decoded.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AnnotationError {
    #[error("expected METADATA block, found whitespace")]
    Empty,
    /// `line` is the 1-based line of the YAML document, when known.
    #[error("{message}")]
    Yaml { message: String, line: Option<usize> },
    #[error("invalid related-resource definition {value}: {reason}")]
    RelatedResource { value: String, reason: String },
    #[error("invalid author definition {value}: {reason}")]
    Author { value: String, reason: String },
    #[error("invalid document reference")]
    DocumentRef,
    #[error("invalid schema reference {0:?}")]
    SchemaRef(String),
    #[error("invalid schema definition: {0}")]
    SchemaDefinition(#[source] Box<AnnotationError>),
    #[error("invalid schema declaration for path {0:?}")]
    SchemaDeclaration(String),
    #[error("invalid map key type(s): {0}")]
    MapKey(String),
    #[error("invalid number {0}")]
    Number(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnnotation {
    scope: String,
    title: String,
    entrypoint: bool,
    description: String,
    organizations: Vec<String>,
    related_resources: Vec<RawEntry>,
    authors: Vec<RawEntry>,
    schemas: Vec<Mapping>,
    custom: Mapping,
}

/// A list entry that may be written as a string or as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Text(String),
    Object(Mapping),
    Other(Yaml),
}

impl RawEntry {
    fn describe(&self) -> String {
        match self {
            RawEntry::Text(s) => s.clone(),
            RawEntry::Object(m) => describe(&Yaml::Mapping(m.clone())),
            RawEntry::Other(v) => describe(v),
        }
    }
}

/// The comments of one block.
struct Block {
    opener: Location,
    comments: Vec<Comment>,
    buf: String,
}

impl Block {
    fn new(opener: Location) -> Self {
        Block {
            opener,
            comments: Vec::new(),
            buf: String::new(),
        }
    }

    fn push(&mut self, comment: Comment) {
        self.buf
            .push_str(comment.text.strip_prefix(' ').unwrap_or(&comment.text));
        self.buf.push('\n');
        self.comments.push(comment);
    }

    /// Where to report `err`: the comment holding the offending YAML line
    /// for decoder errors, the `METADATA` line otherwise.
    fn error_location(&self, err: &AnnotationError) -> Location {
        let AnnotationError::Yaml { line, .. } = err else {
            return self.opener.clone();
        };
        let comment = match line {
            Some(line) => {
                let idx = line.saturating_sub(1).min(self.comments.len().saturating_sub(1));
                self.comments.get(idx)
            }
            None => self.comments.first(),
        };
        comment.map_or_else(|| self.opener.clone(), |c| c.location.clone())
    }

    fn decode(&self) -> Result<Annotations, AnnotationError> {
        if self.buf.trim().is_empty() {
            return Err(AnnotationError::Empty);
        }

        let raw: RawAnnotation = serde_yaml::from_str(&self.buf).map_err(|err| {
            AnnotationError::Yaml {
                message: with_separator_hints(err.to_string(), &self.comments),
                line: err.location().map(|l| l.line()),
            }
        })?;

        let related_resources = raw
            .related_resources
            .iter()
            .map(|entry| {
                related_resource(entry).map_err(|reason| AnnotationError::RelatedResource {
                    value: entry.describe(),
                    reason,
                })
            })
            .collect::<Result<_, _>>()?;

        let authors = raw
            .authors
            .iter()
            .map(|entry| {
                author(entry).map_err(|reason| AnnotationError::Author {
                    value: entry.describe(),
                    reason,
                })
            })
            .collect::<Result<_, _>>()?;

        let schemas = raw
            .schemas
            .iter()
            .filter_map(|pair| pair.iter().next())
            .map(|(k, v)| schema(k, v))
            .collect::<Result<_, _>>()?;

        let mut custom = BTreeMap::new();
        for (k, v) in &raw.custom {
            let Some(key) = k.as_str() else {
                return Err(AnnotationError::MapKey(String::new()));
            };
            custom.insert(key.to_string(), yaml_to_json(v, &mut vec![key.to_string()])?);
        }

        Ok(Annotations {
            scope: raw.scope,
            title: raw.title,
            entrypoint: raw.entrypoint,
            description: raw.description,
            organizations: raw.organizations,
            related_resources,
            schemas,
            authors,
            custom,
            location: Some(self.opener.clone().with_text(self.text())),
            comments: self.comments.clone(),
        })
    }

    /// The block rebuilt as comment lines.
    fn text(&self) -> String {
        let mut text = format!("# {MARKER}\n");
        for line in self.buf.lines() {
            text.push_str("# ");
            text.push_str(line);
            text.push('\n');
        }
        text.truncate(text.trim_end_matches('\n').len());
        text
    }
}

impl Parser {
    /// Decode every `METADATA` block among the collected comments and
    /// append the results to `statements`.
    pub(crate) fn parse_annotations(&mut self, statements: &mut Vec<Statement>) {
        let blocks = group_blocks(&self.comments);
        debug!(blocks = blocks.len(), "annotation blocks");

        for block in blocks {
            match block.decode() {
                Ok(annotations) => {
                    trace!(%annotations, "decoded");
                    statements.push(Statement::Annotations(Box::new(annotations)));
                }
                Err(err) => {
                    let loc = block.error_location(&err);
                    self.error(loc, err.to_string());
                }
            }
        }
    }
}

fn group_blocks(comments: &[Comment]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut open = false;

    for (i, comment) in comments.iter().enumerate() {
        if open {
            let prev = &comments[i - 1];
            if comment.location.row == prev.location.row + 1 && comment.location.col == 1 {
                if let Some(block) = blocks.last_mut() {
                    block.push(comment.clone());
                }
                continue;
            }
            open = false;
        }
        if comment.text.trim().starts_with(MARKER) {
            blocks.push(Block::new(comment.location.clone()));
            open = true;
        }
    }

    blocks
}

fn related_resource(entry: &RawEntry) -> Result<RelatedResourceAnnotation, String> {
    match entry {
        RawEntry::Text(url) if url.is_empty() => Err("ref URL may not be empty string".into()),
        RawEntry::Text(url) => Ok(RelatedResourceAnnotation {
            reference: url.clone(),
            description: String::new(),
        }),
        RawEntry::Object(m) => {
            let obj = object(m)?;
            let reference = string_field(&obj, "ref");
            if reference.is_empty() {
                return Err("'ref' value required in object".into());
            }
            Ok(RelatedResourceAnnotation {
                reference,
                description: string_field(&obj, "description"),
            })
        }
        RawEntry::Other(_) => Err("invalid value type, must be string or map".into()),
    }
}

fn author(entry: &RawEntry) -> Result<AuthorAnnotation, String> {
    match entry {
        RawEntry::Text(s) => author_from_str(s),
        RawEntry::Object(m) => {
            let obj = object(m)?;
            let name = string_field(&obj, "name");
            let email = string_field(&obj, "email");
            if name.is_empty() && email.is_empty() {
                return Err("'name' and/or 'email' values required in object".into());
            }
            Ok(AuthorAnnotation { name, email })
        }
        RawEntry::Other(_) => Err("invalid value type, must be string or map".into()),
    }
}

/// `Jane Doe <jane@example.com>`: a trailing `<...>` word is the email.
fn author_from_str(s: &str) -> Result<AuthorAnnotation, String> {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    let Some(last) = words.last().copied() else {
        return Err("author is an empty string".into());
    };

    let mut email = String::new();
    if let Some(inner) = last.strip_prefix('<').and_then(|w| w.strip_suffix('>')) {
        email = inner.to_string();
        words.pop();
    }

    Ok(AuthorAnnotation {
        name: words.join(" "),
        email,
    })
}

fn schema(key: &Yaml, value: &Yaml) -> Result<SchemaAnnotation, AnnotationError> {
    let key = key.as_str().ok_or(AnnotationError::DocumentRef)?;
    let path = crate::parse_ref(key).map_err(|_| AnnotationError::DocumentRef)?;

    match untag(value) {
        Yaml::String(s) => Ok(SchemaAnnotation {
            path,
            schema: Some(schema_ref(s)?),
            definition: None,
        }),
        def @ Yaml::Mapping(_) => {
            let definition = yaml_to_json(def, &mut Vec::new())
                .map_err(|err| AnnotationError::SchemaDefinition(Box::new(err)))?;
            Ok(SchemaAnnotation {
                path,
                schema: None,
                definition: Some(definition),
            })
        }
        _ => Err(AnnotationError::SchemaDeclaration(key.to_string())),
    }
}

/// `schema` or `schema.<path>`.
fn schema_ref(s: &str) -> Result<Ref, AnnotationError> {
    let root = Ref(vec![rego_ir::Term::var(SCHEMA_ROOT_DOCUMENT)]);
    let invalid = || AnnotationError::SchemaRef(s.to_string());

    let term = crate::parse_term(s).map_err(|_| invalid())?;
    match term.value {
        Value::Var(v) if v.as_str() == SCHEMA_ROOT_DOCUMENT => Ok(root),
        Value::Ref(r) if r.has_prefix(&root) => Ok(r),
        _ => Err(invalid()),
    }
}

fn object(m: &Mapping) -> Result<serde_json::Map<String, Json>, String> {
    match yaml_to_json(&Yaml::Mapping(m.clone()), &mut Vec::new()) {
        Ok(Json::Object(obj)) => Ok(obj),
        Ok(_) => Err("invalid value type, must be string or map".into()),
        Err(err) => Err(err.to_string()),
    }
}

fn string_field(obj: &serde_json::Map<String, Json>, key: &str) -> String {
    obj.get(key)
        .and_then(Json::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn untag(value: &Yaml) -> &Yaml {
    match value {
        Yaml::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Convert YAML to JSON. Map keys must be strings; `path` names the
/// offending map in the error.
fn yaml_to_json(value: &Yaml, path: &mut Vec<String>) -> Result<Json, AnnotationError> {
    Ok(match untag(value) {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .ok_or_else(|| AnnotationError::Number(n.to_string()))?
            }
        }
        Yaml::String(s) => Json::String(s.clone()),
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(i.to_string());
                out.push(yaml_to_json(item, path)?);
                path.pop();
            }
            Json::Array(out)
        }
        Yaml::Mapping(m) => {
            let mut out = serde_json::Map::new();
            for (k, v) in m {
                let Some(key) = untag(k).as_str() else {
                    return Err(AnnotationError::MapKey(path.join("/")));
                };
                path.push(key.to_string());
                out.insert(key.to_string(), yaml_to_json(v, path)?);
                path.pop();
            }
            Json::Object(out)
        }
        Yaml::Tagged(_) => Json::Null,
    })
}

fn describe(value: &Yaml) -> String {
    match untag(value) {
        Yaml::String(s) => s.clone(),
        other => yaml_to_json(other, &mut Vec::new())
            .map_or_else(|_| format!("{other:?}"), |json| json.to_string()),
    }
}

/// Point at `key:value` pairs whose separator is followed by something
/// other than a space or a tab, a common cause of otherwise puzzling
/// decoder errors.
fn with_separator_hints(mut message: String, comments: &[Comment]) -> String {
    for comment in comments {
        let mut parts = comment.text.split(':').skip(1).peekable();
        if parts.peek().is_none() {
            continue;
        }

        let mut symbols = Vec::new();
        while let Some(part) = parts.next() {
            let last = parts.peek().is_none();
            if part.is_empty() && last {
                symbols.clear();
                break;
            }
            let c = part.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
            if c == ' ' || c == '\t' {
                symbols.clear();
                break;
            }
            symbols.push(quote_char(c));
        }

        if !symbols.is_empty() {
            message = format!(
                "{message}\n  Hint: on line {}, symbol(s) [{}] immediately following a key/value separator ':' is not a legal yaml space character",
                comment.location.row,
                symbols.join(" "),
            );
        }
    }
    message
}

/// A character literal with everything outside printable ASCII escaped.
fn quote_char(c: char) -> String {
    match c {
        '\'' => r"'\''".to_string(),
        '\\' => r"'\\'".to_string(),
        ' '..='~' => format!("'{c}'"),
        '\0'..='\x7f' => format!("'\\x{:02x}'", u32::from(c)),
        '\u{80}'..='\u{ffff}' => format!("'\\u{:04x}'", u32::from(c)),
        _ => format!("'\\U{:08x}'", u32::from(c)),
    }
}

#[cfg(test)]
mod tests;
