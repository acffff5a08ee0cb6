//! Terms: the value-producing nodes of the tree.
//!
//! A [`Term`] pairs a [`Value`] with its source [`Location`]. Composite
//! values (arrays, objects, sets, calls, refs, comprehensions) own their
//! children directly; there is no arena because the parser builds small,
//! short-lived trees and clones heads when desugaring chained rules.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::query::Body;
use crate::visitor::{self, Visitor};
use crate::{Location, WILDCARD_PREFIX};

/// A value with an optional source location.
///
/// Locations are absent only on synthesized terms that have not been
/// positioned yet. Equality ignores the location.
#[derive(Clone, Debug)]
pub struct Term {
    pub value: Value,
    pub location: Option<Location>,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Term {}

impl Term {
    #[inline]
    pub fn new(value: Value) -> Self {
        Term {
            value,
            location: None,
        }
    }

    /// Attach a location, replacing any existing one.
    #[must_use]
    #[inline]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn null() -> Self {
        Term::new(Value::Null)
    }

    pub fn boolean(b: bool) -> Self {
        Term::new(Value::Boolean(b))
    }

    pub fn number(text: impl Into<String>) -> Self {
        Term::new(Value::Number(Number(text.into())))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Term::new(Value::String(s.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::new(Value::Var(Var(name.into())))
    }

    pub fn reference(terms: Vec<Term>) -> Self {
        Term::new(Value::Ref(Ref(terms)))
    }

    pub fn array(terms: Vec<Term>) -> Self {
        Term::new(Value::Array(terms))
    }

    pub fn object(pairs: Vec<(Term, Term)>) -> Self {
        Term::new(Value::Object(pairs))
    }

    pub fn set(terms: Vec<Term>) -> Self {
        Term::new(Value::Set(terms))
    }

    /// A call term: `terms[0]` is the operator, the rest are arguments.
    pub fn call(terms: Vec<Term>) -> Self {
        Term::new(Value::Call(terms))
    }

    #[inline]
    pub fn is_ground(&self) -> bool {
        self.value.is_ground()
    }

    /// Location of this term, or the default location if unset.
    pub fn location_or_default(&self) -> Location {
        self.location.clone().unwrap_or_default()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Term payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Boolean(bool),
    /// Numbers keep their exact source spelling (`1e3`, `0.50`, `-.5`).
    Number(Number),
    String(String),
    Var(Var),
    Ref(Ref),
    Array(Vec<Term>),
    /// Key/value pairs in source order.
    Object(Vec<(Term, Term)>),
    Set(Vec<Term>),
    /// Operator term followed by argument terms.
    Call(Vec<Term>),
    ArrayComprehension(Box<ArrayComprehension>),
    ObjectComprehension(Box<ObjectComprehension>),
    SetComprehension(Box<SetComprehension>),
}

impl Value {
    /// Lower-case kind name used in diagnostics (`ref`, `var`, `call`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Var(_) => "var",
            Value::Ref(_) => "ref",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Set(_) => "set",
            Value::Call(_) => "call",
            Value::ArrayComprehension(_) => "arraycomprehension",
            Value::ObjectComprehension(_) => "objectcomprehension",
            Value::SetComprehension(_) => "setcomprehension",
        }
    }

    /// A value is ground when it contains no variables. The head of a ref
    /// does not count: `data.x` and `p.q` are ground, `p[x]` is not.
    pub fn is_ground(&self) -> bool {
        match self {
            Value::Var(_) => false,
            Value::Ref(r) => r.is_ground(),
            Value::Array(terms) | Value::Set(terms) | Value::Call(terms) => {
                terms.iter().all(Term::is_ground)
            }
            Value::Object(pairs) => pairs.iter().all(|(k, v)| k.is_ground() && v.is_ground()),
            Value::ArrayComprehension(_)
            | Value::ObjectComprehension(_)
            | Value::SetComprehension(_) => {
                let mut finder = VarFinder { found: false };
                finder.visit_value(self);
                !finder.found
            }
            Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => true,
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Value::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref_path(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&[Term]> {
        match self {
            Value::Call(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for `Value::Var` with the given name.
    pub fn is_var_named(&self, name: &str) -> bool {
        matches!(self, Value::Var(v) if v.0 == name)
    }
}

struct VarFinder {
    found: bool,
}

impl<'ast> Visitor<'ast> for VarFinder {
    fn visit_value(&mut self, value: &'ast Value) {
        if self.found {
            return;
        }
        if let Value::Var(_) = value {
            self.found = true;
            return;
        }
        visitor::walk_value(self, value);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write_quoted(f, s),
            Value::Var(v) => write!(f, "{v}"),
            Value::Ref(r) => write!(f, "{r}"),
            Value::Array(terms) => {
                f.write_str("[")?;
                write_list(f, terms)?;
                f.write_str("]")
            }
            Value::Object(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Set(terms) if terms.is_empty() => f.write_str("set()"),
            Value::Set(terms) => {
                f.write_str("{")?;
                write_list(f, terms)?;
                f.write_str("}")
            }
            Value::Call(terms) => match terms.split_first() {
                Some((op, args)) => {
                    write!(f, "{op}(")?;
                    write_list(f, args)?;
                    f.write_str(")")
                }
                None => Ok(()),
            },
            Value::ArrayComprehension(c) => write!(f, "[{} | {}]", c.term, c.body),
            Value::ObjectComprehension(c) => write!(f, "{{{}: {} | {}}}", c.key, c.value, c.body),
            Value::SetComprehension(c) => write!(f, "{{{} | {}}}", c.term, c.body),
        }
    }
}

pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{t}")?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

/// A number in its source spelling.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Number(pub String);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A variable name. Wildcards are stored under generated names starting
/// with [`WILDCARD_PREFIX`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub String);

impl Var {
    pub fn new(name: impl Into<String>) -> Self {
        Var(name.into())
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.0.starts_with(WILDCARD_PREFIX)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Var::new(name)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A path expression: head term followed by segments.
///
/// `a.b[x]` is `Ref([Var(a), String("b"), Var(x)])`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Ref(pub Vec<Term>);

impl Ref {
    /// Ground when every segment after the head is ground.
    pub fn is_ground(&self) -> bool {
        self.0.iter().skip(1).all(Term::is_ground)
    }

    pub fn has_prefix(&self, prefix: &Ref) -> bool {
        prefix.0.len() <= self.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }

    /// The head variable, if the head is a var.
    pub fn head_var(&self) -> Option<&Var> {
        self.0.first().and_then(|t| t.value.as_var())
    }
}

impl Deref for Ref {
    type Target = Vec<Term>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Ref {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((head, tail)) = self.0.split_first() else {
            return Ok(());
        };
        write!(f, "{head}")?;
        for seg in tail {
            match &seg.value {
                Value::String(s) if is_var_compatible(s) => write!(f, ".{s}")?,
                _ => write!(f, "[{seg}]")?,
            }
        }
        Ok(())
    }
}

/// Whether `s` could be written as a bare identifier segment (`a.s`).
fn is_var_compatible(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// `[term | body]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayComprehension {
    pub term: Term,
    pub body: Body,
}

/// `{key: value | body}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectComprehension {
    pub key: Term,
    pub value: Term,
    pub body: Body,
}

/// `{term | body}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetComprehension {
    pub term: Term,
    pub body: Body,
}
