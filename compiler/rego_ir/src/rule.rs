//! Rule definitions.
//!
//! Every rule has a normalized [`Head`]:
//!
//! | Source                  | reference | key  | value          | args   |
//! |-------------------------|-----------|------|----------------|--------|
//! | `p := 1`                | `p`       | -    | `1`            | -      |
//! | `p contains x`          | `p`       | `x`  | -              | -      |
//! | `p[x] { ... }`          | `p`       | `x`  | -              | -      |
//! | `p[x] if { ... }`       | `p[x]`    | -    | `true` (gen.)  | -      |
//! | `f(x) := y`             | `f`       | -    | `y`            | `x`    |
//! | `a.b.c if { ... }`      | `a.b.c`   | -    | `true` (gen.)  | -      |
//!
//! Multi-value rules never have args; function rules never have a key.

use std::fmt;

use crate::term::write_list;
use crate::visitor::{LocationSetter, VisitorMut};
use crate::{Body, Location, Ref, Term, Var};

/// Optional keywords a head was written with, kept for formatting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RuleKeyword {
    If,
    Contains,
}

/// The normalized left-hand side of a rule.
#[derive(Clone, Debug)]
pub struct Head {
    /// Legacy single-name form, set for var heads and desugared `p[x]` heads.
    pub name: Option<Var>,
    pub reference: Ref,
    pub args: Vec<Term>,
    pub key: Option<Term>,
    pub value: Option<Term>,
    /// Written with `:=` rather than `=`.
    pub assign: bool,
    /// `value` was synthesized (`true`) rather than written.
    pub generated_value: bool,
    pub keywords: Vec<RuleKeyword>,
    pub location: Option<Location>,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.reference == other.reference
            && self.args == other.args
            && self.key == other.key
            && self.value == other.value
            && self.assign == other.assign
    }
}

impl Eq for Head {}

impl Head {
    /// Head for a plain name: `p`.
    pub fn var_head(name: Var, location: Option<Location>) -> Self {
        let mut term = Term::var(name.0.clone());
        term.location.clone_from(&location);
        Head {
            name: Some(name),
            reference: Ref(vec![term]),
            location,
            ..Head::ref_head(Ref::default())
        }
    }

    /// Head for a path: `a.b.c`, `p[x]`.
    pub fn ref_head(reference: Ref) -> Self {
        Head {
            name: None,
            reference,
            args: Vec::new(),
            key: None,
            value: None,
            assign: false,
            generated_value: false,
            keywords: Vec::new(),
            location: None,
        }
    }

    /// A function head has arguments.
    #[inline]
    pub fn is_function(&self) -> bool {
        !self.args.is_empty()
    }

    /// A multi-value head has a key and no value.
    #[inline]
    pub fn is_multi_value(&self) -> bool {
        self.key.is_some() && self.value.is_none()
    }

    /// Position every node of the head at `loc`.
    pub fn set_location_recursive(&mut self, loc: &Location) {
        self.location = Some(loc.clone());
        let mut setter = LocationSetter::new(loc);
        for t in self.reference.iter_mut() {
            setter.visit_term_mut(t);
        }
        for t in &mut self.args {
            setter.visit_term_mut(t);
        }
        if let Some(k) = &mut self.key {
            setter.visit_term_mut(k);
        }
        if let Some(v) = &mut self.value {
            setter.visit_term_mut(v);
        }
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            write_list(f, &self.args)?;
            f.write_str(")")?;
        }
        match (&self.key, &self.value) {
            (_, Some(value)) if self.assign => write!(f, " := {value}"),
            (_, Some(value)) => write!(f, " = {value}"),
            (Some(key), None) => write!(f, " contains {key}"),
            (None, None) => Ok(()),
        }
    }
}

/// A rule: head, body, and an optional chain of `else` fallbacks.
#[derive(Clone, Debug)]
pub struct Rule {
    pub default: bool,
    pub head: Head,
    pub body: Body,
    pub else_rule: Option<Box<Rule>>,
    /// `body` was synthesized (`true`) rather than written.
    pub generated_body: bool,
    pub location: Option<Location>,
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.default == other.default
            && self.head == other.head
            && self.body == other.body
            && self.else_rule == other.else_rule
    }
}

impl Eq for Rule {}

impl Rule {
    pub fn new(head: Head, body: Body) -> Self {
        Rule {
            default: false,
            head,
            body,
            else_rule: None,
            generated_body: false,
            location: None,
        }
    }

    /// Number of links in the else chain, not counting this rule.
    pub fn else_chain_len(&self) -> usize {
        let mut n = 0;
        let mut cur = self.else_rule.as_deref();
        while let Some(r) = cur {
            n += 1;
            cur = r.else_rule.as_deref();
        }
        n
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.default {
            return write!(f, "default {}", self.head);
        }
        write!(f, "{} {{ {} }}", self.head, self.body)?;
        let mut cur = self.else_rule.as_deref();
        while let Some(r) = cur {
            f.write_str(" else")?;
            if let Some(value) = r.head.value.as_ref().filter(|_| !r.head.generated_value) {
                let op = if r.head.assign { ":=" } else { "=" };
                write!(f, " {op} {value}")?;
            }
            write!(f, " {{ {} }}", r.body)?;
            cur = r.else_rule.as_deref();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
