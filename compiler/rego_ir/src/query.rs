//! Queries: bodies, expressions and their modifiers.

use std::fmt;
use std::ops::Deref;

use crate::term::write_list;
use crate::visitor::{LocationSetter, VisitorMut};
use crate::{Location, Term, Value, MEMBER, MEMBER_WITH_KEY};

/// An ordered conjunction of expressions.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Body(pub Vec<Expr>);

impl Body {
    pub fn new() -> Self {
        Body(Vec::new())
    }

    /// A body holding a single expression.
    pub fn single(expr: Expr) -> Self {
        let mut body = Body::new();
        body.push(expr);
        body
    }

    /// Append an expression, numbering it by position.
    pub fn push(&mut self, mut expr: Expr) {
        expr.index = self.0.len();
        self.0.push(expr);
    }

    /// Position every node of the body at `loc`.
    pub fn set_location_recursive(&mut self, loc: &Location) {
        LocationSetter::new(loc).visit_body_mut(self);
    }
}

impl Deref for Body {
    type Target = Vec<Expr>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{expr}")?;
        }
        Ok(())
    }
}

/// A single literal of a query.
#[derive(Clone, Debug)]
pub struct Expr {
    /// Position within the enclosing body.
    pub index: usize,
    /// Synthesized by the parser (e.g. the `true` body of `default` rules).
    pub generated: bool,
    pub negated: bool,
    pub terms: ExprTerms,
    pub with: Vec<With>,
    pub location: Option<Location>,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.negated == other.negated && self.terms == other.terms && self.with == other.with
    }
}

impl Eq for Expr {}

impl Expr {
    pub fn new(terms: ExprTerms) -> Self {
        Expr {
            index: 0,
            generated: false,
            negated: false,
            terms,
            with: Vec::new(),
            location: None,
        }
    }

    pub fn from_term(term: Term) -> Self {
        Expr::new(ExprTerms::Term(Box::new(term)))
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The operator of a call expression (`eq`, `assign`, `plus`, ...).
    pub fn operator(&self) -> Option<&Term> {
        match &self.terms {
            ExprTerms::Call(terms) => terms.first(),
            _ => None,
        }
    }

    /// The single term of a term expression.
    pub fn term(&self) -> Option<&Term> {
        match &self.terms {
            ExprTerms::Term(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        match &self.terms {
            ExprTerms::Term(t) => write!(f, "{t}")?,
            ExprTerms::Call(terms) => write!(f, "{}", Value::Call(terms.clone()))?,
            ExprTerms::Some(decl) => write!(f, "{decl}")?,
            ExprTerms::Every(every) => write!(f, "{every}")?,
        }
        for w in &self.with {
            write!(f, " {w}")?;
        }
        Ok(())
    }
}

/// What an expression consists of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprTerms {
    /// A bare term (`x`, `input.allowed`, `[1, 2]`).
    Term(Box<Term>),
    /// A top-level call, operator first (`x = 1` is `[eq, x, 1]`).
    Call(Vec<Term>),
    /// `some x, y` or `some k, v in xs`.
    Some(SomeDecl),
    /// `every k, v in xs { ... }`.
    Every(Box<Every>),
}

/// A `some` declaration.
///
/// Symbols are plain vars, or a single membership call for `some x in xs`.
#[derive(Clone, Debug)]
pub struct SomeDecl {
    pub symbols: Vec<Term>,
    pub location: Option<Location>,
}

impl PartialEq for SomeDecl {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for SomeDecl {}

impl fmt::Display for SomeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("some ")?;
        if let [symbol] = self.symbols.as_slice() {
            if let Some(call) = symbol.value.as_call() {
                if let Some((op, args)) = call.split_first() {
                    let name = op.to_string();
                    if name == MEMBER || name == MEMBER_WITH_KEY {
                        if let Some((domain, lhs)) = args.split_last() {
                            write_list(f, lhs)?;
                            return write!(f, " in {domain}");
                        }
                    }
                }
            }
        }
        write_list(f, &self.symbols)
    }
}

/// `every key, value in domain { body }`.
#[derive(Clone, Debug)]
pub struct Every {
    pub key: Option<Term>,
    pub value: Term,
    pub domain: Term,
    pub body: Body,
    pub location: Option<Location>,
}

impl PartialEq for Every {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.domain == other.domain
            && self.body == other.body
    }
}

impl Eq for Every {}

impl fmt::Display for Every {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("every ")?;
        if let Some(key) = &self.key {
            write!(f, "{key}, ")?;
        }
        write!(f, "{} in {} {{ {} }}", self.value, self.domain, self.body)
    }
}

/// `with target as value`.
#[derive(Clone, Debug)]
pub struct With {
    pub target: Term,
    pub value: Term,
    pub location: Option<Location>,
}

impl PartialEq for With {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.value == other.value
    }
}

impl Eq for With {}

impl fmt::Display for With {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "with {} as {}", self.target, self.value)
    }
}
