//! Tree traversal.
//!
//! Two traits are provided: [`Visitor`] for read-only walks and
//! [`VisitorMut`] for in-place rewrites. Default methods call the matching
//! `walk_*` function, which recurses into children; override a `visit_*`
//! method to act on a node and call `walk_*` to keep descending.

use crate::{Body, Expr, ExprTerms, Location, Term, Value};

/// Read-only traversal.
pub trait Visitor<'ast> {
    fn visit_term(&mut self, term: &'ast Term) {
        walk_term(self, term);
    }

    fn visit_value(&mut self, value: &'ast Value) {
        walk_value(self, value);
    }

    fn visit_body(&mut self, body: &'ast Body) {
        walk_body(self, body);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_term<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, term: &'ast Term) {
    visitor.visit_value(&term.value);
}

pub fn walk_value<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, value: &'ast Value) {
    match value {
        Value::Ref(r) => {
            for t in r.iter() {
                visitor.visit_term(t);
            }
        }
        Value::Array(terms) | Value::Set(terms) | Value::Call(terms) => {
            for t in terms {
                visitor.visit_term(t);
            }
        }
        Value::Object(pairs) => {
            for (k, v) in pairs {
                visitor.visit_term(k);
                visitor.visit_term(v);
            }
        }
        Value::ArrayComprehension(c) => {
            visitor.visit_term(&c.term);
            visitor.visit_body(&c.body);
        }
        Value::ObjectComprehension(c) => {
            visitor.visit_term(&c.key);
            visitor.visit_term(&c.value);
            visitor.visit_body(&c.body);
        }
        Value::SetComprehension(c) => {
            visitor.visit_term(&c.term);
            visitor.visit_body(&c.body);
        }
        Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) | Value::Var(_) => {}
    }
}

pub fn walk_body<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, body: &'ast Body) {
    for expr in body.iter() {
        visitor.visit_expr(expr);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.terms {
        ExprTerms::Term(t) => visitor.visit_term(t),
        ExprTerms::Call(terms) => {
            for t in terms {
                visitor.visit_term(t);
            }
        }
        ExprTerms::Some(decl) => {
            for t in &decl.symbols {
                visitor.visit_term(t);
            }
        }
        ExprTerms::Every(every) => {
            if let Some(k) = &every.key {
                visitor.visit_term(k);
            }
            visitor.visit_term(&every.value);
            visitor.visit_term(&every.domain);
            visitor.visit_body(&every.body);
        }
    }
    for w in &expr.with {
        visitor.visit_term(&w.target);
        visitor.visit_term(&w.value);
    }
}

/// In-place traversal.
pub trait VisitorMut {
    fn visit_term_mut(&mut self, term: &mut Term) {
        walk_term_mut(self, term);
    }

    fn visit_body_mut(&mut self, body: &mut Body) {
        walk_body_mut(self, body);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }
}

pub fn walk_term_mut<V: VisitorMut + ?Sized>(visitor: &mut V, term: &mut Term) {
    match &mut term.value {
        Value::Ref(r) => {
            for t in r.iter_mut() {
                visitor.visit_term_mut(t);
            }
        }
        Value::Array(terms) | Value::Set(terms) | Value::Call(terms) => {
            for t in terms {
                visitor.visit_term_mut(t);
            }
        }
        Value::Object(pairs) => {
            for (k, v) in pairs {
                visitor.visit_term_mut(k);
                visitor.visit_term_mut(v);
            }
        }
        Value::ArrayComprehension(c) => {
            visitor.visit_term_mut(&mut c.term);
            visitor.visit_body_mut(&mut c.body);
        }
        Value::ObjectComprehension(c) => {
            visitor.visit_term_mut(&mut c.key);
            visitor.visit_term_mut(&mut c.value);
            visitor.visit_body_mut(&mut c.body);
        }
        Value::SetComprehension(c) => {
            visitor.visit_term_mut(&mut c.term);
            visitor.visit_body_mut(&mut c.body);
        }
        Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) | Value::Var(_) => {}
    }
}

pub fn walk_body_mut<V: VisitorMut + ?Sized>(visitor: &mut V, body: &mut Body) {
    for expr in &mut body.0 {
        visitor.visit_expr_mut(expr);
    }
}

pub fn walk_expr_mut<V: VisitorMut + ?Sized>(visitor: &mut V, expr: &mut Expr) {
    match &mut expr.terms {
        ExprTerms::Term(t) => visitor.visit_term_mut(t),
        ExprTerms::Call(terms) => {
            for t in terms {
                visitor.visit_term_mut(t);
            }
        }
        ExprTerms::Some(decl) => {
            for t in &mut decl.symbols {
                visitor.visit_term_mut(t);
            }
        }
        ExprTerms::Every(every) => {
            if let Some(k) = &mut every.key {
                visitor.visit_term_mut(k);
            }
            visitor.visit_term_mut(&mut every.value);
            visitor.visit_term_mut(&mut every.domain);
            visitor.visit_body_mut(&mut every.body);
        }
    }
    for w in &mut expr.with {
        visitor.visit_term_mut(&mut w.target);
        visitor.visit_term_mut(&mut w.value);
    }
}

/// Stamps one location onto every node it visits.
pub(crate) struct LocationSetter<'l> {
    loc: &'l Location,
}

impl<'l> LocationSetter<'l> {
    pub(crate) fn new(loc: &'l Location) -> Self {
        LocationSetter { loc }
    }
}

impl VisitorMut for LocationSetter<'_> {
    fn visit_term_mut(&mut self, term: &mut Term) {
        term.location = Some(self.loc.clone());
        walk_term_mut(self, term);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        expr.location = Some(self.loc.clone());
        for w in &mut expr.with {
            w.location = Some(self.loc.clone());
        }
        match &mut expr.terms {
            ExprTerms::Some(decl) => decl.location = Some(self.loc.clone()),
            ExprTerms::Every(every) => every.location = Some(self.loc.clone()),
            ExprTerms::Term(_) | ExprTerms::Call(_) => {}
        }
        walk_expr_mut(self, expr);
    }
}
