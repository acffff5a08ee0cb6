//! Queries and their literals.
//!
//! A query is a sequence of literals separated by `;` or newlines. A
//! literal is an expression, optionally negated with `not`, optionally
//! followed by `with` modifiers; or a `some` declaration; or an `every`
//! quantifier.

use rego_ir::{Body, Every, Expr, ExprTerms, SomeDecl, Term, Value, With, MEMBER, MEMBER_WITH_KEY};
use rego_lexer::Token;

use crate::Parser;

const EVERY_HINT: &str = "`import future.keywords.every` for `every x in xs { ... }` expressions";
const SOME_IN_HINT: &str = "`import future.keywords.in` for `some x in xs` expressions";
const EVERY_SHAPE: &str = "expected `x[, y] in xs { ... }` expression";

impl Parser {
    /// A braced body, up to (not past) `end`.
    pub(crate) fn parse_body(&mut self, end: Token) -> Option<Body> {
        self.nested(|p| p.parse_query(false, end))
    }

    /// Literals up to `end`.
    ///
    /// With `require_semi`, only `;` continues the query: a top-level query
    /// statement ends at the first newline.
    pub(crate) fn parse_query(&mut self, require_semi: bool, end: Token) -> Option<Body> {
        if self.s.tok == end {
            self.error(self.loc(), "found empty body");
            return None;
        }

        let mut body = Body::new();
        loop {
            let expr = self.parse_literal()?;
            body.push(expr);

            if self.s.tok == Token::Semicolon {
                self.scan();
                continue;
            }

            if self.s.tok == end || require_semi {
                return Some(body);
            }

            if !self.s.skipped_nl {
                // Keep the more specific error if there already is one.
                if self.errors.is_empty() {
                    self.illegal(format!("expected \\n or {} or {end}", Token::Semicolon));
                }
                return None;
            }
        }
    }

    pub(crate) fn parse_literal(&mut self) -> Option<Expr> {
        let offset = self.s.loc.offset;
        let loc = self.loc();

        let mut expr = self.parse_literal_kind()?;

        let text = self.text(offset, self.s.last_end);
        expr.location = Some(loc.with_text(text));
        Some(expr)
    }

    fn parse_literal_kind(&mut self) -> Option<Expr> {
        if self.scan_ahead_ref() {
            return self.parse_literal_expr(false);
        }

        let mut negated = false;
        if self.s.tok == Token::Not && !matches!(self.peek_ws(), Token::Dot | Token::LBrack) {
            self.scan();
            negated = true;
        }

        match self.s.tok {
            Token::Some => {
                if negated {
                    self.illegal("illegal negation of 'some'");
                    return None;
                }
                self.parse_some()
            }
            Token::Every => {
                if negated {
                    self.illegal("illegal negation of 'every'");
                    return None;
                }
                self.parse_every()
            }
            _ => self.parse_literal_expr(negated),
        }
    }

    fn parse_literal_expr(&mut self, negated: bool) -> Option<Expr> {
        let s = self.save();

        let mut expr = self.parse_expr()?;
        expr.negated = negated;
        if self.s.tok == Token::With {
            expr.with = self.parse_with()?;
        }

        // `every` read as a variable: would it have parsed as the keyword?
        if matches!(&expr.terms, ExprTerms::Term(t) if t.value.is_var_named("every")) {
            let looks_like_every = self.probe(&s, |p| {
                p.with_all_future_keywords_reserved(|p| p.parse_every())
                    .is_some_and(|e| matches!(e.terms, ExprTerms::Every(_)))
            });
            if looks_like_every {
                self.hint(EVERY_HINT);
            }
        }

        Some(expr)
    }

    fn parse_with(&mut self) -> Option<Vec<With>> {
        let mut withs = Vec::new();

        loop {
            let mut loc = self.loc();
            self.scan();

            if self.s.tok != Token::Ident {
                self.illegal("expected ident");
                return None;
            }

            let target = self.parse_term()?;
            if !matches!(target.value, Value::Ref(_) | Value::Var(_)) {
                self.illegal("expected with target path");
            }

            if self.s.tok != Token::As {
                self.illegal("expected as keyword");
                return None;
            }

            self.scan();
            let value = self.parse_term_infix_call()?;

            loc.text = self.text(loc.offset, self.s.last_end);
            withs.push(With {
                target,
                value,
                location: Some(loc),
            });

            if self.s.tok != Token::With {
                return Some(withs);
            }
        }
    }

    fn parse_some(&mut self) -> Option<Expr> {
        let loc = self.loc();

        // `some x in xs` / `some k, v in xs`
        let s = self.save();
        self.scan();
        if let Some(term) = self.parse_term_infix_call() {
            let call = match &term.value {
                Value::Call(call) => Some((
                    call.first().map(ToString::to_string).unwrap_or_default(),
                    call.len(),
                )),
                _ => None,
            };
            if let Some((op, arity)) = call {
                let domain_ok = match op.as_str() {
                    MEMBER => arity == 3,
                    MEMBER_WITH_KEY => arity == 4,
                    _ => {
                        self.illegal("expected `x in xs` or `x, y in xs` expression");
                        return None;
                    }
                };
                if !domain_ok {
                    self.illegal("illegal domain");
                    return None;
                }

                let decl = SomeDecl {
                    symbols: vec![term],
                    location: Some(loc.clone()),
                };
                let mut expr = Expr::new(ExprTerms::Some(decl)).with_location(loc);
                if self.s.tok == Token::With {
                    expr.with = self.parse_with()?;
                }
                return Some(expr);
            }
        }

        // `some x, y`: but first, would `some x in xs` have parsed had `in`
        // been imported?
        self.restore(&s);
        self.scan();
        let looks_like_some_in = self
            .with_all_future_keywords_reserved(|p| p.parse_term_infix_call())
            .is_some_and(|t| is_member_call(&t));
        self.restore(&s);
        if looks_like_some_in {
            self.hint(SOME_IN_HINT);
        }

        let mut symbols = Vec::new();
        loop {
            self.scan();
            if self.s.tok != Token::Ident {
                self.illegal("expected var");
                return None;
            }
            symbols.push(self.parse_var());
            self.scan();
            if self.s.tok != Token::Comma {
                break;
            }
        }

        let decl = SomeDecl {
            symbols,
            location: Some(loc.clone()),
        };
        Some(Expr::new(ExprTerms::Some(decl)).with_location(loc))
    }

    fn parse_every(&mut self) -> Option<Expr> {
        let loc = self.loc();
        self.scan();

        let term = self.parse_term_infix_call()?;
        let Value::Call(call) = term.value else {
            self.illegal(EVERY_SHAPE);
            return None;
        };

        let op = call.first().map(ToString::to_string).unwrap_or_default();
        let arity = call.len();
        let mut args = call.into_iter().skip(1);

        let (key, value, domain) = match op.as_str() {
            MEMBER => {
                if arity != 3 {
                    self.illegal("illegal domain");
                    return None;
                }
                (None, args.next()?, args.next()?)
            }
            MEMBER_WITH_KEY => {
                if arity != 4 {
                    self.illegal("illegal domain");
                    return None;
                }
                let key = args.next()?;
                if !matches!(key.value, Value::Var(_)) {
                    self.illegal("expected key to be a variable");
                    return None;
                }
                (Some(key), args.next()?, args.next()?)
            }
            _ => {
                self.illegal(EVERY_SHAPE);
                return None;
            }
        };

        if !matches!(value.value, Value::Var(_)) {
            self.illegal("expected value to be a variable");
            return None;
        }

        if self.s.tok != Token::LBrace {
            self.illegal("missing body");
            return None;
        }
        self.scan();
        let body = self.parse_body(Token::RBrace)?;
        self.scan();

        let every = Every {
            key,
            value,
            domain,
            body,
            location: Some(loc.clone()),
        };
        let mut expr = Expr::new(ExprTerms::Every(Box::new(every))).with_location(loc);
        if self.s.tok == Token::With {
            expr.with = self.parse_with()?;
        }
        Some(expr)
    }

    /// An expression: a term, a call, or `lhs := rhs` / `lhs = rhs`.
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        let lhs = self.parse_term_infix_call()?;

        if let Some(op) = self.parse_term_op(&[Token::Assign, Token::Unify]) {
            let rhs = self.parse_term_infix_call()?;
            return Some(Expr::new(ExprTerms::Call(vec![op, lhs, rhs])));
        }

        match lhs.value {
            Value::Call(terms) => Some(Expr::new(ExprTerms::Call(terms))),
            value => Some(Expr::from_term(Term {
                value,
                location: lhs.location,
            })),
        }
    }
}

fn is_member_call(term: &Term) -> bool {
    match &term.value {
        Value::Call(call) => call
            .first()
            .is_some_and(|op| matches!(op.to_string().as_str(), MEMBER | MEMBER_WITH_KEY)),
        _ => false,
    }
}
