//! Primary terms: scalars, variables, refs, calls and collections.
//!
//! # Refs and calls
//!
//! A primary term may be followed, with no whitespace in between, by `.x`,
//! `[expr]` or `(args)`. Those continuations turn it into a ref or a call:
//! `a.b[c](d).e` is a ref whose head is the call `a.b[c](d)`. Whitespace
//! ends the chain, so `f (x)` is not a call.
//!
//! # Collections
//!
//! `{` opens a set, an object, or a set/object comprehension, and `[` an
//! array or an array comprehension. The first element decides: it is read
//! as a primary term, and only if the following token does not settle the
//! matter is the element re-read as a full expression. The term cache makes
//! the second read cheap.

use rego_ir::{
    ArrayComprehension, ObjectComprehension, SetComprehension, Term, Value, ROOT_DOCUMENT_NAMES,
    WILDCARD,
};
use rego_lexer::Token;
use tracing::trace;

use crate::cache::CacheEntry;
use crate::snapshot::Snapshot;
use crate::Parser;

/// Numbers whose binary exponent exceeds this are rejected.
const MAX_BINARY_EXPONENT: i64 = 100_000;

impl Parser {
    /// Parse a primary term and its ref/call continuations.
    pub(crate) fn parse_term(&mut self) -> Option<Term> {
        self.nested(Self::parse_term_cached)
    }

    fn parse_term_cached(&mut self) -> Option<Term> {
        let offset = self.s.loc.offset;
        if let Some(entry) = self.cache.lookup(offset) {
            trace!(offset, "term cache hit");
            self.errors.extend(entry.errors.iter().cloned());
            self.comments.extend(entry.comments.iter().cloned());
            self.s = entry.post.clone();
            return entry.term.clone();
        }

        let s0 = self.save();
        let term = match self.s.tok {
            Token::Null => Some(Term::null().with_location(self.loc())),
            Token::True => Some(Term::boolean(true).with_location(self.loc())),
            Token::False => Some(Term::boolean(false).with_location(self.loc())),
            Token::Sub | Token::Dot | Token::Number => self.parse_number(),
            Token::String => self.parse_string(),
            Token::Ident | Token::Contains => Some(self.parse_var()),
            Token::LBrack => self.parse_array(),
            Token::LBrace => self.parse_set_or_object(),
            Token::LParen => self.parse_parenthesized(),
            _ => {
                self.illegal_token();
                None
            }
        };

        let term = match term {
            Some(head) => self.parse_term_finish(head, false),
            None => None,
        };
        self.remember(&s0, term.clone());
        term
    }

    /// Cache what parsing from `s0` up to here produced.
    fn remember(&mut self, s0: &Snapshot, term: Option<Term>) {
        let entry = CacheEntry {
            offset: s0.offset(),
            term,
            post: self.s.clone(),
            errors: self.errors.get(s0.errors_len..).unwrap_or_default().to_vec(),
            comments: self
                .comments
                .get(s0.comments_len..)
                .unwrap_or_default()
                .to_vec(),
        };
        self.cache.push(entry);
    }

    fn parse_parenthesized(&mut self) -> Option<Term> {
        let offset = self.s.loc.offset;
        self.scan();
        let mut term = self.parse_term_infix_call()?;
        if self.s.tok != Token::RParen {
            self.error(self.loc(), "non-terminated expression");
            return None;
        }
        let text = self.text(offset, self.s.tok_end);
        if let Some(loc) = term.location.as_mut() {
            loc.text = text;
        }
        Some(term)
    }

    /// Continue `head` into a ref or call if `.`, `[` or `(` follows.
    ///
    /// `skip_ws` lets the token after a plain term be read past whitespace;
    /// rule heads use it. A bare `data` or `input` becomes a one-segment ref.
    pub(crate) fn parse_term_finish(&mut self, head: Term, skip_ws: bool) -> Option<Term> {
        let offset = self.s.loc.offset;
        self.do_scan(skip_ws);

        match self.s.tok {
            Token::LParen | Token::Dot | Token::LBrack => self.parse_ref(head, offset),
            tok => {
                if tok == Token::Whitespace {
                    self.scan();
                }
                if matches!(&head.value, Value::Var(v) if ROOT_DOCUMENT_NAMES.contains(&v.as_str()))
                {
                    let loc = head.location.clone();
                    let mut term = Term::reference(vec![head]);
                    term.location = loc;
                    return Some(term);
                }
                Some(head)
            }
        }
    }

    fn parse_number(&mut self) -> Option<Term> {
        let loc = self.loc();
        let mut prefix = String::new();

        if self.s.tok == Token::Sub {
            prefix.push('-');
            self.scan();
            if !matches!(self.s.tok, Token::Number | Token::Dot) {
                self.illegal("expected number");
                return None;
            }
        }

        if self.s.tok == Token::Dot {
            prefix.push('.');
            self.scan();
            if self.s.tok != Token::Number {
                self.illegal("expected number");
                return None;
            }
        }

        let lit = self.s.lit();
        let bytes = lit.as_bytes();
        if !prefix.ends_with('.') && bytes.len() > 1 && bytes[0] == b'0' {
            let decimal = bytes[1] == b'.';
            let scientific = bytes.len() > 2 && matches!(bytes[1], b'e' | b'E');
            if !decimal && !scientific {
                self.illegal("expected number without leading zero");
                return None;
            }
        }

        let text = prefix + lit;
        match binary_exponent(&text) {
            None => {
                self.illegal("invalid float");
                None
            }
            Some(exp) if exp.abs() > MAX_BINARY_EXPONENT => {
                self.error(self.loc(), "number too big");
                None
            }
            Some(_) => Some(Term::number(text).with_location(loc)),
        }
    }

    fn parse_string(&mut self) -> Option<Term> {
        let lit = self.s.lit();

        if let Some(raw) = lit.strip_prefix('`') {
            let raw = raw.strip_suffix('`')?;
            return Some(Term::string(raw).with_location(self.loc()));
        }

        if lit == "\"\"" {
            return Some(Term::string("").with_location(self.loc()));
        }

        match serde_json::from_str::<String>(lit) {
            Ok(s) => Some(Term::string(s).with_location(self.loc())),
            Err(_) => {
                let msg = format!("illegal string literal: {lit}");
                self.error(self.loc(), msg);
                None
            }
        }
    }

    /// The current token as a variable; `_` becomes a fresh wildcard.
    pub(crate) fn parse_var(&mut self) -> Term {
        let lit = self.s.lit().to_string();
        let name = if lit == WILDCARD {
            self.gen_wildcard()
        } else {
            lit
        };
        Term::var(name).with_location(self.loc())
    }

    fn parse_call(&mut self, operator: Term, offset: usize) -> Option<Term> {
        self.nested(move |p| {
            let loc = operator.location_or_default();
            // Step over `(`.
            p.scan();

            if p.s.tok == Token::RParen {
                let end = p.s.tok_end;
                p.scan_ws();
                let term = if is_set_constructor(&operator) {
                    Term::set(Vec::new())
                } else {
                    Term::call(vec![operator])
                };
                return Some(p.set_loc(term, &loc, offset, end));
            }

            let terms = p.parse_term_list(Token::RParen, vec![operator])?;
            let end = p.s.tok_end;
            p.scan_ws();
            Some(p.set_loc(Term::call(terms), &loc, offset, end))
        })
    }

    fn parse_ref(&mut self, head: Term, offset: usize) -> Option<Term> {
        self.nested(move |p| p.parse_ref_segments(head, offset))
    }

    fn parse_ref_segments(&mut self, head: Term, offset: usize) -> Option<Term> {
        let loc = head.location_or_default();

        match &head.value {
            Value::Var(_)
            | Value::Array(_)
            | Value::Object(_)
            | Value::Set(_)
            | Value::ArrayComprehension(_)
            | Value::ObjectComprehension(_)
            | Value::SetComprehension(_)
            | Value::Call(_) => {}
            other => {
                let msg = format!("illegal ref (head cannot be {})", other.type_name());
                self.error(loc.clone(), msg);
            }
        }

        let mut path = vec![head];

        loop {
            match self.s.tok {
                Token::Dot => {
                    self.scan_ws();
                    if self.s.tok != Token::Ident && !self.is_allowed_ref_keyword(self.s.tok) {
                        self.illegal(format!("expected {}", Token::Ident));
                        return None;
                    }
                    path.push(Term::string(self.s.lit()).with_location(self.loc()));
                    self.scan_ws();
                }
                Token::LParen => {
                    let operator =
                        self.set_loc(Term::reference(path), &loc, offset, self.s.loc.offset);
                    let call = self.parse_call(operator, offset)?;
                    return match self.s.tok {
                        Token::Whitespace => {
                            self.scan();
                            Some(call)
                        }
                        Token::Dot | Token::LBrack => self.parse_ref(call, offset),
                        _ => Some(call),
                    };
                }
                Token::LBrack => {
                    self.scan();
                    let term = self.parse_term_infix_call()?;
                    if self.s.tok != Token::RBrack {
                        self.illegal(format!("expected {}", Token::RBrack));
                        return None;
                    }
                    path.push(term);
                    self.scan_ws();
                }
                Token::Whitespace => {
                    let end = self.s.last_end;
                    self.scan();
                    return Some(self.set_loc(Term::reference(path), &loc, offset, end));
                }
                _ => {
                    let end = self.s.last_end;
                    return Some(self.set_loc(Term::reference(path), &loc, offset, end));
                }
            }
        }
    }

    fn parse_array(&mut self) -> Option<Term> {
        self.nested(|p| {
            let loc = p.loc();
            let term = p.parse_array_elements()?;
            let end = p.s.tok_end;
            Some(p.set_loc(term, &loc, loc.offset, end))
        })
    }

    fn parse_array_elements(&mut self) -> Option<Term> {
        self.scan();
        if self.s.tok == Token::RBrack {
            return Some(Term::array(Vec::new()));
        }

        // `[, x | ...]` cannot be a comprehension.
        let mut potential_comprehension = true;
        if self.s.tok == Token::Comma {
            potential_comprehension = false;
            self.scan();
        }

        let s = self.save();
        let head = self.parse_term()?;

        match self.s.tok {
            Token::RBrack => return Some(Term::array(vec![head])),
            Token::Comma => {
                self.scan();
                return self
                    .parse_term_list(Token::RBrack, vec![head])
                    .map(Term::array);
            }
            Token::Or if potential_comprehension => {
                // Either `[x | body]` or `[x | y, z]`; the comprehension wins
                // unless its body stops at a comma.
                self.scan();
                if let Some(body) = self.parse_body(Token::RBrack) {
                    return Some(Term::new(Value::ArrayComprehension(Box::new(
                        ArrayComprehension { term: head, body },
                    ))));
                }
                if self.s.tok != Token::Comma {
                    return None;
                }
            }
            _ => {}
        }

        self.restore(&s);
        self.parse_term_list(Token::RBrack, Vec::new())
            .map(Term::array)
    }

    fn parse_set_or_object(&mut self) -> Option<Term> {
        self.nested(|p| {
            let loc = p.loc();
            let term = p.parse_set_or_object_elements()?;
            let end = p.s.tok_end;
            Some(p.set_loc(term, &loc, loc.offset, end))
        })
    }

    fn parse_set_or_object_elements(&mut self) -> Option<Term> {
        self.scan();
        if self.s.tok == Token::RBrace {
            return Some(Term::object(Vec::new()));
        }

        let mut potential_comprehension = true;
        if self.s.tok == Token::Comma {
            potential_comprehension = false;
            self.scan();
        }

        let s = self.save();
        let head = self.parse_term()?;

        match self.s.tok {
            Token::Or if potential_comprehension => {
                return self.parse_set(&s, head, potential_comprehension)
            }
            Token::RBrace | Token::Comma => {
                return self.parse_set(&s, head, potential_comprehension)
            }
            Token::Colon => return self.parse_object(head, potential_comprehension),
            _ => {}
        }

        // The first element is an expression: `{a + 1, ...}`, `{x == y: 1}`.
        self.restore(&s);
        let head = self.parse_term_infix_call_in_list()?;

        match self.s.tok {
            Token::RBrace | Token::Comma => self.parse_set(&s, head, false),
            Token::Colon => self.parse_object(head, potential_comprehension),
            _ => {
                self.illegal("non-terminated set");
                None
            }
        }
    }

    fn parse_set(&mut self, s: &Snapshot, head: Term, potential_comprehension: bool) -> Option<Term> {
        self.nested(move |p| match p.s.tok {
            Token::RBrace => Some(Term::set(vec![head])),
            Token::Comma => {
                p.scan();
                p.parse_term_list(Token::RBrace, vec![head]).map(Term::set)
            }
            Token::Or => {
                if potential_comprehension {
                    p.scan();
                    if let Some(body) = p.parse_body(Token::RBrace) {
                        return Some(Term::new(Value::SetComprehension(Box::new(
                            SetComprehension { term: head, body },
                        ))));
                    }
                    if p.s.tok != Token::Comma {
                        return None;
                    }
                }
                p.restore(s);
                p.parse_term_list(Token::RBrace, Vec::new()).map(Term::set)
            }
            _ => None,
        })
    }

    fn parse_object(&mut self, key: Term, potential_comprehension: bool) -> Option<Term> {
        self.nested(move |p| {
            // Step over `:`.
            p.scan();

            let s = p.save();
            let value = p.parse_term()?;

            let mut potential_relation = true;
            if potential_comprehension {
                match p.s.tok {
                    Token::RBrace | Token::Comma => {
                        potential_relation = false;
                        if let Some(term) = p.parse_object_finish(key.clone(), value, true) {
                            return Some(term);
                        }
                    }
                    Token::Or => {
                        if let Some(term) = p.parse_object_finish(key.clone(), value, true) {
                            return Some(term);
                        }
                    }
                    _ => {}
                }
            }

            p.restore(&s);

            if potential_relation {
                let value = p.parse_term_infix_call_in_list()?;
                if matches!(p.s.tok, Token::RBrace | Token::Comma) {
                    return p.parse_object_finish(key, value, false);
                }
            }

            p.illegal("non-terminated object");
            None
        })
    }

    fn parse_object_finish(
        &mut self,
        key: Term,
        value: Term,
        potential_comprehension: bool,
    ) -> Option<Term> {
        self.nested(move |p| match p.s.tok {
            Token::RBrace => Some(Term::object(vec![(key, value)])),
            Token::Or => {
                if !potential_comprehension {
                    p.illegal("non-terminated object");
                    return None;
                }
                p.scan();
                let body = p.parse_body(Token::RBrace)?;
                Some(Term::new(Value::ObjectComprehension(Box::new(
                    ObjectComprehension { key, value, body },
                ))))
            }
            Token::Comma => {
                p.scan();
                p.parse_term_pair_list(Token::RBrace, vec![(key, value)])
                    .map(Term::object)
            }
            _ => None,
        })
    }

    /// Comma-separated expressions up to `end`, which is left current. A
    /// trailing comma is accepted.
    fn parse_term_list(&mut self, end: Token, mut terms: Vec<Term>) -> Option<Vec<Term>> {
        if self.s.tok == end {
            return Some(terms);
        }
        loop {
            let term = self.parse_term_infix_call_in_list()?;
            terms.push(term);
            match self.s.tok {
                tok if tok == end => return Some(terms),
                Token::Comma => {
                    self.scan();
                    if self.s.tok == end {
                        return Some(terms);
                    }
                }
                _ => {
                    self.illegal(format!(
                        "expected {:?} or {:?}",
                        Token::Comma.as_str(),
                        end.as_str()
                    ));
                    return None;
                }
            }
        }
    }

    /// Comma-separated `key: value` pairs up to `end`.
    fn parse_term_pair_list(
        &mut self,
        end: Token,
        mut pairs: Vec<(Term, Term)>,
    ) -> Option<Vec<(Term, Term)>> {
        if self.s.tok == end {
            return Some(pairs);
        }
        loop {
            let key = self.parse_term_infix_call_in_list()?;
            if self.s.tok != Token::Colon {
                self.illegal(format!("expected {:?}", Token::Colon.as_str()));
                return None;
            }
            self.scan();
            let value = self.parse_term_infix_call_in_list()?;
            pairs.push((key, value));
            match self.s.tok {
                tok if tok == end => return Some(pairs),
                Token::Comma => {
                    self.scan();
                    if self.s.tok == end {
                        return Some(pairs);
                    }
                }
                _ => {
                    self.illegal(format!(
                        "expected {:?} or {:?}",
                        Token::Comma.as_str(),
                        end.as_str()
                    ));
                    return None;
                }
            }
        }
    }
}

/// `set()` denotes the empty set rather than a call.
fn is_set_constructor(operator: &Term) -> bool {
    match &operator.value {
        Value::Ref(r) => r.len() == 1 && r[0].value.is_var_named("set"),
        _ => false,
    }
}

/// Validate `text` as a decimal number and return its approximate binary
/// exponent (`0` for zero).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "the estimate only needs to be compared against a large bound"
)]
pub(crate) fn binary_exponent(text: &str) -> Option<i64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return None;
    }

    let exponent: i64 = match exponent {
        None => 0,
        Some(e) => {
            let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
            if digits.is_empty() || !all_digits(digits) {
                return None;
            }
            // Saturate exponents too long for an i64; they are out of range
            // either way.
            e.parse().unwrap_or(if e.starts_with('-') {
                i64::MIN / 2
            } else {
                i64::MAX / 2
            })
        }
    };

    // Position of the first significant digit relative to the point.
    let int_digits = int.trim_start_matches('0');
    let magnitude = if int_digits.is_empty() {
        let frac_digits = frac.trim_start_matches('0');
        if frac_digits.is_empty() {
            return Some(0);
        }
        -((frac.len() - frac_digits.len()) as i64)
    } else {
        int_digits.len() as i64
    };

    let decimal = magnitude.saturating_add(exponent);
    Some((decimal as f64 * std::f64::consts::LOG2_10) as i64)
}

#[cfg(test)]
mod tests;
