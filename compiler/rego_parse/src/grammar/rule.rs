//! Rules.
//!
//! ```text
//! rule     = [ "default" ] head [ body ] { else } { "{" query "}" }
//! head     = ref [ "(" args ")" ] [ ( "contains" key ) | ( ( ":=" | "=" ) value ) ]
//! body     = "if" literal | [ "if" ] "{" query "}"
//! else     = "else" [ ( ":=" | "=" ) value ] [ body ]
//! ```
//!
//! Several `{ ... }` bodies after one head (`p { a } { b }`) define one
//! rule per body, all sharing the head.

use rego_ir::visitor::{walk_value, Visitor};
use rego_ir::{Body, Expr, ExprTerms, Head, Location, Ref, Rule, RuleKeyword, Term, Value, Var};
use rego_lexer::Token;

use crate::Parser;

impl Parser {
    pub(crate) fn parse_rules(&mut self) -> Option<Vec<Rule>> {
        let mut loc = self.loc();

        self.scan_ahead_ref();

        let mut default = false;
        if self.s.tok == Token::Default {
            self.scan();
            default = true;
            self.scan_ahead_ref();
        }

        if self.s.tok != Token::Ident {
            return None;
        }

        let (mut head, uses_contains) = self.parse_head(default)?;
        if uses_contains {
            head.keywords.push(RuleKeyword::Contains);
        }

        if default {
            return self.finish_default_rule(head, loc).map(|rule| vec![rule]);
        }

        let has_if = self.s.tok == Token::If;
        let ref_len = head.reference.len();

        if has_if && !uses_contains && ref_len == 2 {
            // `p[x] if ...` and `a.b if ...` keep their full ref.
            if head.value.is_none() {
                head.generated_value = true;
                head.value = Some(Term::boolean(true).with_location(loc.clone()));
            } else {
                head.name = Some(head.reference[0].value.as_var()?.clone());
            }
        }

        if !has_if && !uses_contains && head.args.is_empty() && ref_len == 2 {
            // Legacy `p[x] { ... }` / `p.q = v { ... }`: the last segment is
            // the key.
            head.name = Some(head.reference[0].value.as_var()?.clone());
            head.key = Some(head.reference[1].clone());
            if head.value.is_none() {
                head.reference.truncate(1);
            }
        }

        let mut rule = Rule::new(head, Body::new());
        rule.location = Some(loc.clone());

        if has_if {
            rule.head.keywords.push(RuleKeyword::If);
            self.scan();

            // `if expr`, unless the expression is a set literal, which is
            // read as a braced body instead.
            let s = self.save();
            let single = self.parse_literal().filter(|expr| {
                !matches!(&expr.terms, ExprTerms::Term(t) if matches!(t.value, Value::Set(_)))
            });
            match single {
                Some(expr) => rule.body.push(expr),
                None => {
                    self.restore(&s);
                    self.scan();
                    rule.body = self.parse_body(Token::RBrace)?;
                    self.scan();
                }
            }
        } else if self.s.tok == Token::LBrace {
            self.scan();
            rule.body = self.parse_body(Token::RBrace)?;
            self.scan();
        } else if uses_contains {
            rule.body = generated_true_body(&loc);
            rule.generated_body = true;
            rule.location = rule.head.location.clone();
            return Some(vec![rule]);
        } else {
            return None;
        }

        if self.s.tok == Token::Else && !self.scan_ahead_ref() {
            let reference = &rule.head.reference;
            if reference.len() > 1 && !reference.is_ground() {
                self.error(
                    self.loc(),
                    "else keyword cannot be used on rules with variables in head",
                );
                return None;
            }
            if rule.head.key.is_some() {
                self.error(self.loc(), "else keyword cannot be used on multi-value rules");
                return None;
            }
            rule.else_rule = Some(Box::new(self.parse_else(&rule.head)?));
        }

        loc.text = self.text(loc.offset, self.s.last_end);
        rule.location = Some(loc);

        let mut rules = vec![rule];

        while self.s.tok == Token::LBrace {
            if rules[0].else_rule.is_some() {
                self.error(self.loc(), "expected else keyword");
                return None;
            }

            let mut loc = self.loc();
            self.scan();
            let body = self.parse_body(Token::RBrace)?;
            self.scan();
            loc.text = self.text(loc.offset, self.s.last_end);

            let mut head = rules[0].head.clone();
            self.regenerate_wildcard_args(&mut head);
            head.set_location_recursive(&loc);

            let mut next = Rule::new(head, body);
            next.location = Some(loc);
            rules.push(next);
        }

        Some(rules)
    }

    fn finish_default_rule(&mut self, head: Head, mut loc: Location) -> Option<Rule> {
        loc.text = self.text(loc.offset, self.s.last_end);

        let mut rule = Rule::new(head, Body::new());
        rule.default = true;
        rule.location = Some(loc.clone());

        if !self.validate_default_value(&rule, &loc) {
            return None;
        }
        if !rule.head.args.is_empty() && !self.validate_default_args(&rule, &loc) {
            return None;
        }

        rule.body = generated_true_body(&loc);
        rule.generated_body = true;
        Some(rule)
    }

    fn validate_default_value(&mut self, rule: &Rule, loc: &Location) -> bool {
        let Some(value) = &rule.head.value else {
            self.error(loc.clone(), "illegal default rule (must have a value)");
            return false;
        };

        let mut finder = NonConstant::default();
        finder.visit_term(value);
        for kind in &finder.found {
            self.error(
                loc.clone(),
                format!("illegal default rule (value cannot contain {kind})"),
            );
        }
        finder.found.is_empty()
    }

    fn validate_default_args(&mut self, rule: &Rule, loc: &Location) -> bool {
        let mut valid = true;
        let mut seen: Vec<&Var> = Vec::new();

        for arg in &rule.head.args {
            match &arg.value {
                Value::Var(v) if v.is_wildcard() => {}
                Value::Var(v) => {
                    if seen.contains(&v) {
                        valid = false;
                        self.error(
                            loc.clone(),
                            format!("illegal default rule (arguments cannot be repeated {v})"),
                        );
                    } else {
                        seen.push(v);
                    }
                }
                other => {
                    valid = false;
                    self.error(
                        loc.clone(),
                        format!(
                            "illegal default rule (arguments cannot contain {})",
                            other.type_name()
                        ),
                    );
                }
            }
        }

        valid
    }

    /// `else [= value] [if] [body]`, recursively.
    fn parse_else(&mut self, head: &Head) -> Option<Rule> {
        let start = self.loc();

        let mut else_head = head.clone();
        else_head.generated_value = false;
        else_head.keywords.clear();
        self.regenerate_wildcard_args(&mut else_head);
        else_head.location = Some(start.clone());

        let mut rule = Rule::new(else_head, Body::new());

        self.scan();

        match self.s.tok {
            Token::LBrace | Token::If => {
                rule.head.generated_value = true;
                rule.head.value = Some(Term::boolean(true).with_location(start.clone()));
            }
            Token::Assign | Token::Unify => {
                rule.head.assign = self.s.tok == Token::Assign;
                self.scan();
                rule.head.value = Some(self.parse_term_infix_call()?);
                let text = self.text(start.offset, self.s.last_end);
                if let Some(loc) = rule.head.location.as_mut() {
                    loc.text = text;
                }
            }
            _ => {
                self.illegal("expected else value term or rule body");
                return None;
            }
        }

        let has_if = self.s.tok == Token::If;
        let has_lbrace = self.s.tok == Token::LBrace;

        // Bodies positioned at the whole `else` clause once its extent is
        // known.
        let mut relocate_body = false;

        if !has_if && !has_lbrace {
            rule.body = generated_true_body(&start);
            rule.generated_body = true;
            relocate_body = true;
        } else {
            if has_if {
                rule.head.keywords.push(RuleKeyword::If);
                self.scan();
            }

            if self.s.tok == Token::LBrace {
                self.scan();
                rule.body = self.parse_body(Token::RBrace)?;
                self.scan();
            } else if self.s.tok != Token::Eof {
                let expr = self.parse_literal()?;
                rule.body.push(expr);
                relocate_body = true;
            } else {
                self.illegal("rule body expected");
                return None;
            }

            if self.s.tok == Token::Else {
                rule.else_rule = Some(Box::new(self.parse_else(head)?));
            }
        }

        let text = self.text(start.offset, self.s.last_end);
        let loc = start.with_text(text);
        if relocate_body {
            rule.body.set_location_recursive(&loc);
        }
        rule.location = Some(loc);
        Some(rule)
    }

    /// Returns the head and whether it was written with `contains`.
    fn parse_head(&mut self, default: bool) -> Option<(Head, bool)> {
        let mut loc = self.loc();
        let (mut head, uses_contains) = self.parse_head_parts(default, &loc)?;
        loc.text = self.text(loc.offset, self.s.last_end);
        head.location = Some(loc);
        Some((head, uses_contains))
    }

    fn parse_head_parts(&mut self, default: bool, loc: &Location) -> Option<(Head, bool)> {
        let var = self.parse_var();
        let Some(term) = self.parse_term_finish(var, true) else {
            self.illegal("expected rule head name");
            return None;
        };

        let mut head = match term.value {
            Value::Var(name) => Head::var_head(name, term.location),
            Value::Ref(reference) => Head::ref_head(reference),
            Value::Call(mut call) => {
                if call.is_empty() {
                    return None;
                }
                let op = call.remove(0);
                let reference = match op.value {
                    Value::Var(_) => Ref(vec![op]),
                    Value::Ref(reference) => {
                        if reference.head_var().is_none() {
                            self.illegal(format!("rule head ref {reference} invalid"));
                            return None;
                        }
                        reference
                    }
                    _ => return None,
                };
                let mut head = Head::ref_head(reference);
                head.args = call;
                head
            }
            _ => return None,
        };

        let name = head.reference.to_string();

        match self.s.tok {
            Token::Contains => {
                if !head.args.is_empty() {
                    self.illegal(format!(
                        "the contains keyword can only be used with multi-value rule definitions (e.g., {name} contains <VALUE> {{ ... }})"
                    ));
                }
                self.scan();
                head.key = self.parse_term_infix_call();
                if head.key.is_none() {
                    self.illegal(format!(
                        "expected rule key term (e.g., {name} contains <VALUE> {{ ... }})"
                    ));
                }
                return Some((head, true));
            }
            Token::Unify => {
                self.scan();
                head.value = self.parse_term_infix_call();
                if head.value.is_none() {
                    self.illegal(format!(
                        "expected rule value term (e.g., {name} = <VALUE> {{ ... }})"
                    ));
                }
            }
            Token::Assign => {
                self.scan();
                head.assign = true;
                head.value = self.parse_term_infix_call();
                if head.value.is_none() {
                    let msg = if !head.args.is_empty() {
                        format!("expected function value term (e.g., {name}(...) := <VALUE> {{ ... }})")
                    } else if head.key.is_some() {
                        format!("expected partial rule value term (e.g., {name}[...] := <VALUE> {{ ... }})")
                    } else if default {
                        format!("expected default rule value term (e.g., default {name} := <VALUE>)")
                    } else {
                        format!("expected rule value term (e.g., {name} := <VALUE> {{ ... }})")
                    };
                    self.illegal(msg);
                }
            }
            _ => {}
        }

        if head.value.is_none()
            && head.key.is_none()
            && (head.reference.len() != 2 || !head.args.is_empty())
        {
            head.generated_value = true;
            head.value = Some(Term::boolean(true).with_location(loc.clone()));
        }

        Some((head, false))
    }

    /// Give every wildcard argument a fresh name, so that rules sharing a
    /// head do not share wildcards.
    fn regenerate_wildcard_args(&mut self, head: &mut Head) {
        for arg in &mut head.args {
            if matches!(&arg.value, Value::Var(v) if v.is_wildcard()) {
                arg.value = Value::Var(Var(self.gen_wildcard()));
            }
        }
    }
}

fn generated_true_body(loc: &Location) -> Body {
    let mut expr = Expr::from_term(Term::boolean(true).with_location(loc.clone()))
        .with_location(loc.clone());
    expr.generated = true;
    Body::single(expr)
}

/// Collects the kinds of non-constant values in a default rule's value.
/// Comprehensions are allowed.
#[derive(Default)]
struct NonConstant {
    found: Vec<&'static str>,
}

impl<'ast> Visitor<'ast> for NonConstant {
    fn visit_value(&mut self, value: &'ast Value) {
        match value {
            Value::ArrayComprehension(_)
            | Value::ObjectComprehension(_)
            | Value::SetComprehension(_) => {}
            Value::Ref(_) | Value::Var(_) | Value::Call(_) => self.found.push(value.type_name()),
            _ => walk_value(self, value),
        }
    }
}
