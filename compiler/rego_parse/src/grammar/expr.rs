//! Binary operators.
//!
//! Precedence, loosest first:
//!
//! | Tier     | Operators                      |
//! |----------|--------------------------------|
//! | in       | `in`, and `k, v in xs`         |
//! | relation | `==` `!=` `<` `>` `<=` `>=`    |
//! | or       | `\|`                           |
//! | and      | `&`                            |
//! | arith    | `+` `-`                        |
//! | factor   | `*` `/` `%`                    |
//!
//! Every tier is left-associative and builds call terms whose operator is
//! a one-segment ref named after the token (`plus`, `equal`, ...). `in`
//! builds calls to `internal.member_2` and `internal.member_3`. The
//! location of a binary call starts at its left operand and its text runs
//! to the end of its right operand.

use rego_ir::Term;
use rego_lexer::Token;

use crate::Parser;

const MEMBER_ROOT: &str = "internal";
const MEMBER_2: &str = "member_2";
const MEMBER_3: &str = "member_3";

/// Operator tiers below `in`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Tier {
    Relation,
    Or,
    And,
    Arith,
    Factor,
}

impl Tier {
    fn operators(self) -> &'static [Token] {
        match self {
            Tier::Relation => &[
                Token::Equal,
                Token::Neq,
                Token::Lt,
                Token::Gt,
                Token::Lte,
                Token::Gte,
            ],
            Tier::Or => &[Token::Or],
            Tier::And => &[Token::And],
            Tier::Arith => &[Token::Add, Token::Sub],
            Tier::Factor => &[Token::Mul, Token::Quo, Token::Rem],
        }
    }

    /// The next tighter tier; `None` means operands are primary terms.
    fn tighter(self) -> Option<Tier> {
        match self {
            Tier::Relation => Some(Tier::Or),
            Tier::Or => Some(Tier::And),
            Tier::And => Some(Tier::Arith),
            Tier::Arith => Some(Tier::Factor),
            Tier::Factor => None,
        }
    }
}

impl Parser {
    /// A full expression term, including `k, v in xs`.
    pub(crate) fn parse_term_infix_call(&mut self) -> Option<Term> {
        self.nested(|p| {
            let offset = p.s.loc.offset;
            p.parse_term_in(None, true, offset)
        })
    }

    /// A full expression term inside a comma-separated list, where a comma
    /// separates elements rather than introducing `k, v in xs`.
    pub(crate) fn parse_term_infix_call_in_list(&mut self) -> Option<Term> {
        self.nested(|p| {
            let offset = p.s.loc.offset;
            p.parse_term_in(None, false, offset)
        })
    }

    fn parse_term_in(&mut self, lhs: Option<Term>, key_val: bool, offset: usize) -> Option<Term> {
        self.nested(move |p| p.parse_term_in_tail(lhs, key_val, offset))
    }

    fn parse_term_in_tail(
        &mut self,
        lhs: Option<Term>,
        key_val: bool,
        offset: usize,
    ) -> Option<Term> {
        let lhs = match lhs {
            Some(lhs) => lhs,
            None => self.parse_binary(Tier::Relation, None, offset)?,
        };

        if key_val && self.s.tok == Token::Comma {
            let s = self.save();
            self.scan();
            if let Some(mhs) = self.parse_binary(Tier::Relation, None, offset) {
                if let Some(op) = self.parse_member_op(MEMBER_3) {
                    let rhs_offset = self.s.loc.offset;
                    if let Some(rhs) = self.parse_binary(Tier::Relation, None, rhs_offset) {
                        let call = self.located_call(vec![op, lhs, mhs, rhs], offset);
                        return if self.s.tok == Token::In {
                            self.parse_term_in(Some(call), key_val, offset)
                        } else {
                            Some(call)
                        };
                    }
                }
            }
            self.restore(&s);
        }

        self.scan_ahead_ref();

        if let Some(op) = self.parse_member_op(MEMBER_2) {
            let rhs_offset = self.s.loc.offset;
            if let Some(rhs) = self.parse_binary(Tier::Relation, None, rhs_offset) {
                let call = self.located_call(vec![op, lhs, rhs], offset);
                return if self.s.tok == Token::In {
                    self.parse_term_in(Some(call), key_val, offset)
                } else {
                    Some(call)
                };
            }
        }

        Some(lhs)
    }

    /// One operator tier. With `lhs` given, continues a chain
    /// (`a + b` `+ c`).
    fn parse_binary(&mut self, tier: Tier, lhs: Option<Term>, offset: usize) -> Option<Term> {
        self.nested(move |p| {
            let lhs = match lhs {
                Some(lhs) => lhs,
                None => p.parse_operand(tier, offset)?,
            };

            if let Some(op) = p.parse_term_op(tier.operators()) {
                let rhs_offset = p.s.loc.offset;
                if let Some(rhs) = p.parse_operand(tier, rhs_offset) {
                    let call = p.located_call(vec![op, lhs, rhs], offset);
                    return if tier.operators().contains(&p.s.tok) {
                        p.parse_binary(tier, Some(call), offset)
                    } else {
                        Some(call)
                    };
                }
            }

            Some(lhs)
        })
    }

    fn parse_operand(&mut self, tier: Tier, offset: usize) -> Option<Term> {
        match tier.tighter() {
            Some(next) => self.parse_binary(next, None, offset),
            None => self.parse_term(),
        }
    }

    /// A call term positioned at its first argument and spanning up to the
    /// last consumed token.
    fn located_call(&self, terms: Vec<Term>, offset: usize) -> Term {
        let loc = terms
            .get(1)
            .map(Term::location_or_default)
            .unwrap_or_default();
        let end = self.s.last_end;
        self.set_loc(Term::call(terms), &loc, offset, end)
    }

    /// If the current token is one of `ops`, consume it as an operator term.
    pub(crate) fn parse_term_op(&mut self, ops: &[Token]) -> Option<Term> {
        if !ops.contains(&self.s.tok) {
            return None;
        }
        let loc = self.loc();
        let op = Term::reference(vec![
            Term::var(self.s.tok.as_str()).with_location(loc.clone())
        ])
        .with_location(loc);
        self.scan();
        Some(op)
    }

    /// If the current token is `in`, consume it as `internal.<name>`.
    fn parse_member_op(&mut self, name: &str) -> Option<Term> {
        if self.s.tok != Token::In {
            return None;
        }
        let loc = self.loc();
        let op = Term::reference(vec![
            Term::var(MEMBER_ROOT).with_location(loc.clone()),
            Term::string(name).with_location(loc.clone()),
        ])
        .with_location(loc);
        self.scan();
        Some(op)
    }
}
