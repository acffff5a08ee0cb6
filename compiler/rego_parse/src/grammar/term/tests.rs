use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rego_ir::{ExprTerms, Term, Value};
use rego_lexer::{Scanner, Token};

use super::binary_exponent;
use crate::{parse_expr, parse_term, Parser, MAX_DEPTH_EXCEEDED};

fn parser(src: &str) -> Parser {
    let mut p = Parser::new(src);
    p.negotiate_keywords().unwrap();
    p.scan();
    p
}

fn term(src: &str) -> Term {
    parse_term(src).unwrap_or_else(|e| panic!("{src}: {e}"))
}

fn term_error(src: &str) -> String {
    let errs = parse_term(src).unwrap_err();
    errs.iter().next().unwrap().message.clone()
}

fn text(term: &Term) -> &str {
    &term.location.as_ref().unwrap().text
}

#[test]
fn test_scalars() {
    assert_eq!(term("null").value, Value::Null);
    assert_eq!(term("true").value, Value::Boolean(true));
    assert_eq!(term("false").value, Value::Boolean(false));
    assert_eq!(term("\"a\\tb\"").value, Value::String("a\tb".into()));
    assert_eq!(term("\"\"").value, Value::String(String::new()));
    assert_eq!(term("\"\\u00e9\"").value, Value::String("é".into()));
    assert_eq!(term("`raw\\n`").value, Value::String("raw\\n".into()));
}

#[test]
fn test_numbers() {
    for src in ["0", "1", "-1", "3.14", "-0.5", "0.5", "1e10", "0e1", "2E-3", ".5", "-.5", "5."] {
        assert!(matches!(term(src).value, Value::Number(_)), "{src}");
    }
    assert_eq!(term("-.5").to_string(), "-.5");
    assert_eq!(term("1e300").to_string(), "1e300");
}

#[test]
fn test_number_errors() {
    assert_eq!(
        term_error("01"),
        "unexpected number token: expected number without leading zero"
    );
    assert_eq!(term_error("1e40000"), "number too big");
    assert_eq!(term_error("-x"), "unexpected identifier token: expected number");
}

#[test]
fn test_binary_exponent() {
    assert_eq!(binary_exponent("0"), Some(0));
    assert_eq!(binary_exponent("0.000"), Some(0));
    assert_eq!(binary_exponent("1"), Some(3));
    assert_eq!(binary_exponent("-1000"), Some(13));
    assert!(binary_exponent("1e1000000").unwrap() > 3_000_000);
    assert!(binary_exponent("0.001").unwrap() < 0);
    assert_eq!(binary_exponent("1e"), None);
    assert_eq!(binary_exponent("."), None);
    assert_eq!(binary_exponent("1x"), None);
}

#[test]
fn test_root_documents_are_refs() {
    for src in ["data", "input"] {
        match term(src).value {
            Value::Ref(r) => assert_eq!(r.0, vec![Term::var(src)]),
            other => panic!("{src}: {other:?}"),
        }
    }
    assert_eq!(term("x").value, Value::Var("x".into()));
}

#[test]
fn test_refs() {
    let t = term("a.b[0][\"c d\"][x]");
    let Value::Ref(r) = &t.value else {
        panic!("{t:?}");
    };
    assert_eq!(
        r.0,
        vec![
            Term::var("a"),
            Term::string("b"),
            Term::number("0"),
            Term::string("c d"),
            Term::var("x"),
        ]
    );
    assert_eq!(text(&t), "a.b[0][\"c d\"][x]");
}

#[test]
fn test_ref_with_call_head() {
    let t = term("f(x).y[0]");
    let Value::Ref(r) = &t.value else {
        panic!("{t:?}");
    };
    assert!(matches!(r[0].value, Value::Call(_)));
    assert_eq!(text(&r[0]), "f(x)");
    assert_eq!(text(&t), "f(x).y[0]");
}

#[test]
fn test_ref_head_errors() {
    assert_eq!(term_error("\"s\".x"), "illegal ref (head cannot be string)");
    assert_eq!(term_error("a[1"), "unexpected eof token: expected ]");
}

#[test]
fn test_calls() {
    let t = parser("f(1, \"x\")").parse_term().unwrap();
    assert_eq!(t.to_string(), "f(1, \"x\")");
    assert_eq!(text(&t), "f(1, \"x\")");

    let t = parser("a.b.c()").parse_term().unwrap();
    assert_eq!(t.to_string(), "a.b.c()");

    assert_eq!(term("set()").value, Value::Set(Vec::new()));
}

#[test]
fn test_call_needs_adjacent_paren() {
    // Two literals, not a call.
    let body = crate::parse_body("f (x)").unwrap();
    assert_eq!(body.to_string(), "f; x");
}

#[test]
fn test_wildcards_are_unique() {
    let t = parser("f(_, _)").parse_term().unwrap();
    let Value::Call(args) = &t.value else {
        panic!("{t:?}");
    };
    assert_eq!(args[1], Term::var("$0"));
    assert_eq!(args[2], Term::var("$1"));
}

#[test]
fn test_arrays() {
    assert_eq!(term("[]").value, Value::Array(Vec::new()));
    assert_eq!(term("[1, 2,]").to_string(), "[1, 2]");
    assert_eq!(term("[, 1]").to_string(), "[1]");
    assert_eq!(term("[a + 1, 2]").to_string(), "[plus(a, 1), 2]");
    assert_eq!(text(&term("[1,  2]")), "[1,  2]");
}

#[test]
fn test_array_comprehension() {
    let t = term("[x | x = a[_]]");
    let Value::ArrayComprehension(c) = &t.value else {
        panic!("{t:?}");
    };
    assert_eq!(c.term, Term::var("x"));
    assert_eq!(c.body.len(), 1);

    // `|` as an operator inside an array literal.
    assert_eq!(term("[a | b, c]").to_string(), "[or(a, b), c]");
    assert_eq!(term("[, a | b]").to_string(), "[or(a, b)]");
}

#[test]
fn test_sets_and_objects() {
    assert_eq!(term("{}").value, Value::Object(Vec::new()));
    assert_eq!(term("{1, 2}").to_string(), "{1, 2}");
    assert_eq!(term("{1,}").to_string(), "{1}");
    assert_eq!(term("{\"a\": 1, \"b\": [2]}").to_string(), "{\"a\": 1, \"b\": [2]}");
    assert_eq!(term("{a + 1, 2}").to_string(), "{plus(a, 1), 2}");
    assert_eq!(term("{x == y: 1}").to_string(), "{equal(x, y): 1}");
    assert_eq!(term("{\"k\": a + 1}").to_string(), "{\"k\": plus(a, 1)}");
    assert_eq!(text(&term("{1, 2}")), "{1, 2}");
}

#[test]
fn test_comprehensions() {
    assert!(matches!(
        term("{x | x = a[_]}").value,
        Value::SetComprehension(_)
    ));
    assert!(matches!(
        term("{k: v | v = a[k]}").value,
        Value::ObjectComprehension(_)
    ));
    assert_eq!(term("{a | b, c}").to_string(), "{or(a, b), c}");
    // A comprehension wins over `|` as an operator when its body parses.
    assert!(matches!(
        term("{\"k\": a | b}").value,
        Value::ObjectComprehension(_)
    ));
}

#[test]
fn test_collection_errors() {
    assert_eq!(term_error("[1 2]"), "unexpected number token: expected \",\" or \"]\"");
    assert_eq!(term_error("{1: 2 3}"), "unexpected number token: non-terminated object");
    assert_eq!(term_error("{1 2}"), "unexpected number token: non-terminated set");
    assert_eq!(term_error("{\"a\": 1, \"b\" 2}"), "unexpected number token: non-terminated object");
    assert_eq!(term_error("(1"), "non-terminated expression");
}

#[test]
fn test_parenthesized_location() {
    let mut p = parser("(1 + 2)");
    let t = p.parse_term().unwrap();
    assert_eq!(t.to_string(), "plus(1, 2)");
    assert_eq!(text(&t), "(1 + 2)");
}

#[test]
fn test_repeated_operands_are_equal() {
    let expr = parse_expr("a.b.c | a.b.c").unwrap();
    let ExprTerms::Call(terms) = &expr.terms else {
        panic!("{expr:?}");
    };
    assert_eq!(terms[1], terms[2]);
    assert_eq!(text(&terms[1]), text(&terms[2]));
    assert_eq!(terms[2].location.as_ref().unwrap().offset, 8);
}

#[test]
fn test_cache_avoids_rescanning() {
    let src = "{a.b.c + 1}";
    let mut fresh = Scanner::new(src);
    let mut expected = 0;
    loop {
        expected += 1;
        if fresh.scan().token == Token::Eof {
            break;
        }
    }

    let mut p = parser(src);
    let t = p.parse_term().unwrap();
    assert_eq!(t.to_string(), "{plus(a.b.c, 1)}");
    assert!(p.errors.is_empty());
    assert_eq!(p.s.tok, Token::Eof);
    assert_eq!(p.tokens_scanned, expected);
}

#[test]
fn test_depth_ceiling() {
    let src = "((((((1))))))";
    let out = Parser::new(src).with_max_recursion_depth(5).parse();
    assert!(out.errors.iter().any(|e| e.message == MAX_DEPTH_EXCEEDED));

    let out = Parser::new(src).with_max_recursion_depth(0).parse();
    assert!(out.errors.is_empty(), "{:?}", out.errors);
}

#[test]
fn test_depth_restored_after_parse() {
    let mut p = parser("[[[1]]]");
    p.parse_term().unwrap();
    assert_eq!(p.depth.depth(), 0);
}

proptest! {
    #[test]
    fn prop_integers_parse(n in any::<i64>()) {
        let src = n.to_string();
        let t = term(&src);
        prop_assert_eq!(t.to_string(), src);
    }

    #[test]
    fn prop_strings_round_trip(s in "[a-zA-Z0-9 _.\\-]{0,16}") {
        let src = serde_json::to_string(&s).unwrap();
        prop_assert_eq!(term(&src).value, Value::String(s));
    }
}

#[test]
fn test_calls_are_not_terms() {
    assert_eq!(term_error("f(_, _)"), "expected term but got f($0, $1)");
}

#[test]
fn test_wildcards_in_expressions_are_unique() {
    let expr = parse_expr("f(_, _)").unwrap();
    let ExprTerms::Call(terms) = &expr.terms else {
        panic!("{expr:?}");
    };
    assert_ne!(terms[1], terms[2]);
}

#[test]
fn test_object_error_location() {
    let errs = parse_term("{\"a\": 1, \"b\" 2}").unwrap_err();
    let loc = errs.iter().next().unwrap().location.clone().unwrap();
    assert_eq!((loc.row, loc.col), (1, 7));
}
