use super::*;
use crate::{Expr, Value};
use pretty_assertions::assert_eq;

fn loc(text: &str) -> Location {
    Location::default().with_text(text)
}

#[test]
fn test_var_head_has_single_segment_ref() {
    let head = Head::var_head(Var::new("allow"), Some(loc("allow")));
    assert_eq!(head.reference.len(), 1);
    assert_eq!(head.name, Some(Var::new("allow")));
    assert_eq!(head.to_string(), "allow");
}

#[test]
fn test_head_display_forms() {
    let mut head = Head::var_head(Var::new("p"), None);
    head.value = Some(Term::number("1"));
    head.assign = true;
    assert_eq!(head.to_string(), "p := 1");

    let mut multi = Head::var_head(Var::new("q"), None);
    multi.key = Some(Term::var("x"));
    assert!(multi.is_multi_value());
    assert_eq!(multi.to_string(), "q contains x");

    let mut func = Head::var_head(Var::new("f"), None);
    func.args = vec![Term::var("a"), Term::var("b")];
    func.value = Some(Term::var("a"));
    assert!(func.is_function());
    assert_eq!(func.to_string(), "f(a, b) = a");
}

#[test]
fn test_set_location_recursive_reaches_nested_terms() {
    let mut head = Head::var_head(Var::new("f"), None);
    head.args = vec![Term::array(vec![Term::var("x")])];
    head.set_location_recursive(&loc("{ true }"));

    let Value::Array(items) = &head.args[0].value else {
        panic!("expected array arg");
    };
    assert_eq!(items[0].location.as_ref().map(|l| l.text.as_str()), Some("{ true }"));
    assert_eq!(head.reference[0].location.as_ref().map(|l| l.text.as_str()), Some("{ true }"));
}

#[test]
fn test_else_chain_len_and_display() {
    let mut head = Head::var_head(Var::new("p"), None);
    head.value = Some(Term::number("1"));
    let body = Body::single(Expr::from_term(Term::boolean(false)));

    let mut tail_head = head.clone();
    tail_head.value = Some(Term::number("2"));
    let tail = Rule::new(tail_head, Body::single(Expr::from_term(Term::boolean(true))));

    let mut rule = Rule::new(head, body);
    rule.else_rule = Some(Box::new(tail));

    assert_eq!(rule.else_chain_len(), 1);
    assert_eq!(rule.to_string(), "p = 1 { false } else = 2 { true }");
}
