use super::*;
use crate::{ParserOptions, FEATURE_KEYWORDS_IN_REFS};
use pretty_assertions::assert_eq;
use rego_ir::{ExprTerms, Statement, MEMBER};

fn errors(parser: Parser) -> Vec<String> {
    parser.parse().errors.into_iter().map(|e| e.message).collect()
}

fn caps(keywords: &[&str], features: &[&str]) -> Capabilities {
    Capabilities {
        future_keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
        features: features.iter().map(|s| (*s).to_string()).collect(),
    }
}

#[test]
fn test_keywords_in_version() {
    assert!(is_keyword_in_version("not", RegoVersion::V0));
    assert!(is_keyword_in_version("not", RegoVersion::V1));
    assert!(!is_keyword_in_version("if", RegoVersion::V0));
    assert!(!is_keyword_in_version("contains", RegoVersion::V0CompatV1));
    assert!(is_keyword_in_version("if", RegoVersion::V1));
    assert!(is_keyword_in_version("every", RegoVersion::V1));
    assert!(!is_keyword_in_version("foo", RegoVersion::V1));
}

#[test]
fn test_v1_requires_rego_v1_feature() {
    let p = Parser::new("p := 1").with_capabilities(caps(&[], &[]));
    let output = p.parse();
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].message,
        "illegal capabilities: rego_v1 feature required for parsing v1 Rego"
    );
    assert!(output.errors[0].location.is_none());
    assert!(output.statements.is_empty());
}

#[test]
fn test_v1_rejects_unknown_capability_keyword() {
    let p = Parser::new("p := 1").with_capabilities(caps(&["foo"], &[FEATURE_REGO_V1]));
    assert_eq!(errors(p), vec!["illegal capabilities: unknown keyword: foo"]);
}

#[test]
fn test_v1_rejects_unknown_requested_keyword() {
    let p = Parser::new("p := 1").with_future_keywords(["foo"]);
    assert_eq!(errors(p), vec!["unknown future keyword: foo"]);
}

#[test]
fn test_v0_rejects_unknown_capability_keyword() {
    let p = Parser::new("p = 1")
        .with_rego_version(RegoVersion::V0)
        .with_capabilities(caps(&["bar"], &[]));
    assert_eq!(errors(p), vec!["illegal capabilities: unknown keyword: bar"]);
}

#[test]
fn test_v0_requested_keyword_must_be_allowed() {
    let p = Parser::new("p = 1")
        .with_rego_version(RegoVersion::V0)
        .with_capabilities(caps(&["if"], &[]))
        .with_future_keywords(["in"]);
    assert_eq!(errors(p), vec!["unknown future keyword: in"]);
}

#[test]
fn test_v0_rego_v1_feature_allows_everything() {
    let p = Parser::new("x in y")
        .with_rego_version(RegoVersion::V0)
        .with_capabilities(caps(&[], &[FEATURE_REGO_V1]))
        .with_future_keywords(["in"]);
    let output = p.parse();
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let Statement::Body(body) = &output.statements[0] else {
        panic!("expected a query");
    };
    let ExprTerms::Call(call) = &body[0].terms else {
        panic!("expected a call");
    };
    assert_eq!(call[0].to_string(), MEMBER);
}

#[test]
fn test_v0_without_selection_keeps_keywords_as_names() {
    let output = Parser::new("in := 1 { true }")
        .with_rego_version(RegoVersion::V0)
        .parse();
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    let rule = output.statements[0].as_rule().unwrap();
    assert_eq!(rule.head.reference.to_string(), "in");
}

#[test]
fn test_selected_keywords_reach_the_scanner() {
    let mut p = Parser::new("")
        .with_rego_version(RegoVersion::V0)
        .with_future_keywords(["if", "contains"]);
    let allowed = p.negotiate_keywords().unwrap();
    assert_eq!(allowed.len(), 4);
    assert!(p.s.scanner.is_keyword("if"));
    assert!(p.s.scanner.is_keyword("contains"));
    assert!(!p.s.scanner.is_keyword("in"));

    let mut p = Parser::new("").with_options(
        ParserOptions::default()
            .with_rego_version(RegoVersion::V0)
            .with_all_future_keywords(true),
    );
    p.negotiate_keywords().unwrap();
    assert!(p.s.scanner.is_keyword("every"));
}

#[test]
fn test_v1_reserves_all_future_keywords() {
    let mut p = Parser::new("");
    let allowed = p.negotiate_keywords().unwrap();
    assert_eq!(allowed, KeywordTable::future_v0());
    for (kw, _) in FUTURE_KEYWORDS_V0 {
        assert!(p.s.scanner.is_keyword(kw), "{kw}");
    }
    assert!(p.capabilities.contains_feature(FEATURE_KEYWORDS_IN_REFS));
}

#[test]
fn test_derived_parsers_restore_keywords() {
    let mut p = Parser::new("").with_rego_version(RegoVersion::V0);
    p.negotiate_keywords().unwrap();

    let inside = p.with_all_future_keywords_reserved(|p| p.s.scanner.is_keyword("every"));
    assert!(inside);
    assert!(!p.s.scanner.is_keyword("every"));

    let mut p = Parser::new("");
    p.negotiate_keywords().unwrap();
    let inside = p.with_present_keywords(|p| p.s.scanner.is_keyword("in"));
    assert!(!inside);
    assert!(p.s.scanner.is_keyword("in"));
}
