//! End-to-end parsing of complete policies through the public API.

use pretty_assertions::assert_eq;
use rego_ir::{ExprTerms, Rule, RuleKeyword, Statement, Term};
use rego_parse::{
    parse_body, parse_expr, parse_ref, parse_statements, parse_term, ParseOutput, Parser,
    ParserOptions, RegoVersion,
};

fn kinds(statements: &[Statement]) -> Vec<&'static str> {
    statements
        .iter()
        .map(|s| match s {
            Statement::Package(_) => "package",
            Statement::Import(_) => "import",
            Statement::Rule(_) => "rule",
            Statement::Body(_) => "body",
            Statement::Annotations(_) => "annotations",
        })
        .collect()
}

fn rules(out: &ParseOutput) -> Vec<&Rule> {
    out.statements.iter().filter_map(Statement::as_rule).collect()
}

const LEGACY_POLICY: &str = r#"package httpapi.authz

import input

# Deny unless a rule below says otherwise.
default allow = false

allow {
    input.method == "GET"
    input.path = ["salary", user]
    user == input.user
}

allow {
    some i
    data.managers[input.user][i] == input.path[1]
}

users[name] = info {
    info := data.users[name]
}

double(x) = y {
    y := x * 2
}
"#;

#[test]
fn test_legacy_policy() {
    let out = Parser::new(LEGACY_POLICY)
        .with_filename("authz.rego")
        .with_rego_version(RegoVersion::V0)
        .parse();
    assert!(!out.has_errors(), "{:?}", out.errors);
    assert_eq!(
        kinds(&out.statements),
        vec!["package", "import", "rule", "rule", "rule", "rule", "rule"]
    );
    assert_eq!(out.comments.len(), 1);

    let found = rules(&out);
    assert!(found[0].default);
    assert_eq!(found[1].body.len(), 3);
    assert_eq!(found[2].body[0].to_string(), "some i");

    let users = found[3];
    assert_eq!(users.head.name, Some("users".into()));
    assert_eq!(users.head.key, Some(Term::var("name")));
    assert_eq!(users.head.value, Some(Term::var("info")));

    let double = found[4];
    assert!(double.head.is_function());
    assert_eq!(double.to_string(), "double(x) = y { assign(y, mul(x, 2)) }");
}

const MODERN_POLICY: &str = r#"package example

import rego.v1

max_len := 10

deny contains msg if {
	some name in input.names
	count(name) > max_len
	msg := sprintf("name too long: %s", [name])
}

all_positive if {
	every x in input.values {
		x > 0
	}
}

grade := "A" if {
	input.score >= 90
} else := "B" if {
	input.score >= 80
} else := "C"

double(x) := x * 2 if true

names := {n | some n in input.names}
"#;

#[test]
fn test_modern_policy() {
    let out = Parser::new(MODERN_POLICY).parse();
    assert!(!out.has_errors(), "{:?}", out.errors);
    assert_eq!(
        kinds(&out.statements),
        vec!["package", "import", "body", "rule", "rule", "rule", "rule", "body"]
    );

    let found = rules(&out);

    let deny = found[0];
    assert_eq!(deny.head.keywords, vec![RuleKeyword::Contains, RuleKeyword::If]);
    assert_eq!(deny.body.len(), 3);
    assert!(matches!(deny.body[0].terms, ExprTerms::Some(_)));

    let all_positive = found[1];
    assert!(matches!(all_positive.body[0].terms, ExprTerms::Every(_)));

    let grade = found[2];
    assert_eq!(grade.else_chain_len(), 2);
    assert_eq!(grade.location.as_ref().unwrap().row, 19);

    let double = found[3];
    assert_eq!(double.body.to_string(), "true");
    assert_eq!(double.head.value.as_ref().unwrap().to_string(), "mul(x, 2)");
}

#[test]
fn test_same_policy_in_both_versions() {
    // With `import rego.v1`, a v0 parser accepts v1 syntax.
    let options = ParserOptions::default().with_rego_version(RegoVersion::V0);
    let (v0, _) = parse_statements("example.rego", MODERN_POLICY, options).unwrap();
    let (v1, _) =
        parse_statements("example.rego", MODERN_POLICY, ParserOptions::default()).unwrap();
    assert_eq!(v0, v1);
}

#[test]
fn test_every_without_import_fails_in_v0() {
    let src = "package p\n\nallow {\n\tevery x in input.xs {\n\t\tx > 0\n\t}\n}\n";
    let options = ParserOptions::default().with_rego_version(RegoVersion::V0);
    let errs = parse_statements("p.rego", src, options).unwrap_err();
    let first = errs.iter().next().unwrap();
    assert_eq!(first.location.as_ref().unwrap().row, 4);
    assert!(first.message.contains("import future.keywords.every"));

    let fixed = src.replace("package p\n", "package p\nimport future.keywords.every\nimport future.keywords.in\n");
    let options = ParserOptions::default().with_rego_version(RegoVersion::V0);
    let (statements, _) = parse_statements("p.rego", &fixed, options).unwrap();
    assert_eq!(kinds(&statements), vec!["package", "import", "import", "rule"]);
}

#[test]
fn test_errors_carry_file_and_snippet() {
    let src = "package p\n\nallow if {\n\tinput.x ==\n}\n";
    let errs = parse_statements("broken.rego", src, ParserOptions::default()).unwrap_err();
    let first = errs.iter().next().unwrap();
    let rendered = first.to_string();
    assert!(rendered.starts_with("broken.rego:5: parse-error: "), "{rendered}");
    assert!(first.details.is_some());
}

#[test]
fn test_annotated_policy() {
    let src = r#"# METADATA
# title: Example
# description: Example package
package example

# METADATA
# title: Allow admins
# authors:
# - Jane Doe <jane@example.com>
# custom:
#   severity: high
allow if input.user.admin
"#;
    let options = ParserOptions::default().with_process_annotation(true);
    let (statements, comments) = parse_statements("a.rego", src, options).unwrap();
    assert_eq!(
        kinds(&statements),
        vec!["package", "rule", "annotations", "annotations"]
    );
    assert_eq!(comments.len(), 9);

    let Statement::Annotations(rule_annotations) = &statements[3] else {
        panic!("{:?}", statements[3]);
    };
    assert_eq!(rule_annotations.title, "Allow admins");
    assert_eq!(rule_annotations.authors[0].email, "jane@example.com");
    assert_eq!(
        rule_annotations.custom["severity"],
        serde_json::json!("high")
    );
}

#[test]
fn test_convenience_entry_points() {
    let body = parse_body("x := 1\nx > 0").unwrap();
    assert_eq!(body.len(), 2);

    let expr = parse_expr("input.a + 1 == 2").unwrap();
    assert_eq!(expr.to_string(), "equal(plus(input.a, 1), 2)");

    let term = parse_term("{\"a\": [1, 2]}").unwrap();
    assert_eq!(term.to_string(), "{\"a\": [1, 2]}");

    // Keywords are fine as ref segments.
    let reference = parse_ref("input.every[0]").unwrap();
    assert_eq!(reference.to_string(), "input.every[0]");
}
