use pretty_assertions::assert_eq;
use rego_ir::Statement;

use super::*;

fn kinds(out: &ParseOutput) -> Vec<&'static str> {
    out.statements
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

const POLICY: &str = r#"package authz

import data.roles
import input.user as u

# Admins may do anything.
default allow := false

allow if {
    some role in roles[u.name]
    role == "admin"
}

deny contains msg if {
    not u.active
    msg := "inactive user"
}
"#;

#[test]
fn test_parse_module() {
    let out = Parser::new(POLICY).with_filename("authz.rego").parse();
    assert!(!out.has_errors(), "{:?}", out.errors);
    assert_eq!(
        kinds(&out),
        vec!["package", "import", "import", "rule", "rule", "rule"]
    );
    assert_eq!(out.comments.len(), 1);
    assert_eq!(out.comments[0].text, " Admins may do anything.");
    assert_eq!(out.comments[0].location.row, 6);

    for stmt in &out.statements {
        let loc = stmt.location().unwrap();
        assert_eq!(&*loc.file, "authz.rego");
    }
}

#[test]
fn test_statement_rows_follow_source_order() {
    let out = Parser::new(POLICY).parse();
    let rows: Vec<usize> = out
        .statements
        .iter()
        .map(|s| s.location().unwrap().row)
        .collect();
    assert_eq!(rows, vec![1, 3, 4, 7, 9, 14]);
}

#[test]
fn test_stops_at_first_failing_statement() {
    let out = Parser::new("package p\n\np if {\n\tx :=\n}\n\nq := 1\n").parse();
    assert!(out.has_errors());
    assert_eq!(kinds(&out), vec!["package"]);
}

#[test]
fn test_error_display() {
    let out = Parser::new("package p\n\np if {\n\tx := ]\n}\n")
        .with_filename("bad.rego")
        .parse();
    let err = &out.errors[0];
    assert_eq!(err.code.as_str(), "parse-error");
    assert_eq!(
        err.to_string(),
        "bad.rego:4: parse-error: unexpected ] token\n\tx := ]\n\t     ^"
    );
}

#[test]
fn test_configuration_errors_stop_early() {
    let out = Parser::new("package p")
        .with_rego_version(RegoVersion::V0)
        .with_future_keywords(["nope"])
        .parse();
    assert!(out.statements.is_empty());
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].message, "unknown future keyword: nope");
    assert_eq!(out.errors[0].location, None);
}

#[test]
fn test_all_future_keywords() {
    let src = "p contains x if { some x in [1, 2] }";
    let out = Parser::new(src)
        .with_rego_version(RegoVersion::V0)
        .with_all_future_keywords(true)
        .parse();
    assert!(!out.has_errors(), "{:?}", out.errors);
    assert_eq!(kinds(&out), vec!["rule"]);
}

#[test]
fn test_v0_compat_v1() {
    let src = "import rego.v1\np contains 1";
    let out = Parser::new(src)
        .with_rego_version(RegoVersion::V0CompatV1)
        .parse();
    assert!(!out.has_errors(), "{:?}", out.errors);
    assert_eq!(kinds(&out), vec!["import", "rule"]);
}

#[test]
fn test_skip_rules() {
    let out = Parser::new("x := 1\ny = 2").with_skip_rules(true).parse();
    assert!(!out.has_errors());
    assert_eq!(kinds(&out), vec!["body", "body"]);

    // A rule is then just a failing query.
    let out = Parser::new("p if { true }").with_skip_rules(true).parse();
    assert!(out.has_errors());
}

#[test]
fn test_max_recursion_depth() {
    let src = "x := [[[[[[1]]]]]]";
    let out = Parser::new(src).with_max_recursion_depth(4).parse();
    assert!(out
        .errors
        .iter()
        .any(|e| e.message == MAX_DEPTH_EXCEEDED));

    let out = Parser::new(src).parse();
    assert!(!out.has_errors());
}

#[test]
fn test_annotations_only_when_asked() {
    let src = "# METADATA\n# title: Allow\nallow := true\n";
    let out = Parser::new(src).parse();
    assert_eq!(kinds(&out), vec!["body"]);
    assert_eq!(out.comments.len(), 2);

    let out = Parser::new(src).with_process_annotation(true).parse();
    assert_eq!(kinds(&out), vec!["body", "annotations"]);
}

#[test]
fn test_empty_source() {
    let out = Parser::new("").parse();
    assert!(out.statements.is_empty());
    assert!(!out.has_errors());

    let out = Parser::new("# only a comment\n").parse();
    assert!(out.statements.is_empty());
    assert_eq!(out.comments.len(), 1);
}

#[test]
fn test_cache_avoids_rescanning() {
    // Rule, then query, both reread the same long ref.
    let src = "a.b.c.d.e.f.g.h == 1";
    let mut p = Parser::new(src);
    p.negotiate_keywords().unwrap();
    p.scan();
    let s = p.save();
    p.parse_term().unwrap();
    let first = p.tokens_scanned;
    p.restore(&s);
    p.parse_term().unwrap();
    assert_eq!(p.tokens_scanned, first);
}
