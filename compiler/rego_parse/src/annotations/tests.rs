use pretty_assertions::assert_eq;
use rego_ir::{Annotations, AuthorAnnotation, RelatedResourceAnnotation, Statement};

use super::{author_from_str, quote_char, with_separator_hints};
use crate::{ParseOutput, Parser};

fn parse(src: &str) -> ParseOutput {
    Parser::new(src).with_process_annotation(true).parse()
}

fn annotations(output: &ParseOutput) -> Vec<&Annotations> {
    output
        .statements
        .iter()
        .filter_map(|s| match s {
            Statement::Annotations(a) => Some(a.as_ref()),
            _ => None,
        })
        .collect()
}

fn messages(output: &ParseOutput) -> Vec<&str> {
    output.errors.iter().map(|e| e.message.as_str()).collect()
}

#[test]
fn test_basic_block() {
    let out = parse(
        "package p\n\n# METADATA\n# title: Allow\n# description: Lets admins in\n# entrypoint: true\nallow := true\n",
    );
    assert!(out.errors.is_empty(), "{:?}", out.errors);

    let found = annotations(&out);
    assert_eq!(found.len(), 1);
    let a = found[0];
    assert_eq!(a.title, "Allow");
    assert_eq!(a.description, "Lets admins in");
    assert!(a.entrypoint);
    assert_eq!(a.comments.len(), 3);

    let loc = a.location.as_ref().unwrap();
    assert_eq!(loc.row, 3);
    assert_eq!(
        loc.text,
        "# METADATA\n# title: Allow\n# description: Lets admins in\n# entrypoint: true"
    );
}

#[test]
fn test_annotations_ignored_unless_enabled() {
    let out = Parser::new("# METADATA\n# title: x\np := 1\n").parse();
    assert!(annotations(&out).is_empty());
    assert_eq!(out.comments.len(), 2);
}

#[test]
fn test_block_ends_at_gap_or_indent() {
    let out = parse("# METADATA\n# title: one\n\n# title: stray\np := 1\n");
    let found = annotations(&out);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "one");
    assert_eq!(found[0].comments.len(), 1);

    let out = parse("# METADATA\n# title: one\n  # title: indented\np := 1\n");
    let found = annotations(&out);
    assert_eq!(found[0].comments.len(), 1);
}

#[test]
fn test_separate_blocks_decode_independently() {
    let out = parse(
        "# METADATA\n# title: first\np := 1\n\n# METADATA\n# authors: [{}]\nq := 2\n\n# METADATA\n# title: third\nr := 3\n",
    );
    let titles: Vec<&str> = annotations(&out).iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "third"]);
    assert_eq!(
        messages(&out),
        vec!["invalid author definition {}: 'name' and/or 'email' values required in object"]
    );
    assert_eq!(out.errors[0].location.as_ref().unwrap().row, 5);
}

#[test]
fn test_empty_block() {
    let out = parse("# METADATA\np := 1\n");
    assert_eq!(messages(&out), vec!["expected METADATA block, found whitespace"]);

    let out = parse("# METADATA\n#   \np := 1\n");
    assert_eq!(messages(&out), vec!["expected METADATA block, found whitespace"]);
}

#[test]
fn test_related_resources() {
    let out = parse(
        "# METADATA\n# related_resources:\n# - https://example.com\n# - ref: https://example.com/docs\n#   description: \" the docs \"\np := 1\n",
    );
    assert!(out.errors.is_empty(), "{:?}", out.errors);
    assert_eq!(
        annotations(&out)[0].related_resources,
        vec![
            RelatedResourceAnnotation {
                reference: "https://example.com".into(),
                description: String::new(),
            },
            RelatedResourceAnnotation {
                reference: "https://example.com/docs".into(),
                description: "the docs".into(),
            },
        ]
    );
}

#[test]
fn test_related_resource_errors() {
    let out = parse("# METADATA\n# related_resources:\n# - \"\"\np := 1\n");
    assert_eq!(
        messages(&out),
        vec!["invalid related-resource definition : ref URL may not be empty string"]
    );

    let out = parse("# METADATA\n# related_resources:\n# - description: x\np := 1\n");
    assert_eq!(
        messages(&out),
        vec![r#"invalid related-resource definition {"description":"x"}: 'ref' value required in object"#]
    );

    let out = parse("# METADATA\n# related_resources:\n# - 42\np := 1\n");
    assert_eq!(
        messages(&out),
        vec!["invalid related-resource definition 42: invalid value type, must be string or map"]
    );
}

#[test]
fn test_authors() {
    let out = parse(
        "# METADATA\n# authors:\n# - Jane Doe <jane@example.com>\n# - name: John\n# - email: j@example.com\np := 1\n",
    );
    assert!(out.errors.is_empty(), "{:?}", out.errors);
    assert_eq!(
        annotations(&out)[0].authors,
        vec![
            AuthorAnnotation {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
            },
            AuthorAnnotation {
                name: "John".into(),
                email: String::new(),
            },
            AuthorAnnotation {
                name: String::new(),
                email: "j@example.com".into(),
            },
        ]
    );
}

#[test]
fn test_author_from_str() {
    let a = author_from_str("  <only@example.com> ").unwrap();
    assert_eq!(a.name, "");
    assert_eq!(a.email, "only@example.com");

    let a = author_from_str("Plain Name").unwrap();
    assert_eq!(a.name, "Plain Name");
    assert_eq!(a.email, "");

    let a = author_from_str("Name <>").unwrap();
    assert_eq!(a.name, "Name");
    assert_eq!(a.email, "");

    assert_eq!(author_from_str(" \t ").unwrap_err(), "author is an empty string");
}

#[test]
fn test_schemas() {
    let out = parse(
        "# METADATA\n# schemas:\n# - input: schema.input\n# - data.x: schema\n# - input.y:\n#     type: string\np := 1\n",
    );
    assert!(out.errors.is_empty(), "{:?}", out.errors);

    let schemas: Vec<String> = annotations(&out)[0]
        .schemas
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        schemas,
        vec![
            "input:schema.input",
            "data.x:schema",
            r#"input.y:{"type":"string"}"#,
        ]
    );
}

#[test]
fn test_schema_errors() {
    let out = parse("# METADATA\n# schemas:\n# - input: foo.bar\np := 1\n");
    assert_eq!(messages(&out), vec![r#"invalid schema reference "foo.bar""#]);

    let out = parse("# METADATA\n# schemas:\n# - \"1 +\": schema\np := 1\n");
    assert_eq!(messages(&out), vec!["invalid document reference"]);

    let out = parse("# METADATA\n# schemas:\n# - input: 7\np := 1\n");
    assert_eq!(messages(&out), vec![r#"invalid schema declaration for path "input""#]);

    let out = parse("# METADATA\n# schemas:\n# - input:\n#     1: x\np := 1\n");
    assert_eq!(
        messages(&out),
        vec!["invalid schema definition: invalid map key type(s): "]
    );
}

#[test]
fn test_custom() {
    let out = parse(
        "# METADATA\n# custom:\n#   severity: high\n#   tags: [a, b]\n#   nested:\n#     n: 1.5\np := 1\n",
    );
    assert!(out.errors.is_empty(), "{:?}", out.errors);

    let custom = &annotations(&out)[0].custom;
    assert_eq!(custom["severity"], serde_json::json!("high"));
    assert_eq!(custom["tags"], serde_json::json!(["a", "b"]));
    assert_eq!(custom["nested"], serde_json::json!({ "n": 1.5 }));
}

#[test]
fn test_custom_map_key_path() {
    let out = parse("# METADATA\n# custom:\n#   a:\n#     b:\n#       1: x\np := 1\n");
    assert_eq!(messages(&out), vec!["invalid map key type(s): a/b"]);
}

#[test]
fn test_yaml_error_located_at_comment() {
    let out = parse("package p\n\n# METADATA\n# title: ok\n# scope: [unclosed\np := 1\n");
    assert_eq!(out.errors.len(), 1);
    let row = out.errors[0].location.as_ref().unwrap().row;
    assert!((4..=5).contains(&row), "row {row}");
}

#[test]
fn test_separator_hint() {
    let comments = vec![
        rego_ir::Comment::new(" title:\u{a0}x", rego_ir::Location::new("".into(), 7, 1, 0)),
        rego_ir::Comment::new(" scope: rule", rego_ir::Location::new("".into(), 8, 1, 0)),
    ];
    assert_eq!(
        with_separator_hints("bad".into(), &comments),
        "bad\n  Hint: on line 7, symbol(s) ['\\u00a0'] immediately following a key/value separator ':' is not a legal yaml space character"
    );
}

#[test]
fn test_separator_hint_skips_trailing_colon() {
    let comments = vec![rego_ir::Comment::new(
        " authors:",
        rego_ir::Location::new("".into(), 2, 1, 0),
    )];
    assert_eq!(with_separator_hints("bad".into(), &comments), "bad");
}

#[test]
fn test_quote_char() {
    assert_eq!(quote_char('x'), "'x'");
    assert_eq!(quote_char('\''), r"'\''");
    assert_eq!(quote_char('\u{1}'), r"'\x01'");
    assert_eq!(quote_char('\u{3000}'), r"'\u3000'");
    assert_eq!(quote_char('\u{1f600}'), r"'\U0001f600'");
}

#[test]
fn test_marker_with_leading_space() {
    let out = parse("#   METADATA\n# scope: rule\np := 1\n");
    let found = annotations(&out);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].scope, "rule");
}
