use super::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn loc(file: &str, row: usize, col: usize, offset: usize) -> Location {
    Location::new(Arc::from(file), row, col, offset)
}

#[test]
fn test_single_hint_is_appended() {
    let err = ParseError::new("unexpected ident token").with_hints(vec!["try this".into()]);
    assert_eq!(err.message, "unexpected ident token (hint: try this)");
    assert_eq!(err.hints, vec!["try this".to_string()]);
}

#[test]
fn test_multiple_hints_are_joined() {
    let err = ParseError::new("bad").with_hints(vec!["a".into(), "b".into()]);
    assert_eq!(err.message, "bad (hints: a, b)");
}

#[test]
fn test_display_without_file() {
    let err = ParseError::new("found empty body").at(loc("", 2, 5, 10));
    assert_eq!(err.to_string(), "2:5: parse-error: found empty body");
}

#[test]
fn test_display_with_file_and_details() {
    let source = b"package x\np {\n\t1 +\n}";
    let err = ParseError::new("unexpected } token")
        .at(loc("x.rego", 4, 1, 19))
        .with_details_from(source);
    assert_eq!(
        err.to_string(),
        "x.rego:4: parse-error: unexpected } token\n\t}\n\t^"
    );
}

#[test]
fn test_details_skip_trailing_whitespace() {
    // Offset points at the newline after `+`; the snippet should show
    // the line with the `+`.
    let source = b"a +\nb";
    let details = ErrorDetails::from_source(source, 3);
    assert_eq!(
        details,
        Some(ErrorDetails {
            line: "a +".into(),
            idx: 2,
        })
    );
}

#[test]
fn test_details_strip_leading_tabs_in_caret_line() {
    let details = ErrorDetails {
        line: "\t\tx := ".into(),
        idx: 4,
    };
    assert_eq!(details.lines(), ("x := ".to_string(), "  ^".to_string()));
}

#[test]
fn test_details_of_empty_source() {
    assert_eq!(ErrorDetails::from_source(b"", 0), None);
}

#[test]
fn test_errors_display() {
    let none = ParseErrors::default();
    assert_eq!(none.to_string(), "no error(s)");

    let one = ParseErrors(vec![ParseError::new("x")]);
    assert_eq!(one.to_string(), "1 error occurred: parse-error: x");

    let two = ParseErrors(vec![ParseError::new("x"), ParseError::new("y")]);
    assert_eq!(
        two.to_string(),
        "2 errors occurred:\nparse-error: x\nparse-error: y"
    );
}
