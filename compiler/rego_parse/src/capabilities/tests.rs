use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_from_json_ignores_unrelated_fields() {
    let json = r#"{
        "builtins": [{"name": "plus"}],
        "future_keywords": ["in", "every"],
        "wasm_abi_versions": [{"version": 1, "minor_version": 2}],
        "features": ["rego_v1_import"]
    }"#;
    let caps = Capabilities::from_json(json).unwrap();
    assert_eq!(caps.future_keywords, vec!["in".to_string(), "every".to_string()]);
    assert!(caps.contains_feature(FEATURE_REGO_V1_IMPORT));
    assert!(!caps.contains_feature(FEATURE_REGO_V1));
}

#[test]
fn test_missing_fields_default_to_empty() {
    let caps = Capabilities::from_json("{}").unwrap();
    assert_eq!(caps, Capabilities::default());
}

#[test]
fn test_invalid_json() {
    let err = Capabilities::from_json("{").unwrap_err();
    assert!(matches!(err, CapabilitiesError::Json(_)));
    assert!(err.to_string().starts_with("invalid capabilities document"));
}

#[test]
fn test_load_missing_file() {
    let err = Capabilities::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, CapabilitiesError::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn test_defaults_per_version() {
    let v0 = Capabilities::for_version(RegoVersion::V0);
    assert_eq!(v0.future_keywords.len(), 4);
    assert!(v0.contains_feature(FEATURE_REGO_V1_IMPORT));
    assert!(v0.contains_feature(FEATURE_KEYWORDS_IN_REFS));

    let v1 = Capabilities::for_version(RegoVersion::V1);
    assert!(v1.future_keywords.is_empty());
    assert!(v1.contains_feature(FEATURE_REGO_V1));
    assert!(!v1.contains_feature(FEATURE_REGO_V1_IMPORT));
}
