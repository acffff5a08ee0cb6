use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_base_table_has_no_future_keywords() {
    let base = KeywordTable::base();
    assert_eq!(base.get("package"), Some(Token::Package));
    assert_eq!(base.get("some"), Some(Token::Some));
    for (name, _) in FUTURE_KEYWORDS_V0 {
        assert!(!base.contains(name), "{name} should not be reserved by default");
    }
}

#[test]
fn test_base_tokens_are_keywords() {
    for (_, tok) in BASE_KEYWORDS {
        assert!(tok.is_keyword(), "{tok} should be a keyword");
        assert!(!tok.is_future_keyword());
    }
    for (_, tok) in FUTURE_KEYWORDS_V0 {
        assert!(tok.is_future_keyword());
        assert!(!tok.is_keyword());
    }
}

#[test]
fn test_extend_and_remove() {
    let mut table = KeywordTable::base();
    table.extend_from(&KeywordTable::future_v0());
    assert_eq!(table.get("contains"), Some(Token::Contains));
    assert_eq!(table.len(), 15);

    table.remove_all(&KeywordTable::future_v0());
    assert_eq!(table, KeywordTable::base());
}

#[test]
fn test_names_are_sorted() {
    assert_eq!(
        KeywordTable::future_v0().names(),
        vec!["contains", "every", "if", "in"]
    );
}
