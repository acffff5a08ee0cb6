//! Keyword tables.
//!
//! A [`KeywordTable`] maps reserved words to their tokens. The scanner
//! consults its table for every identifier it reads, so reserving a word
//! mid-file (after `import future.keywords.in`) affects all later scans.

use rustc_hash::FxHashMap;

use crate::Token;

/// Words reserved in every language version.
pub const BASE_KEYWORDS: [(&str, Token); 11] = [
    ("not", Token::Not),
    ("package", Token::Package),
    ("import", Token::Import),
    ("as", Token::As),
    ("default", Token::Default),
    ("else", Token::Else),
    ("with", Token::With),
    ("null", Token::Null),
    ("true", Token::True),
    ("false", Token::False),
    ("some", Token::Some),
];

/// Words that v0 sources reserve only after importing them.
pub const FUTURE_KEYWORDS_V0: [(&str, Token); 4] = [
    ("in", Token::In),
    ("every", Token::Every),
    ("contains", Token::Contains),
    ("if", Token::If),
];

/// A name-to-token map of reserved words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeywordTable {
    map: FxHashMap<Box<str>, Token>,
}

impl KeywordTable {
    /// An empty table.
    pub fn new() -> Self {
        KeywordTable::default()
    }

    /// The words every scanner starts with.
    pub fn base() -> Self {
        BASE_KEYWORDS.iter().copied().collect()
    }

    /// All v0 future keywords.
    pub fn future_v0() -> Self {
        FUTURE_KEYWORDS_V0.iter().copied().collect()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Token> {
        self.map.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn insert(&mut self, name: &str, token: Token) {
        self.map.insert(name.into(), token);
    }

    /// Add every entry of `other`, overwriting on conflict.
    pub fn extend_from(&mut self, other: &KeywordTable) {
        for (name, tok) in &other.map {
            self.map.insert(name.clone(), *tok);
        }
    }

    /// Remove every name that appears in `other`.
    pub fn remove_all(&mut self, other: &KeywordTable) {
        self.map.retain(|name, _| !other.map.contains_key(name));
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.map.keys().map(AsRef::as_ref).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Token)> {
        self.map.iter().map(|(k, v)| (k.as_ref(), *v))
    }
}

impl<'a> FromIterator<(&'a str, Token)> for KeywordTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, Token)>>(iter: I) -> Self {
        let mut table = KeywordTable::new();
        for (name, tok) in iter {
            table.insert(name, tok);
        }
        table
    }
}

#[cfg(test)]
mod tests;
