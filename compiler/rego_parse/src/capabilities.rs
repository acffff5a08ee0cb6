//! Capabilities: which keyword and feature extensions a parse may use.
//!
//! A capabilities document is the JSON file OPA-compatible tooling
//! exchanges to describe what a target engine supports. Only the parts
//! that affect parsing are read; everything else (builtins, wasm ABI
//! versions, network allow-lists) is ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::RegoVersion;

/// Capabilities feature enabling v1 syntax.
pub const FEATURE_REGO_V1: &str = "rego_v1";
/// Capabilities feature enabling `import rego.v1` in v0 modules.
pub const FEATURE_REGO_V1_IMPORT: &str = "rego_v1_import";
/// Capabilities feature allowing keywords as ref segments and ref heads.
pub const FEATURE_KEYWORDS_IN_REFS: &str = "keywords_in_refs";

const V0_FUTURE_KEYWORDS: [&str; 4] = ["contains", "every", "if", "in"];

#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub future_keywords: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Failure to read a capabilities document.
#[derive(Debug, thiserror::Error)]
pub enum CapabilitiesError {
    #[error("failed to read capabilities file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid capabilities document: {0}")]
    Json(#[from] serde_json::Error),
}

impl Capabilities {
    /// The capabilities of this parser for the given language version.
    pub fn for_version(version: RegoVersion) -> Self {
        match version {
            RegoVersion::V0 | RegoVersion::V0CompatV1 => Capabilities {
                future_keywords: V0_FUTURE_KEYWORDS.iter().map(|s| (*s).to_string()).collect(),
                features: vec![
                    FEATURE_REGO_V1_IMPORT.to_string(),
                    FEATURE_REGO_V1.to_string(),
                    FEATURE_KEYWORDS_IN_REFS.to_string(),
                ],
            },
            RegoVersion::V1 => Capabilities {
                future_keywords: Vec::new(),
                features: vec![
                    FEATURE_REGO_V1.to_string(),
                    FEATURE_KEYWORDS_IN_REFS.to_string(),
                ],
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CapabilitiesError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CapabilitiesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CapabilitiesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Capabilities::from_json(&json)
    }

    pub fn contains_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

#[cfg(test)]
mod tests;
