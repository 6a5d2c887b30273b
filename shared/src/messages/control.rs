//! Control endpoint bodies

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::SharedError;

/// `POST /control/expectation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationRequest {
    pub active_metaphors: Vec<String>,
    pub beats: Vec<String>,
    pub base: String,
    pub poles: BTreeMap<String, String>,
}

impl ExpectationRequest {
    pub const DEFAULT_BASE: &'static str = "linear";

    /// Parse `axis:pole` pairs; entries without a colon or with a blank side are skipped
    pub fn parse_poles<S: AsRef<str>>(entries: &[S]) -> BTreeMap<String, String> {
        entries
            .iter()
            .filter_map(|entry| {
                let (axis, pole) = entry.as_ref().split_once(':')?;
                let (axis, pole) = (axis.trim(), pole.trim());
                (!axis.is_empty() && !pole.is_empty()).then(|| (axis.to_string(), pole.to_string()))
            })
            .collect()
    }
}

/// `POST /control/viewpoint`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewpointRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    pub lang: String,
}

/// `POST /control/attention`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionRequest {
    pub text: String,
    pub lang: String,
    pub top_k: u32,
}

impl AttentionRequest {
    pub const DEFAULT_TOP_K: u32 = 5;
}

/// Language tag sent when the operator gives none
pub const DEFAULT_LANG: &str = "en";

/// Validate a two-letter-ish language tag
pub fn validate_lang(lang: &str) -> Result<String, SharedError> {
    let lang = lang.trim();
    if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return Err(SharedError::InvalidConfig {
            field: "lang".to_string(),
            value: lang.to_string(),
        });
    }
    Ok(lang.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poles() {
        let poles = ExpectationRequest::parse_poles(&["tension:high", "bad", " tone : dark ", "x:"]);
        assert_eq!(poles.len(), 2);
        assert_eq!(poles.get("tension").map(String::as_str), Some("high"));
        assert_eq!(poles.get("tone").map(String::as_str), Some("dark"));
    }

    #[test]
    fn test_validate_lang() {
        assert_eq!(validate_lang(" EN ").unwrap(), "en");
        assert!(validate_lang("").is_err());
        assert!(validate_lang("e n").is_err());
    }
}
