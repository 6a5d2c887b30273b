//! Status, banks and bible browsing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Bank;

/// `GET /status` data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub llm_default: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusPayload {
    /// Server-suggested harness, if non-blank
    pub fn suggested_harness(&self) -> Option<&str> {
        self.llm_default
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// `GET /banks` data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BanksPayload {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub banks: Vec<Bank>,
}

/// Query options of `GET /bible/schemas`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaQuery {
    pub validate: bool,
    /// Schema source; `current` means the server default
    pub source: Option<String>,
}

impl SchemaQuery {
    /// Query parameters in request order
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.validate {
            params.push(("validate", "true".to_string()));
        }
        if let Some(source) = self.source.as_deref().map(str::trim) {
            if !source.is_empty() && source != "current" {
                params.push(("source", source.to_string()));
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suggested_harness_ignores_blank() {
        let status: StatusPayload = serde_json::from_value(json!({"llm_default": "  "})).unwrap();
        assert_eq!(status.suggested_harness(), None);

        let status: StatusPayload =
            serde_json::from_value(json!({"llm_default": "openai", "version": "0.4"})).unwrap();
        assert_eq!(status.suggested_harness(), Some("openai"));
        assert_eq!(status.extra.get("version"), Some(&json!("0.4")));
    }

    #[test]
    fn test_schema_query_params() {
        let query = SchemaQuery { validate: true, source: Some("current".to_string()) };
        assert_eq!(query.params(), vec![("validate", "true".to_string())]);

        let query = SchemaQuery { validate: false, source: Some("draft".to_string()) };
        assert_eq!(query.params(), vec![("source", "draft".to_string())]);
    }
}
