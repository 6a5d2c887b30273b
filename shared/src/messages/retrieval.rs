//! Retrieval search bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::RetrievalHit;

/// `POST /retrieval/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub k: u32,
    pub kinds: Vec<String>,
}

impl SearchRequest {
    pub const DEFAULT_K: u32 = 8;

    /// Kinds searched when the caller names none
    pub fn default_kinds() -> Vec<String> {
        vec!["schema".to_string(), "metaphor".to_string(), "frame".to_string()]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub hits: Vec<RetrievalHit>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_hits_read_as_no_hits() {
        let result: SearchResult = serde_json::from_value(json!({"hits": null})).unwrap();
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_hits_with_null_score_still_parse() {
        let result: SearchResult = serde_json::from_value(json!({
            "hits": [{"doc_id": "path", "kind": "schema", "score": null, "tags": null}]
        }))
        .unwrap();

        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].score, 0.0);
    }
}
