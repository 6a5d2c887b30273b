//! Read-only views: status, banks, bible collections and gold statistics

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use shared::{Bank, SchemaQuery, StatusPayload};
use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::ConsoleApi;

pub const STATUS_FAILED: &str = "Failed to load status";
pub const BANKS_FAILED: &str = "Failed to load banks";
pub const GOLD_FAILED: &str = "Failed to load gold stats";

/// Bible collections the service exposes
#[derive(Debug, Clone, PartialEq)]
pub enum BibleView {
    Schemas(SchemaQuery),
    Compat,
    Lexicon,
    Metaphors { validate: bool },
    Frames,
    BlendRules,
}

impl BibleView {
    /// Key of the entry list inside the payload, when the view has one
    pub fn collection_key(&self) -> Option<&'static str> {
        match self {
            BibleView::Schemas(_) => Some("schemas"),
            BibleView::Metaphors { .. } => Some("metaphors"),
            BibleView::Frames => Some("frames"),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> String {
        format!("Failed to fetch {}", self)
    }
}

impl fmt::Display for BibleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BibleView::Schemas(_) => "schemas",
            BibleView::Compat => "schema compatibility",
            BibleView::Lexicon => "lexicon",
            BibleView::Metaphors { .. } => "metaphors",
            BibleView::Frames => "frames",
            BibleView::BlendRules => "blend rules",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for BibleView {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "schemas" => Ok(BibleView::Schemas(SchemaQuery::default())),
            "compat" => Ok(BibleView::Compat),
            "lexicon" => Ok(BibleView::Lexicon),
            "metaphors" => Ok(BibleView::Metaphors { validate: false }),
            "frames" => Ok(BibleView::Frames),
            "blend_rules" | "blend-rules" => Ok(BibleView::BlendRules),
            other => Err(ConsoleError::validation(format!("Unknown bible view: {}", other))),
        }
    }
}

pub async fn status<A: ConsoleApi + ?Sized>(api: &A) -> ConsoleResult<StatusPayload> {
    api.status().await
}

pub async fn banks<A: ConsoleApi + ?Sized>(api: &A) -> ConsoleResult<Vec<Bank>> {
    api.banks().await
}

pub async fn gold_stats<A: ConsoleApi + ?Sized>(api: &A) -> ConsoleResult<Value> {
    api.gold_stats().await
}

pub async fn bible<A: ConsoleApi + ?Sized>(api: &A, view: &BibleView) -> ConsoleResult<Value> {
    match view {
        BibleView::Schemas(query) => api.schemas(query.clone()).await,
        BibleView::Compat => api.schemas_compat().await,
        BibleView::Lexicon => api.schemas_lexicon().await,
        BibleView::Metaphors { validate } => api.metaphors(*validate).await,
        BibleView::Frames => api.frames().await,
        BibleView::BlendRules => api.blend_rules().await,
    }
}

/// Entries of a bible payload whose id, or any lexicon lemma, contains `term`
///
/// A blank term keeps every entry. Views without an entry list yield nothing.
pub fn filter_entries(view: &BibleView, payload: &Value, term: &str) -> Vec<Value> {
    let entries = match view.collection_key().and_then(|key| payload.get(key)) {
        Some(Value::Array(entries)) => entries,
        _ => return Vec::new(),
    };
    let term = term.trim().to_lowercase();

    entries
        .iter()
        .filter(|entry| term.is_empty() || entry_matches(entry, &term))
        .cloned()
        .collect()
}

fn entry_matches(entry: &Value, term: &str) -> bool {
    let contains = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(|text| text.to_lowercase().contains(term))
            .unwrap_or(false)
    };
    if contains(entry.get("id")) {
        return true;
    }

    entry
        .get("lexicon")
        .and_then(Value::as_object)
        .map(|lexicon| {
            lexicon
                .values()
                .filter_map(Value::as_array)
                .flatten()
                .any(|lemma| contains(lemma.get("lemma")))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas_payload() -> Value {
        json!({
            "schemas": [
                { "id": "path", "lexicon": { "en": [{ "lemma": "road" }], "fa": [{ "lemma": "rah" }] } },
                { "id": "container", "lexicon": { "en": [{ "lemma": "box" }] } },
                { "id": "balance" }
            ],
            "summary": { "count": 3 }
        })
    }

    #[test]
    fn test_filter_by_id_and_lemma() {
        let view = BibleView::Schemas(SchemaQuery::default());
        let payload = schemas_payload();

        assert_eq!(filter_entries(&view, &payload, "").len(), 3);
        assert_eq!(filter_entries(&view, &payload, "CONT")[0]["id"], "container");
        assert_eq!(filter_entries(&view, &payload, "rah")[0]["id"], "path");
        assert!(filter_entries(&view, &payload, "zzz").is_empty());
    }

    #[test]
    fn test_views_without_entries() {
        assert!(filter_entries(&BibleView::BlendRules, &json!({ "rules": [] }), "").is_empty());
        assert!(filter_entries(&BibleView::Frames, &json!({}), "").is_empty());
    }

    #[test]
    fn test_parse_view() {
        assert_eq!("Frames".parse::<BibleView>().unwrap(), BibleView::Frames);
        assert_eq!("blend-rules".parse::<BibleView>().unwrap(), BibleView::BlendRules);
        assert!("gates".parse::<BibleView>().is_err());
        assert_eq!(BibleView::Compat.failure_message(), "Failed to fetch schema compatibility");
    }
}
