//! Active selection cache
//!
//! Retrieval hits the operator promoted to "active", grouped by kind and unique
//! by `doc_id` within a kind. Lives for one session and is never persisted.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use shared::{process_debug, ActiveDocument, ProcessId, RetrievalHit, SelectionKind};

/// Kind → ordered documents
pub type ActiveSnapshot = BTreeMap<SelectionKind, Vec<ActiveDocument>>;

#[derive(Default)]
pub struct ActiveSelectionCache {
    entries: RwLock<ActiveSnapshot>,
}

impl ActiveSelectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `document` under `kind`. A document already present by `doc_id`
    /// is left in place and `false` is returned.
    pub fn add(&self, kind: SelectionKind, document: ActiveDocument) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let documents = entries.entry(kind).or_default();

        if documents.iter().any(|existing| existing.doc_id == document.doc_id) {
            process_debug!(
                ProcessId::current(),
                "{} already active under {}, skipping",
                document.doc_id,
                kind
            );
            return false;
        }

        documents.push(document);
        true
    }

    /// Promote a retrieval hit into the bucket its kind maps to
    pub fn activate_hit(&self, hit: RetrievalHit) -> bool {
        let kind = hit.selection_kind();
        self.add(kind, hit)
    }

    /// Remove the first document matching `doc_id`; returns whether one was removed
    pub fn remove(&self, kind: SelectionKind, doc_id: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(documents) = entries.get_mut(&kind) else {
            return false;
        };

        match documents.iter().position(|document| document.doc_id == doc_id) {
            Some(index) => {
                documents.remove(index);
                true
            }
            None => false,
        }
    }

    /// Clear one kind, or everything when `kind` is `None`
    pub fn clear(&self, kind: Option<SelectionKind>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match kind {
            Some(kind) => {
                entries.remove(&kind);
            }
            None => entries.clear(),
        }
    }

    pub fn contains(&self, kind: SelectionKind, doc_id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map(|documents| documents.iter().any(|document| document.doc_id == doc_id))
            .unwrap_or(false)
    }

    /// Whether a hit is already active under the kind it maps to
    pub fn contains_hit(&self, hit: &RetrievalHit) -> bool {
        self.contains(hit.selection_kind(), &hit.doc_id)
    }

    pub fn documents(&self, kind: SelectionKind) -> Vec<ActiveDocument> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Non-empty kinds with their documents
    pub fn snapshot(&self) -> ActiveSnapshot {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(kind, documents)| (*kind, documents.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The selection as `{ "schemas": [...], ... }`, every kind present
    pub fn to_payload(&self) -> Value {
        let snapshot = self.snapshot();
        let mut payload = serde_json::Map::new();
        for kind in SelectionKind::ALL {
            let documents = snapshot.get(&kind).cloned().unwrap_or_default();
            payload.insert(
                kind.as_str().to_string(),
                serde_json::to_value(documents).unwrap_or(Value::Array(Vec::new())),
            );
        }
        Value::Object(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(doc_id: &str, kind: &str) -> RetrievalHit {
        RetrievalHit::new(doc_id, kind, 0.5)
    }

    #[test]
    fn test_duplicate_add_keeps_single_entry() {
        let cache = ActiveSelectionCache::new();
        for kind in SelectionKind::ALL {
            assert!(cache.add(kind, hit("path", "schema")));
            assert!(!cache.add(kind, hit("path", "schema")));
            assert_eq!(
                cache.documents(kind).iter().filter(|d| d.doc_id == "path").count(),
                1
            );
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_same_doc_id_under_different_kinds() {
        let cache = ActiveSelectionCache::new();
        cache.add(SelectionKind::Schemas, hit("light", "schema"));
        cache.add(SelectionKind::Metaphors, hit("light", "metaphor"));

        assert!(cache.contains(SelectionKind::Schemas, "light"));
        assert!(cache.contains(SelectionKind::Metaphors, "light"));
        assert!(!cache.contains(SelectionKind::Frames, "light"));
    }

    #[test]
    fn test_remove_then_contains_is_false() {
        let cache = ActiveSelectionCache::new();
        cache.add(SelectionKind::Frames, hit("journey", "frame"));

        assert!(cache.remove(SelectionKind::Frames, "journey"));
        assert!(!cache.contains(SelectionKind::Frames, "journey"));

        assert!(!cache.remove(SelectionKind::Frames, "never-added"));
        assert!(!cache.contains(SelectionKind::Frames, "never-added"));
    }

    #[test]
    fn test_clear_one_kind_or_all() {
        let cache = ActiveSelectionCache::new();
        cache.add(SelectionKind::Schemas, hit("path", "schema"));
        cache.add(SelectionKind::Gates, hit("g1", "gate"));

        cache.clear(Some(SelectionKind::Schemas));
        assert!(!cache.contains(SelectionKind::Schemas, "path"));
        assert!(cache.contains(SelectionKind::Gates, "g1"));

        cache.clear(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_activate_hit_maps_kind() {
        let cache = ActiveSelectionCache::new();
        assert!(cache.activate_hit(hit("ex-1", "exemplar")));
        assert!(cache.contains(SelectionKind::Gates, "ex-1"));
        assert!(cache.contains_hit(&hit("ex-1", "exemplar")));
    }

    #[test]
    fn test_order_is_preserved() {
        let cache = ActiveSelectionCache::new();
        for id in ["c", "a", "b"] {
            cache.add(SelectionKind::Metaphors, hit(id, "metaphor"));
        }
        let ids: Vec<_> = cache
            .documents(SelectionKind::Metaphors)
            .into_iter()
            .map(|d| d.doc_id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_payload_lists_every_kind() {
        let cache = ActiveSelectionCache::new();
        cache.add(SelectionKind::Schemas, hit("path", "schema"));
        let payload = cache.to_payload();

        assert_eq!(payload["schemas"][0]["doc_id"], "path");
        assert_eq!(payload["gates"], serde_json::json!([]));
    }
}
