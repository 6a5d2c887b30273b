//! Retrieval search over the configured banks

use shared::{process_info, ProcessId, RetrievalHit, SearchRequest, SearchResult};
use crate::core::ActiveSelectionCache;
use crate::error::ConsoleResult;
use crate::panels::required;
use crate::traits::ConsoleApi;

pub const FAILED: &str = "Search failed";
pub const MISSING_QUERY: &str = "Enter a search query";
/// Kinds the service can search
pub const AVAILABLE_KINDS: [&str; 4] = ["schema", "metaphor", "frame", "exemplar"];

#[derive(Debug, Clone)]
pub struct SearchInput {
    pub query: String,
    pub k: u32,
    /// Empty searches the default kinds
    pub kinds: Vec<String>,
}

impl SearchInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: SearchRequest::DEFAULT_K,
            kinds: SearchRequest::default_kinds(),
        }
    }
}

/// A hit together with whether it is already active
#[derive(Debug, Clone, PartialEq)]
pub struct HitView {
    pub hit: RetrievalHit,
    pub active: bool,
}

pub async fn search<A: ConsoleApi + ?Sized>(api: &A, input: SearchInput) -> ConsoleResult<SearchResult> {
    let query = required(&input.query, MISSING_QUERY)?;
    let kinds: Vec<String> = input
        .kinds
        .iter()
        .map(|kind| kind.trim().to_lowercase())
        .filter(|kind| !kind.is_empty())
        .collect();
    let kinds = if kinds.is_empty() { SearchRequest::default_kinds() } else { kinds };

    let result = api
        .search(SearchRequest { query, k: input.k.max(1), kinds })
        .await?;
    process_info!(ProcessId::current(), "🔎 {} hit(s)", result.hits.len());
    Ok(result)
}

/// Mark each hit that is already in the active selection
pub fn annotate_hits(hits: &[RetrievalHit], selections: &ActiveSelectionCache) -> Vec<HitView> {
    hits.iter()
        .map(|hit| HitView {
            active: selections.contains_hit(hit),
            hit: hit.clone(),
        })
        .collect()
}
