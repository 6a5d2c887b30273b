//! One-shot generation

use serde_json::Value;

use shared::{process_info, GenerateRequest, ProcessId};
use crate::core::workflow::{to_list, MISSING_FRAME_OR_QUERY};
use crate::core::ConfigStore;
use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::ConsoleApi;

pub const FAILED: &str = "Generation failed";
pub const MISSING_HARNESS: &str = "Provide a harness identifier before generating";

#[derive(Debug, Clone, Default)]
pub struct GenerateInput {
    pub frame_id: String,
    pub query: String,
    /// Comma separated
    pub beats: String,
    /// Explicit harness; `None` uses the configured one
    pub llm: Option<String>,
}

/// Generate a piece. A successful run with an explicit harness pins it.
pub async fn generate<A: ConsoleApi + ?Sized>(api: &A, config: &ConfigStore, input: GenerateInput) -> ConsoleResult<Value> {
    let frame_id = input.frame_id.trim().to_string();
    if frame_id.is_empty() || input.query.trim().is_empty() {
        return Err(ConsoleError::validation(MISSING_FRAME_OR_QUERY));
    }

    let explicit = match input.llm.as_deref() {
        Some(llm) if llm.trim().is_empty() => return Err(ConsoleError::validation(MISSING_HARNESS)),
        Some(llm) => Some(llm.trim().to_string()),
        None => None,
    };
    let llm = explicit.clone().unwrap_or_else(|| config.harness());

    process_info!(ProcessId::current(), "⚙️ Generating for frame {} with harness {}", frame_id, llm);
    let result = api
        .generate(GenerateRequest {
            frame_id,
            query: input.query,
            beats: to_list(&input.beats),
            llm: Some(llm),
        })
        .await?;

    if let Some(explicit) = explicit {
        config.set_harness(&explicit);
    }
    Ok(result)
}
