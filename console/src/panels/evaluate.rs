//! Piece evaluation, batch evaluation and frame checks

use serde_json::{json, Value};

use shared::{BatchItem, EvaluateRequest, FramecheckRequest};
use crate::error::{ConsoleError, ConsoleResult};
use crate::panels::{parse_json_field, required};
use crate::traits::ConsoleApi;

pub const FAILED: &str = "Evaluation failed";
pub const BATCH_FAILED: &str = "Batch evaluation failed";
pub const FRAMECHECK_FAILED: &str = "Framecheck failed";

pub const MISSING_PIECE: &str = "Provide a piece to evaluate";
pub const EMPTY_BATCH: &str = "Batch payload must be a non-empty JSON array";
pub const MISSING_FRAME: &str = "Frame ID is required";
pub const MISSING_FRAMECHECK_INPUT: &str = "Provide either an active state or a trace payload";

/// Evaluate a single piece; a blank trace is sent as `{}`
pub async fn evaluate<A: ConsoleApi + ?Sized>(api: &A, piece: &str, trace_json: &str) -> ConsoleResult<Value> {
    if piece.trim().is_empty() {
        return Err(ConsoleError::validation(MISSING_PIECE));
    }
    let trace = parse_json_field("Trace", trace_json)?.unwrap_or_else(|| json!({}));

    let result = api
        .evaluate(EvaluateRequest { piece: piece.to_string(), trace })
        .await?;
    if result.is_null() {
        return Err(ConsoleError::missing_data("evaluation"));
    }
    Ok(result)
}

/// Parse a batch payload: a non-empty JSON array of items
pub fn parse_batch(raw: &str) -> ConsoleResult<Vec<BatchItem>> {
    let value = parse_json_field("Batch", raw)?.unwrap_or(Value::Null);
    let entries = match value {
        Value::Array(entries) if !entries.is_empty() => entries,
        _ => return Err(ConsoleError::validation(EMPTY_BATCH)),
    };

    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(|e| ConsoleError::malformed("Batch", &e)))
        .collect()
}

pub async fn evaluate_batch<A: ConsoleApi + ?Sized>(api: &A, raw: &str) -> ConsoleResult<Value> {
    let items = parse_batch(raw)?;
    api.evaluate_batch(items).await
}

/// Check a frame against an active state, a trace, or both
pub async fn framecheck<A: ConsoleApi + ?Sized>(
    api: &A,
    frame_id: &str,
    active_json: &str,
    trace_json: &str,
) -> ConsoleResult<Value> {
    let frame_id = required(frame_id, MISSING_FRAME)?;
    let active = parse_json_field("Active", active_json)?;
    let trace = parse_json_field("Trace", trace_json)?;
    if active.is_none() && trace.is_none() {
        return Err(ConsoleError::validation(MISSING_FRAMECHECK_INPUT));
    }

    api.framecheck(FramecheckRequest { frame_id, active, trace }).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_rejects_empty_and_non_arrays() {
        for raw in ["", "[]", r#"{"id":"a"}"#, "42"] {
            let error = parse_batch(raw).unwrap_err();
            assert_eq!(error.to_string(), EMPTY_BATCH, "input {:?}", raw);
        }
    }

    #[test]
    fn test_parse_batch_reports_syntax_errors() {
        let error = parse_batch("[{").unwrap_err();
        assert!(error.to_string().starts_with("Batch JSON invalid: "));
    }

    #[test]
    fn test_parse_batch_items() {
        let items = parse_batch(r#"[{"id":"a","piece":"The door opened.","tag":"x"},{"piece":"Again."}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, json!("a"));
        assert_eq!(items[0].extra["tag"], "x");
        assert!(items[1].id.is_null());
    }
}
