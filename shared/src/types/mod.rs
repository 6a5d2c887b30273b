//! Core types used throughout the console

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::SharedError;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Which console surface is running in this process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// One-shot command invocation
    Cli,
    /// Interactive shell session
    Shell,
}

impl ProcessId {
    /// Initialize the global process ID for a one-shot command
    pub fn init_cli() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Cli)
    }

    /// Initialize the global process ID for the interactive shell
    pub fn init_shell() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Shell)
    }

    /// Get the global process ID, `Cli` until one of the init functions ran
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&ProcessId::Cli)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Cli => write!(f, "cli"),
            ProcessId::Shell => write!(f, "shell"),
        }
    }
}

/// Unique identifier for a compose session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of documents that can be promoted to active status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Schemas,
    Metaphors,
    Frames,
    Gates,
}

impl SelectionKind {
    pub const ALL: [SelectionKind; 4] = [
        SelectionKind::Schemas,
        SelectionKind::Metaphors,
        SelectionKind::Frames,
        SelectionKind::Gates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Schemas => "schemas",
            SelectionKind::Metaphors => "metaphors",
            SelectionKind::Frames => "frames",
            SelectionKind::Gates => "gates",
        }
    }

    /// Map a retrieval hit kind (`schema`, `metaphor`, ...) to its selection bucket.
    /// Anything unrecognised is treated as a gate.
    pub fn from_hit_kind(kind: &str) -> Self {
        match kind {
            "schema" => SelectionKind::Schemas,
            "metaphor" => SelectionKind::Metaphors,
            "frame" => SelectionKind::Frames,
            _ => SelectionKind::Gates,
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SelectionKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "schemas" | "schema" => Ok(SelectionKind::Schemas),
            "metaphors" | "metaphor" => Ok(SelectionKind::Metaphors),
            "frames" | "frame" => Ok(SelectionKind::Frames),
            "gates" | "gate" => Ok(SelectionKind::Gates),
            _ => Err(SharedError::UnknownSelectionKind { input: s.to_string() }),
        }
    }
}

/// A single document returned by retrieval search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub doc_id: String,
    pub kind: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub tags: Vec<String>,
    /// Any further fields the service attached, kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RetrievalHit {
    pub fn new(doc_id: impl Into<String>, kind: impl Into<String>, score: f64) -> Self {
        Self {
            doc_id: doc_id.into(),
            kind: kind.into(),
            score,
            tags: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn selection_kind(&self) -> SelectionKind {
        SelectionKind::from_hit_kind(&self.kind)
    }
}

/// Documents held in the active selection cache are retrieval hits
pub type ActiveDocument = RetrievalHit;

/// Server-side content bank (read-only snapshot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub bank_id: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub root: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub files: BTreeMap<String, Value>,
}

/// Passive service health as last observed by the monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthStatus {
    Unknown,
    Ok { details: Value, checked_at: DateTime<Utc> },
    Error { message: String, checked_at: DateTime<Utc> },
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Ok { .. } => "ok",
            HealthStatus::Error { .. } => "error",
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Error { .. })
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::Unknown
    }
}

/// One normalized sample of a curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub beat: String,
    pub value: f64,
}

/// One beat of an aligned before/after curve; absent values stay `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub beat: String,
    pub before: Option<f64>,
    pub after: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_kind_mapping() {
        assert_eq!(SelectionKind::from_hit_kind("schema"), SelectionKind::Schemas);
        assert_eq!(SelectionKind::from_hit_kind("metaphor"), SelectionKind::Metaphors);
        assert_eq!(SelectionKind::from_hit_kind("frame"), SelectionKind::Frames);
        assert_eq!(SelectionKind::from_hit_kind("exemplar"), SelectionKind::Gates);
    }

    #[test]
    fn test_selection_kind_parsing() {
        assert_eq!("Schemas".parse::<SelectionKind>().unwrap(), SelectionKind::Schemas);
        assert_eq!("gate".parse::<SelectionKind>().unwrap(), SelectionKind::Gates);
        assert!("poles".parse::<SelectionKind>().is_err());
    }

    #[test]
    fn test_retrieval_hit_keeps_extra_fields() {
        let hit: RetrievalHit = serde_json::from_value(serde_json::json!({
            "doc_id": "path",
            "kind": "schema",
            "score": 0.82,
            "tags": ["motion"],
            "title": "Source-Path-Goal"
        }))
        .unwrap();

        assert_eq!(hit.selection_kind(), SelectionKind::Schemas);
        assert_eq!(hit.extra.get("title"), Some(&serde_json::json!("Source-Path-Goal")));
    }

    #[test]
    fn test_null_hit_fields_read_as_empty() {
        let hit: RetrievalHit = serde_json::from_value(serde_json::json!({
            "doc_id": "threshold",
            "kind": "exemplar",
            "score": null,
            "tags": null
        }))
        .unwrap();

        assert_eq!(hit.score, 0.0);
        assert!(hit.tags.is_empty());
    }

    #[test]
    fn test_null_bank_fields_read_as_empty() {
        let bank: Bank = serde_json::from_value(serde_json::json!({
            "bank_id": "noir",
            "version": null,
            "root": null,
            "files": null
        }))
        .unwrap();

        assert_eq!(bank.version, "");
        assert!(bank.files.is_empty());
    }

    #[test]
    fn test_health_status_serialization() {
        let value = serde_json::to_value(HealthStatus::Unknown).unwrap();
        assert_eq!(value, serde_json::json!({"status": "unknown"}));
    }
}
