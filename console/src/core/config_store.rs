//! Bankset and harness configuration
//!
//! Both values survive restarts through a [`ConfigStorage`] backend. Reads are
//! synchronous so the gateway can compute the bank header right before each call.

use std::sync::{Arc, PoisonError, RwLock};

use shared::{process_debug, process_info, process_warn, ProcessId};
use crate::services::config_storage::MemoryConfigStorage;
use crate::traits::ConfigStorage;

/// Storage key of the bankset (JSON list text)
pub const BANKSET_KEY: &str = "sv-bankset";
/// Storage key of the harness (raw string)
pub const HARNESS_KEY: &str = "sv-harness";

pub const DEFAULT_BANK: &str = "default";
pub const DEFAULT_HARNESS: &str = "echo";
/// Harness identifiers the service ships with
pub const HARNESS_PRESETS: [&str; 2] = ["echo", "openai"];

/// How a harness identifier was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessKind {
    Preset,
    Custom,
}

/// Coerce operator input into a stored harness value
pub fn normalize_harness(candidate: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return DEFAULT_HARNESS.to_string();
    }
    let lowered = trimmed.to_lowercase();
    if HARNESS_PRESETS.contains(&lowered.as_str()) {
        lowered
    } else {
        trimmed.to_string()
    }
}

pub fn classify_harness(value: &str) -> HarnessKind {
    if HARNESS_PRESETS.contains(&value) {
        HarnessKind::Preset
    } else {
        HarnessKind::Custom
    }
}

/// Interpret persisted bankset text.
///
/// A JSON list is used as-is; any other text is a single bank id.
pub fn parse_persisted_bankset(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return vec![DEFAULT_BANK.to_string()];
    }

    let ids = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(id) => id,
                other => other.to_string(),
            })
            .collect(),
        _ => vec![raw.to_string()],
    };

    if ids.is_empty() {
        vec![DEFAULT_BANK.to_string()]
    } else {
        ids
    }
}

#[derive(Debug, Clone)]
struct ConfigValues {
    bankset: Vec<String>,
    harness: String,
    pinned: bool,
}

/// Process-wide bankset and harness
pub struct ConfigStore {
    values: RwLock<ConfigValues>,
    storage: Arc<dyn ConfigStorage>,
}

impl ConfigStore {
    /// Restore configuration from storage, falling back to defaults
    pub fn load(storage: Arc<dyn ConfigStorage>) -> Self {
        let bankset = match storage.load(BANKSET_KEY) {
            Ok(Some(raw)) => parse_persisted_bankset(&raw),
            Ok(None) => vec![DEFAULT_BANK.to_string()],
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Could not read persisted bankset: {}", e);
                vec![DEFAULT_BANK.to_string()]
            }
        };

        let (harness, pinned) = match storage.load(HARNESS_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => (normalize_harness(&raw), true),
            Ok(_) => (DEFAULT_HARNESS.to_string(), false),
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Could not read persisted harness: {}", e);
                (DEFAULT_HARNESS.to_string(), false)
            }
        };

        process_debug!(
            ProcessId::current(),
            "Loaded config: bankset={:?}, harness={} (pinned: {})",
            bankset,
            harness,
            pinned
        );

        Self {
            values: RwLock::new(ConfigValues { bankset, harness, pinned }),
            storage,
        }
    }

    /// Fresh configuration that is never written to disk
    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryConfigStorage::new()))
    }

    pub fn bankset(&self) -> Vec<String> {
        self.read().bankset.clone()
    }

    /// Replace the bankset with the ids as given; an empty candidate selects
    /// the default bank
    pub fn set_bankset<I, S>(&self, candidate: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = candidate.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            ids.push(DEFAULT_BANK.to_string());
        }

        self.write().bankset = ids.clone();
        process_info!(ProcessId::current(), "🏦 Bankset set to {}", ids.join(","));

        match serde_json::to_string(&ids) {
            Ok(text) => self.persist(BANKSET_KEY, &text),
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Could not serialize bankset: {}", e);
            }
        }
        ids
    }

    pub fn harness(&self) -> String {
        self.read().harness.clone()
    }

    pub fn harness_kind(&self) -> HarnessKind {
        classify_harness(&self.read().harness)
    }

    /// Whether the operator chose the harness (explicitly or in an earlier run)
    pub fn is_harness_pinned(&self) -> bool {
        self.read().pinned
    }

    /// Store an operator-chosen harness and pin it
    pub fn set_harness(&self, candidate: &str) -> String {
        let harness = normalize_harness(candidate);
        {
            let mut values = self.write();
            values.harness = harness.clone();
            values.pinned = true;
        }
        process_info!(ProcessId::current(), "🔧 Harness set to {}", harness);
        self.persist(HARNESS_KEY, &harness);
        harness
    }

    /// Adopt a server-suggested harness unless the operator pinned one.
    /// Returns whether the suggestion was applied.
    pub fn apply_server_default(&self, candidate: &str) -> bool {
        if candidate.trim().is_empty() {
            return false;
        }

        let mut values = self.write();
        if values.pinned {
            process_debug!(
                ProcessId::current(),
                "Ignoring server harness '{}', '{}' is pinned",
                candidate.trim(),
                values.harness
            );
            return false;
        }
        values.harness = normalize_harness(candidate);
        process_debug!(ProcessId::current(), "Using server harness default '{}'", values.harness);
        true
    }

    /// Value of the bank header, `None` when the header must be omitted
    pub fn bank_header_value(&self) -> Option<String> {
        Self::header_value(&self.read().bankset)
    }

    pub fn header_value(bankset: &[String]) -> Option<String> {
        if bankset.is_empty() {
            None
        } else {
            Some(bankset.join(","))
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.save(key, value) {
            process_warn!(ProcessId::current(), "⚠️ Could not persist {}: {}", key, e);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ConfigValues> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ConfigValues> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}
