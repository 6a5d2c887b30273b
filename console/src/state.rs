//! Application state shared by every console surface
//!
//! Passed explicitly to whatever needs it; nothing here is global.

use std::sync::Arc;
use tokio::sync::RwLock;

use shared::{Bank, HealthStatus};
use crate::core::{ActiveSelectionCache, ConfigStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub selections: Arc<ActiveSelectionCache>,
    pub health: Arc<RwLock<HealthStatus>>,
    pub banks: Arc<RwLock<Vec<Bank>>>,
}

impl AppState {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            config,
            selections: Arc::new(ActiveSelectionCache::new()),
            health: Arc::new(RwLock::new(HealthStatus::default())),
            banks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Isolated state with in-memory configuration
    pub fn in_memory() -> Self {
        Self::new(Arc::new(ConfigStore::in_memory()))
    }

    pub async fn health(&self) -> HealthStatus {
        self.health.read().await.clone()
    }

    pub async fn banks(&self) -> Vec<Bank> {
        self.banks.read().await.clone()
    }

    pub async fn set_banks(&self, banks: Vec<Bank>) {
        *self.banks.write().await = banks;
    }
}
