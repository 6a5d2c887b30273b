//! Console wiring with dependency injection

use std::sync::Arc;
use std::time::Duration;

use shared::{logging, process_info, process_warn, Bank, ProcessId, RetrievalHit, StatusPayload};
use crate::compose::ComposeWorkflow;
use crate::error::ConsoleResult;
use crate::services::health_monitor::{HealthMonitor, HealthMonitorHandle};
use crate::state::AppState;
use crate::traits::ConsoleApi;

/// Service boundary plus the state every surface shares
pub struct Console<A: ConsoleApi> {
    api: Arc<A>,
    state: AppState,
}

impl<A: ConsoleApi> Clone for Console<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A: ConsoleApi + 'static> Console<A> {
    pub fn new(api: Arc<A>, state: AppState) -> Self {
        Self { api, state }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Load banks and the server's harness suggestion. Failures are logged and
    /// leave the console usable.
    pub async fn bootstrap(&self) {
        if let Err(e) = self.refresh_banks().await {
            logging::log_error(ProcessId::current(), "Loading banks", &e);
        }
        if let Err(e) = self.refresh_status().await {
            logging::log_error(ProcessId::current(), "Loading status", &e);
        }
    }

    pub async fn refresh_banks(&self) -> ConsoleResult<Vec<Bank>> {
        let banks = self.api.banks().await?;
        process_info!(ProcessId::current(), "🏦 {} bank(s) available", banks.len());
        self.state.set_banks(banks.clone()).await;
        Ok(banks)
    }

    /// Fetch `/status` and adopt its harness default unless one is pinned
    pub async fn refresh_status(&self) -> ConsoleResult<StatusPayload> {
        let status = self.api.status().await?;
        if let Some(suggested) = status.suggested_harness() {
            self.state.config.apply_server_default(suggested);
        }
        Ok(status)
    }

    /// Pick up the server's harness default before a one-shot request unless
    /// the operator pinned one. A failed `/status` keeps the current harness.
    pub async fn sync_server_harness(&self) {
        if self.state.config.is_harness_pinned() {
            return;
        }
        if let Err(e) = self.refresh_status().await {
            logging::log_error(ProcessId::current(), "Loading status", &e);
        }
    }

    /// Start polling `/health` into the shared status
    pub fn start_health_monitor(&self, period: Duration) -> HealthMonitorHandle {
        process_info!(ProcessId::current(), "🩺 Health polling every {}s", period.as_secs());
        HealthMonitor::new(self.api.clone(), self.state.health.clone())
            .with_period(period)
            .spawn()
    }

    pub fn compose_session(&self) -> ComposeWorkflow<A> {
        ComposeWorkflow::new(self.api.clone())
    }

    /// Apply a bankset chosen by the operator; unknown ids are kept but reported
    pub async fn apply_bankset(&self, ids: Vec<String>) -> Vec<String> {
        let applied = self.state.config.set_bankset(ids);

        let known = self.state.banks().await;
        if !known.is_empty() {
            for id in applied.iter().filter(|id| !known.iter().any(|bank| &bank.bank_id == *id)) {
                process_warn!(ProcessId::current(), "⚠️ Bank '{}' is not offered by the service", id);
            }
        }
        applied
    }

    pub fn set_harness(&self, candidate: &str) -> String {
        self.state.config.set_harness(candidate)
    }

    /// Promote a retrieval hit to the active selection
    pub fn activate(&self, hit: RetrievalHit) -> bool {
        self.state.selections.activate_hit(hit)
    }
}
