//! Recurring health poll
//!
//! Writes only the shared health status. A failed check marks the status as
//! degraded and is logged; it never reaches workflow code.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use shared::{process_debug, process_warn, HealthStatus, ProcessId};
use crate::traits::ConsoleApi;

pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Polls `GET /health` into a shared [`HealthStatus`]
pub struct HealthMonitor<A: ConsoleApi> {
    api: Arc<A>,
    health: Arc<RwLock<HealthStatus>>,
    period: Duration,
}

impl<A: ConsoleApi + 'static> HealthMonitor<A> {
    pub fn new(api: Arc<A>, health: Arc<RwLock<HealthStatus>>) -> Self {
        Self {
            api,
            health,
            period: DEFAULT_HEALTH_INTERVAL,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run a single check and record its outcome
    pub async fn check_once(&self) -> HealthStatus {
        let status = match self.api.health().await {
            Ok(details) => HealthStatus::Ok {
                details,
                checked_at: Utc::now(),
            },
            Err(e) => {
                process_warn!(ProcessId::current(), "⚠️ Health check failed: {}", e);
                HealthStatus::Error {
                    message: e.user_message("Health check failed"),
                    checked_at: Utc::now(),
                }
            }
        };

        process_debug!(ProcessId::current(), "🩺 Service health: {}", status.label());
        *self.health.write().await = status.clone();
        status
    }

    /// Check immediately, then once per period until the handle is dropped
    pub fn spawn(self) -> HealthMonitorHandle {
        let task = tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.check_once().await;
            }
        });

        HealthMonitorHandle { task }
    }
}

/// Stops the polling task when dropped
pub struct HealthMonitorHandle {
    task: JoinHandle<()>,
}

impl HealthMonitorHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for HealthMonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
