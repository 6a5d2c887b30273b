//! Tests for HealthMonitor using a mocked service boundary

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::RwLock;

use shared::HealthStatus;
use crate::error::ConsoleError;
use crate::services::health_monitor::HealthMonitor;
use crate::traits::MockConsoleApi;

fn shared_health() -> Arc<RwLock<HealthStatus>> {
    Arc::new(RwLock::new(HealthStatus::default()))
}

#[tokio::test]
async fn test_successful_check_records_details() {
    let mut api = MockConsoleApi::new();
    api.expect_health()
        .times(1)
        .returning(|| Ok(json!({ "status": "ok", "version": "0.9.0" })));

    let health = shared_health();
    let monitor = HealthMonitor::new(Arc::new(api), health.clone());

    let status = monitor.check_once().await;
    assert_eq!(status.label(), "ok");

    match &*health.read().await {
        HealthStatus::Ok { details, .. } => assert_eq!(details["version"], "0.9.0"),
        other => panic!("expected ok status, got {:?}", other),
    };
}

#[tokio::test]
async fn test_failed_check_marks_degraded() {
    let mut api = MockConsoleApi::new();
    api.expect_health().times(1).returning(|| {
        Err(ConsoleError::Service {
            status: Some(503),
            errors: Vec::new(),
            message: "Request failed with status code 503".to_string(),
        })
    });

    let health = shared_health();
    let monitor = HealthMonitor::new(Arc::new(api), health.clone());
    monitor.check_once().await;

    let status = health.read().await.clone();
    assert!(status.is_degraded());
    match status {
        HealthStatus::Error { message, .. } => assert_eq!(message, "Request failed with status code 503"),
        other => panic!("expected error status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_recovery_after_failure() {
    let mut api = MockConsoleApi::new();
    let mut sequence = mockall::Sequence::new();
    api.expect_health()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Err(ConsoleError::validation("connection refused")));
    api.expect_health()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(json!({ "status": "ok" })));

    let health = shared_health();
    let monitor = HealthMonitor::new(Arc::new(api), health.clone());

    assert!(monitor.check_once().await.is_degraded());
    assert_eq!(monitor.check_once().await.label(), "ok");
    assert!(!health.read().await.is_degraded());
}

#[tokio::test]
async fn test_spawned_monitor_polls_until_dropped() {
    let mut api = MockConsoleApi::new();
    api.expect_health().returning(|| Ok(json!({ "status": "ok" })));

    let health = shared_health();
    let handle = HealthMonitor::new(Arc::new(api), health.clone())
        .with_period(Duration::from_millis(10))
        .spawn();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_running());
    assert_eq!(health.read().await.label(), "ok");

    handle.stop();
}
