//! Test helpers and builders for console tests

use std::sync::Arc;

use shared::StatusPayload;
use sv_console::*;

use super::fixtures::TestFixtures;

/// Builder for a [`Console`] backed by a [`MockConsoleApi`]
pub struct ConsoleBuilder {
    api: MockConsoleApi,
    state: AppState,
}

impl ConsoleBuilder {
    pub fn new() -> Self {
        Self {
            api: MockConsoleApi::new(),
            state: AppState::in_memory(),
        }
    }

    /// Configure the API mock with a setup function
    pub fn with_api<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockConsoleApi),
    {
        setup(&mut self.api);
        self
    }

    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = state;
        self
    }

    pub fn build(self) -> Console<MockConsoleApi> {
        Console::new(Arc::new(self.api), self.state)
    }
}

/// Common expectations and assertions
pub struct TestHelpers;

impl TestHelpers {
    /// Mock that answers the standard plan, compose and beat exactly once each
    pub fn happy_path_api() -> MockConsoleApi {
        let mut api = MockConsoleApi::new();
        api.expect_compose_plan()
            .times(1)
            .returning(|_| Ok(TestFixtures::plan_result()));
        api.expect_compose()
            .times(1)
            .returning(|_| Ok(TestFixtures::compose_result()));
        api.expect_compose_beat()
            .times(1)
            .returning(|_| Ok(TestFixtures::beat_result()));
        api
    }

    /// Mock whose status suggests `harness`
    pub fn status_api(harness: &'static str) -> MockConsoleApi {
        let mut api = MockConsoleApi::new();
        api.expect_status().returning(move || {
            Ok(StatusPayload {
                llm_default: Some(harness.to_string()),
                ..Default::default()
            })
        });
        api
    }

    /// Service error as the gateway reports a failed envelope
    pub fn service_error(errors: &[&str]) -> ConsoleError {
        ConsoleError::Service {
            status: Some(422),
            errors: errors.iter().map(|e| e.to_string()).collect(),
            message: "Request failed with status code 422".to_string(),
        }
    }
}
