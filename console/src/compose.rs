//! Async driver for the compose workflow
//!
//! Stamps each request through [`WorkflowState`], awaits the service without
//! holding the state lock, then hands the response back for token checking.

use std::sync::Arc;
use tokio::sync::Mutex;

use shared::{process_debug, process_info, process_warn, ComposeResult, PlanResult, ProcessId, SessionId};
use crate::core::workflow::{BeatOutcome, WorkflowState};
use crate::error::ConsoleResult;
use crate::traits::ConsoleApi;

/// One compose session over a service boundary
pub struct ComposeWorkflow<A: ConsoleApi> {
    api: Arc<A>,
    state: Arc<Mutex<WorkflowState>>,
}

impl<A: ConsoleApi> Clone for ComposeWorkflow<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A: ConsoleApi> ComposeWorkflow<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(WorkflowState::new())),
        }
    }

    pub async fn session_id(&self) -> SessionId {
        self.state.lock().await.session_id()
    }

    /// Read the session state
    pub async fn inspect<R>(&self, f: impl FnOnce(&WorkflowState) -> R) -> R {
        f(&*self.state.lock().await)
    }

    /// Change operator inputs (frame, query, k, typed beats)
    pub async fn edit<R>(&self, f: impl FnOnce(&mut WorkflowState) -> R) -> R {
        f(&mut *self.state.lock().await)
    }

    pub async fn set_beats_input(&self, input: &str) {
        self.state.lock().await.set_beats_input(input);
    }

    pub async fn resolve_beats(&self) -> Vec<String> {
        self.state.lock().await.resolve_beats()
    }

    pub async fn run_plan(&self, frame_id: &str, query: &str, k: u32) -> ConsoleResult<PlanResult> {
        let (token, request) = self.state.lock().await.begin_plan(frame_id, query, k)?;
        process_info!(ProcessId::current(), "🧭 Planning '{}' for frame {} (k={})", request.query, request.frame_id, k);

        let outcome = self.api.compose_plan(request).await;

        let applied = self.state.lock().await.finish_plan(token, outcome);
        log_outcome("plan", &applied);
        applied
    }

    /// `beats` of `None` composes the resolved beat list
    pub async fn run_compose(&self, frame_id: &str, query: &str, beats: Option<Vec<String>>) -> ConsoleResult<ComposeResult> {
        let (token, request) = self.state.lock().await.begin_compose(frame_id, query, beats)?;
        process_info!(
            ProcessId::current(),
            "✍️ Composing {} beat(s) for frame {}{}",
            request.beats.len(),
            request.frame_id,
            if request.active.is_some() { " with plan context" } else { "" }
        );

        let outcome = self.api.compose(request).await;

        let applied = self.state.lock().await.finish_compose(token, outcome);
        log_outcome("compose", &applied);
        applied
    }

    /// Regenerate a single beat using the freshest active context
    pub async fn run_beat(&self, beat: &str, frame_id: &str, query: &str) -> ConsoleResult<BeatOutcome> {
        let (token, request) = self.state.lock().await.begin_beat(beat, frame_id, query)?;
        process_info!(ProcessId::current(), "🔁 Regenerating beat '{}'", request.beat);

        let outcome = self.api.compose_beat(request).await;

        let applied = self.state.lock().await.finish_beat(token, beat, outcome);
        log_outcome("beat", &applied);
        applied
    }

    /// Detach the session; responses still in flight are discarded
    pub async fn close(&self) {
        self.state.lock().await.close();
        process_debug!(ProcessId::current(), "Compose session closed");
    }
}

fn log_outcome<T>(phase: &str, outcome: &ConsoleResult<T>) {
    match outcome {
        Ok(_) => {
            process_debug!(ProcessId::current(), "{} response applied", phase);
        }
        Err(e) if e.is_superseded() => {
            process_debug!(ProcessId::current(), "{}", e);
        }
        Err(e) => {
            process_warn!(ProcessId::current(), "⚠️ {} failed: {}", phase, e);
        }
    }
}
