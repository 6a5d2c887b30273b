//! Compose workflow state machine
//!
//! Pure state for the plan → compose → beat sequence. Every phase owns its own
//! status, result and error. Requests are stamped with a per-phase token and a
//! response is applied only while its token is still the latest one issued.

use std::fmt;

use serde_json::{Map, Value};
use shared::{
    BeatRequest, BeatResult, ComposeRequest, ComposeResult, PlanRequest, PlanResult, SessionId,
};
use crate::error::{ConsoleError, ConsoleResult};

/// Beat ordering used when neither the operator nor a plan supplies one
pub const DEFAULT_BEATS: [&str; 6] = ["hook", "setup", "development", "turn", "reveal", "settle"];
/// Retrieval depth for planning
pub const DEFAULT_K: u32 = 6;

pub const MISSING_FRAME_OR_QUERY: &str = "Frame ID and query are required";
pub const MISSING_BEATS: &str = "At least one beat is required to compose";
pub const MISSING_ACTIVE: &str = "No active selections found. Create a plan first.";
pub const MISSING_BEAT_NAME: &str = "Select a beat to regenerate";

pub const PLAN_FAILED: &str = "Planning failed";
pub const COMPOSE_FAILED: &str = "Compose failed";
pub const BEAT_FAILED: &str = "Compose beat failed";

/// Split comma separated input, trimming and dropping blanks
pub fn to_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Plan,
    Compose,
    Beat,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Plan => write!(f, "plan"),
            PhaseKind::Compose => write!(f, "compose"),
            PhaseKind::Beat => write!(f, "beat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Token identifying one issued request of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    phase: PhaseKind,
    sequence: u64,
}

impl RequestToken {
    pub fn phase(&self) -> PhaseKind {
        self.phase
    }
}

/// Status, result and error of one phase
#[derive(Debug, Clone)]
pub struct Phase<T> {
    kind: PhaseKind,
    status: PhaseStatus,
    result: Option<T>,
    error: Option<String>,
    sequence: u64,
}

impl<T: Clone> Phase<T> {
    pub fn new(kind: PhaseKind) -> Self {
        Self {
            kind,
            status: PhaseStatus::Idle,
            result: None,
            error: None,
            sequence: 0,
        }
    }

    pub fn status(&self) -> PhaseStatus {
        self.status
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == PhaseStatus::Loading
    }

    /// Issue a new token; any older in-flight request becomes stale
    pub fn begin(&mut self) -> RequestToken {
        self.sequence += 1;
        self.status = PhaseStatus::Loading;
        self.error = None;
        RequestToken { phase: self.kind, sequence: self.sequence }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.phase == self.kind && token.sequence == self.sequence
    }

    fn succeed(&mut self, token: RequestToken, result: T) -> ConsoleResult<T> {
        self.ensure_current(token)?;
        self.status = PhaseStatus::Success;
        self.error = None;
        self.result = Some(result.clone());
        Ok(result)
    }

    fn fail(&mut self, token: RequestToken, error: ConsoleError, fallback: &str) -> ConsoleResult<T> {
        self.ensure_current(token)?;
        self.status = PhaseStatus::Error;
        self.error = Some(error.user_message(fallback));
        Err(error)
    }

    /// Record a local validation failure; no request is issued.
    /// Invalidates anything still in flight for this phase.
    fn reject(&mut self, error: ConsoleError) -> ConsoleError {
        self.sequence += 1;
        self.status = PhaseStatus::Error;
        self.error = Some(error.to_string());
        error
    }

    /// Drop result and error, and invalidate anything in flight
    pub fn reset(&mut self) {
        self.sequence += 1;
        self.status = PhaseStatus::Idle;
        self.result = None;
        self.error = None;
    }

    fn ensure_current(&self, token: RequestToken) -> ConsoleResult<()> {
        if self.is_current(token) {
            Ok(())
        } else {
            Err(ConsoleError::Superseded { phase: self.kind.to_string() })
        }
    }
}

/// Regenerated prompts for one beat
#[derive(Debug, Clone, PartialEq)]
pub struct BeatOutcome {
    pub beat: String,
    pub prompts: Map<String, Value>,
    pub trace_beat: Value,
}

/// State of one compose session
#[derive(Debug, Clone)]
pub struct WorkflowState {
    session_id: SessionId,
    closed: bool,
    frame_id: String,
    query: String,
    k: u32,
    beats_input: String,
    plan: Phase<PlanResult>,
    compose: Phase<ComposeResult>,
    beat: Phase<BeatOutcome>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            closed: false,
            frame_id: String::new(),
            query: String::new(),
            k: DEFAULT_K,
            beats_input: String::new(),
            plan: Phase::new(PhaseKind::Plan),
            compose: Phase::new(PhaseKind::Compose),
            beat: Phase::new(PhaseKind::Beat),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Detach the session; responses still in flight are discarded
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn set_frame_id(&mut self, frame_id: &str) {
        self.frame_id = frame_id.trim().to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn set_k(&mut self, k: u32) {
        self.k = k;
    }

    pub fn beats_input(&self) -> &str {
        &self.beats_input
    }

    /// Replace the operator's comma separated beat list
    pub fn set_beats_input(&mut self, input: &str) {
        self.beats_input = input.to_string();
    }

    pub fn plan(&self) -> &Phase<PlanResult> {
        &self.plan
    }

    pub fn compose(&self) -> &Phase<ComposeResult> {
        &self.compose
    }

    pub fn beat(&self) -> &Phase<BeatOutcome> {
        &self.beat
    }

    pub fn typed_beats(&self) -> Vec<String> {
        to_list(&self.beats_input)
    }

    /// Beat names of the latest plan
    pub fn plan_beats(&self) -> Vec<String> {
        self.plan.result().map(PlanResult::beat_names).unwrap_or_default()
    }

    /// Typed list, else the plan's beats, else [`DEFAULT_BEATS`]
    pub fn resolve_beats(&self) -> Vec<String> {
        let typed = self.typed_beats();
        if !typed.is_empty() {
            return typed;
        }
        let planned = self.plan_beats();
        if !planned.is_empty() {
            return planned;
        }
        DEFAULT_BEATS.iter().map(|beat| beat.to_string()).collect()
    }

    /// Context for beat regeneration: compose result's `active`, else the plan's
    pub fn active_context(&self) -> Option<Value> {
        self.compose
            .result()
            .and_then(ComposeResult::active_context)
            .or_else(|| self.plan.result().and_then(PlanResult::active_context))
            .cloned()
    }

    pub fn begin_plan(&mut self, frame_id: &str, query: &str, k: u32) -> ConsoleResult<(RequestToken, PlanRequest)> {
        self.ensure_open(PhaseKind::Plan)?;
        let (frame_id, query) = self.capture_inputs(frame_id, query);
        self.k = k;

        if frame_id.is_empty() || query.trim().is_empty() {
            return Err(self.plan.reject(ConsoleError::validation(MISSING_FRAME_OR_QUERY)));
        }

        let token = self.plan.begin();
        Ok((token, PlanRequest { frame_id, query, k }))
    }

    /// Apply a plan response. On success the plan's beat names replace the typed
    /// list and the compose and beat phases start over.
    pub fn finish_plan(&mut self, token: RequestToken, outcome: ConsoleResult<PlanResult>) -> ConsoleResult<PlanResult> {
        self.ensure_open(PhaseKind::Plan)?;
        match outcome {
            Ok(result) => {
                let result = self.plan.succeed(token, result)?;
                let names = result.beat_names();
                if !names.is_empty() {
                    self.beats_input = names.join(",");
                }
                self.compose.reset();
                self.beat.reset();
                Ok(result)
            }
            Err(error) => self.plan.fail(token, error, PLAN_FAILED),
        }
    }

    /// `beats` of `None` uses [`WorkflowState::resolve_beats`]
    pub fn begin_compose(
        &mut self,
        frame_id: &str,
        query: &str,
        beats: Option<Vec<String>>,
    ) -> ConsoleResult<(RequestToken, ComposeRequest)> {
        self.ensure_open(PhaseKind::Compose)?;
        let (frame_id, query) = self.capture_inputs(frame_id, query);

        if frame_id.is_empty() || query.trim().is_empty() {
            return Err(self.compose.reject(ConsoleError::validation(MISSING_FRAME_OR_QUERY)));
        }

        let beats: Vec<String> = match beats {
            Some(beats) => beats
                .into_iter()
                .map(|beat| beat.trim().to_string())
                .filter(|beat| !beat.is_empty())
                .collect(),
            None => self.resolve_beats(),
        };
        if beats.is_empty() {
            return Err(self.compose.reject(ConsoleError::validation(MISSING_BEATS)));
        }

        let active = self.plan.result().and_then(PlanResult::active_context).cloned();
        let token = self.compose.begin();
        Ok((token, ComposeRequest { frame_id, query, beats, active }))
    }

    pub fn finish_compose(&mut self, token: RequestToken, outcome: ConsoleResult<ComposeResult>) -> ConsoleResult<ComposeResult> {
        self.ensure_open(PhaseKind::Compose)?;
        match outcome {
            Ok(result) => {
                let result = self.compose.succeed(token, result)?;
                self.beat.reset();
                Ok(result)
            }
            Err(error) => self.compose.fail(token, error, COMPOSE_FAILED),
        }
    }

    pub fn begin_beat(&mut self, beat: &str, frame_id: &str, query: &str) -> ConsoleResult<(RequestToken, BeatRequest)> {
        self.ensure_open(PhaseKind::Beat)?;
        let (frame_id, query) = self.capture_inputs(frame_id, query);

        if frame_id.is_empty() || query.trim().is_empty() {
            return Err(self.beat.reject(ConsoleError::validation(MISSING_FRAME_OR_QUERY)));
        }
        let beat = beat.trim();
        if beat.is_empty() {
            return Err(self.beat.reject(ConsoleError::validation(MISSING_BEAT_NAME)));
        }
        let Some(active) = self.active_context() else {
            return Err(self.beat.reject(ConsoleError::precondition(MISSING_ACTIVE)));
        };

        let token = self.beat.begin();
        Ok((
            token,
            BeatRequest {
                frame_id,
                beat: beat.to_string(),
                query,
                active,
            },
        ))
    }

    pub fn finish_beat(&mut self, token: RequestToken, beat: &str, outcome: ConsoleResult<BeatResult>) -> ConsoleResult<BeatOutcome> {
        self.ensure_open(PhaseKind::Beat)?;
        match outcome {
            Ok(result) => self.beat.succeed(
                token,
                BeatOutcome {
                    beat: beat.trim().to_string(),
                    prompts: result.prompts,
                    trace_beat: result.trace_beat,
                },
            ),
            Err(error) => self.beat.fail(token, error, BEAT_FAILED),
        }
    }

    fn capture_inputs(&mut self, frame_id: &str, query: &str) -> (String, String) {
        self.set_frame_id(frame_id);
        self.set_query(query);
        (self.frame_id.clone(), self.query.clone())
    }

    fn ensure_open(&self, phase: PhaseKind) -> ConsoleResult<()> {
        if self.closed {
            Err(ConsoleError::Superseded { phase: phase.to_string() })
        } else {
            Ok(())
        }
    }
}
