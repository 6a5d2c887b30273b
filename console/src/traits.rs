//! Console trait definitions for dependency injection

use async_trait::async_trait;
use serde_json::Value;

use shared::{
    AttentionRequest, Bank, BatchItem, BeatRequest, BeatResult, BlendRequest, ComposeRequest,
    ComposeResult, EvaluateRequest, ExpectationRequest, FilmPlanRequest, FramecheckRequest,
    GenerateRequest, PlanRequest, PlanResult, SchemaQuery, SearchRequest, SearchResult,
    StatusPayload, ViewpointRequest,
};
use crate::error::ConsoleResult;

/// Outbound boundary to the composition service.
///
/// Every implementation attaches the bank header computed by the config store.
#[mockall::automock]
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// `GET /health`, the raw body
    async fn health(&self) -> ConsoleResult<Value>;

    async fn status(&self) -> ConsoleResult<StatusPayload>;

    async fn banks(&self) -> ConsoleResult<Vec<Bank>>;

    async fn schemas(&self, query: SchemaQuery) -> ConsoleResult<Value>;

    async fn schemas_compat(&self) -> ConsoleResult<Value>;

    async fn schemas_lexicon(&self) -> ConsoleResult<Value>;

    async fn metaphors(&self, validate: bool) -> ConsoleResult<Value>;

    async fn frames(&self) -> ConsoleResult<Value>;

    async fn blend_rules(&self) -> ConsoleResult<Value>;

    async fn search(&self, request: SearchRequest) -> ConsoleResult<SearchResult>;

    async fn compose_plan(&self, request: PlanRequest) -> ConsoleResult<PlanResult>;

    async fn compose(&self, request: ComposeRequest) -> ConsoleResult<ComposeResult>;

    async fn compose_beat(&self, request: BeatRequest) -> ConsoleResult<BeatResult>;

    /// `POST /generate`; a request without `llm` gets the configured harness
    async fn generate(&self, request: GenerateRequest) -> ConsoleResult<Value>;

    async fn blend(&self, request: BlendRequest) -> ConsoleResult<Value>;

    async fn evaluate(&self, request: EvaluateRequest) -> ConsoleResult<Value>;

    /// `POST /evaluate/batch`, the whole response body
    async fn evaluate_batch(&self, items: Vec<BatchItem>) -> ConsoleResult<Value>;

    async fn framecheck(&self, request: FramecheckRequest) -> ConsoleResult<Value>;

    async fn expectation(&self, request: ExpectationRequest) -> ConsoleResult<Value>;

    async fn viewpoint(&self, request: ViewpointRequest) -> ConsoleResult<Value>;

    async fn attention(&self, request: AttentionRequest) -> ConsoleResult<Value>;

    async fn gold_stats(&self) -> ConsoleResult<Value>;

    /// `POST /p12/filmplan`, the resolved plan payload
    async fn film_plan(&self, request: FilmPlanRequest) -> ConsoleResult<Value>;
}

/// Key/value persistence for console configuration
#[mockall::automock]
pub trait ConfigStorage: Send + Sync {
    /// Read the raw text stored under `key`
    fn load(&self, key: &str) -> ConsoleResult<Option<String>>;

    /// Store raw text under `key`
    fn save(&self, key: &str, value: &str) -> ConsoleResult<()>;
}
