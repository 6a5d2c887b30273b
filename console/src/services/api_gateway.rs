//! HTTP gateway to the composition service
//!
//! The only place that performs outbound requests. Every request carries the
//! bank header computed by the config store at send time, and `generate`
//! requests without an explicit harness get the configured one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use shared::{
    process_debug, ApiEnvelope, AttentionRequest, Bank, BanksPayload, BatchItem, BeatRequest,
    BeatResult, BlendRequest, ComposeRequest, ComposeResult, EvaluateRequest, ExpectationRequest,
    FilmPlanBody, FilmPlanRequest, FramecheckRequest, GenerateRequest, PlanRequest, PlanResult,
    ProcessId, SchemaQuery, SearchRequest, SearchResult, StatusPayload, ViewpointRequest,
};
use crate::core::config_store::ConfigStore;
use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::ConsoleApi;

/// Header carrying the comma-joined bankset
pub const BANK_HEADER: &str = "X-SV-Banks";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`ConsoleApi`]
pub struct RealApiGateway {
    client: reqwest::Client,
    base_url: Url,
    config: Arc<ConfigStore>,
}

impl RealApiGateway {
    pub fn new(base_url: &str, config: Arc<ConfigStore>) -> ConsoleResult<Self> {
        Self::with_timeout(base_url, config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, config: Arc<ConfigStore>, timeout: Duration) -> ConsoleResult<Self> {
        let mut base_url = Url::parse(base_url.trim()).map_err(|e| ConsoleError::Config {
            message: format!("invalid API base URL '{}': {}", base_url, e),
        })?;
        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> ConsoleResult<RequestBuilder> {
        let url = self.base_url.join(path.trim_start_matches('/')).map_err(|e| ConsoleError::Config {
            message: format!("invalid endpoint path '{}': {}", path, e),
        })?;
        process_debug!(ProcessId::current(), "➡️ {} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(banks) = self.config.bank_header_value() {
            builder = builder.header(BANK_HEADER, banks);
        }
        Ok(builder)
    }

    /// Send and read the JSON body; non-2xx becomes [`ConsoleError::Service`]
    async fn send(&self, builder: RequestBuilder) -> ConsoleResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let errors = serde_json::from_str::<ApiEnvelope<Value>>(&text)
                .map(|envelope| envelope.error_list())
                .unwrap_or_default();
            return Err(ConsoleError::Service {
                status: Some(status.as_u16()),
                errors,
                message: format!("Request failed with status code {}", status.as_u16()),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Reject bodies that report `ok: false`, passing anything else through
    fn check_failure(body: Value, subject: &str) -> ConsoleResult<Value> {
        if body.get("ok") == Some(&Value::Bool(false)) {
            let envelope: ApiEnvelope<Value> = serde_json::from_value(body)?;
            return Err(ConsoleError::Service {
                status: None,
                errors: envelope.error_list(),
                message: format!("{} request failed", subject),
            });
        }
        Ok(body)
    }

    /// Extract `data` from an envelope
    fn unwrap_envelope<T: DeserializeOwned>(body: Value, subject: &str) -> ConsoleResult<T> {
        if !body.is_object() {
            return Err(ConsoleError::missing_data(subject));
        }
        let envelope: ApiEnvelope<Value> = serde_json::from_value(Self::check_failure(body, subject)?)?;
        match envelope.data {
            Some(data) if !data.is_null() => Ok(serde_json::from_value(data)?),
            _ => Err(ConsoleError::missing_data(subject)),
        }
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)], subject: &str) -> ConsoleResult<T> {
        let mut builder = self.request(Method::GET, path)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let body = self.send(builder).await?;
        Self::unwrap_envelope(body, subject)
    }

    async fn post_data<B, T>(&self, path: &str, payload: &B, subject: &str) -> ConsoleResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = self.send(self.request(Method::POST, path)?.json(payload)).await?;
        Self::unwrap_envelope(body, subject)
    }
}

#[async_trait]
impl ConsoleApi for RealApiGateway {
    async fn health(&self) -> ConsoleResult<Value> {
        self.send(self.request(Method::GET, "health")?).await
    }

    async fn status(&self) -> ConsoleResult<StatusPayload> {
        self.get_data("status", &[], "status").await
    }

    async fn banks(&self) -> ConsoleResult<Vec<Bank>> {
        let body = Self::check_failure(self.send(self.request(Method::GET, "banks")?).await?, "banks")?;

        // Answered either as an envelope or as a bare `{ banks }`
        let nested = body.get("data").filter(|data| data.get("banks").is_some()).cloned();
        let payload = match nested {
            Some(data) => data,
            None if body.get("banks").is_some() => body,
            None => return Err(ConsoleError::missing_data("banks")),
        };
        let payload: BanksPayload = serde_json::from_value(payload)?;
        Ok(payload.banks)
    }

    async fn schemas(&self, query: SchemaQuery) -> ConsoleResult<Value> {
        self.get_data("bible/schemas", &query.params(), "schemas").await
    }

    async fn schemas_compat(&self) -> ConsoleResult<Value> {
        self.get_data("bible/schemas/compat", &[], "compatibility").await
    }

    async fn schemas_lexicon(&self) -> ConsoleResult<Value> {
        self.get_data("bible/schemas/lexicon", &[], "lexicon").await
    }

    async fn metaphors(&self, validate: bool) -> ConsoleResult<Value> {
        let query = if validate { vec![("validate", "true".to_string())] } else { Vec::new() };
        self.get_data("bible/metaphors", &query, "metaphors").await
    }

    async fn frames(&self) -> ConsoleResult<Value> {
        self.get_data("bible/frames", &[], "frames").await
    }

    async fn blend_rules(&self) -> ConsoleResult<Value> {
        self.get_data("bible/blend_rules", &[], "blend rules").await
    }

    async fn search(&self, request: SearchRequest) -> ConsoleResult<SearchResult> {
        self.post_data("retrieval/search", &request, "search").await
    }

    async fn compose_plan(&self, request: PlanRequest) -> ConsoleResult<PlanResult> {
        self.post_data("compose/plan", &request, "plan").await
    }

    async fn compose(&self, request: ComposeRequest) -> ConsoleResult<ComposeResult> {
        self.post_data("compose", &request, "compose").await
    }

    async fn compose_beat(&self, request: BeatRequest) -> ConsoleResult<BeatResult> {
        self.post_data("compose/beat", &request, "beat").await
    }

    async fn generate(&self, mut request: GenerateRequest) -> ConsoleResult<Value> {
        let explicit = request.llm.as_deref().map(str::trim).filter(|llm| !llm.is_empty());
        request.llm = Some(match explicit {
            Some(llm) => llm.to_string(),
            None => self.config.harness(),
        });
        self.post_data("generate", &request, "generate").await
    }

    async fn blend(&self, request: BlendRequest) -> ConsoleResult<Value> {
        self.post_data("blend", &request, "blend").await
    }

    async fn evaluate(&self, request: EvaluateRequest) -> ConsoleResult<Value> {
        self.post_data("evaluate", &request, "evaluation").await
    }

    async fn evaluate_batch(&self, items: Vec<BatchItem>) -> ConsoleResult<Value> {
        let body = self.send(self.request(Method::POST, "evaluate/batch")?.json(&items)).await?;
        if body.is_null() {
            return Err(ConsoleError::missing_data("batch evaluation"));
        }
        Self::check_failure(body, "batch evaluation")
    }

    async fn framecheck(&self, request: FramecheckRequest) -> ConsoleResult<Value> {
        self.post_data("eval/framecheck", &request, "framecheck").await
    }

    async fn expectation(&self, request: ExpectationRequest) -> ConsoleResult<Value> {
        self.post_data("control/expectation", &request, "expectation").await
    }

    async fn viewpoint(&self, request: ViewpointRequest) -> ConsoleResult<Value> {
        self.post_data("control/viewpoint", &request, "viewpoint").await
    }

    async fn attention(&self, request: AttentionRequest) -> ConsoleResult<Value> {
        self.post_data("control/attention", &request, "attention").await
    }

    async fn gold_stats(&self) -> ConsoleResult<Value> {
        self.get_data("gold/stats", &[], "gold stats").await
    }

    async fn film_plan(&self, request: FilmPlanRequest) -> ConsoleResult<Value> {
        let body = self.send(self.request(Method::POST, "p12/filmplan")?.json(&request)).await?;
        match FilmPlanBody::new(body).into_plan() {
            Ok(Some(plan)) => Ok(plan),
            Ok(None) => Err(ConsoleError::missing_data("film plan")),
            Err(errors) => Err(ConsoleError::Service {
                status: None,
                errors,
                message: "Film plan failed".to_string(),
            }),
        }
    }
}
