//! Shared types for the SV operator console
//!
//! Contains the wire contract of the composition service (envelope and
//! request/response bodies), the domain types every console surface agrees on,
//! and process-aware logging.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;
pub mod serde_util;

pub use types::*;
pub use errors::*;

// Re-export the wire contract
pub use messages::{
    // Envelope handling
    ApiEnvelope, FilmPlanBody,

    // Compose workflow
    PlanRequest, PlanResult, BeatDescriptor, ComposeRequest, ComposeResult, ComposePrompts,
    BeatRequest, BeatResult, GenerateRequest,

    // Retrieval
    SearchRequest, SearchResult,

    // Blend and evaluation
    BlendRequest, EvaluateRequest, BatchItem, FramecheckRequest,

    // Control endpoints
    ExpectationRequest, ViewpointRequest, AttentionRequest, DEFAULT_LANG, validate_lang,

    // Film plan
    FilmPlanRequest,

    // Library views
    StatusPayload, BanksPayload, SchemaQuery,
};
