//! Wire contract of the composition service
//!
//! This module organizes all request and response bodies by endpoint family:
//! - `envelope`: the `{ ok, data, errors }` wrapper every endpoint answers with
//! - `compose`: plan → compose → beat workflow and one-shot generation
//! - `retrieval`: search over the content banks
//! - `evaluate`: blending and evaluation
//! - `control`: expectation / viewpoint / attention control endpoints
//! - `film`: P12 film plan
//! - `library`: status, banks and bible browsing

pub mod envelope;
pub mod compose;
pub mod retrieval;
pub mod evaluate;
pub mod control;
pub mod film;
pub mod library;

pub use envelope::{ApiEnvelope, FilmPlanBody};

pub use compose::{
    PlanRequest, PlanResult, BeatDescriptor, ComposeRequest, ComposeResult, ComposePrompts,
    BeatRequest, BeatResult, GenerateRequest,
};

pub use retrieval::{SearchRequest, SearchResult};

pub use evaluate::{BlendRequest, EvaluateRequest, BatchItem, FramecheckRequest};

pub use control::{ExpectationRequest, ViewpointRequest, AttentionRequest, DEFAULT_LANG, validate_lang};

pub use film::FilmPlanRequest;

pub use library::{StatusPayload, BanksPayload, SchemaQuery};
