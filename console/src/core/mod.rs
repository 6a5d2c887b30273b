//! Core console logic
//!
//! Pure state and transformations, testable without a service or a runtime.

pub mod active_selection;
pub mod config_store;
pub mod curve;
pub mod workflow;

pub use active_selection::{ActiveSelectionCache, ActiveSnapshot};
pub use config_store::{ConfigStore, HarnessKind};
pub use curve::{build_aligned_series, normalize_series, CurveSample, CurveView, Magnitude};
pub use workflow::{BeatOutcome, Phase, PhaseKind, PhaseStatus, RequestToken, WorkflowState, DEFAULT_BEATS};
