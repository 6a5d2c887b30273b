//! Operator console for the SV composition service
//!
//! Talks to the backend over HTTP, keeps the operator's bankset and harness
//! choices across restarts and drives the plan, compose and beat workflow.

pub mod error;
pub mod traits;
pub mod core;
pub mod services;
pub mod state;
pub mod compose;
pub mod console_impl;
pub mod panels;
pub mod shell;

// Re-export main types
pub use error::{ConsoleError, ConsoleResult};
pub use traits::*;
pub use state::AppState;
pub use compose::ComposeWorkflow;
pub use console_impl::Console;
pub use shell::{Shell, ShellCommand, ShellReply};
pub use services::*;
