//! Console error types

use thiserror::Error;

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Console error types
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Required input missing, caught before any request
    #[error("{message}")]
    Validation { message: String },

    /// Operator-supplied JSON text that failed to parse
    #[error("{field} JSON invalid: {message}")]
    MalformedInput { field: String, message: String },

    /// A phase was invoked without the context it depends on
    #[error("{message}")]
    Precondition { message: String },

    /// Non-2xx answer or an envelope with `ok: false`
    #[error("{message}")]
    Service {
        status: Option<u16>,
        errors: Vec<String>,
        message: String,
    },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("No {subject} data returned")]
    MissingData { subject: String },

    /// A newer request of the same phase was issued, or the session closed
    #[error("{phase} response discarded: superseded by a newer request")]
    Superseded { phase: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    SharedError(#[from] shared::SharedError),
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation { message: message.into() }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ConsoleError::Precondition { message: message.into() }
    }

    pub fn malformed(field: impl Into<String>, source: &serde_json::Error) -> Self {
        ConsoleError::MalformedInput {
            field: field.into(),
            message: source.to_string(),
        }
    }

    pub fn missing_data(subject: impl Into<String>) -> Self {
        ConsoleError::MissingData { subject: subject.into() }
    }

    /// Raised locally, no request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ConsoleError::Validation { .. }
                | ConsoleError::MalformedInput { .. }
                | ConsoleError::Precondition { .. }
        )
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ConsoleError::Superseded { .. })
    }

    /// Operator-facing text: the service's error list joined, else this error's
    /// own text, else the phase fallback
    pub fn user_message(&self, fallback: &str) -> String {
        if let ConsoleError::Service { errors, .. } = self {
            let joined = errors
                .iter()
                .map(|e| e.trim())
                .filter(|e| !e.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !joined.is_empty() {
                return joined;
            }
        }

        let own = self.to_string();
        if own.trim().is_empty() {
            fallback.to_string()
        } else {
            own
        }
    }
}
