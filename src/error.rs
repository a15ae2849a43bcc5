//! Error types for insight-agent.
//!
//! [`AgentError`] covers the agent core: configuration problems and
//! transport-level failures of the text-generation service. Malformed
//! model output is never an error; every stage degrades it to a
//! fallback value instead.
//!
//! [`CommandError`] covers the CLI layer, and [`Error`] unifies both.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the agent core.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for a provider that needs one.
    #[error("API key missing: set OPENAI_API_KEY or INSIGHT_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not known.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// The text-generation service rejected or failed the request.
    #[error("API request failed{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    ApiRequest {
        /// Error description from the transport or service.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The request did not complete within the configured timeout.
    #[error("API request timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// The configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// The query cannot be run.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// What is wrong.
        message: String,
    },

    /// A prompt template file could not be read.
    #[error("failed to read prompt template {}: {source}", path.display())]
    PromptTemplate {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl AgentError {
    /// Returns `true` for transport failures an outer retry may recover from.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ApiRequest { .. } | Self::Timeout { .. })
    }
}

/// Errors raised while executing a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// User input could not be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The command failed while running.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent core error.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command error.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(
            AgentError::ApiRequest {
                message: "503".to_string(),
                status: Some(503),
            }
            .is_retryable()
        );
        assert!(AgentError::Timeout { seconds: 5 }.is_retryable());
        assert!(!AgentError::ApiKeyMissing.is_retryable());
        assert!(
            !AgentError::InvalidQuery {
                message: "empty".to_string()
            }
            .is_retryable()
        );
        assert!(
            !AgentError::InvalidConfig {
                message: "bad".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_api_request_display() {
        let err = AgentError::ApiRequest {
            message: "overloaded".to_string(),
            status: Some(529),
        };
        assert_eq!(err.to_string(), "API request failed (status 529): overloaded");

        let err = AgentError::ApiRequest {
            message: "connection reset".to_string(),
            status: None,
        };
        assert_eq!(err.to_string(), "API request failed: connection reset");
    }

    #[test]
    fn test_error_wraps_agent_error() {
        let err: Error = AgentError::ApiKeyMissing.into();
        assert!(matches!(err, Error::Agent(AgentError::ApiKeyMissing)));
    }
}
