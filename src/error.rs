//! Error types for the library assistant.

use std::time::Duration;

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Completion service error: {0}")]
    Llm(#[from] LlmError),

    #[error("Scope classifier error: {0}")]
    Scope(#[from] ScopeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Completion service errors (infrastructure-level).
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Completion request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Completion request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Invalid response from completion service: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scope classifier errors.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// The classifier could not reach the completion service. The dispatch
    /// core treats this as a Block verdict, never as permission.
    #[error("Scope classification unavailable: {0}")]
    Unavailable(#[source] LlmError),
}

/// Registry construction errors (startup-time, fatal).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate tool name: {name}")]
    DuplicateToolName { name: String },
}

/// Turn dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The message was rejected by the scope classifier. Classifier
    /// failures fold into the same rejection (fail-closed); the session
    /// driver renders this as the fixed refusal message.
    #[error("Message rejected by scope policy")]
    ScopeRejected,

    #[error("Tool loop exceeded {rounds} rounds without a final answer")]
    ToolLoopExceeded { rounds: usize },

    #[error("Completion service unavailable: {0}")]
    CompletionUnavailable(#[source] LlmError),
}

/// Result type alias for the assistant.
pub type Result<T> = std::result::Result<T, Error>;
