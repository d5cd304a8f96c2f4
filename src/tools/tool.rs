//! Tool abstraction: capability records with visibility predicates.

use std::time::Duration;

use async_trait::async_trait;

use crate::context::UserContext;

/// Errors a tool handler can produce. These are fed back to the completion
/// service as structured error results, never propagated as turn failures.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Output of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Structured result payload, fed back into the conversation.
    pub result: serde_json::Value,
    /// Execution time.
    pub elapsed: Duration,
}

impl ToolOutput {
    pub fn success(result: serde_json::Value, elapsed: Duration) -> Self {
        Self { result, elapsed }
    }
}

/// An invocable capability.
///
/// Visibility is part of the record: [`Tool::visible_for`] is a pure
/// predicate over the caller's context, evaluated freshly per turn. Tools
/// with no restriction keep the default (always visible). Predicates must
/// not perform I/O and must not depend on the in-flight message.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// Description shown to the completion service.
    fn description(&self) -> &str;

    /// JSON schema of the expected arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether this tool may be exposed to the given caller.
    fn visible_for(&self, _ctx: &UserContext) -> bool {
        true
    }

    /// Execute with the supplied arguments and the caller's context.
    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &UserContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// Extract a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    params.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        ToolError::InvalidParameters(format!("missing required string parameter '{}'", key))
    })
}
