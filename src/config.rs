//! Configuration types.

use std::time::Duration;

/// Gatekeeper instruction for the scope classifier. Demands a single exact
/// token so the verdict can be compared fail-closed.
pub const CLASSIFIER_INSTRUCTIONS: &str = "You are a strict gatekeeper for a library assistant. \
     If the user's message is about books, availability, membership, or library timings, \
     respond with EXACTLY 'ALLOW'. \
     For anything else (e.g., sports, politics, finance, chit-chat), respond with EXACTLY 'BLOCK'. \
     No extra words.";

/// System instruction sent with every dispatch request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful Library Assistant. \
     You can: search for books, check availability for registered members, and provide \
     library timings. Refuse non-library queries. Use tools when needed.";

/// Fixed refusal shown for out-of-scope messages.
pub const REFUSAL_MESSAGE: &str = "This assistant only answers library-related questions.";

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Assistant name for identification.
    pub name: String,
    /// System instruction describing the assistant's role.
    pub system_prompt: String,
    /// Gatekeeper instruction for the scope classifier.
    pub classifier_instructions: String,
    /// Refusal shown to the caller for out-of-scope messages.
    pub refusal_message: String,
    /// Maximum completion/tool round trips within one turn.
    pub max_tool_rounds: usize,
    /// Per-request timeout for completion calls.
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "library-assist".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            classifier_instructions: CLASSIFIER_INSTRUCTIONS.to_string(),
            refusal_message: REFUSAL_MESSAGE.to_string(),
            max_tool_rounds: 8,
            request_timeout: Duration::from_secs(30),
        }
    }
}
