//! Scope classifier — topical pre-filter for incoming messages.
//!
//! One tool-free round trip to the completion service with a fixed
//! gatekeeper instruction. The policy is fail-closed: only the exact ALLOW
//! token (after normalization) admits a message; anything ambiguous,
//! malformed, or erroring is a Block.

use std::sync::Arc;

use crate::error::ScopeError;
use crate::llm::{ChatMessage, CompletionProvider, CompletionRequest};

/// Exact token the classifier must return for an in-scope message.
const ALLOW_TOKEN: &str = "ALLOW";

/// Verdict for a single message. Produced fresh per message, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeVerdict {
    Allow,
    Block,
}

/// LLM-backed classifier deciding topical admissibility.
pub struct ScopeClassifier {
    llm: Arc<dyn CompletionProvider>,
    instructions: String,
}

impl ScopeClassifier {
    pub fn new(llm: Arc<dyn CompletionProvider>, instructions: impl Into<String>) -> Self {
        Self {
            llm,
            instructions: instructions.into(),
        }
    }

    /// Classify one message. The service reply is trimmed and uppercased;
    /// anything other than the exact ALLOW token is a Block.
    pub async fn classify(&self, message: &str) -> Result<ScopeVerdict, ScopeError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(&self.instructions),
            ChatMessage::user(message),
        ]);

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(ScopeError::Unavailable)?;

        let verdict = if response.content.trim().to_uppercase() == ALLOW_TOKEN {
            ScopeVerdict::Allow
        } else {
            ScopeVerdict::Block
        };
        tracing::debug!(?verdict, raw = %response.content.trim(), "Scope classification");
        Ok(verdict)
    }
}
