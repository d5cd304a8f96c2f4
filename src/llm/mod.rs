//! Completion service boundary.
//!
//! The assistant delegates to an OpenAI-compatible chat-completions
//! endpoint; the production deployment targets Gemini's openai/ surface.
//! Everything behind [`CompletionProvider`] is swappable — tests script it
//! in memory.

pub mod openai_compat;
pub mod provider;
pub(crate) mod retry;

pub use openai_compat::OpenAiCompatProvider;
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::LlmError;

/// Default OpenAI-compatible endpoint (Gemini).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for creating a completion provider.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

/// Create a completion provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>, LlmError> {
    let provider = OpenAiCompatProvider::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.model.clone(),
        config.request_timeout,
    )?;
    tracing::info!("Using completion model {} at {}", config.model, config.base_url);
    Ok(Arc::new(provider))
}
