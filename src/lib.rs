//! Library assistant with a guarded tool-dispatch core.
//!
//! Every inbound message passes a fail-closed scope classifier before any
//! tool schema is assembled; tools carry visibility predicates evaluated
//! against the caller's context, so unauthorized capabilities are absent
//! from the model's view rather than merely refused.

pub mod catalog;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod scope;
pub mod session;
pub mod tools;

pub use config::AssistantConfig;
pub use context::UserContext;
pub use dispatch::{Dispatcher, TurnResult};
pub use error::{Error, Result};
pub use session::Session;
