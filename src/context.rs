//! Caller identity for a session.

use serde::Serialize;

/// Identity of the caller for the duration of a session.
///
/// Constructed once by the session driver and only ever lent out as a
/// shared reference. Whether a `member_id` is actually valid is the
/// membership directory's call, not this struct's: an id that is present
/// but unknown simply fails the visibility predicates of gated tools.
#[derive(Debug, Clone, Serialize)]
pub struct UserContext {
    /// Display name used for tone personalization.
    pub display_name: String,
    /// Membership id, if the caller claims one.
    pub member_id: Option<String>,
}

impl UserContext {
    /// Create a context for a caller.
    pub fn new(display_name: impl Into<String>, member_id: Option<String>) -> Self {
        Self {
            display_name: display_name.into(),
            member_id,
        }
    }

    /// Create a context with no membership claim.
    pub fn guest(display_name: impl Into<String>) -> Self {
        Self::new(display_name, None)
    }
}
