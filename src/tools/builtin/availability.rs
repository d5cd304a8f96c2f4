//! Availability tool — visible to registered members only.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::catalog::{Catalog, MembershipDirectory};
use crate::context::UserContext;
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Tool that reports how many copies of a title are on the shelf.
///
/// Gated: only callers whose member id is present in the membership
/// directory see this tool at all. An invalid or absent id does not error,
/// the tool simply stays hidden (guest-level access).
pub struct CheckAvailabilityTool {
    catalog: Arc<Catalog>,
    members: Arc<MembershipDirectory>,
}

impl CheckAvailabilityTool {
    pub fn new(catalog: Arc<Catalog>, members: Arc<MembershipDirectory>) -> Self {
        Self { catalog, members }
    }
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn name(&self) -> &str {
        "check_availability"
    }

    fn description(&self) -> &str {
        "Check how many copies of a book are currently available. Only \
         offered to registered library members."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "book_name": {
                    "type": "string",
                    "description": "Exact book title to check"
                }
            },
            "required": ["book_name"]
        })
    }

    fn visible_for(&self, ctx: &UserContext) -> bool {
        ctx.member_id
            .as_deref()
            .is_some_and(|id| self.members.is_member(id))
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &UserContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let book_name = require_str(&params, "book_name")?;

        let result = match self.catalog.copies(book_name) {
            Some(copies) => serde_json::json!({
                "title": book_name,
                "available_copies": copies,
            }),
            None => serde_json::json!({
                "title": book_name,
                "available_copies": 0,
                "note": "Not in catalog.",
            }),
        };

        Ok(ToolOutput::success(result, start.elapsed()))
    }
}
