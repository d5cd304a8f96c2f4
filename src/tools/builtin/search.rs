//! Catalog search tool — always visible.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::context::UserContext;
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Tool that checks whether a title exists in the catalog.
pub struct SearchBookTool {
    catalog: Arc<Catalog>,
}

impl SearchBookTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SearchBookTool {
    fn name(&self) -> &str {
        "search_book"
    }

    fn description(&self) -> &str {
        "Search the library catalog for a book by title. Returns whether \
         the title is in the catalog."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "book_name": {
                    "type": "string",
                    "description": "Exact book title to look up"
                }
            },
            "required": ["book_name"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &UserContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let book_name = require_str(&params, "book_name")?;

        Ok(ToolOutput::success(
            serde_json::json!({
                "title": book_name,
                "in_catalog": self.catalog.contains(book_name),
            }),
            start.elapsed(),
        ))
    }
}
