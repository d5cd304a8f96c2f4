//! Opening-hours tool — always visible.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::catalog::OpeningHours;
use crate::context::UserContext;
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Tool that reports the library's opening hours for a day.
pub struct LibraryTimingsTool {
    hours: Arc<OpeningHours>,
}

impl LibraryTimingsTool {
    pub fn new(hours: Arc<OpeningHours>) -> Self {
        Self { hours }
    }
}

#[async_trait]
impl Tool for LibraryTimingsTool {
    fn name(&self) -> &str {
        "get_library_timings"
    }

    fn description(&self) -> &str {
        "Get the library's opening hours for a given day of the week."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "day": {
                    "type": "string",
                    "description": "Day of the week, e.g. 'Sunday'"
                }
            },
            "required": ["day"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &UserContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let day = require_str(&params, "day")?;

        let hours = self.hours.for_day(day).unwrap_or("Unknown day.");
        Ok(ToolOutput::success(
            serde_json::json!({
                "day": day,
                "hours": hours,
            }),
            start.elapsed(),
        ))
    }
}
