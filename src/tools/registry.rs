//! Tool registry — immutable catalog of invocable tools.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::UserContext;
use crate::error::RegistryError;
use crate::llm::ToolDefinition;
use crate::tools::tool::Tool;

/// Registry of available tools.
///
/// Built once at startup; there is no mutation API afterwards, so a shared
/// `Arc<ToolRegistry>` needs no locking discipline between sessions.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry from a set of tools. Duplicate names are a startup
    /// error, not a runtime condition.
    pub fn build(tools: Vec<Arc<dyn Tool>>) -> Result<Self, RegistryError> {
        let mut map: HashMap<String, Arc<dyn Tool>> = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_string();
            if map.insert(name.clone(), tool).is_some() {
                return Err(RegistryError::DuplicateToolName { name });
            }
            tracing::debug!("Registered tool: {}", name);
        }
        Ok(Self { tools: map })
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool exists.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Tools whose visibility predicate admits the given caller, in name
    /// order.
    pub fn visible_for(&self, ctx: &UserContext) -> Vec<Arc<dyn Tool>> {
        let mut visible: Vec<Arc<dyn Tool>> = self
            .tools
            .values()
            .filter(|tool| tool.visible_for(ctx))
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.name().cmp(b.name()));
        visible
    }

    /// Schemas of the visible tools, for the completion request. Hidden
    /// tools are structurally absent, not merely disabled.
    pub fn definitions_for(&self, ctx: &UserContext) -> Vec<ToolDefinition> {
        self.visible_for(ctx)
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }
}
