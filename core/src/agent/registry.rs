use crate::traits::{Tool, ToolResult, ToolSpec};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered set of tools, fixed once the agent starts.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            bail!("Tool '{}' is already registered", tool.name());
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Rebuilt on every call; tools are never cached by the provider side.
    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub async fn execute(&self, name: &str, args: serde_json::Value) -> ToolResult {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "model requested unknown function");
            return ToolResult::error(format!("unknown function '{}'", name));
        };

        debug!(tool = name, "executing tool");
        match tool.execute(args).await {
            Ok(result) => {
                if let Some(error) = &result.error {
                    warn!(tool = name, error = %error, "tool returned an error");
                }
                result
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                ToolResult::error(format!("Execution failed: {}", e))
            }
        }
    }
}
