use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

/// Performs the action a planner decision names. Lives outside this crate in production.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Returns a short outcome line that is recorded back into context memory.
    async fn dispatch(&self, tool: &str, parameters: &Map<String, Value>) -> anyhow::Result<String>;
}

/// Logs the call and reports success without touching the system.
#[derive(Debug, Default, Clone)]
pub struct DryRunDispatcher;

#[async_trait]
impl ToolDispatcher for DryRunDispatcher {
    async fn dispatch(&self, tool: &str, parameters: &Map<String, Value>) -> anyhow::Result<String> {
        info!(tool, params = parameters.len(), "dry-run dispatch");
        Ok(format!("{} ran (dry run)", tool))
    }
}
