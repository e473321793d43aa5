use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::error::TransportError;
use super::interface::{ToolDescriptor, ToolTransport};
use super::registry::ToolRegistry;
use super::result::InvocationResult;

const LOCAL_SERVER: &str = "local";

/// In-process transport straight onto a shared registry.
#[derive(Clone)]
pub struct LocalTransport {
    registry: Arc<ToolRegistry>,
}

impl LocalTransport {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolTransport for LocalTransport {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, TransportError> {
        Ok(self.registry.list().map(ToolDescriptor::from).collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<InvocationResult, TransportError> {
        debug!(tool = %name, "Dispatching tool in-process");
        let registry = Arc::clone(&self.registry);
        let name = name.to_string();
        // Handlers block on file and process I/O.
        tokio::task::spawn_blocking(move || registry.invoke(&name, arguments))
            .await
            .map_err(|err| TransportError::Transport {
                server: LOCAL_SERVER.to_string(),
                message: err.to_string(),
            })
    }
}
