use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TransportError;
use super::registry::ToolDefinition;
use super::result::InvocationResult;

/// What the reasoning engine sees of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(
        rename = "inputSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub input_schema: Option<Value>,
}

impl From<&ToolDefinition> for ToolDescriptor {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            name: definition.name().to_string(),
            description: Some(definition.description().to_string()),
            server: None,
            input_schema: Some(definition.input_schema()),
        }
    }
}

/// Request/response channel to wherever the tools live.
///
/// Calls are issued one at a time; the agent awaits each reply before it
/// consults the model again.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, TransportError>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<InvocationResult, TransportError>;

    /// Free-text guidance the tool side published during its handshake.
    async fn instructions(&self) -> Option<String> {
        None
    }

    async fn shutdown(&self) {}
}
