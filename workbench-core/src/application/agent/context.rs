use crate::tooling::ToolDescriptor;
use serde::Serialize;

/// What the model is told about the tools for one run.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ToolContext {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}
