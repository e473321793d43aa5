use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum AgentDirective {
    Final { response: String },
    CallTool { tool: String, input: Value },
}
