use super::context::ToolContext;
use super::models::AgentStep;
use crate::tooling::{InvocationResult, ToolTransport, TransportError};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the pseudo tool that returns the catalogue instead of dispatching.
pub(crate) const LIST_TOOLS: &str = "list_tools";

pub(crate) const JSON_RETRY_MESSAGE: &str = "Your previous reply was not a valid agent action. Respond with exactly one JSON object: {\"action\":\"call_tool\",\"tool\":\"tool_name\",\"input\":{...}} or {\"action\":\"final\",\"response\":\"...\"}.";

const TOOL_RESULT_INSTRUCTION: &str = "Use this tool result to continue. Call another tool if more work is needed, otherwise answer with the final action.";

/// Bridges the agent loop and a tool transport.
pub(crate) struct ToolRuntime {
    transport: Arc<dyn ToolTransport>,
}

impl ToolRuntime {
    pub fn new(transport: Arc<dyn ToolTransport>) -> Self {
        Self { transport }
    }

    pub async fn build_context(&self) -> Result<ToolContext, TransportError> {
        let tools = self.transport.list_tools().await?;
        let guidance = self
            .transport
            .instructions()
            .await
            .filter(|text| !text.trim().is_empty());
        debug!(tools = tools.len(), "Tool context built");
        Ok(ToolContext { tools, guidance })
    }

    pub fn compose_system_instructions(
        &self,
        context: &ToolContext,
        custom: Option<&str>,
    ) -> String {
        let mut lines = Vec::new();
        if let Some(custom) = custom.map(str::trim).filter(|text| !text.is_empty()) {
            lines.push(custom.to_string());
        }
        lines.extend(
            [
                "You are an autonomous assistant that can call tools to solve user requests.",
                "Every reply must be a single JSON object without commentary or code fences.",
                "To invoke a tool, respond with: {\"action\":\"call_tool\",\"tool\":\"tool_name\",\"input\":{...}}.",
                "Call exactly one tool per reply and wait for its result before deciding the next step.",
                "To obtain the list of available tools, call the special tool: {\"action\":\"call_tool\",\"tool\":\"list_tools\"}.",
                "When you are ready to give the final answer to the user, respond with: {\"action\":\"final\",\"response\":\"...\"}.",
                "Answer in the same language the user wrote in.",
            ]
            .map(String::from),
        );

        if let Some(guidance) = &context.guidance {
            lines.push(format!("Tool server guidance: {guidance}"));
        }

        if context.tools.is_empty() {
            lines.push("No tools are currently available.".to_string());
            return lines.join(" ");
        }

        lines.push("Available tools:".to_string());
        for descriptor in &context.tools {
            let mut line = format!("- {}", descriptor.name);
            if let Some(server) = &descriptor.server {
                line.push_str(&format!(" (server: {server})"));
            }
            if let Some(description) = &descriptor.description {
                line.push_str(&format!(": {description}"));
            }
            if let Some(schema) = &descriptor.input_schema {
                let compact = serde_json::to_string(schema).unwrap_or_default();
                line.push_str(&format!(". Input schema: {compact}"));
            }
            lines.push(line);
        }

        lines.join(" ")
    }

    pub fn initial_user_prompt(&self, prompt: &str) -> String {
        json!({
            "action": "user_request",
            "prompt": prompt,
        })
        .to_string()
    }

    pub async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        context: &ToolContext,
    ) -> Result<ToolExecution, TransportError> {
        if tool_name.eq_ignore_ascii_case(LIST_TOOLS) {
            debug!("Agent requested tool catalogue via list_tools");
            let catalogue = serde_json::to_value(&context.tools).unwrap_or(Value::Null);
            return Ok(ToolExecution {
                tool: LIST_TOOLS.to_string(),
                input,
                result: InvocationResult::success(catalogue),
            });
        }

        let arguments = match &input {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        let result = self.transport.call_tool(tool_name, arguments).await?;
        info!(
            tool = %tool_name,
            success = result.is_success(),
            "Tool executed"
        );
        Ok(ToolExecution {
            tool: tool_name.to_string(),
            input,
            result,
        })
    }
}

pub(crate) struct ToolExecution {
    pub tool: String,
    pub input: Value,
    pub result: InvocationResult,
}

impl ToolExecution {
    pub fn step(&self) -> AgentStep {
        let output = match &self.result {
            InvocationResult::Success { output } => output.clone(),
            InvocationResult::Failure { error } => json!({ "error": error }),
        };
        AgentStep {
            tool: self.tool.clone(),
            input: self.input.clone(),
            success: self.result.is_success(),
            output,
            message: Some(self.result.text()).filter(|text| !text.is_empty()),
        }
    }

    /// The turn appended to the conversation after the call.
    pub fn to_message(&self) -> String {
        let step = self.step();
        json!({
            "tool_result": {
                "tool": step.tool,
                "input": step.input,
                "success": step.success,
                "output": step.output,
                "message": step.message,
            },
            "instruction": TOOL_RESULT_INSTRUCTION,
        })
        .to_string()
    }
}
