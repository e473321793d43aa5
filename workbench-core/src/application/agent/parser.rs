use super::directive::AgentDirective;
use super::errors::AgentError;
use serde_json::{Map, Value};

/// Reads the model's reply as a directive.
///
/// The reply may be bare JSON, fenced JSON, or JSON embedded in prose. A
/// reply that contains no JSON object at all is taken as the final answer.
pub fn parse_directive(content: &str) -> Result<AgentDirective, AgentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AgentError::InvalidResponse("empty agent response".into()));
    }
    match extract_object(trimmed) {
        Some(map) => parse_action(map),
        None => Ok(AgentDirective::Final {
            response: unquote(trimmed),
        }),
    }
}

fn parse_action(map: Map<String, Value>) -> Result<AgentDirective, AgentError> {
    let Some(action) = map.get("action").and_then(Value::as_str) else {
        return Err(AgentError::InvalidResponse(
            "missing action field in agent response".into(),
        ));
    };
    match action {
        "call_tool" => {
            let tool = map
                .get("tool")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    AgentError::InvalidResponse("call_tool action missing tool field".into())
                })?;
            let input = map.get("input").cloned().unwrap_or(Value::Null);
            Ok(AgentDirective::CallTool {
                tool: tool.to_string(),
                input,
            })
        }
        "final" => {
            let response = match map.get("response") {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => {
                    return Err(AgentError::InvalidResponse(
                        "final action missing response field".into(),
                    ));
                }
                Some(other) => other.to_string(),
            };
            Ok(AgentDirective::Final { response })
        }
        other => Err(AgentError::InvalidResponse(format!(
            "unknown action value: {other}"
        ))),
    }
}

fn extract_object(trimmed: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => return Some(map),
        Ok(Value::String(inner)) => return extract_object(inner.trim()),
        _ => {}
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed.trim_start_matches("```json");
        let stripped = stripped.trim_start_matches("```JSON");
        let stripped = stripped.trim_start_matches("```");
        if let Some(end) = stripped.rfind("```") {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stripped[..end].trim()) {
                return Some(map);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Some(map);
            }
        }
    }

    None
}

fn unquote(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(inner)) => inner,
        _ => text.to_string(),
    }
}
