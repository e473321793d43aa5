use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use thiserror::Error;

/// Failure categories a tool invocation can report back as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArguments,
    HandlerFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArguments => "invalid_arguments",
            ErrorKind::HandlerFailure => "handler_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ToolFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// Offending parameter for `InvalidArguments`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ToolFailure {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
            parameter: None,
        }
    }

    pub fn invalid_arguments(parameter: impl Into<String>, reason: impl fmt::Display) -> Self {
        let parameter = parameter.into();
        Self {
            kind: ErrorKind::InvalidArguments,
            message: format!("invalid argument '{parameter}': {reason}"),
            parameter: Some(parameter),
        }
    }

    pub fn handler(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::HandlerFailure,
            message: message.into(),
            parameter: None,
        }
    }
}

/// Outcome of a single dispatch: a payload or a failure, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationResult {
    Success { output: Value },
    Failure { error: ToolFailure },
}

impl InvocationResult {
    pub fn success(output: impl Into<Value>) -> Self {
        Self::Success {
            output: output.into(),
        }
    }

    pub fn failure(error: ToolFailure) -> Self {
        Self::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&ToolFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Plain-text rendering handed to the reasoning engine.
    pub fn text(&self) -> String {
        match self {
            Self::Success {
                output: Value::String(text),
            } => text.clone(),
            Self::Success { output } => output.to_string(),
            Self::Failure { error } => error.message.clone(),
        }
    }

    /// Encodes the result as an MCP `tools/call` result object.
    pub fn to_call_result(&self) -> Value {
        match self {
            Self::Success { output } => json!({
                "content": [{ "type": "text", "text": self.text() }],
                "structuredContent": { "result": output },
                "isError": false,
            }),
            Self::Failure { error } => json!({
                "content": [{ "type": "text", "text": error.message }],
                "structuredContent": { "error": error },
                "isError": true,
            }),
        }
    }

    /// Decodes an MCP `tools/call` result object produced by any server.
    ///
    /// Servers that do not send `structuredContent` are read from their text
    /// blocks; an error without a recognised kind is a `HandlerFailure`.
    pub fn from_call_result(result: &Value) -> Self {
        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let structured = result.get("structuredContent");

        if is_error {
            let error = structured
                .and_then(|value| value.get("error"))
                .and_then(|value| serde_json::from_value::<ToolFailure>(value.clone()).ok())
                .unwrap_or_else(|| {
                    ToolFailure::handler(
                        extract_text(result).unwrap_or_else(|| "tool reported an error".into()),
                    )
                });
            return Self::Failure { error };
        }

        if let Some(output) = structured.and_then(|value| value.get("result")) {
            return Self::Success {
                output: output.clone(),
            };
        }

        Self::Success {
            output: extract_text(result).map(Value::String).unwrap_or(Value::Null),
        }
    }
}

impl From<Result<Value, ToolFailure>> for InvocationResult {
    fn from(value: Result<Value, ToolFailure>) -> Self {
        match value {
            Ok(output) => Self::Success { output },
            Err(error) => Self::Failure { error },
        }
    }
}

fn extract_text(result: &Value) -> Option<String> {
    let blocks = result.get("content").and_then(Value::as_array)?;
    let texts: Vec<&str> = blocks
        .iter()
        .filter(|block| {
            block
                .get("type")
                .and_then(Value::as_str)
                .map(|kind| kind.eq_ignore_ascii_case("text"))
                .unwrap_or(false)
        })
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}
