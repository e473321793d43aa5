use crate::config::ModelProviderConfig;
use crate::constants::{DEFAULT_GEMINI_API_PATH, DEFAULT_OLLAMA_API_PATH, DEFAULT_OPENAI_API_PATH};
use crate::infrastructure::model::types::ModelRequest;
use crate::types::{ChatMessage, MessageRole};
use serde_json::{Value, json};
use std::fmt;

/// Wire format spoken by a provider's chat endpoint.
///
/// Every dialect asks for JSON output where the API allows it, since the
/// agent reads replies as directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gemini,
    OpenAi,
    Ollama,
}

impl Dialect {
    pub fn of(config: &ModelProviderConfig) -> Self {
        if config.is_gemini() {
            Dialect::Gemini
        } else if config.is_ollama() {
            Dialect::Ollama
        } else {
            Dialect::OpenAi
        }
    }

    pub fn default_path(self) -> &'static str {
        match self {
            Dialect::Gemini => DEFAULT_GEMINI_API_PATH,
            Dialect::OpenAi => DEFAULT_OPENAI_API_PATH,
            Dialect::Ollama => DEFAULT_OLLAMA_API_PATH,
        }
    }

    /// Local Ollama servers are called without credentials.
    pub fn needs_api_key(self) -> bool {
        !matches!(self, Dialect::Ollama)
    }

    pub fn payload(self, request: &ModelRequest) -> Value {
        match self {
            Dialect::Gemini => {
                let (system, contents) = gemini_contents(&request.messages);
                let mut body = json!({
                    "contents": contents,
                    "generationConfig": { "responseMimeType": "application/json" },
                });
                if let Some(system) = system {
                    body["system_instruction"] = json!({ "parts": [{ "text": system }] });
                }
                body
            }
            Dialect::OpenAi => json!({
                "model": request.model,
                "messages": role_content_messages(&request.messages),
                "stream": false,
            }),
            Dialect::Ollama => json!({
                "model": request.model,
                "messages": role_content_messages(&request.messages),
                "stream": false,
                "format": "json",
            }),
        }
    }

    /// Text of the first candidate in a provider reply.
    pub fn reply_text(self, reply: &Value) -> Option<String> {
        let text = match self {
            Dialect::Gemini => reply
                .pointer("/candidates/0/content/parts")?
                .as_array()?
                .iter()
                .find_map(|part| part.get("text")?.as_str()),
            Dialect::OpenAi => reply.pointer("/choices/0/message/content")?.as_str(),
            Dialect::Ollama => reply.pointer("/message/content")?.as_str(),
        };
        text.map(str::to_string)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Gemini => "gemini",
            Dialect::OpenAi => "openai",
            Dialect::Ollama => "ollama",
        })
    }
}

/// `[{"role", "content"}]` turns. Tool results are replayed as user turns;
/// directives carry no call ids for a native `tool` role to refer to.
fn role_content_messages(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let role = match message.role {
                MessageRole::Tool => MessageRole::User,
                other => other,
            };
            json!({ "role": role.as_str(), "content": message.content })
        })
        .collect()
}

/// System turns are lifted into one instruction; everything else becomes
/// `user` or `model` contents.
fn gemini_contents(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
    let mut system = Vec::new();
    let mut contents = Vec::new();
    for message in messages {
        let role = match message.role {
            MessageRole::System => {
                system.push(message.content.as_str());
                continue;
            }
            MessageRole::Assistant => "model",
            MessageRole::User | MessageRole::Tool => "user",
        };
        contents.push(json!({ "role": role, "parts": [{ "text": message.content }] }));
    }
    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, contents)
}
