use crate::tooling::ToolDescriptor;
use crate::types::{ChatMessage, MessageRole};
use reqwest::StatusCode;
use thiserror::Error;

/// One turn's worth of input for the reasoning engine.
///
/// `messages` is the whole conversation so far; `tools` is the advertised
/// catalogue, which the system message already describes in prose.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub provider: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDescriptor>,
}

/// The assistant turn a backend produced.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: ChatMessage::new(MessageRole::Assistant, content),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown model provider '{provider}'")]
    ProviderNotFound { provider: String },
    #[error("provider '{provider}' does not list model '{model}'")]
    ModelNotFound { provider: String, model: String },
    #[error("no API key available for provider '{provider}'")]
    MissingApiKey { provider: String },
    #[error("request to provider '{provider}' failed: {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unreadable reply from provider '{provider}': {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn provider_not_found(provider: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider: provider.into(),
        }
    }

    pub fn model_not_found(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// One line for the terminal, without transport internals.
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderNotFound { provider } => {
                format!("No provider '{provider}' in workbench.toml.")
            }
            Self::ModelNotFound { provider, model } => {
                format!("'{provider}' does not offer model '{model}'; add it to its models list.")
            }
            Self::MissingApiKey { provider } => {
                format!("'{provider}' needs an API key. Set the variable named by its api_key.")
            }
            Self::Network { provider, source } => describe_network_failure(provider, source),
            Self::InvalidResponse { provider, reason } => {
                format!("'{provider}' sent a reply that could not be read ({reason}).")
            }
        }
    }
}

fn describe_network_failure(provider: &str, source: &reqwest::Error) -> String {
    if source.is_connect() {
        return format!("Cannot reach '{provider}'. Is the endpoint right and the service up?");
    }
    if source.is_timeout() {
        return format!("'{provider}' did not answer in time.");
    }
    match source.status() {
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            format!("'{provider}' refused the API key.")
        }
        Some(StatusCode::NOT_FOUND) => {
            format!("'{provider}' has no such endpoint; check endpoint and api_path.")
        }
        Some(StatusCode::TOO_MANY_REQUESTS) => format!("'{provider}' is rate limiting requests."),
        Some(status) if status.is_server_error() => {
            format!("'{provider}' failed on its side ({}).", status.as_u16())
        }
        Some(status) => format!("'{provider}' rejected the request ({}).", status.as_u16()),
        None => format!("Network error while talking to '{provider}'."),
    }
}
