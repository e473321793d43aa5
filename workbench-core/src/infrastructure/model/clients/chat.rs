use super::base::{Auth, HttpClientBase};
use super::dialect::Dialect;
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::traits::ModelClient;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;
use std::env;
use tracing::{debug, info, warn};

/// Chat client for one configured provider, whatever its dialect.
#[derive(Clone)]
pub struct ChatClient {
    base: HttpClientBase,
    dialect: Dialect,
    api_path: String,
}

impl ChatClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let dialect = Dialect::of(config);
        let api_key = if dialect.needs_api_key() {
            resolve_api_key(&config.id, config.api_key.as_deref())
        } else {
            None
        };
        Self {
            base: HttpClientBase::new(config.id.clone(), config.endpoint.clone(), api_key),
            dialect,
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| dialect.default_path().to_string()),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Gemini puts the model in the path; the others name it in the body.
    pub fn url_for(&self, model: &str) -> String {
        match self.dialect {
            Dialect::Gemini => self.base.build_url(&format!(
                "{}/{model}:generateContent",
                self.api_path.trim_matches('/')
            )),
            Dialect::OpenAi | Dialect::Ollama => self.base.build_url(&self.api_path),
        }
    }

    fn auth(&self) -> Auth {
        match self.dialect {
            Dialect::Gemini => Auth::QueryKey,
            Dialect::OpenAi => Auth::Bearer,
            Dialect::Ollama => Auth::None,
        }
    }
}

#[async_trait]
impl ModelClient for ChatClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.url_for(&request.model);
        let payload = self.dialect.payload(&request);
        info!(
            provider = %self.base.id,
            dialect = %self.dialect,
            model = %request.model,
            turns = request.messages.len(),
            "Consulting model"
        );

        let reply = self.base.post_json(&url, &payload, self.auth()).await?;
        let content = self.dialect.reply_text(&reply).ok_or_else(|| {
            ModelError::invalid_response(
                &self.base.id,
                format!("{} reply carried no text", self.dialect),
            )
        })?;
        debug!(provider = %self.base.id, chars = content.len(), "Model replied");
        Ok(ModelResponse::new(content))
    }
}

/// Reads the API key from the environment variable named in config.
/// `NAME` and `${NAME}` are both accepted.
pub fn resolve_api_key(provider: &str, configured: Option<&str>) -> Option<String> {
    let raw = configured.map(str::trim).filter(|raw| !raw.is_empty())?;
    let name = raw
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(raw);
    match env::var(name) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(provider, env_var = name, %err, "API key environment variable is not set");
            None
        }
    }
}
