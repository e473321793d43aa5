use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::clients::ChatClient;
use super::traits::{ModelClient, ModelProvider};
use super::types::{ModelError, ModelRequest, ModelResponse};
use crate::config::ModelProviderConfig;

/// A configured backend and the models it may be asked for.
struct Backend {
    /// Empty means any model name is passed through.
    allowed: HashSet<String>,
    client: Box<dyn ModelClient>,
}

impl Backend {
    fn from_config(config: &ModelProviderConfig) -> Self {
        let client = ChatClient::from_config(config);
        debug!(
            provider = %config.id,
            dialect = %client.dialect(),
            models = config.models.len(),
            "Model backend ready"
        );
        Self {
            allowed: config.models.iter().map(|info| info.name.clone()).collect(),
            client: Box::new(client),
        }
    }

    fn allows(&self, model: &str) -> bool {
        self.allowed.is_empty() || self.allowed.contains(model)
    }
}

/// Routes each request to the backend named by [`ModelRequest::provider`].
#[derive(Default)]
pub struct DynamicModelProvider {
    backends: HashMap<String, Backend>,
}

impl DynamicModelProvider {
    pub fn from_configs(configs: &[ModelProviderConfig]) -> Self {
        let backends = configs
            .iter()
            .map(|config| (config.id.clone(), Backend::from_config(config)))
            .collect();
        Self { backends }
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.backends.contains_key(provider)
    }
}

#[async_trait]
impl ModelProvider for DynamicModelProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let Some(backend) = self.backends.get(&request.provider) else {
            return Err(ModelError::provider_not_found(&request.provider));
        };
        if !backend.allows(&request.model) {
            return Err(ModelError::model_not_found(&request.provider, &request.model));
        }
        backend.client.chat(request).await
    }
}
