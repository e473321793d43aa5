use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// Anything the agent can ask for its next move.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

/// A single backend reached over the network.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider id from configuration.
    fn id(&self) -> &str;

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
