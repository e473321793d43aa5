use super::error::ConfigError;
use super::provider::ModelProviderConfig;
use super::server::ServerConfig;
use super::workspace::WorkspaceConfig;
use std::path::Path;

/// Validated contents of `workbench.toml`.
///
/// The default provider is guaranteed to exist and to list `model`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_steps: usize,
    pub servers: Vec<ServerConfig>,
    pub providers: Vec<ModelProviderConfig>,
    pub workspace: WorkspaceConfig,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    pub fn provider(&self, id: &str) -> Option<&ModelProviderConfig> {
        self.providers.iter().find(|provider| provider.id == id)
    }
}
