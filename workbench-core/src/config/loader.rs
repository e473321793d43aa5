use super::app::AppConfig;
use super::error::ConfigError;
use super::provider::ModelProviderConfig;
use super::server::ServerConfig;
use super::workspace::WorkspaceConfig;
use crate::agent::DEFAULT_MAX_STEPS;
use crate::constants::{CONFIG_PATH, ENV_PATH};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Once;
use std::{fs, io};
use tracing::{debug, info};

static DOTENV: Once = Once::new();

/// The file as written, before required keys are checked.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    model: Option<String>,
    default_provider: Option<String>,
    system_prompt: Option<String>,
    max_steps: Option<usize>,
    #[serde(default)]
    servers: Vec<ServerConfig>,
    #[serde(default)]
    providers: Vec<ModelProviderConfig>,
    #[serde(default)]
    workspace: WorkspaceConfig,
}

/// Just the `[workspace]` table, for the tool server which never talks to
/// a model. Other tables may be absent or incomplete.
#[derive(Debug, Deserialize)]
struct WorkspaceFile {
    #[serde(default)]
    workspace: WorkspaceConfig,
}

/// Loads `config/.env`, then `.env`, once per process. Variables already
/// set are never overwritten.
pub fn ensure_env_loaded() {
    DOTENV.call_once(|| {
        let loaded = [dotenvy::from_filename(ENV_PATH), dotenvy::dotenv()];
        for path in loaded.into_iter().flatten() {
            debug!(path = %path.display(), "Loaded environment file");
        }
    });
}

/// Reads and validates the configuration at `path`, or at
/// [`CONFIG_PATH`] when none is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    let path = path.unwrap_or(Path::new(CONFIG_PATH));
    let file: ConfigFile = read_toml(path)?;
    let config = file.validate()?;
    info!(
        path = %path.display(),
        provider = %config.default_provider,
        model = %config.model,
        servers = config.servers.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Reads only the `[workspace]` table. Without an explicit path a missing
/// default file yields the default workspace.
pub fn load_workspace(path: Option<&Path>) -> Result<WorkspaceConfig, ConfigError> {
    ensure_env_loaded();
    match read_toml::<WorkspaceFile>(path.unwrap_or(Path::new(CONFIG_PATH))) {
        Ok(file) => Ok(file.workspace.expanded()),
        Err(ConfigError::NotFound { .. }) if path.is_none() => {
            debug!("No configuration file, using default workspace");
            Ok(WorkspaceConfig::default())
        }
        Err(err) => Err(err),
    }
}

/// Expands `~` and `$VAR` / `${VAR}`. Unknown variables are left as written.
pub(super) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| value.to_owned())
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ConfigFile {
    fn validate(self) -> Result<AppConfig, ConfigError> {
        let model = self.model.ok_or(ConfigError::MissingModel)?;
        let default_provider = self
            .default_provider
            .ok_or(ConfigError::MissingDefaultProvider)?;
        let max_steps = match self.max_steps {
            Some(0) => return Err(ConfigError::InvalidMaxSteps),
            Some(steps) => steps,
            None => DEFAULT_MAX_STEPS,
        };
        if self.providers.is_empty() {
            return Err(ConfigError::NoProvidersConfigured);
        }
        if let Some(provider) = self
            .providers
            .iter()
            .find(|provider| provider.endpoint.trim().is_empty())
        {
            return Err(ConfigError::MissingEndpoint {
                provider: provider.id.clone(),
            });
        }

        let mut providers = self.providers;
        match providers.iter_mut().find(|p| p.id == default_provider) {
            Some(provider) => provider.ensure_model(&model),
            None => {
                return Err(ConfigError::ProviderNotFound {
                    provider: default_provider,
                });
            }
        }

        Ok(AppConfig {
            default_provider,
            model,
            system_prompt: self.system_prompt,
            max_steps,
            servers: self.servers.into_iter().map(ServerConfig::expanded).collect(),
            providers,
            workspace: self.workspace.expanded(),
        })
    }
}
