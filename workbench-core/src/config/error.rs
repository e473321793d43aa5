use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid TOML: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("`model` is required")]
    MissingModel,

    #[error("`default_provider` is required")]
    MissingDefaultProvider,

    #[error("at least one [[providers]] entry is required")]
    NoProvidersConfigured,

    #[error("`default_provider` names '{provider}', which is not among [[providers]]")]
    ProviderNotFound { provider: String },

    #[error("provider '{provider}' has no endpoint")]
    MissingEndpoint { provider: String },

    #[error("`max_steps` must be positive")]
    InvalidMaxSteps,
}
