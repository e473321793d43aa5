//! `workbench.toml` loading and validation.

mod app;
mod error;
mod loader;
mod provider;
mod server;
mod workspace;

pub use crate::constants::CONFIG_PATH;

pub use app::AppConfig;
pub use error::ConfigError;
pub use loader::{ensure_env_loaded, load_config, load_workspace};
pub use provider::{ModelInfo, ModelProviderConfig};
pub use server::ServerConfig;
pub use workspace::WorkspaceConfig;
