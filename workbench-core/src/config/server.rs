use super::loader::expand;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One `[[servers]]` entry: an MCP tool server launched as a subprocess.
///
/// `command`, `args`, `env` values and `workdir` may reference environment
/// variables; they are expanded when the configuration is loaded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub workdir: Option<PathBuf>,
}

impl ServerConfig {
    pub(super) fn expanded(self) -> Self {
        let path = |path: &Path| PathBuf::from(expand(&path.to_string_lossy()));
        Self {
            command: path(&self.command),
            args: self.args.iter().map(|arg| expand(arg)).collect(),
            env: self
                .env
                .into_iter()
                .map(|(key, value)| {
                    let value = expand(&value);
                    (key, value)
                })
                .collect(),
            workdir: self.workdir.as_deref().map(path),
            name: self.name,
        }
    }
}
