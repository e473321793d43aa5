use super::loader::expand;
use crate::constants::{DEFAULT_IGNORED_DIRS, DEFAULT_SHELL_TIMEOUT_SECS};
use serde::Deserialize;
use std::path::PathBuf;

/// `[workspace]` table: where file tools operate and whether the shell tool
/// is offered. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: Option<PathBuf>,
    pub ignored_dirs: Vec<String>,
    pub allow_shell: bool,
    pub shell_timeout_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: None,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            allow_shell: true,
            shell_timeout_secs: DEFAULT_SHELL_TIMEOUT_SECS,
        }
    }
}

impl WorkspaceConfig {
    pub(super) fn expanded(mut self) -> Self {
        self.root = self
            .root
            .map(|root| PathBuf::from(expand(&root.to_string_lossy())));
        self
    }
}
