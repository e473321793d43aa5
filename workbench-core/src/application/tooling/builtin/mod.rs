//! Built-in tool handlers.
//!
//! Handlers are plain synchronous functions returning
//! `Result<Value, ToolFailure>`; the registry turns that into an
//! [`InvocationResult`](super::InvocationResult).

mod files;
mod math;
mod shell;
mod tree;

use super::registry::ToolKind;
use super::result::ToolFailure;
use super::schema::Arguments;
use crate::config::WorkspaceConfig;
use crate::constants::{DEFAULT_IGNORED_DIRS, DEFAULT_SHELL_TIMEOUT_SECS};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use math::floor_div;
pub use tree::render_tree;

/// Filesystem and process settings shared by every handler.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    ignored_dirs: BTreeSet<String>,
    allow_shell: bool,
    shell_timeout: Duration,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            allow_shell: true,
            shell_timeout: Duration::from_secs(DEFAULT_SHELL_TIMEOUT_SECS),
        }
    }
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_ignored_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_shell(mut self, allowed: bool) -> Self {
        self.allow_shell = allowed;
        self
    }

    pub fn with_shell_timeout(mut self, timeout: Duration) -> Self {
        self.shell_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignored_dirs(&self) -> &BTreeSet<String> {
        &self.ignored_dirs
    }

    pub fn allow_shell(&self) -> bool {
        self.allow_shell
    }

    pub fn shell_timeout(&self) -> Duration {
        self.shell_timeout
    }

    /// Relative paths are taken from the workspace root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

impl From<&WorkspaceConfig> for Workspace {
    fn from(config: &WorkspaceConfig) -> Self {
        let root = config.root.clone().unwrap_or_else(|| PathBuf::from("."));
        Workspace::new(root)
            .with_ignored_dirs(config.ignored_dirs.iter().cloned())
            .with_shell(config.allow_shell)
            .with_shell_timeout(Duration::from_secs(config.shell_timeout_secs))
    }
}

impl ToolKind {
    /// Runs the handler behind this tool with already validated arguments.
    pub fn call(self, args: &Arguments, workspace: &Workspace) -> Result<Value, ToolFailure> {
        match self {
            ToolKind::Add => math::add(args),
            ToolKind::Subtract => math::subtract(args),
            ToolKind::Multiply => math::multiply(args),
            ToolKind::Divide => math::divide(args),
            ToolKind::ShowDirectory => tree::show_directory(args, workspace),
            ToolKind::CreateFile => files::create_file(args, workspace),
            ToolKind::EditFile => files::edit_file(args, workspace),
            ToolKind::AppendFile => files::append_file(args, workspace),
            ToolKind::DeleteFile => files::delete_file(args, workspace),
            ToolKind::RunShellCommand => shell::run_shell_command(args, workspace),
        }
    }
}
