// Config loading tests - testing AppConfig::load error handling
//
// Tests focused on configuration file loading and validation errors.

use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use workbench_core::agent::DEFAULT_MAX_STEPS;
use workbench_core::config::{AppConfig, ConfigError, load_workspace};

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("workbench.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

const PROVIDERS: &str = r#"
[[providers]]
id = "gemini"
type = "gemini"
endpoint = "https://generativelanguage.googleapis.com"
api_key = "GOOGLE_API_KEY"
models = ["gemini-2.0-flash"]
"#;

fn load(content: &str) -> Result<AppConfig, ConfigError> {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), content);
    AppConfig::load(Some(&path))
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/workbench.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_error_on_invalid_toml() {
    let result = load("model = \"unterminated");
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn returns_error_when_model_missing() {
    let result = load(&format!("default_provider = \"gemini\"\n{PROVIDERS}"));
    assert!(matches!(result, Err(ConfigError::MissingModel)));
}

#[test]
fn returns_error_when_default_provider_missing() {
    let result = load(&format!("model = \"gemini-2.0-flash\"\n{PROVIDERS}"));
    assert!(matches!(result, Err(ConfigError::MissingDefaultProvider)));
}

#[test]
fn returns_error_when_no_providers() {
    let result = load("model = \"m\"\ndefault_provider = \"gemini\"\n");
    assert!(matches!(result, Err(ConfigError::NoProvidersConfigured)));
}

#[test]
fn returns_error_when_default_provider_unknown() {
    let result = load(&format!(
        "model = \"m\"\ndefault_provider = \"openai\"\n{PROVIDERS}"
    ));
    assert!(matches!(
        result,
        Err(ConfigError::ProviderNotFound { provider }) if provider == "openai"
    ));
}

#[test]
fn returns_error_when_endpoint_missing() {
    let result = load(
        r#"
model = "llama3"
default_provider = "local"

[[providers]]
id = "local"
type = "ollama"
"#,
    );
    assert!(matches!(
        result,
        Err(ConfigError::MissingEndpoint { provider }) if provider == "local"
    ));
}

#[test]
fn returns_error_when_max_steps_zero() {
    let result = load(&format!(
        "model = \"m\"\ndefault_provider = \"gemini\"\nmax_steps = 0\n{PROVIDERS}"
    ));
    assert!(matches!(result, Err(ConfigError::InvalidMaxSteps)));
}

#[test]
fn minimal_config_gets_defaults() {
    let config = load(&format!(
        "model = \"gemini-2.0-flash\"\ndefault_provider = \"gemini\"\n{PROVIDERS}"
    ))
    .expect("valid config");

    assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
    assert!(config.servers.is_empty());
    assert!(config.workspace.allow_shell);
    assert_eq!(config.workspace.shell_timeout_secs, 60);
    assert!(config.workspace.ignored_dirs.contains(&"__pycache__".to_string()));
    assert_eq!(config.provider("gemini").map(|p| p.is_gemini()), Some(true));
}

#[test]
fn default_model_is_added_to_provider() {
    let config = load(&format!(
        "model = \"gemini-2.5-pro\"\ndefault_provider = \"gemini\"\n{PROVIDERS}"
    ))
    .expect("valid config");
    let provider = config.provider("gemini").expect("provider");
    let names: Vec<&str> = provider.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["gemini-2.0-flash", "gemini-2.5-pro"]);
}

#[test]
#[serial]
fn servers_and_workspace_are_expanded() {
    unsafe {
        std::env::set_var("WORKBENCH_TEST_HOME", "/opt/workbench");
    }
    let config = load(&format!(
        r#"
model = "gemini-2.0-flash"
default_provider = "gemini"
max_steps = 12
system_prompt = "Be brief."

[[servers]]
name = "tools"
command = "$WORKBENCH_TEST_HOME/bin/workbench-server"
args = ["--root", "${{WORKBENCH_TEST_HOME}}/data"]

[workspace]
root = "$WORKBENCH_TEST_HOME/data"
allow_shell = false
{PROVIDERS}"#
    ))
    .expect("valid config");
    unsafe {
        std::env::remove_var("WORKBENCH_TEST_HOME");
    }

    assert_eq!(config.max_steps, 12);
    assert_eq!(config.system_prompt.as_deref(), Some("Be brief."));
    let server = &config.servers[0];
    assert_eq!(
        server.command,
        PathBuf::from("/opt/workbench/bin/workbench-server")
    );
    assert_eq!(server.args, vec!["--root", "/opt/workbench/data"]);
    assert_eq!(
        config.workspace.root,
        Some(PathBuf::from("/opt/workbench/data"))
    );
    assert!(!config.workspace.allow_shell);
}

#[test]
fn workspace_only_loading_ignores_other_tables() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[workspace]
ignored_dirs = ["target"]
shell_timeout_secs = 3
"#,
    );
    let workspace = load_workspace(Some(&path)).expect("workspace");
    assert_eq!(workspace.ignored_dirs, vec!["target".to_string()]);
    assert_eq!(workspace.shell_timeout_secs, 3);
}

#[test]
fn workspace_loading_requires_explicit_file_to_exist() {
    let result = load_workspace(Some(Path::new("/nonexistent/workbench.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn shipped_sample_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/workbench.toml");
    let config = AppConfig::load(Some(&path)).expect("sample config loads");

    assert_eq!(config.default_provider, "gemini");
    let gemini = config.provider("gemini").expect("gemini provider");
    assert_eq!(gemini.api_key.as_deref(), Some("GOOGLE_API_KEY"));
    assert!(config.provider("ollama").is_some_and(|p| p.is_ollama()));
    assert!(config.servers.is_empty());
}
