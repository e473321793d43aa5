// CLI tests - flag parsing and how flags override the loaded configuration

use clap::Parser;
use std::fs;
use tempfile::tempdir;
use workbench_cli::{Cli, RunMode, build_transport, run_config};
use workbench_core::config::AppConfig;

const CONFIG: &str = r#"
model = "gemini-2.0-flash"
default_provider = "gemini"
max_steps = 8
system_prompt = "Answer in one line."

[[providers]]
id = "gemini"
type = "gemini"
endpoint = "https://generativelanguage.googleapis.com"
api_key = "GOOGLE_API_KEY"
models = ["gemini-2.0-flash"]

[[providers]]
id = "local"
type = "ollama"
endpoint = "http://127.0.0.1:11434"
models = ["llama3"]
"#;

fn load_config() -> AppConfig {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("workbench.toml");
    fs::write(&path, CONFIG).expect("write config");
    AppConfig::load(Some(&path)).expect("valid config")
}

#[test]
fn configuration_supplies_defaults() {
    let config = load_config();
    let cli = Cli::try_parse_from(["workbench", "what", "is", "2+2"]).expect("parse");

    assert_eq!(cli.mode, RunMode::Agent);
    let run = run_config(&cli, &config);
    assert_eq!(run.provider, "gemini");
    assert_eq!(run.model, "gemini-2.0-flash");
    assert_eq!(run.max_steps, 8);
    assert_eq!(run.system_prompt.as_deref(), Some("Answer in one line."));
}

#[test]
fn flags_override_configuration() {
    let config = load_config();
    let cli = Cli::try_parse_from([
        "workbench",
        "--provider",
        "local",
        "--model",
        "llama3",
        "--max-steps",
        "3",
        "--system",
        "Be verbose.",
        "task",
    ])
    .expect("parse");

    let run = run_config(&cli, &config);
    assert_eq!(run.provider, "local");
    assert_eq!(run.model, "llama3");
    assert_eq!(run.max_steps, 3);
    assert_eq!(run.system_prompt.as_deref(), Some("Be verbose."));
}

#[test]
fn unknown_mode_is_rejected() {
    assert!(Cli::try_parse_from(["workbench", "--mode", "batch"]).is_err());
}

#[tokio::test]
async fn no_servers_means_builtin_tools_in_process() {
    let config = load_config();
    let transport = build_transport(&config).expect("transport");
    let tools = transport.list_tools().await.expect("tools");

    assert!(tools.iter().any(|tool| tool.name == "show_directory"));
    assert!(tools.iter().all(|tool| tool.server.is_none()));
}
