// Provider config tests - provider type detection and model lists

use std::fs;
use std::path::Path;
use tempfile::tempdir;
use workbench_core::config::{AppConfig, ModelProviderConfig};

fn load_with_provider(dir: &Path, provider: &str) -> AppConfig {
    let path = dir.join("workbench.toml");
    let content = format!(
        r#"
default_provider = "test"
model = "model"

[[providers]]
id = "test"
endpoint = "http://localhost:8080"
{provider}
"#
    );
    fs::write(&path, content).expect("Failed to write config");
    AppConfig::load(Some(&path)).expect("load config")
}

fn provider_of_type(provider_type: &str) -> ModelProviderConfig {
    let dir = tempdir().expect("tempdir");
    let config = load_with_provider(dir.path(), &format!("type = \"{provider_type}\""));
    config.providers[0].clone()
}

#[test]
fn ollama_family_is_case_insensitive() {
    for provider_type in ["ollama", "OLLAMA", "LocalAI"] {
        let provider = provider_of_type(provider_type);
        assert!(provider.is_ollama(), "{provider_type}");
        assert!(!provider.is_gemini(), "{provider_type}");
    }
}

#[test]
fn gemini_family_is_case_insensitive() {
    for provider_type in ["gemini", "GEMINI", "google", "Google-AI"] {
        let provider = provider_of_type(provider_type);
        assert!(provider.is_gemini(), "{provider_type}");
        assert!(!provider.is_ollama(), "{provider_type}");
    }
}

#[test]
fn other_types_use_the_openai_protocol() {
    let provider = provider_of_type("openai");
    assert!(!provider.is_gemini());
    assert!(!provider.is_ollama());
}

#[test]
fn models_accept_plain_and_detailed_entries() {
    let dir = tempdir().expect("tempdir");
    let config = load_with_provider(
        dir.path(),
        r#"type = "ollama"
models = ["model", { name = "llama3", display_name = "Llama 3" }]"#,
    );
    let models = &config.providers[0].models;
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "model");
    assert_eq!(models[0].display_name, None);
    assert_eq!(models[1].display_name.as_deref(), Some("Llama 3"));
}
