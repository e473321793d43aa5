//! `[[providers]]` entries: the reasoning engine backends.
//!
//! `type` selects the wire format. `gemini` (aliases `google`, `google-ai`)
//! and `ollama` (alias `localai`) are recognised; anything else is treated
//! as an OpenAI-compatible chat completions API. Only Ollama runs without
//! an API key.

use serde::Deserialize;

/// A model a provider serves. Written either as a bare name or as a table
/// with `name` and `display_name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ModelEntry")]
pub struct ModelInfo {
    pub name: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelEntry {
    Bare(String),
    Table {
        name: String,
        #[serde(default)]
        display_name: Option<String>,
    },
}

impl From<ModelEntry> for ModelInfo {
    fn from(entry: ModelEntry) -> Self {
        let (name, display_name) = match entry {
            ModelEntry::Bare(name) => (name, None),
            ModelEntry::Table { name, display_name } => (name, display_name),
        };
        Self { name, display_name }
    }
}

/// ```toml
/// [[providers]]
/// id = "gemini"
/// type = "gemini"
/// endpoint = "https://generativelanguage.googleapis.com"
/// api_key = "GOOGLE_API_KEY"
/// models = ["gemini-2.0-flash"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelProviderConfig {
    pub id: String,
    #[serde(rename = "type", default)]
    pub provider_type: String,
    /// Empty when absent; rejected during validation.
    #[serde(default)]
    pub endpoint: String,
    /// Name of the environment variable holding the key, optionally as `${NAME}`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_path: Option<String>,
    /// Empty accepts any model name.
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

impl ModelProviderConfig {
    /// Appends `model` unless already listed.
    pub fn ensure_model(&mut self, model: &str) {
        if !self.models.iter().any(|info| info.name == model) {
            self.models.push(ModelInfo {
                name: model.to_owned(),
                display_name: None,
            });
        }
    }

    /// ```
    /// use workbench_core::config::ModelProviderConfig;
    ///
    /// let provider = ModelProviderConfig {
    ///     id: "local".to_string(),
    ///     provider_type: "LocalAI".to_string(),
    ///     endpoint: "http://localhost:11434".to_string(),
    ///     api_key: None,
    ///     api_path: None,
    ///     models: vec![],
    /// };
    /// assert!(provider.is_ollama());
    /// assert!(!provider.is_gemini());
    /// ```
    pub fn is_ollama(&self) -> bool {
        self.type_is(&["ollama", "localai"])
    }

    pub fn is_gemini(&self) -> bool {
        self.type_is(&["gemini", "google", "google-ai"])
    }

    fn type_is(&self, names: &[&str]) -> bool {
        let kind = self.provider_type.trim();
        names.iter().any(|name| kind.eq_ignore_ascii_case(name))
    }
}
