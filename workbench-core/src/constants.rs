//! Application constants
//!
//! Single source of truth for paths and protocol constants.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/workbench.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// MCP protocol revision spoken by both the client and the tool server
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Name reported in `initialize` handshakes
pub const SERVER_NAME: &str = "workbench-tools";

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

/// Default OpenAI-compatible chat completions path
pub const DEFAULT_OPENAI_API_PATH: &str = "/v1/chat/completions";

/// Default Ollama chat path
pub const DEFAULT_OLLAMA_API_PATH: &str = "/api/chat";

/// Directory names skipped by `show_directory` unless configured otherwise
pub const DEFAULT_IGNORED_DIRS: [&str; 3] = ["__pycache__", ".git", ".venv"];

/// Seconds a shell command may run before it is killed
pub const DEFAULT_SHELL_TIMEOUT_SECS: u64 = 60;
