//! # workbench-core
//!
//! Tool registry and dispatcher, the MCP stdio transport on both ends, and the
//! agent loop that lets a language model drive the registered tools.
//!
//! - [`tooling`] - tool schemas, the registry, built-in handlers and transports
//! - [`agent`] - the step-budgeted agent loop
//! - [`model`] - reasoning engine providers (Gemini, OpenAI-compatible, Ollama)
//! - [`rpc`] - JSON-RPC types and the stdio tool server
//! - [`config`] - TOML configuration and `.env` loading

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, tooling};
pub use config::{AppConfig, ConfigError};
pub use domain::types;
pub use infrastructure::{model, rpc};
