//! # Agent Module
//!
//! A step-budgeted loop that lets a language model drive the registered
//! tools.
//!
//! ## Agent Loop
//!
//! 1. Seed the conversation with the protocol instructions (including the
//!    advertised tool list) and the user's task
//! 2. Ask the model for its next move, re-asking on malformed JSON
//! 3. On a tool call, dispatch it and append the result as a new turn
//! 4. On a final answer, stop
//!
//! A tool call requested once `max_steps` tools have already run aborts the
//! run without consulting the model again.

mod context;
mod conversation;
mod directive;
mod errors;
mod models;
mod parser;
mod runner;
mod runtime;


pub use context::ToolContext;
pub use conversation::Conversation;
pub use directive::AgentDirective;
pub use errors::AgentError;
pub use models::{AgentOutcome, AgentRunConfig, AgentState, AgentStep, DEFAULT_MAX_STEPS};
pub use parser::parse_directive;
pub use runner::Agent;
