use super::errors::AgentError;
use crate::types::ChatMessage;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub const DEFAULT_MAX_STEPS: usize = 30;

/// One executed tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: Value,
    pub success: bool,
    pub output: Value,
    pub message: Option<String>,
}

/// How a run ended. The loop's intermediate phases never escape the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Done,
    Aborted,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgentState::Done => "done",
            AgentState::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Per-run settings. Fixed for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct AgentRunConfig {
    pub provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_steps: usize,
}

impl AgentRunConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub run_id: String,
    pub state: AgentState,
    pub response: Option<String>,
    pub steps: Vec<AgentStep>,
    pub transcript: Vec<ChatMessage>,
    pub max_steps: usize,
}

impl AgentOutcome {
    /// The final answer, or `BudgetExceeded` for an aborted run.
    pub fn into_answer(self) -> Result<String, AgentError> {
        match self.state {
            AgentState::Done => Ok(self.response.unwrap_or_default()),
            AgentState::Aborted => Err(AgentError::BudgetExceeded {
                max_steps: self.max_steps,
            }),
        }
    }
}
