use crate::model::ModelError;
use crate::tooling::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
    #[error("agent exceeded the step budget of {max_steps} tool calls")]
    BudgetExceeded { max_steps: usize },
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::Transport(err) => {
                format!("Tool server '{}' is unavailable: {err}", err.server())
            }
            AgentError::InvalidResponse(_) => {
                "The model kept answering in a format the agent could not understand. Try rephrasing the task."
                    .to_string()
            }
            AgentError::BudgetExceeded { max_steps } => format!(
                "Stopped after {max_steps} tool calls without a final answer. Raise max_steps or simplify the task."
            ),
        }
    }
}
