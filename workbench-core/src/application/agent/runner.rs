use super::context::ToolContext;
use super::conversation::Conversation;
use super::directive::AgentDirective;
use super::errors::AgentError;
use super::models::{AgentOutcome, AgentRunConfig, AgentState};
use super::parser::parse_directive;
use super::runtime::{JSON_RETRY_MESSAGE, ToolRuntime};
use crate::model::{ModelProvider, ModelRequest};
use crate::tooling::ToolTransport;
use crate::types::MessageRole;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Maximum retry attempts for JSON parsing failures
const MAX_JSON_RETRIES: u8 = 3;

enum Phase {
    AwaitModel,
    ExecuteTool { tool: String, input: Value },
}

pub struct Agent<P: ModelProvider> {
    provider: Arc<P>,
    runtime: ToolRuntime,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: Arc<P>, transport: Arc<dyn ToolTransport>) -> Self {
        Self {
            provider,
            runtime: ToolRuntime::new(transport),
        }
    }

    /// Runs one task to a final answer or until the step budget is spent.
    ///
    /// Tool failures are handed back to the model as data. Only model,
    /// transport and repeated malformed replies end the run with an error.
    pub async fn run(
        &self,
        task: &str,
        config: &AgentRunConfig,
    ) -> Result<AgentOutcome, AgentError> {
        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            provider = %config.provider,
            model = %config.model,
            max_steps = config.max_steps,
            "Agent run started"
        );

        let context = self.runtime.build_context().await?;
        let mut conversation = Conversation::new();
        conversation.push(
            MessageRole::System,
            self.runtime
                .compose_system_instructions(&context, config.system_prompt.as_deref()),
        );
        conversation.push(MessageRole::User, self.runtime.initial_user_prompt(task));

        let mut steps = Vec::new();
        let mut response = None;
        let mut phase = Phase::AwaitModel;

        let state = loop {
            phase = match phase {
                Phase::AwaitModel => {
                    debug!(run_id = %run_id, steps = steps.len(), "Awaiting model");
                    let content = self.consult(&mut conversation, config, &context).await?;
                    let directive = self
                        .parse_with_retry(content, &mut conversation, config, &context)
                        .await?;
                    match directive {
                        AgentDirective::Final { response: answer } => {
                            info!(run_id = %run_id, steps = steps.len(), "Agent returned final response");
                            response = Some(answer);
                            break AgentState::Done;
                        }
                        AgentDirective::CallTool { .. } if steps.len() >= config.max_steps => {
                            warn!(
                                run_id = %run_id,
                                max_steps = config.max_steps,
                                "Agent exceeded max tool interactions"
                            );
                            break AgentState::Aborted;
                        }
                        AgentDirective::CallTool { tool, input } => {
                            Phase::ExecuteTool { tool, input }
                        }
                    }
                }
                Phase::ExecuteTool { tool, input } => {
                    info!(run_id = %run_id, tool = %tool, "Agent requested tool execution");
                    let execution = self.runtime.execute(&tool, input, &context).await?;
                    steps.push(execution.step());
                    conversation.push(MessageRole::Tool, execution.to_message());
                    Phase::AwaitModel
                }
            };
        };

        Ok(AgentOutcome {
            run_id,
            state,
            response,
            steps,
            transcript: conversation.into_messages(),
            max_steps: config.max_steps,
        })
    }

    async fn consult(
        &self,
        conversation: &mut Conversation,
        config: &AgentRunConfig,
        context: &ToolContext,
    ) -> Result<String, AgentError> {
        let request = ModelRequest {
            provider: config.provider.clone(),
            model: config.model.clone(),
            messages: conversation.messages().to_vec(),
            tools: context.tools.clone(),
        };
        let reply = self.provider.chat(request).await?;
        let content = reply.message.content;
        conversation.push(MessageRole::Assistant, content.clone());
        Ok(content)
    }

    /// Parse agent action with retry logic for malformed JSON
    async fn parse_with_retry(
        &self,
        content: String,
        conversation: &mut Conversation,
        config: &AgentRunConfig,
        context: &ToolContext,
    ) -> Result<AgentDirective, AgentError> {
        let mut retry_count = 0u8;
        let mut current_content = content;

        loop {
            match parse_directive(&current_content) {
                Ok(directive) => return Ok(directive),
                Err(e) if retry_count < MAX_JSON_RETRIES => {
                    retry_count += 1;
                    warn!(
                        attempt = retry_count,
                        max_attempts = MAX_JSON_RETRIES,
                        error = %e,
                        "JSON parse failed, requesting correction from model"
                    );
                    conversation.push(
                        MessageRole::User,
                        format!("{JSON_RETRY_MESSAGE}\n\nError details: {e}"),
                    );
                    current_content = self.consult(conversation, config, context).await?;
                }
                Err(e) => {
                    warn!(
                        attempts = retry_count,
                        "JSON parse failed after max retries"
                    );
                    return Err(AgentError::InvalidResponse(format!(
                        "invalid JSON after {MAX_JSON_RETRIES} retry attempts: {e}"
                    )));
                }
            }
        }
    }
}
