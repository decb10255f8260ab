//! Two-call tool orchestration: Elicit → Resolve → Synthesize.
//!
//! 1. Append the user query and ask the model, offering every tool
//! 2. Dispatch each requested tool in order and record its output
//! 3. Ask the model again to answer from the populated conversation

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::agent::conversation::Conversation;
use crate::config::{AgentConfig, DEFAULT_SYNTHESIS_INSTRUCTIONS};
use crate::provider::{ModelProvider, ModelRequest};
use crate::tools::{self, Dispatcher};
use crate::types::*;

/// What one `run` produced.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub final_text: String,
    pub tool_results: Vec<ToolCallResult>,
    pub usage: TokenUsage,
}

/// Drives the model provider and the tool dispatcher.
///
/// The agent itself holds no conversation; callers own a [`Conversation`]
/// and pass it to every [`Agent::run`].
pub struct Agent<P> {
    provider: P,
    dispatcher: Dispatcher,
    model: String,
    synthesis_instructions: String,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: P, dispatcher: Dispatcher, model: impl Into<String>) -> Self {
        Self {
            provider,
            dispatcher,
            model: model.into(),
            synthesis_instructions: DEFAULT_SYNTHESIS_INSTRUCTIONS.to_string(),
        }
    }

    /// Build an agent with the tools, retry bound, and model named in config.
    pub fn from_config(provider: P, config: &AgentConfig) -> Result<Self> {
        let registry = tools::build_registry(&config.tools)
            .context("Failed to build tool registry")?;
        let dispatcher = Dispatcher::new(Arc::new(registry), config.max_retries)
            .with_validation(config.validate_arguments);

        Ok(Self::new(provider, dispatcher, &config.model)
            .with_synthesis_instructions(&config.synthesis_instructions))
    }

    pub fn with_synthesis_instructions(mut self, instructions: &str) -> Self {
        self.synthesis_instructions = instructions.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Answer one user query, extending `conversation` in place.
    ///
    /// Tool failures never end the run; they become outputs the model sees.
    /// Errors are returned only for provider failures and conversation
    /// invariant violations.
    pub async fn run(&self, conversation: &mut Conversation, query: &str) -> Result<RunOutcome> {
        let tag = conversation.id().to_string();
        let tool_defs = self.dispatcher.registry().definitions();
        let mut usage = TokenUsage::default();

        // Phase 1: elicit
        info!("[{}] User Query: {}", tag, query);
        conversation.push_user(query);

        let first = self
            .provider
            .respond(ModelRequest {
                model: &self.model,
                instructions: None,
                tools: &tool_defs,
                input: conversation.items(),
            })
            .await
            .context("Tool selection request failed")?;
        usage += first.usage;
        debug!("[{}] First call usage: {:?}", tag, first.usage);

        let calls: Vec<ToolCallRequest> = first.tool_calls().cloned().collect();
        conversation
            .push_model_items(first.output)
            .context("Model output violated conversation order")?;

        // Phase 2: resolve
        let mut tool_results = Vec::with_capacity(calls.len());
        for call in &calls {
            info!("[{}] Model requested tool: {}({})", tag, call.name, call.arguments);

            let result = self.dispatcher.dispatch(call).await;
            if !result.success {
                warn!("[{}] Tool error: {}", tag, result.output);
            }

            conversation
                .push_output(&result.call_id, result.output.clone())
                .context("Failed to record tool output")?;
            tool_results.push(result);
        }
        if calls.is_empty() {
            info!("[{}] No tools requested", tag);
        }

        // Phase 3: synthesize
        let last = self
            .provider
            .respond(ModelRequest {
                model: &self.model,
                instructions: Some(&self.synthesis_instructions),
                tools: &tool_defs,
                input: conversation.items(),
            })
            .await
            .context("Final synthesis request failed")?;
        usage += last.usage;
        debug!("[{}] Final call usage: {:?}", tag, last.usage);

        let final_text = last.output_text();
        for item in last.output {
            match item {
                ConversationItem::AssistantText { content } => {
                    conversation.push_assistant_text(content)
                }
                ConversationItem::FunctionCall(call) => {
                    warn!("[{}] Ignoring tool request '{}' in final response", tag, call.name)
                }
                _ => {}
            }
        }

        info!(
            "[{}] Run complete: {} tool calls, {} tokens",
            tag,
            tool_results.len(),
            usage.total_tokens
        );

        Ok(RunOutcome {
            final_text,
            tool_results,
            usage,
        })
    }
}
