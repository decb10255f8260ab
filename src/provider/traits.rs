//! Model provider trait.

use anyhow::Result;
use async_trait::async_trait;

use crate::tools::ToolDefinition;
use crate::types::{ConversationItem, ModelResponse};

/// Everything a provider needs for one model call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub model: &'a str,
    /// System-level instruction for this call only.
    pub instructions: Option<&'a str>,
    pub tools: &'a [ToolDefinition],
    pub input: &'a [ConversationItem],
}

/// A hosted model that can answer with text and/or tool-call requests.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn respond(&self, request: ModelRequest<'_>) -> Result<ModelResponse>;
}
