//! Shared types used across the agent runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Conversation items
// ---------------------------------------------------------------------------

/// One entry in the conversation passed back to the model on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationItem {
    /// Text typed by the user.
    UserMessage { content: String },
    /// Plain text produced by the model.
    AssistantText { content: String },
    /// A tool invocation requested by the model.
    FunctionCall(ToolCallRequest),
    /// The local result of a previously requested tool call.
    FunctionCallOutput { call_id: String, output: String },
}

impl ConversationItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::UserMessage { .. } => ItemKind::UserMessage,
            Self::AssistantText { .. } => ItemKind::AssistantText,
            Self::FunctionCall(_) => ItemKind::FunctionCall,
            Self::FunctionCallOutput { .. } => ItemKind::FunctionCallOutput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    UserMessage,
    AssistantText,
    FunctionCall,
    FunctionCallOutput,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserMessage => write!(f, "user_message"),
            Self::AssistantText => write!(f, "assistant_text"),
            Self::FunctionCall => write!(f, "function_call"),
            Self::FunctionCallOutput => write!(f, "function_call_output"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tool calls
// ---------------------------------------------------------------------------

/// A tool call request from the model.
///
/// `arguments` is kept as the raw JSON text the provider sent; decoding it is
/// the dispatcher's job so that malformed payloads count as failed attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub name: String,
    pub arguments: String,
}

/// Result of dispatching one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: String,
    pub output: String,
    pub success: bool,
    pub attempts: u32,
}

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// Response from a model call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Output items in the order the model produced them. Only
    /// `AssistantText` and `FunctionCall` ever appear here.
    pub output: Vec<ConversationItem>,
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// Concatenated assistant text, the equivalent of the provider's
    /// `output_text` convenience field.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                ConversationItem::AssistantText { content } => Some(content.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Function-call requests in the order they were emitted.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallRequest> {
        self.output.iter().filter_map(|item| match item {
            ConversationItem::FunctionCall(call) => Some(call),
            _ => None,
        })
    }
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
    }
}
