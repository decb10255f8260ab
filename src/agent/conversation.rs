//! Caller-owned conversation state.
//!
//! Append-only. A function-call output is accepted only for a call id that
//! was requested earlier in the same conversation and not yet answered.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::types::{ConversationItem, ToolCallRequest};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("function call output references unknown call id '{0}'")]
    UnknownCallId(String),

    #[error("call id '{0}' already has an output")]
    DuplicateOutput(String),

    #[error("call id '{0}' was requested twice")]
    DuplicateCallId(String),
}

/// Ordered record of every item exchanged in one logical conversation.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    items: Vec<ConversationItem>,
    requested: HashSet<String>,
    answered: HashSet<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            items: Vec::new(),
            requested: HashSet::new(),
            answered: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[ConversationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.items.push(ConversationItem::UserMessage {
            content: content.into(),
        });
    }

    pub fn push_assistant_text(&mut self, content: impl Into<String>) {
        self.items.push(ConversationItem::AssistantText {
            content: content.into(),
        });
    }

    pub fn push_call(&mut self, call: ToolCallRequest) -> Result<(), ConversationError> {
        if !self.requested.insert(call.call_id.clone()) {
            return Err(ConversationError::DuplicateCallId(call.call_id));
        }
        self.items.push(ConversationItem::FunctionCall(call));
        Ok(())
    }

    /// Append a model output item. Only text and call requests are expected.
    pub fn push_model_item(&mut self, item: ConversationItem) -> Result<(), ConversationError> {
        match item {
            ConversationItem::FunctionCall(call) => self.push_call(call),
            ConversationItem::FunctionCallOutput { call_id, output } => {
                self.push_output(&call_id, output)
            }
            other => {
                self.items.push(other);
                Ok(())
            }
        }
    }

    /// Append a whole model response, or nothing if any item would be rejected.
    pub fn push_model_items(
        &mut self,
        items: Vec<ConversationItem>,
    ) -> Result<(), ConversationError> {
        let mut new_calls = HashSet::new();
        let mut new_outputs = HashSet::new();
        for item in &items {
            match item {
                ConversationItem::FunctionCall(call) => {
                    if self.requested.contains(&call.call_id)
                        || !new_calls.insert(call.call_id.as_str())
                    {
                        return Err(ConversationError::DuplicateCallId(call.call_id.clone()));
                    }
                }
                ConversationItem::FunctionCallOutput { call_id, .. } => {
                    if !self.requested.contains(call_id) && !new_calls.contains(call_id.as_str()) {
                        return Err(ConversationError::UnknownCallId(call_id.clone()));
                    }
                    if self.answered.contains(call_id) || !new_outputs.insert(call_id.as_str()) {
                        return Err(ConversationError::DuplicateOutput(call_id.clone()));
                    }
                }
                _ => {}
            }
        }

        for item in items {
            self.push_model_item(item)?;
        }
        Ok(())
    }

    /// Append the output for a previously requested call.
    pub fn push_output(
        &mut self,
        call_id: &str,
        output: impl Into<String>,
    ) -> Result<(), ConversationError> {
        if !self.requested.contains(call_id) {
            return Err(ConversationError::UnknownCallId(call_id.to_string()));
        }
        if !self.answered.insert(call_id.to_string()) {
            return Err(ConversationError::DuplicateOutput(call_id.to_string()));
        }
        self.items.push(ConversationItem::FunctionCallOutput {
            call_id: call_id.to_string(),
            output: output.into(),
        });
        debug!("[{}] output recorded for {}", self.id, call_id);
        Ok(())
    }

    /// Call ids that were requested but have no output yet, in request order.
    pub fn pending_calls(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ConversationItem::FunctionCall(call) if !self.answered.contains(&call.call_id) => {
                    Some(call.call_id.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCallRequest {
        ToolCallRequest {
            call_id: id.into(),
            name: "get_stock_price".into(),
            arguments: r#"{"ticker":"TSLA"}"#.into(),
        }
    }

    #[test]
    fn output_requires_prior_request() {
        let mut conv = Conversation::new();
        conv.push_user("hi");
        assert_eq!(
            conv.push_output("call_x", "nope"),
            Err(ConversationError::UnknownCallId("call_x".into()))
        );
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn output_is_accepted_once() {
        let mut conv = Conversation::new();
        conv.push_call(call("c1")).unwrap();
        conv.push_output("c1", "first").unwrap();
        assert_eq!(
            conv.push_output("c1", "second"),
            Err(ConversationError::DuplicateOutput("c1".into()))
        );
    }

    #[test]
    fn duplicate_call_ids_are_rejected() {
        let mut conv = Conversation::new();
        conv.push_call(call("c1")).unwrap();
        assert!(conv.push_call(call("c1")).is_err());
    }

    #[test]
    fn items_keep_append_order() {
        let mut conv = Conversation::new();
        conv.push_user("q");
        conv.push_model_item(ConversationItem::FunctionCall(call("c1"))).unwrap();
        conv.push_model_item(ConversationItem::FunctionCall(call("c2"))).unwrap();
        assert_eq!(conv.pending_calls(), vec!["c1", "c2"]);
        conv.push_output("c2", "b").unwrap();
        conv.push_output("c1", "a").unwrap();
        assert!(conv.pending_calls().is_empty());

        let kinds: Vec<String> = conv.items().iter().map(|i| i.kind().to_string()).collect();
        assert_eq!(
            kinds,
            vec![
                "user_message",
                "function_call",
                "function_call",
                "function_call_output",
                "function_call_output"
            ]
        );
    }

    #[test]
    fn rejected_batch_leaves_conversation_untouched() {
        let mut conv = Conversation::new();
        conv.push_user("q");
        let batch = vec![
            ConversationItem::AssistantText { content: "looking".into() },
            ConversationItem::FunctionCall(call("same")),
            ConversationItem::FunctionCall(call("same")),
        ];
        assert_eq!(
            conv.push_model_items(batch),
            Err(ConversationError::DuplicateCallId("same".into()))
        );
        assert_eq!(conv.len(), 1);
        assert!(conv.pending_calls().is_empty());
    }

    #[test]
    fn batch_rejects_call_ids_seen_in_earlier_turns() {
        let mut conv = Conversation::new();
        conv.push_call(call("c1")).unwrap();
        conv.push_output("c1", "done").unwrap();
        let batch = vec![
            ConversationItem::FunctionCall(call("c2")),
            ConversationItem::FunctionCall(call("c1")),
        ];
        assert!(conv.push_model_items(batch).is_err());
        assert_eq!(conv.len(), 2);
        assert!(conv.pending_calls().is_empty());
    }

    #[test]
    fn valid_batch_is_appended_in_order() {
        let mut conv = Conversation::new();
        conv.push_model_items(vec![
            ConversationItem::FunctionCall(call("c1")),
            ConversationItem::FunctionCall(call("c2")),
        ])
        .unwrap();
        assert_eq!(conv.pending_calls(), vec!["c1", "c2"]);
    }

    #[test]
    fn conversations_get_distinct_ids() {
        assert_ne!(Conversation::new().id(), Conversation::new().id());
    }
}
