//! Model inference via the OpenAI Responses API.
//!
//! Supports function calling in the Responses item format: tool calls come
//! back as `function_call` output items and results are sent as
//! `function_call_output` input items.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ModelProvider, ModelRequest};
use crate::tools::ToolDefinition;
use crate::types::*;

/// Client for `POST /v1/responses`.
#[derive(Clone)]
pub struct OpenAiResponsesClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAiResponsesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiResponsesClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

// -- Request / response types -----------------------------------------------

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputItem<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputItem<'a> {
    Message {
        role: &'a str,
        content: &'a str,
    },
    FunctionCall {
        call_id: &'a str,
        name: &'a str,
        arguments: &'a str,
    },
    FunctionCallOutput {
        call_id: &'a str,
        output: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItemPayload>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItemPayload {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UsagePayload {
    input_tokens: u32,
    output_tokens: u32,
    total_tokens: u32,
}

// -- Conversions ------------------------------------------------------------

fn input_item(item: &ConversationItem) -> InputItem<'_> {
    match item {
        ConversationItem::UserMessage { content } => InputItem::Message {
            role: "user",
            content,
        },
        ConversationItem::AssistantText { content } => InputItem::Message {
            role: "assistant",
            content,
        },
        // Replayed without the provider item id: that id ties the call to a
        // reasoning item, which is not kept.
        ConversationItem::FunctionCall(call) => InputItem::FunctionCall {
            call_id: &call.call_id,
            name: &call.name,
            arguments: &call.arguments,
        },
        ConversationItem::FunctionCallOutput { call_id, output } => {
            InputItem::FunctionCallOutput { call_id, output }
        }
    }
}

fn tool_payload(tool: &ToolDefinition) -> ToolPayload<'_> {
    ToolPayload {
        r#type: "function",
        name: &tool.name,
        description: &tool.description,
        parameters: &tool.parameters,
    }
}

fn build_request<'a>(request: &ModelRequest<'a>) -> ResponsesRequest<'a> {
    ResponsesRequest {
        model: request.model,
        input: request.input.iter().map(input_item).collect(),
        tools: request.tools.iter().map(tool_payload).collect(),
        instructions: request.instructions,
    }
}

fn into_model_response(body: ResponsesResponse) -> ModelResponse {
    let mut output = Vec::new();

    for item in body.output {
        match item {
            OutputItemPayload::Message { content } => {
                let text: String = content
                    .into_iter()
                    .filter_map(|part| match part {
                        ContentPart::OutputText { text } => Some(text),
                        ContentPart::Other => None,
                    })
                    .collect();
                if !text.is_empty() {
                    output.push(ConversationItem::AssistantText { content: text });
                }
            }
            OutputItemPayload::FunctionCall {
                call_id,
                name,
                arguments,
            } => output.push(ConversationItem::FunctionCall(ToolCallRequest {
                call_id,
                name,
                arguments,
            })),
            OutputItemPayload::Other => debug!("Skipping unsupported output item (e.g. reasoning)"),
        }
    }

    let usage = body
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    ModelResponse { output, usage }
}

impl OpenAiResponsesClient {
    /// Create a new client.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModelProvider for OpenAiResponsesClient {
    async fn respond(&self, request: ModelRequest<'_>) -> Result<ModelResponse> {
        let url = format!("{}/v1/responses", self.base_url);
        let body = build_request(&request);

        debug!(
            "Model request to {}: {} input items, {} tools",
            request.model,
            body.input.len(),
            body.tools.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Model request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Model request failed ({}): {}", status, body);
        }

        let body: ResponsesResponse = resp
            .json()
            .await
            .context("Failed to parse model response")?;

        Ok(into_model_response(body))
    }
}
