//! Configuration schema for agent.toml.

use serde::{Deserialize, Serialize};

use crate::tools::BUILTIN_TOOLS;

/// Instruction sent with the final synthesis call.
pub const DEFAULT_SYNTHESIS_INSTRUCTIONS: &str =
    "Respond naturally using the tool outputs provided.";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier sent with every call.
    pub model: String,

    /// Provider API base URL.
    pub api_base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Extra attempts after a failed tool execution.
    pub max_retries: u32,

    /// Check tool arguments against their schema before dispatch.
    pub validate_arguments: bool,

    /// Instruction for the final answer call.
    pub synthesis_instructions: String,

    /// Built-in tools offered to the model, in order.
    pub tools: Vec<String>,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".into(),
            api_base_url: "https://api.openai.com".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            max_retries: 2,
            validate_arguments: false,
            synthesis_instructions: DEFAULT_SYNTHESIS_INSTRUCTIONS.into(),
            tools: BUILTIN_TOOLS.iter().map(|t| t.to_string()).collect(),
            log_level: "info".into(),
        }
    }
}
