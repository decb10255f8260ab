//! Tool trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::calculator::CalcError;

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Why a single tool attempt failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments could not be decoded or did not match the schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Calculation(#[from] CalcError),

    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::InvalidArguments(_))
    }
}

/// Trait for tools the model can call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in function calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the decoded arguments.
    async fn execute(&self, args: &serde_json::Value) -> Result<String, ToolError>;

    /// Provider-facing definition built from the three accessors above.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Read a string argument, treating a missing or non-string value as empty.
///
/// Tools without validation enabled receive whatever the model sent, so the
/// lookup tools degrade to a not-found message instead of failing.
pub(crate) fn str_arg<'a>(args: &'a serde_json::Value, key: &str) -> &'a str {
    args.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}
