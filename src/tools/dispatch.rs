//! Tool execution with bounded retry.
//!
//! The dispatcher is total: every request yields a [`ToolCallResult`] whose
//! output is either the tool's answer or an error message meant for the model.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::registry::ToolRegistry;
use super::traits::{Tool, ToolError};
use super::validate::validate_arguments;
use crate::types::{ToolCallRequest, ToolCallResult};

/// Resolves tool-call requests against a registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    max_retries: u32,
    validate_arguments: bool,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, max_retries: u32) -> Self {
        Self {
            registry,
            max_retries,
            validate_arguments: false,
        }
    }

    /// Check arguments against the tool schema before every attempt.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_arguments = enabled;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute one tool call, retrying up to `max_retries` times on failure.
    ///
    /// Unknown tool names are answered immediately and never retried.
    pub async fn dispatch(&self, call: &ToolCallRequest) -> ToolCallResult {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!("Error: Tool {} not found.", call.name);
            return ToolCallResult {
                call_id: call.call_id.clone(),
                output: format!("Error: Tool {} not found.", call.name),
                success: false,
                attempts: 0,
            };
        };

        let total_attempts = self.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=total_attempts {
            match self.attempt(tool.as_ref(), &call.arguments).await {
                Ok(output) => {
                    info!(
                        "Tool '{}' succeeded on attempt {} ({} chars)",
                        call.name,
                        attempt,
                        output.len()
                    );
                    return ToolCallResult {
                        call_id: call.call_id.clone(),
                        output,
                        success: true,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(
                        "Error executing tool '{}', attempt {}/{}: {}",
                        call.name, attempt, total_attempts, e
                    );
                    last_error = Some(e);
                }
            }
        }

        let output = match last_error {
            Some(e) if e.is_argument_error() => format!(
                "Error: Invalid arguments for {} after {} attempts: {}",
                call.name, total_attempts, e
            ),
            Some(e) => format!(
                "Error: Failed to execute {} after {} retries: {}",
                call.name, self.max_retries, e
            ),
            None => format!(
                "Error: Failed to execute {} after {} retries.",
                call.name, self.max_retries
            ),
        };

        ToolCallResult {
            call_id: call.call_id.clone(),
            output,
            success: false,
            attempts: total_attempts,
        }
    }

    async fn attempt(&self, tool: &dyn Tool, raw_arguments: &str) -> Result<String, ToolError> {
        let args: serde_json::Value = serde_json::from_str(raw_arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("malformed JSON: {}", e)))?;
        debug!("Decoded arguments for '{}': {}", tool.name(), args);

        if self.validate_arguments {
            validate_arguments(&tool.parameters_schema(), &args)?;
        }

        tool.execute(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{ProductPriceTool, StockPriceTool};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times, then succeeds.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Tool for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn description(&self) -> &str {
            "fails for a while"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: &serde_json::Value) -> Result<String, ToolError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(ToolError::Execution(format!("boom #{}", n)))
            } else {
                Ok("ok".into())
            }
        }
    }

    fn flaky(failures: u32) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures,
            calls: AtomicU32::new(0),
        })
    }

    fn dispatcher_with(tool: Arc<dyn Tool>, max_retries: u32) -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(tool).unwrap();
        Dispatcher::new(Arc::new(registry), max_retries)
    }

    fn request(name: &str, arguments: &str) -> ToolCallRequest {
        ToolCallRequest {
            call_id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[tokio::test]
    async fn returns_tool_output_on_success() {
        let d = dispatcher_with(Arc::new(StockPriceTool), 2);
        let result = d.dispatch(&request("get_stock_price", r#"{"ticker":"TSLA"}"#)).await;
        assert!(result.success);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.call_id, "call_1");
        assert_eq!(result.output, "The current stock price of TSLA is $210.1.");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_retried() {
        let tool = flaky(0);
        let d = dispatcher_with(tool.clone(), 2);
        let result = d.dispatch(&request("get_weather", "{}")).await;
        assert!(!result.success);
        assert_eq!(result.attempts, 0);
        assert_eq!(result.output, "Error: Tool get_weather not found.");
        assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_before_decoding_arguments() {
        let d = dispatcher_with(flaky(0), 2);
        let result = d.dispatch(&request("get_weather", "{not json")).await;
        assert_eq!(result.attempts, 0);
        assert_eq!(result.output, "Error: Tool get_weather not found.");
    }

    #[tokio::test]
    async fn always_failing_tool_uses_every_attempt() {
        let tool = flaky(u32::MAX);
        let d = dispatcher_with(tool.clone(), 2);
        let result = d.dispatch(&request("flaky", "{}")).await;
        assert!(!result.success);
        assert_eq!(result.attempts, 3);
        assert_eq!(tool.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result.output,
            "Error: Failed to execute flaky after 2 retries: boom #3"
        );
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let tool = flaky(2);
        let d = dispatcher_with(tool.clone(), 2);
        let result = d.dispatch(&request("flaky", "{}")).await;
        assert!(result.success);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.output, "ok");
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let tool = flaky(1);
        let d = dispatcher_with(tool.clone(), 0);
        let result = d.dispatch(&request("flaky", "{}")).await;
        assert!(!result.success);
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_json_is_an_argument_failure() {
        let d = dispatcher_with(Arc::new(StockPriceTool), 1);
        let result = d.dispatch(&request("get_stock_price", "{ticker: TSLA")).await;
        assert!(!result.success);
        assert_eq!(result.attempts, 2);
        assert!(
            result
                .output
                .starts_with("Error: Invalid arguments for get_stock_price after 2 attempts"),
            "{}",
            result.output
        );
    }

    #[tokio::test]
    async fn validation_failures_are_retried() {
        let d = dispatcher_with(Arc::new(ProductPriceTool), 2).with_validation(true);
        let result = d.dispatch(&request("get_product_price", r#"{"name":"iPhone 15"}"#)).await;
        assert!(!result.success);
        assert_eq!(result.attempts, 3);
        assert!(result.output.contains("missing required argument 'product_name'"));
    }

    #[tokio::test]
    async fn without_validation_missing_argument_is_a_lookup_miss() {
        let d = dispatcher_with(Arc::new(ProductPriceTool), 2);
        let result = d.dispatch(&request("get_product_price", r#"{"name":"iPhone 15"}"#)).await;
        assert!(result.success);
        assert_eq!(result.output, "Price for '' not found.");
    }
}
