pub mod calculator;
pub mod catalog;
pub mod dispatch;
pub mod horoscope;
pub mod registry;
pub mod traits;
pub mod validate;

pub use dispatch::Dispatcher;
pub use registry::{RegistryError, ToolRegistry};
pub use traits::{Tool, ToolDefinition, ToolError};

use std::sync::Arc;

use calculator::CalculatorTool;
use catalog::{ProductPriceTool, StockPriceTool};
use horoscope::HoroscopeTool;

/// Names of every built-in tool, in default registration order.
pub const BUILTIN_TOOLS: &[&str] = &[
    "get_product_price",
    "get_stock_price",
    "get_horoscope",
    "calculate",
];

/// Construct a built-in tool by name.
pub fn builtin(name: &str) -> Option<Arc<dyn Tool>> {
    let tool: Arc<dyn Tool> = match name {
        "get_product_price" => Arc::new(ProductPriceTool),
        "get_stock_price" => Arc::new(StockPriceTool),
        "get_horoscope" => Arc::new(HoroscopeTool),
        "calculate" => Arc::new(CalculatorTool),
        _ => return None,
    };
    Some(tool)
}

/// Build a registry from a list of built-in tool names.
pub fn build_registry<S: AsRef<str>>(names: &[S]) -> anyhow::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for name in names {
        let name = name.as_ref();
        let tool = builtin(name).ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        registry.register(tool)?;
    }
    Ok(registry)
}

/// Registry with every built-in tool.
pub fn default_registry() -> anyhow::Result<ToolRegistry> {
    build_registry(BUILTIN_TOOLS)
}
