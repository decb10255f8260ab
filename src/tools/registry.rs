//! Tool registry: name → handler map plus ordered schema export.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::traits::{Tool, ToolDefinition};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate tool: {0}")]
    Duplicate(String),
}

/// Registered tools. Filled once at startup and shared read-only afterwards.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Tool definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{ProductPriceTool, StockPriceTool};

    #[test]
    fn exports_definitions_in_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StockPriceTool)).unwrap();
        registry.register(Arc::new(ProductPriceTool)).unwrap();

        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "get_stock_price");
        assert_eq!(defs[1].name, "get_product_price");
        assert_eq!(defs[0].parameters["required"][0], "ticker");
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StockPriceTool)).unwrap();
        assert_eq!(
            registry.register(Arc::new(StockPriceTool)),
            Err(RegistryError::Duplicate("get_stock_price".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(ProductPriceTool)).unwrap();
        assert!(registry.get("get_product_price").is_some());
        assert!(registry.get("get_weather").is_none());
    }
}
