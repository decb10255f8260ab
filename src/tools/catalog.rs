//! Price lookup tools backed by fixed in-memory catalogs.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use super::traits::{str_arg, Tool, ToolError};

/// Product catalog. A `None` price means the product is listed without a price
/// and is reported exactly like an unknown product.
const PRODUCTS: &[(&str, Option<u32>)] = &[
    ("Redmi Note 10S 8GB/128GB", Some(1700)),
    ("iPhone 15", Some(1200)),
    ("Samsung S24", Some(1100)),
    ("MacBook Air", Some(1500)),
    ("AirPods Pro", Some(250)),
    ("Watch", None),
];

const STOCKS: &[(&str, f64)] = &[
    ("AAPL", 185.30),
    ("GOOGL", 138.50),
    ("MSFT", 402.20),
    ("TSLA", 210.10),
];

/// Look up a product price and describe the outcome.
pub fn product_price(product_name: &str) -> String {
    let price = PRODUCTS
        .iter()
        .find(|(name, _)| *name == product_name)
        .and_then(|(_, price)| *price);

    match price {
        Some(price) => format!("The price of {} is ${}.", product_name, price),
        None => {
            warn!("Price for '{}' not found.", product_name);
            format!("Price for '{}' not found.", product_name)
        }
    }
}

/// Look up a stock price by ticker symbol.
pub fn stock_price(ticker: &str) -> String {
    match STOCKS.iter().find(|(symbol, _)| *symbol == ticker) {
        Some((_, price)) => format!("The current stock price of {} is ${}.", ticker, price),
        None => {
            warn!("Stock price for '{}' not found.", ticker);
            format!("Stock price for '{}' not found.", ticker)
        }
    }
}

pub struct ProductPriceTool;

#[async_trait]
impl Tool for ProductPriceTool {
    fn name(&self) -> &str {
        "get_product_price"
    }

    fn description(&self) -> &str {
        "Get the price of a product from a predefined catalog."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "product_name": {
                    "type": "string",
                    "description": "Name of the product to get the price for."
                }
            },
            "required": ["product_name"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        Ok(product_price(str_arg(args, "product_name")))
    }
}

pub struct StockPriceTool;

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price for a given ticker symbol."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Ticker symbol of the stock to get the price for."
                }
            },
            "required": ["ticker"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        Ok(stock_price(str_arg(args, "ticker")))
    }
}
