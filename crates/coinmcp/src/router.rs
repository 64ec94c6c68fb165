use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::coingecko::{CoinError, MarketData, MAX_MARKET_LIMIT};
use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolCall, ToolCallResponse};

pub const GET_CRYPTO_PRICE: &str = "get_crypto_price";
pub const GET_TRENDING_COINS: &str = "get_trending_coins";
pub const GET_MARKET_DATA: &str = "get_market_data";

const DEFAULT_VS_CURRENCY: &str = "usd";
const DEFAULT_MARKET_LIMIT: u32 = 10;
const SUPPORTED_CURRENCIES: [&str; 5] = ["usd", "eur", "gbp", "jpy", "cny"];

/// Registry of the crypto tools, routing tool calls to the market data source
pub struct ToolRouter {
    tools: Vec<Tool>,
    market: Arc<dyn MarketData>,
}

impl ToolRouter {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        let price_tool = Tool::new(
            GET_CRYPTO_PRICE,
            "Get current price and market data for a cryptocurrency. \
            Returns price, market cap, 24h volume, and 24h change.",
            json!({
                "type": "object",
                "properties": {
                    "coin_id": {
                        "type": "string",
                        "description": "CoinGecko coin ID (e.g., 'bitcoin', 'ethereum', 'cardano')"
                    },
                    "vs_currency": {
                        "type": "string",
                        "description": "Target currency code",
                        "default": DEFAULT_VS_CURRENCY,
                        "enum": SUPPORTED_CURRENCIES
                    }
                },
                "required": ["coin_id"]
            }),
        );

        let trending_tool = Tool::new(
            GET_TRENDING_COINS,
            "Get currently trending cryptocurrencies on CoinGecko. \
            Returns top 7 trending coins with basic info.",
            json!({
                "type": "object",
                "properties": {}
            }),
        );

        let market_tool = Tool::new(
            GET_MARKET_DATA,
            "Get market data for top cryptocurrencies ranked by market cap. \
            Returns detailed market info including prices, volumes, and price changes.",
            json!({
                "type": "object",
                "properties": {
                    "vs_currency": {
                        "type": "string",
                        "description": "Target currency code",
                        "default": DEFAULT_VS_CURRENCY,
                        "enum": SUPPORTED_CURRENCIES
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Number of coins to return (1-100)",
                        "default": DEFAULT_MARKET_LIMIT,
                        "minimum": 1,
                        "maximum": MAX_MARKET_LIMIT
                    }
                }
            }),
        );

        Self {
            tools: vec![price_tool, trending_tool, market_tool],
            market,
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == name)
    }

    /// Route a tool call to its handler.
    ///
    /// Missing or malformed arguments fail with `Err` before any upstream call.
    /// Everything that happens afterwards, upstream failures included, is reported
    /// inside the returned envelope.
    pub async fn dispatch(&self, call: ToolCall) -> ToolResult<ToolCallResponse> {
        info!("Calling tool: {} with args: {:?}", call.name, call.arguments);

        let result = match call.name.as_str() {
            GET_CRYPTO_PRICE => {
                let coin_id = required_str(&call.arguments, "coin_id")?;
                let vs_currency = optional_str(&call.arguments, "vs_currency")?
                    .unwrap_or(DEFAULT_VS_CURRENCY);
                to_text(self.market.price(coin_id, vs_currency).await)
            }
            GET_TRENDING_COINS => to_text(self.market.trending().await),
            GET_MARKET_DATA => {
                let vs_currency = optional_str(&call.arguments, "vs_currency")?
                    .unwrap_or(DEFAULT_VS_CURRENCY);
                let limit = market_limit(&call.arguments)?;
                to_text(self.market.market(vs_currency, limit).await)
            }
            _ => {
                let err = ToolError::ToolNotFound(call.name.clone());
                error!("{}", err);
                return Ok(ToolCallResponse::error(err.to_string()));
            }
        };

        match result {
            Ok(text) => {
                info!("Tool {} executed successfully", call.name);
                Ok(ToolCallResponse::success(text))
            }
            Err(err) => {
                error!(
                    "Error executing tool {} ({}): {}",
                    call.name,
                    err.http_status().as_u16(),
                    err
                );
                Ok(ToolCallResponse::error(err.to_string()))
            }
        }
    }
}

fn to_text<T: Serialize>(result: Result<T, CoinError>) -> Result<String, CoinError> {
    let value = result?;
    serde_json::to_string(&value).map_err(|e| CoinError::Internal(e.to_string()))
}

fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> ToolResult<&'a str> {
    match optional_str(arguments, key)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ToolError::InvalidParameters(format!(
            "Missing required parameter: {}",
            key
        ))),
    }
}

fn optional_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> ToolResult<Option<&'a str>> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(ToolError::InvalidParameters(format!(
            "Parameter '{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// Out-of-range limits are clamped silently, they are never an error
fn market_limit(arguments: &Map<String, Value>) -> ToolResult<u32> {
    let limit = match arguments.get("limit") {
        None | Some(Value::Null) => return Ok(DEFAULT_MARKET_LIMIT),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(i64::MAX),
        Some(other) => {
            return Err(ToolError::InvalidParameters(format!(
                "Parameter 'limit' must be an integer, got {}",
                other
            )))
        }
    };
    Ok(limit.clamp(1, MAX_MARKET_LIMIT as i64) as u32)
}
