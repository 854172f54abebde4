//! Tool-invocation surface over the market data client.
//!
//! Each tool takes a JSON object of named arguments and returns the
//! artifact as JSON. Failures carry the user-facing message of the
//! underlying market data error.

use cryptomarket_data::{MarketDataClient, MarketDataError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::params::{OhlcvParams, OrderBookParams, SymbolParams, TopMarketsParams};

pub const GET_CURRENT_PRICE: &str = "get_current_price";
pub const GET_TICKER: &str = "get_ticker";
pub const GET_OHLCV: &str = "get_ohlcv";
pub const GET_ORDER_BOOK: &str = "get_order_book";
pub const GET_TOP_MARKETS: &str = "get_top_markets";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{}", .0.user_message())]
    MarketData(#[from] MarketDataError),
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

fn exchange_schema() -> Value {
    json!({"type": "string", "description": "Exchange id, e.g. binance"})
}

fn symbol_schema() -> Value {
    json!({"type": "string", "description": "Trading pair, e.g. BTC/USDT"})
}

/// Descriptors of every tool, in a stable order.
pub fn list_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: GET_CURRENT_PRICE,
            description: "Current price of a trading pair",
            parameters: json!({
                "type": "object",
                "properties": {"symbol": symbol_schema(), "exchange": exchange_schema()},
                "required": ["symbol"],
            }),
        },
        ToolDescriptor {
            name: GET_TICKER,
            description: "Bid, ask and last price of a trading pair",
            parameters: json!({
                "type": "object",
                "properties": {"symbol": symbol_schema(), "exchange": exchange_schema()},
                "required": ["symbol"],
            }),
        },
        ToolDescriptor {
            name: GET_OHLCV,
            description: "OHLCV candles of a trading pair",
            parameters: json!({
                "type": "object",
                "properties": {
                    "symbol": symbol_schema(),
                    "timeframe": {"type": "string", "description": "Timeframe, e.g. 1m, 5m, 1h, 1d", "default": "1h"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": 1000, "default": 100},
                    "exchange": exchange_schema(),
                    "since_ms": {"type": "integer", "description": "Unix timestamp in ms"},
                },
                "required": ["symbol"],
            }),
        },
        ToolDescriptor {
            name: GET_ORDER_BOOK,
            description: "Order book of a trading pair",
            parameters: json!({
                "type": "object",
                "properties": {
                    "symbol": symbol_schema(),
                    "depth": {"type": "integer", "minimum": 1, "maximum": 200, "default": 20},
                    "exchange": exchange_schema(),
                },
                "required": ["symbol"],
            }),
        },
        ToolDescriptor {
            name: GET_TOP_MARKETS,
            description: "Markets with the highest quote volume",
            parameters: json!({
                "type": "object",
                "properties": {
                    "exchange": exchange_schema(),
                    "quote_asset": {"type": "string", "description": "Quote asset to filter by, e.g. USDT", "default": "USDT"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": 100, "default": 10},
                },
            }),
        },
    ]
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    // A missing body is treated as no arguments.
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Internal(e.to_string()))
}

/// Run tool `name` with `args`. Blocks on the client.
pub fn invoke_tool(client: &MarketDataClient, name: &str, args: Value) -> Result<Value, ToolError> {
    match name {
        GET_CURRENT_PRICE => to_json(parse::<SymbolParams>(args)?.price(client)?),
        GET_TICKER => to_json(parse::<SymbolParams>(args)?.ticker(client)?),
        GET_OHLCV => {
            let params: OhlcvParams = parse(args)?;
            params.validate().map_err(ToolError::InvalidArguments)?;
            to_json(params.fetch(client)?)
        }
        GET_ORDER_BOOK => {
            let params: OrderBookParams = parse(args)?;
            params.validate().map_err(ToolError::InvalidArguments)?;
            to_json(params.fetch(client)?)
        }
        GET_TOP_MARKETS => {
            let params: TopMarketsParams = parse(args)?;
            params.validate().map_err(ToolError::InvalidArguments)?;
            to_json(params.fetch(client)?)
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::http::StatusCode;

    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_list_tools_names() {
        let names: Vec<&str> = list_tools().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![GET_CURRENT_PRICE, GET_TICKER, GET_OHLCV, GET_ORDER_BOOK, GET_TOP_MARKETS]
        );
    }

    #[test]
    fn test_market_data_error_message_is_user_facing() {
        let err = ToolError::from(MarketDataError::RateLimit("429".into()));
        assert_eq!(
            err.to_string(),
            "Upstream API rate limit exceeded. Please retry after some time."
        );
    }

    #[test]
    fn test_serialization_failure_is_internal() {
        // JSON object keys must be strings.
        let unserializable = BTreeMap::from([((1, 2), "pair")]);
        let err = to_json(unserializable).unwrap_err();
        assert!(matches!(err, ToolError::Internal(_)));
        assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_tool_error_status_mapping() {
        let cases = [
            (ToolError::UnknownTool("x".into()), StatusCode::NOT_FOUND),
            (ToolError::InvalidArguments("x".into()), StatusCode::BAD_REQUEST),
            (ToolError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ToolError::MarketData(MarketDataError::RateLimit("x".into())),
                StatusCode::TOO_MANY_REQUESTS,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
