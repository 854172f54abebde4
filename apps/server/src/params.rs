//! Request parameters shared by the HTTP routes and the tool surface.

use std::ops::RangeInclusive;

use cryptomarket_data::client::{
    DEFAULT_OHLCV_LIMIT, DEFAULT_ORDER_BOOK_DEPTH, DEFAULT_QUOTE_ASSET, DEFAULT_TIMEFRAME,
    DEFAULT_TOP_MARKETS_LIMIT, OHLCV_LIMIT_RANGE, ORDER_BOOK_DEPTH_RANGE, TOP_MARKETS_LIMIT_RANGE,
};
use cryptomarket_data::{
    MarketDataClient, MarketDataError, OhlcvSeries, OrderBook, Price, Ticker, TopMarketsResponse,
};
use serde::Deserialize;

fn default_timeframe() -> String {
    DEFAULT_TIMEFRAME.to_string()
}

fn default_ohlcv_limit() -> u32 {
    DEFAULT_OHLCV_LIMIT
}

fn default_depth() -> u32 {
    DEFAULT_ORDER_BOOK_DEPTH
}

fn default_top_limit() -> u32 {
    DEFAULT_TOP_MARKETS_LIMIT
}

fn default_quote_asset() -> String {
    DEFAULT_QUOTE_ASSET.to_string()
}

fn check_range(name: &str, value: u32, range: RangeInclusive<u32>) -> Result<(), String> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        ))
    }
}

/// Parameters of the price and ticker operations.
#[derive(Debug, Deserialize)]
pub struct SymbolParams {
    pub symbol: String,
    pub exchange: Option<String>,
}

impl SymbolParams {
    pub fn price(&self, client: &MarketDataClient) -> Result<Price, MarketDataError> {
        client.get_current_price(&self.symbol, self.exchange.as_deref())
    }

    pub fn ticker(&self, client: &MarketDataClient) -> Result<Ticker, MarketDataError> {
        client.get_ticker(&self.symbol, self.exchange.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct OhlcvParams {
    pub symbol: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_ohlcv_limit")]
    pub limit: u32,
    pub exchange: Option<String>,
    pub since_ms: Option<i64>,
}

impl OhlcvParams {
    pub fn validate(&self) -> Result<(), String> {
        check_range("limit", self.limit, OHLCV_LIMIT_RANGE)
    }

    pub fn fetch(&self, client: &MarketDataClient) -> Result<OhlcvSeries, MarketDataError> {
        client.get_ohlcv(
            &self.symbol,
            &self.timeframe,
            self.limit,
            self.since_ms,
            self.exchange.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderBookParams {
    pub symbol: String,
    #[serde(default = "default_depth")]
    pub depth: u32,
    pub exchange: Option<String>,
}

impl OrderBookParams {
    pub fn validate(&self) -> Result<(), String> {
        check_range("depth", self.depth, ORDER_BOOK_DEPTH_RANGE)
    }

    pub fn fetch(&self, client: &MarketDataClient) -> Result<OrderBook, MarketDataError> {
        client.get_order_book(&self.symbol, self.depth, self.exchange.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct TopMarketsParams {
    pub exchange: Option<String>,
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    #[serde(default = "default_top_limit")]
    pub limit: u32,
}

impl TopMarketsParams {
    pub fn validate(&self) -> Result<(), String> {
        check_range("limit", self.limit, TOP_MARKETS_LIMIT_RANGE)
    }

    pub fn fetch(&self, client: &MarketDataClient) -> Result<TopMarketsResponse, MarketDataError> {
        client.get_top_markets(self.exchange.as_deref(), self.limit, &self.quote_asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let p: OhlcvParams = serde_json::from_value(json!({"symbol": "BTC/USDT"})).unwrap();
        assert_eq!(p.timeframe, "1h");
        assert_eq!(p.limit, 100);
        assert!(p.exchange.is_none() && p.since_ms.is_none());

        let p: TopMarketsParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.quote_asset, "USDT");
        assert_eq!(p.limit, 10);

        let p: OrderBookParams = serde_json::from_value(json!({"symbol": "BTC/USDT"})).unwrap();
        assert_eq!(p.depth, 20);
    }

    #[test]
    fn test_bounds() {
        let depth = |d: u32| OrderBookParams {
            symbol: "BTC/USDT".into(),
            depth: d,
            exchange: None,
        };
        assert!(depth(1).validate().is_ok());
        assert!(depth(200).validate().is_ok());
        assert_eq!(
            depth(201).validate().unwrap_err(),
            "depth must be between 1 and 200, got 201"
        );
        assert!(depth(0).validate().is_err());

        let top = |l: u32| TopMarketsParams {
            exchange: None,
            quote_asset: "USDT".into(),
            limit: l,
        };
        assert!(top(100).validate().is_ok());
        assert!(top(101).validate().is_err());
    }
}
