//! Binance spot REST response models.

use serde::Deserialize;
use serde_json::Value;

/// Response from /api/v3/exchangeInfo
#[derive(Debug, Deserialize)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolInfo>,
}

/// One listed market
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    /// Exchange symbol, e.g. "BTCUSDT"
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
}

/// Response item from /api/v3/ticker/24hr
///
/// Binance encodes prices and volumes as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    pub bid_price: Option<String>,
    pub ask_price: Option<String>,
    pub last_price: Option<String>,
    pub quote_volume: Option<String>,
    pub close_time: Option<i64>,
}

/// Response from /api/v3/depth
#[derive(Debug, Deserialize)]
pub struct DepthResponse {
    #[serde(default)]
    pub bids: Vec<Vec<Value>>,
    #[serde(default)]
    pub asks: Vec<Vec<Value>>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: i64,
    pub msg: String,
}
