//! Raw payloads returned by exchange connections, before shaping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A ticker as reported upstream. Every price field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicker {
    /// Unified symbol, e.g. `BTC/USDT`
    pub symbol: String,
    /// Ticker time in ms since epoch
    pub timestamp: Option<i64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Last trade price
    pub last: Option<f64>,
    /// Close of the rolling window
    pub close: Option<f64>,
    /// Traded volume in the quote asset
    pub quote_volume: Option<f64>,
}

impl RawTicker {
    /// Last trade price, falling back to the close price.
    pub fn last_or_close(&self) -> Option<f64> {
        self.last.or(self.close)
    }
}

/// One positional candle row: `[timestamp, open, high, low, close, volume]`.
///
/// Elements are kept as JSON values because exchanges mix numbers and
/// numeric strings.
pub type RawCandle = Vec<Value>;

/// One positional book level: `[price, amount]`.
pub type RawLevel = Vec<Value>;

/// Order book sides as reported upstream, best level first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrderBook {
    #[serde(default)]
    pub bids: Vec<RawLevel>,
    #[serde(default)]
    pub asks: Vec<RawLevel>,
}
