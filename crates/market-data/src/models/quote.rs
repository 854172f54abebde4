use serde::{Deserialize, Serialize};

/// Provenance tag carried by every [`Ticker`].
pub const TICKER_INFO_SOURCE: &str = "exchange";

/// Current price of a symbol on one exchange
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub exchange: String,
    pub symbol: String,
    /// Last trade price, or the close when the exchange reports no last trade
    pub price: f64,
    /// Ticker time in ms since epoch, 0 when unknown
    pub timestamp_ms: i64,
}

/// Top-of-book and last trade snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub exchange: String,
    pub symbol: String,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last: Option<f64>,
    pub timestamp_ms: Option<i64>,
    /// Always [`TICKER_INFO_SOURCE`]
    pub info_source: String,
}
