use serde::{Deserialize, Serialize};

/// One candle
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcvPoint {
    /// Candle open time in ms since epoch
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candles for one symbol and timeframe, in the order the exchange returned them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    pub exchange: String,
    pub symbol: String,
    pub timeframe: String,
    pub points: Vec<OhlcvPoint>,
}
