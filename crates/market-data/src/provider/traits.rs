//! Upstream exchange trait definitions.
//!
//! The client consumes exactly two upstream capabilities:
//! - [`ExchangeFactory`]: construct a connection for an exchange id
//! - [`ExchangeConnection`]: perform one remote call on that connection

use std::sync::Arc;

use crate::errors::UpstreamError;

use super::raw::{RawCandle, RawOrderBook, RawTicker};

/// A live, possibly stateful session with one upstream exchange.
///
/// All calls are blocking and carry whatever timeout the implementation
/// chooses; the client adds none. Implementations report failures as
/// [`UpstreamError`] with a category name the normalizer can classify
/// (for example `"BadSymbol"` or `"RateLimitExceeded"`).
///
/// # Example
///
/// ```ignore
/// struct StaticExchange;
///
/// impl ExchangeConnection for StaticExchange {
///     fn id(&self) -> &str {
///         "static"
///     }
///
///     fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker, UpstreamError> {
///         Ok(RawTicker {
///             symbol: symbol.to_string(),
///             last: Some(1.0),
///             ..Default::default()
///         })
///     }
///
///     // ... implement the remaining fetch methods
/// }
/// ```
pub trait ExchangeConnection: Send + Sync {
    /// Lower-case exchange id this connection talks to.
    fn id(&self) -> &str;

    /// Fetch the ticker for one unified symbol (`BASE/QUOTE`).
    fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker, UpstreamError>;

    /// Fetch candles for `symbol`.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Unified symbol, e.g. `BTC/USDT`
    /// * `timeframe` - Candle width label, e.g. `1m`, `1h`, `1d`
    /// * `since_ms` - Earliest candle open time in ms, or `None` for the most recent
    /// * `limit` - Maximum number of candles
    ///
    /// Rows are returned in upstream order.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since_ms: Option<i64>,
        limit: u32,
    ) -> Result<Vec<RawCandle>, UpstreamError>;

    /// Fetch the order book for `symbol`, asking upstream for `limit` levels per side.
    fn fetch_order_book(&self, symbol: &str, limit: u32) -> Result<RawOrderBook, UpstreamError>;

    /// Fetch tickers for every market on the exchange, in upstream order.
    fn fetch_tickers(&self) -> Result<Vec<RawTicker>, UpstreamError>;
}

/// Constructs exchange connections by id.
pub trait ExchangeFactory: Send + Sync {
    /// Build a new connection for a lower-case exchange id.
    ///
    /// Returns `None` when this factory has no connector for the id.
    fn connect(&self, exchange_id: &str) -> Option<Arc<dyn ExchangeConnection>>;

    /// Exchange ids this factory can connect to.
    fn exchange_ids(&self) -> Vec<String>;
}
