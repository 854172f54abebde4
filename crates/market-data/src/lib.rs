//! Cryptomarket Data Crate
//!
//! A read-through caching layer in front of exchange market data.
//!
//! # Overview
//!
//! The crate serves five kinds of artifact: current price, ticker, OHLCV
//! series, order book and top markets. Each request is answered from a TTL
//! cache when possible; otherwise the exchange is called, its failure (if
//! any) is normalized into [`MarketDataError`], and the shaped result is
//! cached.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | MarketDataClient |  (one method per artifact)
//! +------------------+
//!      |        |
//!      v        v
//! +---------+  +------------------+
//! | TtlCache|  | ExchangeRegistry |  (one connection per exchange id)
//! +---------+  +------------------+
//!                       |
//!                       v
//!              +--------------------+
//!              | ExchangeConnection |  (Binance, test doubles, ...)
//!              +--------------------+
//!                       |
//!                       v
//!              +--------------------+
//!              | normalize_upstream |  (on failure)
//!              +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataClient`] - Cache/fetch/normalize orchestration
//! - [`TtlCache`] - Thread-safe cache with lazy expiry
//! - [`ExchangeRegistry`] - Lazily created, reused exchange connections
//! - [`ExchangeFactory`] / [`ExchangeConnection`] - Upstream capability traits
//! - [`MarketDataError`] - The closed error taxonomy

pub mod cache;
pub mod client;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use cache::{TtlCache, DEFAULT_CACHE_TTL};
pub use client::{CacheKey, CachedArtifact, ClientConfig, MarketDataClient};
pub use errors::{normalize_upstream_error, MarketDataError, UpstreamError};
pub use models::{
    OhlcvPoint, OhlcvSeries, OrderBook, OrderBookLevel, Price, Ticker, TopMarket,
    TopMarketsResponse, TICKER_INFO_SOURCE,
};
pub use provider::binance::{BinanceConnection, BinanceExchangeFactory};
pub use provider::{ExchangeConnection, ExchangeFactory, RawCandle, RawLevel, RawOrderBook, RawTicker};
pub use registry::ExchangeRegistry;
