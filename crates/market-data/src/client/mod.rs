//! Read-through market data client.
//!
//! Every operation follows the same template:
//! 1. Pick the exchange (explicit argument, else the configured default)
//! 2. Compose a [`CacheKey`] from the operation and its parameters
//! 3. Return the cached artifact on a hit
//! 4. On a miss, resolve the exchange connection and call upstream
//! 5. Normalize upstream failures and shape the raw payload
//! 6. Cache and return the artifact
//!
//! All operations block the calling thread. Locks are never held across
//! the upstream call, and no timeout is added beyond the connector's own.

mod key;
mod shaping;

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use self::key::CachedValue;
use crate::cache::{TtlCache, DEFAULT_CACHE_TTL};
use crate::errors::{normalize_upstream_error, MarketDataError};
use crate::models::{OhlcvSeries, OrderBook, Price, Ticker, TopMarketsResponse};
use crate::provider::{ExchangeConnection, ExchangeFactory};
use crate::registry::ExchangeRegistry;

pub use key::{CacheKey, CachedArtifact};

/// Exchange used when a request names none.
pub const DEFAULT_EXCHANGE: &str = "binance";

pub const DEFAULT_TIMEFRAME: &str = "1h";
pub const DEFAULT_OHLCV_LIMIT: u32 = 100;
pub const OHLCV_LIMIT_RANGE: RangeInclusive<u32> = 1..=1000;

pub const DEFAULT_ORDER_BOOK_DEPTH: u32 = 20;
pub const ORDER_BOOK_DEPTH_RANGE: RangeInclusive<u32> = 1..=200;

pub const DEFAULT_TOP_MARKETS_LIMIT: u32 = 10;
pub const TOP_MARKETS_LIMIT_RANGE: RangeInclusive<u32> = 1..=100;
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";

/// Settings read once at start-up.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Exchange id used when a request names none
    pub default_exchange: String,
    /// Lifetime of every cached artifact
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_exchange: DEFAULT_EXCHANGE.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Caching front for upstream exchange data.
///
/// Construct one per process (or per test) and share it behind an `Arc`.
/// Connections and cached artifacts belong to this instance only.
pub struct MarketDataClient {
    default_exchange: String,
    cache: TtlCache<CacheKey, CachedArtifact>,
    registry: ExchangeRegistry,
}

impl MarketDataClient {
    pub fn new(factory: Arc<dyn ExchangeFactory>, config: ClientConfig) -> Self {
        Self {
            default_exchange: normalize_exchange_id(&config.default_exchange),
            cache: TtlCache::new(config.cache_ttl),
            registry: ExchangeRegistry::new(factory),
        }
    }

    pub fn default_exchange(&self) -> &str {
        &self.default_exchange
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Exchange ids the upstream factory can connect to.
    pub fn supported_exchanges(&self) -> Vec<String> {
        self.registry.supported_exchanges()
    }

    /// Drop every cached artifact. Connections are kept.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Current price: last trade, falling back to close.
    pub fn get_current_price(
        &self,
        symbol: &str,
        exchange: Option<&str>,
    ) -> Result<Price, MarketDataError> {
        let exchange = self.effective_exchange(exchange);
        let key = CacheKey::Price {
            exchange: exchange.clone(),
            symbol: symbol.to_string(),
        };

        self.read_through(key, |connection| {
            let raw = connection
                .fetch_ticker(symbol)
                .map_err(|e| normalize_upstream_error(&e))?;
            shaping::shape_price(&exchange, symbol, &raw)
        })
    }

    /// Bid, ask and last trade for one symbol.
    pub fn get_ticker(
        &self,
        symbol: &str,
        exchange: Option<&str>,
    ) -> Result<Ticker, MarketDataError> {
        let exchange = self.effective_exchange(exchange);
        let key = CacheKey::Ticker {
            exchange: exchange.clone(),
            symbol: symbol.to_string(),
        };

        self.read_through(key, |connection| {
            let raw = connection
                .fetch_ticker(symbol)
                .map_err(|e| normalize_upstream_error(&e))?;
            Ok(shaping::shape_ticker(&exchange, symbol, &raw))
        })
    }

    /// Candles for `symbol` at `timeframe`, in upstream order.
    ///
    /// `since_ms` asks for candles starting at that time; `None` gets the most
    /// recent `limit` candles.
    pub fn get_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: u32,
        since_ms: Option<i64>,
        exchange: Option<&str>,
    ) -> Result<OhlcvSeries, MarketDataError> {
        let exchange = self.effective_exchange(exchange);
        let key = CacheKey::Ohlcv {
            exchange: exchange.clone(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            limit,
            since_ms,
        };

        self.read_through(key, |connection| {
            let rows = connection
                .fetch_ohlcv(symbol, timeframe, since_ms, limit)
                .map_err(|e| normalize_upstream_error(&e))?;
            shaping::shape_ohlcv(&exchange, symbol, timeframe, &rows)
        })
    }

    /// Order book with at most `depth` levels per side.
    pub fn get_order_book(
        &self,
        symbol: &str,
        depth: u32,
        exchange: Option<&str>,
    ) -> Result<OrderBook, MarketDataError> {
        let exchange = self.effective_exchange(exchange);
        let key = CacheKey::OrderBook {
            exchange: exchange.clone(),
            symbol: symbol.to_string(),
            depth,
        };

        self.read_through(key, |connection| {
            let raw = connection
                .fetch_order_book(symbol, depth)
                .map_err(|e| normalize_upstream_error(&e))?;
            shaping::shape_order_book(&exchange, symbol, depth, &raw)
        })
    }

    /// Up to `limit` markets quoted in `quote_asset`, highest quote volume first.
    pub fn get_top_markets(
        &self,
        exchange: Option<&str>,
        limit: u32,
        quote_asset: &str,
    ) -> Result<TopMarketsResponse, MarketDataError> {
        let exchange = self.effective_exchange(exchange);
        let key = CacheKey::TopMarkets {
            exchange: exchange.clone(),
            limit,
            quote_asset: quote_asset.to_string(),
        };

        self.read_through(key, |connection| {
            let tickers = connection
                .fetch_tickers()
                .map_err(|e| normalize_upstream_error(&e))?;
            Ok(shaping::shape_top_markets(
                &exchange,
                quote_asset,
                limit,
                &tickers,
            ))
        })
    }

    fn effective_exchange(&self, exchange: Option<&str>) -> String {
        match exchange.map(str::trim).filter(|e| !e.is_empty()) {
            Some(id) => normalize_exchange_id(id),
            None => self.default_exchange.clone(),
        }
    }

    /// Serve `key` from the cache, or fetch, cache and return it.
    fn read_through<T, F>(&self, key: CacheKey, fetch: F) -> Result<T, MarketDataError>
    where
        T: CachedValue,
        F: FnOnce(&dyn ExchangeConnection) -> Result<T, MarketDataError>,
    {
        if let Some(hit) = self.cache.get(&key).and_then(T::from_cached) {
            debug!("Cache hit for {} on '{}'", key.kind(), key.exchange());
            return Ok(hit);
        }

        debug!("Cache miss for {} on '{}'", key.kind(), key.exchange());
        let connection = self.registry.resolve(key.exchange())?;
        let value = fetch(connection.as_ref())?;

        self.cache.set(key, value.clone().into_cached());
        Ok(value)
    }
}

fn normalize_exchange_id(id: &str) -> String {
    id.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UpstreamError;
    use crate::provider::{RawCandle, RawOrderBook, RawTicker};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ScriptedConnection {
        ticker_calls: AtomicUsize,
        fail_with: Option<UpstreamError>,
    }

    impl ExchangeConnection for ScriptedConnection {
        fn id(&self) -> &str {
            "binance"
        }

        fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker, UpstreamError> {
            self.ticker_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(RawTicker {
                symbol: symbol.to_string(),
                last: Some(50000.0),
                timestamp: Some(1700000000000),
                ..Default::default()
            })
        }

        fn fetch_ohlcv(
            &self,
            _symbol: &str,
            _timeframe: &str,
            _since_ms: Option<i64>,
            _limit: u32,
        ) -> Result<Vec<RawCandle>, UpstreamError> {
            Ok(Vec::new())
        }

        fn fetch_order_book(&self, _symbol: &str, _limit: u32) -> Result<RawOrderBook, UpstreamError> {
            Ok(RawOrderBook::default())
        }

        fn fetch_tickers(&self) -> Result<Vec<RawTicker>, UpstreamError> {
            Ok(Vec::new())
        }
    }

    struct SingleFactory(Arc<ScriptedConnection>);

    impl ExchangeFactory for SingleFactory {
        fn connect(&self, exchange_id: &str) -> Option<Arc<dyn ExchangeConnection>> {
            (exchange_id == "binance").then(|| self.0.clone() as Arc<dyn ExchangeConnection>)
        }

        fn exchange_ids(&self) -> Vec<String> {
            vec!["binance".to_string()]
        }
    }

    fn client_with(connection: Arc<ScriptedConnection>) -> MarketDataClient {
        MarketDataClient::new(Arc::new(SingleFactory(connection)), ClientConfig::default())
    }

    #[test]
    fn test_default_exchange_is_used_when_none_given() {
        let connection = Arc::new(ScriptedConnection::default());
        let client = client_with(connection);

        let price = client.get_current_price("BTC/USDT", None).unwrap();
        assert_eq!(price.exchange, "binance");
        assert_eq!(price.price, 50000.0);

        let price = client.get_current_price("BTC/USDT", Some("  ")).unwrap();
        assert_eq!(price.exchange, "binance");
    }

    #[test]
    fn test_second_call_hits_cache() {
        let connection = Arc::new(ScriptedConnection::default());
        let client = client_with(connection.clone());

        let first = client.get_current_price("BTC/USDT", Some("binance")).unwrap();
        let second = client.get_current_price("BTC/USDT", None).unwrap();

        assert_eq!(first, second);
        assert_eq!(connection.ticker_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exchange_id_case_shares_cache_entry() {
        let connection = Arc::new(ScriptedConnection::default());
        let client = client_with(connection.clone());

        client.get_ticker("BTC/USDT", Some("Binance")).unwrap();
        let ticker = client.get_ticker("BTC/USDT", Some("BINANCE")).unwrap();

        assert_eq!(ticker.exchange, "binance");
        assert_eq!(connection.ticker_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_cache_forces_refetch() {
        let connection = Arc::new(ScriptedConnection::default());
        let client = client_with(connection.clone());

        client.get_ticker("BTC/USDT", None).unwrap();
        client.clear_cache();
        client.get_ticker("BTC/USDT", None).unwrap();

        assert_eq!(connection.ticker_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_exchange_fails_before_upstream() {
        let connection = Arc::new(ScriptedConnection::default());
        let client = client_with(connection.clone());

        let err = client.get_current_price("BTC/USDT", Some("kraken")).unwrap_err();
        assert_eq!(err, MarketDataError::ExchangeNotSupported("kraken".to_string()));
        assert_eq!(connection.ticker_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_upstream_failure_is_normalized_and_not_cached() {
        let connection = Arc::new(ScriptedConnection {
            fail_with: Some(UpstreamError::new("BadSymbol", "Bad symbol")),
            ..Default::default()
        });
        let client = client_with(connection.clone());

        for _ in 0..2 {
            let err = client.get_current_price("XXX/YYY", None).unwrap_err();
            assert_eq!(err, MarketDataError::SymbolNotSupported("Bad symbol".to_string()));
        }
        assert_eq!(connection.ticker_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.default_exchange, DEFAULT_EXCHANGE);
        assert_eq!(config.cache_ttl, Duration::from_secs(10));

        let client = MarketDataClient::new(
            Arc::new(SingleFactory(Arc::new(ScriptedConnection::default()))),
            ClientConfig {
                default_exchange: " Binance ".to_string(),
                cache_ttl: Duration::from_secs(3),
            },
        );
        assert_eq!(client.default_exchange(), "binance");
        assert_eq!(client.cache_ttl(), Duration::from_secs(3));
        assert_eq!(client.supported_exchanges(), vec!["binance".to_string()]);
    }
}
