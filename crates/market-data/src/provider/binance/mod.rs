//! Binance spot REST connector.
//!
//! Public, unauthenticated endpoints only:
//! - Tickers via /api/v3/ticker/24hr
//! - Candles via /api/v3/klines
//! - Order books via /api/v3/depth
//! - Market list via /api/v3/exchangeInfo (loaded once per connection)
//!
//! Both binance.com and binance.us expose the same API under different hosts.
//! API documentation: https://developers.binance.com/docs/binance-spot-api-docs/rest-api

mod models;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use self::models::{DepthResponse, ErrorResponse, ExchangeInfoResponse, Ticker24h};
use crate::errors::UpstreamError;
use crate::provider::raw::{RawCandle, RawOrderBook, RawTicker};
use crate::provider::{ExchangeConnection, ExchangeFactory};

pub const BINANCE_ID: &str = "binance";
pub const BINANCE_US_ID: &str = "binanceus";

const BINANCE_BASE_URL: &str = "https://api.binance.com";
const BINANCE_US_BASE_URL: &str = "https://api.binance.us";

/// Default HTTP timeout for a single upstream request.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Binance error code for too many requests.
const CODE_TOO_MANY_REQUESTS: i64 = -1003;
/// Binance error code for an unknown symbol.
const CODE_INVALID_SYMBOL: i64 = -1121;

// Upstream failure categories understood by the error normalizer.
const RATE_LIMIT_EXCEEDED: &str = "RateLimitExceeded";
const BAD_SYMBOL: &str = "BadSymbol";
const NETWORK_ERROR: &str = "NetworkError";
const REQUEST_TIMEOUT: &str = "RequestTimeout";
const BAD_RESPONSE: &str = "BadResponse";
const EXCHANGE_ERROR: &str = "ExchangeError";

// ============================================================================
// Market list
// ============================================================================

/// Mapping between unified `BASE/QUOTE` symbols and Binance symbols.
#[derive(Debug, Default)]
struct Markets {
    by_unified: HashMap<String, String>,
    by_exchange: HashMap<String, String>,
}

impl Markets {
    fn from_info(info: ExchangeInfoResponse) -> Self {
        let mut markets = Self::default();
        for s in info.symbols {
            let unified = format!("{}/{}", s.base_asset, s.quote_asset);
            markets.by_unified.insert(unified.clone(), s.symbol.clone());
            markets.by_exchange.insert(s.symbol, unified);
        }
        markets
    }

    fn exchange_symbol(&self, unified: &str) -> Option<&str> {
        self.by_unified.get(unified).map(String::as_str)
    }

    fn unified_symbol(&self, exchange_symbol: &str) -> Option<&str> {
        self.by_exchange.get(exchange_symbol).map(String::as_str)
    }
}

// ============================================================================
// BinanceConnection
// ============================================================================

/// One connection to a Binance-compatible host.
///
/// The market list is fetched on first use and kept for the life of the
/// connection.
pub struct BinanceConnection {
    id: String,
    base_url: String,
    client: Client,
    markets: Mutex<Option<Arc<Markets>>>,
}

impl BinanceConnection {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            id: id.into(),
            base_url: base_url.into(),
            client,
            markets: Mutex::new(None),
        }
    }

    fn lock_markets(&self) -> MutexGuard<'_, Option<Arc<Markets>>> {
        self.markets.lock().unwrap_or_else(|poisoned| {
            warn!("Binance markets mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// GET `path` and decode the JSON body.
    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} request: {} with {} params", self.id, path, params.len());

        let response = self.client.get(&url).query(params).send().map_err(|e| {
            if e.is_timeout() {
                UpstreamError::new(REQUEST_TIMEOUT, format!("{} {} timed out", self.id, path))
            } else {
                UpstreamError::new(NETWORK_ERROR, format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| UpstreamError::new(NETWORK_ERROR, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            UpstreamError::new(BAD_RESPONSE, format!("Failed to parse {} response: {}", path, e))
        })
    }

    fn markets(&self) -> Result<Arc<Markets>, UpstreamError> {
        let mut guard = self.lock_markets();
        if let Some(markets) = guard.as_ref() {
            return Ok(Arc::clone(markets));
        }

        let info: ExchangeInfoResponse = self.get("/api/v3/exchangeInfo", &[])?;
        let markets = Arc::new(Markets::from_info(info));
        info!("Loaded {} markets for '{}'", markets.by_unified.len(), self.id);
        *guard = Some(Arc::clone(&markets));
        Ok(markets)
    }

    fn market_id(&self, symbol: &str) -> Result<String, UpstreamError> {
        let markets = self.markets()?;
        markets
            .exchange_symbol(symbol)
            .map(str::to_string)
            .ok_or_else(|| {
                UpstreamError::new(
                    BAD_SYMBOL,
                    format!("{} does not have market symbol {}", self.id, symbol),
                )
            })
    }
}

impl ExchangeConnection for BinanceConnection {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker, UpstreamError> {
        let market_id = self.market_id(symbol)?;
        let ticker: Ticker24h = self.get("/api/v3/ticker/24hr", &[("symbol", market_id)])?;
        Ok(to_raw_ticker(ticker, symbol.to_string()))
    }

    fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since_ms: Option<i64>,
        limit: u32,
    ) -> Result<Vec<RawCandle>, UpstreamError> {
        let market_id = self.market_id(symbol)?;
        let mut params = vec![
            ("symbol", market_id),
            ("interval", timeframe.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(since) = since_ms {
            params.push(("startTime", since.to_string()));
        }

        // Klines carry extra trailing fields (close time, trade count, ...).
        let rows: Vec<Vec<Value>> = self.get("/api/v3/klines", &params)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().take(6).collect())
            .collect())
    }

    fn fetch_order_book(&self, symbol: &str, limit: u32) -> Result<RawOrderBook, UpstreamError> {
        let market_id = self.market_id(symbol)?;
        let depth: DepthResponse = self.get(
            "/api/v3/depth",
            &[("symbol", market_id), ("limit", limit.to_string())],
        )?;
        Ok(RawOrderBook {
            bids: depth.bids,
            asks: depth.asks,
        })
    }

    fn fetch_tickers(&self) -> Result<Vec<RawTicker>, UpstreamError> {
        let markets = self.markets()?;
        let tickers: Vec<Ticker24h> = self.get("/api/v3/ticker/24hr", &[])?;

        // Tickers for delisted symbols are absent from exchangeInfo; skip them.
        Ok(tickers
            .into_iter()
            .filter_map(|t| {
                let unified = markets.unified_symbol(&t.symbol)?.to_string();
                Some(to_raw_ticker(t, unified))
            })
            .collect())
    }
}

/// Turn a non-2xx response into an upstream failure with a classifiable name.
fn classify_failure(status: StatusCode, body: &str) -> UpstreamError {
    // 418 means the IP was banned for ignoring 429s.
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
        return UpstreamError::new(RATE_LIMIT_EXCEEDED, format!("HTTP {} - {}", status, body));
    }

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if err.code == CODE_TOO_MANY_REQUESTS => {
            UpstreamError::new(RATE_LIMIT_EXCEEDED, err.msg)
        }
        Ok(err) if err.code == CODE_INVALID_SYMBOL => UpstreamError::new(BAD_SYMBOL, err.msg),
        Ok(err) => UpstreamError::new(EXCHANGE_ERROR, format!("{} (code {})", err.msg, err.code)),
        Err(_) => UpstreamError::new(EXCHANGE_ERROR, format!("HTTP {} - {}", status, body)),
    }
}

fn parse_decimal(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.parse::<f64>().ok())
}

fn to_raw_ticker(ticker: Ticker24h, unified_symbol: String) -> RawTicker {
    let last = parse_decimal(ticker.last_price.as_deref());
    RawTicker {
        symbol: unified_symbol,
        timestamp: ticker.close_time,
        bid: parse_decimal(ticker.bid_price.as_deref()),
        ask: parse_decimal(ticker.ask_price.as_deref()),
        last,
        // The rolling 24h window closes at the last trade.
        close: last,
        quote_volume: parse_decimal(ticker.quote_volume.as_deref()),
    }
}

// ============================================================================
// BinanceExchangeFactory
// ============================================================================

/// Connects to `binance` and `binanceus`.
pub struct BinanceExchangeFactory {
    timeout: Duration,
}

impl BinanceExchangeFactory {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_UPSTREAM_TIMEOUT)
    }

    /// Use `timeout` for every HTTP request made by connections from this factory.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for BinanceExchangeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeFactory for BinanceExchangeFactory {
    fn connect(&self, exchange_id: &str) -> Option<Arc<dyn ExchangeConnection>> {
        let base_url = match exchange_id {
            BINANCE_ID => BINANCE_BASE_URL,
            BINANCE_US_ID => BINANCE_US_BASE_URL,
            _ => return None,
        };
        Some(Arc::new(BinanceConnection::new(
            exchange_id,
            base_url,
            self.timeout,
        )))
    }

    fn exchange_ids(&self) -> Vec<String> {
        vec![BINANCE_ID.to_string(), BINANCE_US_ID.to_string()]
    }
}
