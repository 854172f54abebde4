//! In-memory exchange used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cryptomarket_data::{
    ExchangeConnection, ExchangeFactory, RawCandle, RawOrderBook, RawTicker, UpstreamError,
};

/// Exchange whose responses are set up front. Unknown symbols fail with `BadSymbol`.
#[derive(Default)]
pub struct FakeExchange {
    pub id: String,
    pub tickers: Vec<RawTicker>,
    pub candles: HashMap<String, Vec<RawCandle>>,
    pub books: HashMap<String, RawOrderBook>,
    /// When set, every call fails with this upstream error.
    pub failure: Mutex<Option<UpstreamError>>,
    pub calls: AtomicUsize,
    /// Arguments of the last `fetch_ohlcv` call.
    pub last_ohlcv_args: Mutex<Option<(String, String, Option<i64>, u32)>>,
}

impl FakeExchange {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ticker(mut self, symbol: &str, last: Option<f64>, volume: Option<f64>) -> Self {
        self.tickers.push(RawTicker {
            symbol: symbol.to_string(),
            last,
            quote_volume: volume,
            timestamp: Some(1_700_000_000_000),
            ..Default::default()
        });
        self
    }

    pub fn with_candles(mut self, symbol: &str, rows: Vec<RawCandle>) -> Self {
        self.candles.insert(symbol.to_string(), rows);
        self
    }

    pub fn with_book(mut self, symbol: &str, book: RawOrderBook) -> Self {
        self.books.insert(symbol.to_string(), book);
        self
    }

    pub fn fail_with(&self, name: &str, message: &str) {
        *self.failure.lock().unwrap() = Some(UpstreamError::new(name, message));
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn bad_symbol(&self, symbol: &str) -> UpstreamError {
        UpstreamError::new(
            "BadSymbol",
            format!("{} does not have market symbol {}", self.id, symbol),
        )
    }
}

impl ExchangeConnection for FakeExchange {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch_ticker(&self, symbol: &str) -> Result<RawTicker, UpstreamError> {
        self.enter()?;
        self.tickers
            .iter()
            .find(|t| t.symbol == symbol)
            .cloned()
            .ok_or_else(|| self.bad_symbol(symbol))
    }

    fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since_ms: Option<i64>,
        limit: u32,
    ) -> Result<Vec<RawCandle>, UpstreamError> {
        self.enter()?;
        *self.last_ohlcv_args.lock().unwrap() =
            Some((symbol.to_string(), timeframe.to_string(), since_ms, limit));
        self.candles
            .get(symbol)
            .cloned()
            .ok_or_else(|| self.bad_symbol(symbol))
    }

    fn fetch_order_book(&self, symbol: &str, _limit: u32) -> Result<RawOrderBook, UpstreamError> {
        self.enter()?;
        self.books
            .get(symbol)
            .cloned()
            .ok_or_else(|| self.bad_symbol(symbol))
    }

    fn fetch_tickers(&self) -> Result<Vec<RawTicker>, UpstreamError> {
        self.enter()?;
        Ok(self.tickers.clone())
    }
}

/// Factory serving pre-built fake exchanges, counting `connect` calls per id.
#[derive(Default)]
pub struct FakeFactory {
    pub exchanges: HashMap<String, Arc<FakeExchange>>,
    pub connects: Mutex<HashMap<String, usize>>,
}

impl FakeFactory {
    pub fn with(exchange: Arc<FakeExchange>) -> Self {
        let mut factory = Self::default();
        factory.exchanges.insert(exchange.id.clone(), exchange);
        factory
    }

    pub fn connects_for(&self, id: &str) -> usize {
        self.connects.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

impl ExchangeFactory for FakeFactory {
    fn connect(&self, exchange_id: &str) -> Option<Arc<dyn ExchangeConnection>> {
        *self
            .connects
            .lock()
            .unwrap()
            .entry(exchange_id.to_string())
            .or_default() += 1;
        self.exchanges
            .get(exchange_id)
            .map(|e| e.clone() as Arc<dyn ExchangeConnection>)
    }

    fn exchange_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.exchanges.keys().cloned().collect();
        ids.sort();
        ids
    }
}
