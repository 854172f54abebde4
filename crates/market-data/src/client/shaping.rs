//! Conversion of raw upstream payloads into typed artifacts.
//!
//! Malformed payloads (missing price, short rows, non-numeric fields) are
//! reported as [`MarketDataError::UpstreamApi`].

use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{
    OhlcvPoint, OhlcvSeries, OrderBook, OrderBookLevel, Price, Ticker, TopMarket,
    TopMarketsResponse, TICKER_INFO_SOURCE,
};
use crate::provider::{RawCandle, RawLevel, RawOrderBook, RawTicker};

fn malformed(what: &str, value: &Value) -> MarketDataError {
    MarketDataError::UpstreamApi(format!("Malformed {} in upstream response: {}", what, value))
}

/// Coerce a JSON number or numeric string to `f64`.
fn to_f64(value: &Value, what: &str) -> Result<f64, MarketDataError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(what, value))
}

/// Coerce a JSON integer (or integral float / numeric string) to `i64`.
fn to_i64(value: &Value, what: &str) -> Result<i64, MarketDataError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(what, value))
}

pub(crate) fn shape_price(
    exchange: &str,
    symbol: &str,
    raw: &RawTicker,
) -> Result<Price, MarketDataError> {
    let price = raw.last_or_close().ok_or_else(|| {
        MarketDataError::UpstreamApi(format!("No last or close price for {} on {}", symbol, exchange))
    })?;

    Ok(Price {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        price,
        timestamp_ms: raw.timestamp.unwrap_or(0),
    })
}

pub(crate) fn shape_ticker(exchange: &str, symbol: &str, raw: &RawTicker) -> Ticker {
    Ticker {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        bid: raw.bid,
        ask: raw.ask,
        last: raw.last_or_close(),
        timestamp_ms: raw.timestamp,
        info_source: TICKER_INFO_SOURCE.to_string(),
    }
}

fn shape_candle(row: &RawCandle) -> Result<OhlcvPoint, MarketDataError> {
    if row.len() < 6 {
        return Err(malformed("OHLCV row", &Value::Array(row.clone())));
    }

    Ok(OhlcvPoint {
        timestamp_ms: to_i64(&row[0], "OHLCV timestamp")?,
        open: to_f64(&row[1], "OHLCV open")?,
        high: to_f64(&row[2], "OHLCV high")?,
        low: to_f64(&row[3], "OHLCV low")?,
        close: to_f64(&row[4], "OHLCV close")?,
        volume: to_f64(&row[5], "OHLCV volume")?,
    })
}

pub(crate) fn shape_ohlcv(
    exchange: &str,
    symbol: &str,
    timeframe: &str,
    rows: &[RawCandle],
) -> Result<OhlcvSeries, MarketDataError> {
    let points = rows
        .iter()
        .map(shape_candle)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OhlcvSeries {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        points,
    })
}

fn shape_levels(levels: &[RawLevel], depth: usize) -> Result<Vec<OrderBookLevel>, MarketDataError> {
    levels
        .iter()
        .take(depth)
        .map(|level| match level.as_slice() {
            [price, amount, ..] => Ok(OrderBookLevel {
                price: to_f64(price, "order book price")?,
                amount: to_f64(amount, "order book amount")?,
            }),
            _ => Err(malformed("order book level", &Value::Array(level.clone()))),
        })
        .collect()
}

pub(crate) fn shape_order_book(
    exchange: &str,
    symbol: &str,
    depth: u32,
    raw: &RawOrderBook,
) -> Result<OrderBook, MarketDataError> {
    let depth = depth as usize;
    Ok(OrderBook {
        exchange: exchange.to_string(),
        symbol: symbol.to_string(),
        bids: shape_levels(&raw.bids, depth)?,
        asks: shape_levels(&raw.asks, depth)?,
    })
}

/// Rank markets quoted in `quote_asset` by descending quote volume.
///
/// Tickers with another quote asset or without a last/close price are
/// skipped. Equal volumes keep their upstream order.
pub(crate) fn shape_top_markets(
    exchange: &str,
    quote_asset: &str,
    limit: u32,
    tickers: &[RawTicker],
) -> TopMarketsResponse {
    let suffix = format!("/{}", quote_asset);

    let mut ranked: Vec<(TopMarket, f64)> = tickers
        .iter()
        .filter(|t| t.symbol.ends_with(&suffix))
        .filter_map(|t| {
            let price = t.last_or_close()?;
            let base = t
                .symbol
                .split('/')
                .next()
                .filter(|b| !b.is_empty())
                .map(str::to_string);
            let market = TopMarket {
                symbol: t.symbol.clone(),
                price,
                quote_asset: quote_asset.to_string(),
                base_asset: base,
            };
            Some((market, rank_volume(t.quote_volume)))
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit as usize);

    TopMarketsResponse {
        exchange: exchange.to_string(),
        markets: ranked.into_iter().map(|(market, _)| market).collect(),
    }
}

/// Volume used for ranking. Missing and NaN count as zero; `+ 0.0` folds
/// `-0.0` into `0.0` so `total_cmp` ranks them as equal.
fn rank_volume(volume: Option<f64>) -> f64 {
    volume.filter(|v| !v.is_nan()).unwrap_or(0.0) + 0.0
}
