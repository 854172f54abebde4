//! Market data models
//!
//! This module contains the immutable artifacts returned by the client:
//! - `quote` - Current price and ticker snapshots (Price, Ticker)
//! - `ohlcv` - Candle series (OhlcvPoint, OhlcvSeries)
//! - `order_book` - Depth snapshots (OrderBookLevel, OrderBook)
//! - `markets` - Volume-ranked markets (TopMarket, TopMarketsResponse)

mod markets;
mod ohlcv;
mod order_book;
mod quote;

pub use markets::{TopMarket, TopMarketsResponse};
pub use ohlcv::{OhlcvPoint, OhlcvSeries};
pub use order_book::{OrderBook, OrderBookLevel};
pub use quote::{Price, Ticker, TICKER_INFO_SOURCE};
