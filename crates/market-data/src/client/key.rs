//! Cache keys and cached values for the client.

use crate::models::{OhlcvSeries, OrderBook, Price, Ticker, TopMarketsResponse};

/// Identity of one client request.
///
/// Each variant holds the operation's exchange id plus every parameter that
/// changes the upstream answer, and nothing else.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Price {
        exchange: String,
        symbol: String,
    },
    Ticker {
        exchange: String,
        symbol: String,
    },
    Ohlcv {
        exchange: String,
        symbol: String,
        timeframe: String,
        limit: u32,
        since_ms: Option<i64>,
    },
    OrderBook {
        exchange: String,
        symbol: String,
        depth: u32,
    },
    TopMarkets {
        exchange: String,
        limit: u32,
        quote_asset: String,
    },
}

impl CacheKey {
    /// Exchange id the request targets.
    pub fn exchange(&self) -> &str {
        match self {
            Self::Price { exchange, .. }
            | Self::Ticker { exchange, .. }
            | Self::Ohlcv { exchange, .. }
            | Self::OrderBook { exchange, .. }
            | Self::TopMarkets { exchange, .. } => exchange,
        }
    }

    /// Operation tag, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Price { .. } => "price",
            Self::Ticker { .. } => "ticker",
            Self::Ohlcv { .. } => "ohlcv",
            Self::OrderBook { .. } => "order_book",
            Self::TopMarkets { .. } => "top_markets",
        }
    }
}

/// Any artifact the client stores in its cache.
#[derive(Clone, Debug, PartialEq)]
pub enum CachedArtifact {
    Price(Price),
    Ticker(Ticker),
    Ohlcv(OhlcvSeries),
    OrderBook(OrderBook),
    TopMarkets(TopMarketsResponse),
}

/// Conversion between a concrete artifact and [`CachedArtifact`].
pub(crate) trait CachedValue: Clone + Sized {
    fn into_cached(self) -> CachedArtifact;
    fn from_cached(cached: CachedArtifact) -> Option<Self>;
}

macro_rules! impl_cached_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl CachedValue for $ty {
                fn into_cached(self) -> CachedArtifact {
                    CachedArtifact::$variant(self)
                }

                fn from_cached(cached: CachedArtifact) -> Option<Self> {
                    match cached {
                        CachedArtifact::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_cached_value!(
    Price => Price,
    Ticker => Ticker,
    OhlcvSeries => Ohlcv,
    OrderBook => OrderBook,
    TopMarketsResponse => TopMarkets,
);
