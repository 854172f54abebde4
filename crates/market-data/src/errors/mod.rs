//! Error types and upstream error normalization for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The closed set of errors every client operation can return
//! - [`UpstreamError`]: The raw failure reported by an exchange connection
//! - [`normalize_upstream_error`]: Maps an [`UpstreamError`] onto a [`MarketDataError`]

mod normalize;

pub use normalize::normalize_upstream_error;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// The set is closed: every failure raised while resolving an exchange
/// connection or calling upstream is reported as exactly one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The requested exchange id has no upstream connector.
    /// Raised by the connection registry before any upstream call.
    #[error("Exchange not supported: {0}")]
    ExchangeNotSupported(String),

    /// The symbol is unknown or invalid on the resolved exchange.
    #[error("Symbol not supported: {0}")]
    SymbolNotSupported(String),

    /// The upstream exchange throttled the request.
    #[error("Rate limited: {0}")]
    RateLimit(String),

    /// Any other upstream failure: network, malformed response, unclassified.
    #[error("Upstream API error: {0}")]
    UpstreamApi(String),
}

impl MarketDataError {
    /// Message suitable for showing to an API consumer or a tool-calling agent.
    ///
    /// # Examples
    ///
    /// ```
    /// use cryptomarket_data::errors::MarketDataError;
    ///
    /// let error = MarketDataError::RateLimit("429 Too Many Requests".to_string());
    /// assert_eq!(
    ///     error.user_message(),
    ///     "Upstream API rate limit exceeded. Please retry after some time."
    /// );
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            Self::ExchangeNotSupported(id) => format!("Exchange not supported: {}", id),
            Self::SymbolNotSupported(msg) => {
                format!("Symbol not supported on this exchange: {}", msg)
            }
            Self::RateLimit(_) => {
                "Upstream API rate limit exceeded. Please retry after some time.".to_string()
            }
            Self::UpstreamApi(msg) => format!("Upstream API error: {}", msg),
        }
    }
}

/// A raw failure reported by an exchange connection.
///
/// `name` is the connector's category for the failure (for example
/// `"BadSymbol"`, `"RateLimitExceeded"`, `"NetworkError"`). Classification
/// looks only at the name; `message` is carried through for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct UpstreamError {
    pub name: String,
    pub message: String,
}

impl UpstreamError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::ExchangeNotSupported("kraken2".to_string());
        assert_eq!(format!("{}", error), "Exchange not supported: kraken2");

        let error = MarketDataError::UpstreamApi("connection reset".to_string());
        assert_eq!(format!("{}", error), "Upstream API error: connection reset");
    }

    #[test]
    fn test_user_message_for_each_kind() {
        assert_eq!(
            MarketDataError::ExchangeNotSupported("foo".to_string()).user_message(),
            "Exchange not supported: foo"
        );
        assert_eq!(
            MarketDataError::SymbolNotSupported("XXX/YYY".to_string()).user_message(),
            "Symbol not supported on this exchange: XXX/YYY"
        );
        assert_eq!(
            MarketDataError::RateLimit("slow down".to_string()).user_message(),
            "Upstream API rate limit exceeded. Please retry after some time."
        );
        assert_eq!(
            MarketDataError::UpstreamApi("boom".to_string()).user_message(),
            "Upstream API error: boom"
        );
    }

    #[test]
    fn test_upstream_error_display() {
        let error = UpstreamError::new("BadSymbol", "binance does not have market symbol XXX/YYY");
        assert_eq!(
            error.to_string(),
            "BadSymbol: binance does not have market symbol XXX/YYY"
        );
    }
}
