use log::warn;

use super::{MarketDataError, UpstreamError};

/// Name fragments that mark an unknown or malformed symbol/market.
const SYMBOL_MARKERS: &[&str] = &["Symbol", "Market", "BadSymbol"];

/// Name fragment that marks upstream throttling.
const RATE_LIMIT_MARKER: &str = "RateLimit";

/// Map a raw upstream failure onto the closed error taxonomy.
///
/// Classification is keyword based on the failure's category name only:
///
/// | Name contains | Result |
/// |---------------|--------|
/// | `RateLimit` | [`MarketDataError::RateLimit`] |
/// | `Symbol`, `Market`, `BadSymbol` | [`MarketDataError::SymbolNotSupported`] |
/// | anything else | [`MarketDataError::UpstreamApi`] |
///
/// Never produces [`MarketDataError::ExchangeNotSupported`]; that kind comes
/// from the connection registry.
pub fn normalize_upstream_error(error: &UpstreamError) -> MarketDataError {
    let kind = if error.name.contains(RATE_LIMIT_MARKER) {
        MarketDataError::RateLimit(error.message.clone())
    } else if SYMBOL_MARKERS.iter().any(|m| error.name.contains(m)) {
        MarketDataError::SymbolNotSupported(error.message.clone())
    } else {
        MarketDataError::UpstreamApi(error.message.clone())
    };

    warn!("Upstream failure '{}' normalized to: {}", error.name, kind);
    kind
}
