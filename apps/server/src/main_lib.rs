use std::sync::Arc;

use cryptomarket_data::{BinanceExchangeFactory, ExchangeFactory, MarketDataClient};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub client: Arc<MarketDataClient>,
}

pub fn init_tracing() {
    let log_format = std::env::var("MARKET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// State backed by the Binance connector.
pub fn build_state(config: &Config) -> Arc<AppState> {
    let factory = Arc::new(BinanceExchangeFactory::with_timeout(config.upstream_timeout));
    build_state_with_factory(config, factory)
}

/// State backed by any exchange factory.
pub fn build_state_with_factory(
    config: &Config,
    factory: Arc<dyn ExchangeFactory>,
) -> Arc<AppState> {
    let supported = factory.exchange_ids();
    if !supported.iter().any(|id| id == &config.default_exchange) {
        tracing::warn!(
            "Default exchange '{}' is not one of {:?}; requests without an exchange will fail",
            config.default_exchange,
            supported
        );
    }

    let client = MarketDataClient::new(factory, config.client_config());
    tracing::info!(
        "Market data client ready (default exchange '{}', cache TTL {:?})",
        client.default_exchange(),
        client.cache_ttl()
    );
    Arc::new(AppState {
        client: Arc::new(client),
    })
}
