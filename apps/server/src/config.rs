use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context};
use cryptomarket_data::{client::DEFAULT_EXCHANGE, ClientConfig};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub default_exchange: String,
    pub cache_ttl: Duration,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load an optional `.env` file, then read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = lookup("MARKET_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid MARKET_LISTEN_ADDR")?;

        let default_exchange = lookup("DEFAULT_EXCHANGE")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string());

        let ttl_raw = lookup("CACHE_TTL_SECONDS").unwrap_or_else(|| "10".into());
        let ttl_seconds: u64 = ttl_raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid CACHE_TTL_SECONDS: {ttl_raw}"))?;
        if ttl_seconds == 0 {
            bail!("CACHE_TTL_SECONDS must be a positive integer");
        }

        let cors_allow = lookup("MARKET_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = lookup("MARKET_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);
        let upstream_timeout_ms: u64 = lookup("MARKET_UPSTREAM_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);

        Ok(Self {
            listen_addr,
            default_exchange,
            cache_ttl: Duration::from_secs(ttl_seconds),
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            default_exchange: self.default_exchange.clone(),
            cache_ttl: self.cache_ttl,
        }
    }
}
