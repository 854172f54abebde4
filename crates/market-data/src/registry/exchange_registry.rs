//! Per-exchange connection registry.
//!
//! Maps a lower-case exchange id to a lazily created connection that is
//! reused for the life of the registry. Entries are never evicted, and
//! unknown ids are never cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::errors::MarketDataError;
use crate::provider::{ExchangeConnection, ExchangeFactory};

/// Thread-safe exchange id → connection map.
///
/// The lookup and the factory call run under one lock, so concurrent first
/// requests for the same id construct exactly one connection.
pub struct ExchangeRegistry {
    factory: Arc<dyn ExchangeFactory>,
    connections: Mutex<HashMap<String, Arc<dyn ExchangeConnection>>>,
}

impl ExchangeRegistry {
    pub fn new(factory: Arc<dyn ExchangeFactory>) -> Self {
        Self {
            factory,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the connections mutex, recovering from poison if necessary.
    fn lock_connections(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn ExchangeConnection>>> {
        self.connections.lock().unwrap_or_else(|poisoned| {
            warn!("Exchange registry mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return the connection for `exchange_id`, creating it on first use.
    ///
    /// The id is matched case-insensitively. Fails with
    /// [`MarketDataError::ExchangeNotSupported`] when the factory has no
    /// connector for it; nothing is stored in that case.
    pub fn resolve(&self, exchange_id: &str) -> Result<Arc<dyn ExchangeConnection>, MarketDataError> {
        let key = exchange_id.to_lowercase();
        let mut connections = self.lock_connections();

        if let Some(connection) = connections.get(&key) {
            debug!("Reusing connection for exchange '{}'", key);
            return Ok(Arc::clone(connection));
        }

        let connection = self
            .factory
            .connect(&key)
            .ok_or_else(|| MarketDataError::ExchangeNotSupported(key.clone()))?;

        info!("Created connection for exchange '{}'", key);
        connections.insert(key, Arc::clone(&connection));
        Ok(connection)
    }

    /// Whether a connection for `exchange_id` has already been created.
    pub fn contains(&self, exchange_id: &str) -> bool {
        self.lock_connections()
            .contains_key(&exchange_id.to_lowercase())
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.lock_connections().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exchange ids the underlying factory can connect to.
    pub fn supported_exchanges(&self) -> Vec<String> {
        self.factory.exchange_ids()
    }
}
