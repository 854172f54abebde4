//! Exchange connection registry module.
//!
//! Keeps one reusable connection per exchange id so that expensive
//! connector initialization happens once per client.

mod exchange_registry;

pub use exchange_registry::ExchangeRegistry;
