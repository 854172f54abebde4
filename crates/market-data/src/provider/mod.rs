//! Upstream exchange abstractions and implementations.
//!
//! This module contains:
//! - The `ExchangeFactory` and `ExchangeConnection` traits the client calls through
//! - Raw, unshaped upstream payloads
//! - A concrete Binance-compatible connector
//!
//! The client never knows which connector sits behind the traits; tests swap
//! in in-memory implementations.

pub mod binance;
mod raw;
mod traits;

// Re-exports
pub use raw::{RawCandle, RawLevel, RawOrderBook, RawTicker};
pub use traits::{ExchangeConnection, ExchangeFactory};
