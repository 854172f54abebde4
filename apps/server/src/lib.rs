pub mod api;
pub mod config;
pub mod error;
pub mod params;
pub mod tools;
mod main_lib;

pub use main_lib::{build_state, build_state_with_factory, init_tracing, AppState};
