#![forbid(unsafe_code)]

//! JSON log output.
//!
//! The engine only emits `tracing` events. Applications that do not install
//! their own subscriber can call [`init_json`] once at startup; the level
//! filter is read from `RUST_LOG`.

use tracing_subscriber::EnvFilter;

use crate::error::LoggingError;

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already set.
pub fn init_json() -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| LoggingError(err.to_string()))
}
