//! Work spawned off the request path.
//!
//! Each submodule provides a function that hands its work to `tokio::spawn`
//! and returns immediately. Failures are logged, never surfaced to clients.

pub mod history;
