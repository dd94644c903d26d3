//! Observability subsystem
//!
//! Library code only emits `tracing` events:
//! - `debug` when a query is validated or rejected
//! - `info` when an evaluation completes
//! - `warn` when the result guard fires
//!
//! Installing a subscriber is the binary's job, done once through
//! `init_logging`. Logs always go to stderr; stdout carries responses.

mod logging;

pub use logging::{init_logging, LogFormat, DEFAULT_LOG_LEVEL};
