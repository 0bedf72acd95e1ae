//! Observability for Warden
//!
//! - [`LogSink`]: the logging capability injected into each component
//! - [`TracingSink`]: production sink, forwards to `tracing`
//! - [`MemorySink`]: captures events for assertions in tests
//! - [`init_tracing`]: installs the process-wide subscriber at bootstrap
//!
//! # Usage
//!
//! ```ignore
//! use warden::observability::{init_tracing, LogSink, TracingSink};
//!
//! init_tracing();
//! let log = TracingSink::shared();
//! log.info("boot_complete", &[("store", "sqlite")]);
//! ```

mod logger;

pub use logger::{LogRecord, LogSink, MemorySink, Severity, TracingSink};

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// The filter comes from `RUST_LOG`, then `LOG_LEVEL`, then defaults to
/// `info`. Calling this twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
