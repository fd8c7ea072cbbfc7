//! Observability for the compatibility layer
//!
//! Structured logging through `tracing`. Each event carries an `event` field
//! naming an [`Event`], plus whatever context the call site has.
//!
//! # Usage
//!
//! ```ignore
//! use docshim::config::LogConfig;
//! use docshim::observability::init_logging;
//!
//! init_logging(&LogConfig::default());
//! ```

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Installs the global `tracing` subscriber
///
/// `RUST_LOG` wins over `config.level` when set. Calling this twice is
/// harmless; the second subscriber is simply not installed.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
