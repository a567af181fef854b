//! Diagnostic logging setup.
//!
//! The core reports everything it skips or falls back on through `tracing`.
//! The CLI installs a compact stderr subscriber; the filter comes from
//! `PIXELFLAG_LOG` and defaults to `warn` (`debug` with `--verbose`).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "PIXELFLAG_LOG";

pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    })
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(layer)
        .try_init();
}
