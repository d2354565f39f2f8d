//! Logging setup.
//!
//! `RUST_LOG` wins over the configured filter; an unparsable filter falls
//! back to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FALLBACK_FILTER: &str = "info";

/// Builds the filter from `RUST_LOG` or `configured`.
pub fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Installs the global subscriber. Returns `false` if one was already set.
pub fn init(configured: &str) -> bool {
    let fmt_layer = fmt::layer().with_target(true);
    tracing_subscriber::registry()
        .with(build_filter(configured))
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
