//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `VERBOSE` is true
pub const VERBOSE_FILTER: &str = "info,stock_agent=debug";
/// Default filter when `VERBOSE` is false
pub const QUIET_FILTER: &str = "warn";

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { QUIET_FILTER }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins over the `verbose` default. A second call is a no-op.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // Err means a global subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(verbose))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(true), "info,stock_agent=debug");
        assert_eq!(default_filter(false), "warn");
    }

    #[test]
    fn test_init_twice_is_noop() {
        init_tracing(false);
        init_tracing(true);
    }
}
