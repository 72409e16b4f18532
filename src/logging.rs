//! Logging
//!
//! `tracing` subscriber setup for the binary. `RUST_LOG` wins over the
//! verbosity flag when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a `-v` count: warnings, then info, then debug.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "volfs=warn",
        1 => "volfs=info",
        _ => "volfs=debug",
    }
}

/// Install the global subscriber, writing to stderr. Later calls are no-ops.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_by_verbosity() {
        assert_eq!(default_filter(0), "volfs=warn");
        assert_eq!(default_filter(1), "volfs=info");
        assert_eq!(default_filter(3), "volfs=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(0);
        init(2);
    }
}
