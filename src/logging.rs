//! Logging setup for the binary.
//! Library code only emits `tracing` events; installing a subscriber is left
//! to `main`.

use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Log level used when neither `RUST_LOG` nor a CLI override is given.
pub const DEFAULT_FILTER: &str = "steam_catalog=info,warn";

/// Installs a compact fmt subscriber writing to stderr, keeping stdout free
/// for tables and summaries. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
