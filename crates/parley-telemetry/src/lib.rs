//! Logging for Parley
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or a JSON formatting layer

use parley_config::TelemetryConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Resolve the filter directive
///
/// `RUST_LOG` wins over configuration so operators can raise verbosity
/// without editing the config file. Invalid directives fall back to `info`.
fn build_filter(config: Option<&TelemetryConfig>, default_filter: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = config.map_or(default_filter, |c| c.log_filter.as_str());
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging from configuration
///
/// Must be called once, before the server starts handling requests.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed
pub fn init(config: Option<&TelemetryConfig>, default_filter: &str) -> anyhow::Result<()> {
    let filter = build_filter(config, default_filter);
    let json = config.is_some_and(|c| c.json);

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install JSON log subscriber: {e}"))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;
    }

    Ok(())
}
