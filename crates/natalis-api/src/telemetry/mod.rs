//! Tracing subscriber setup

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "natalis=debug,tower_http=debug";

/// Initialize tracing: compact console output, or JSON lines in production.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_telemetry(json: bool) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let console_fmt = (!json).then(|| {
        tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        )
    });
    let json_fmt = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .flatten_event(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_fmt)
        .with(json_fmt)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::debug!(json, "Tracing initialized");
    Ok(())
}
