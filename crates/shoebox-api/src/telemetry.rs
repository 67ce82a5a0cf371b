use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "shoebox=debug,tower_http=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Production deployments get one
/// JSON object per event; everything else gets the compact console format.
pub fn init_telemetry(json: bool) -> Result<(), anyhow::Error> {
    let json_fmt = json.then(|| tracing_subscriber::fmt::layer().json().with_current_span(true));
    let console_fmt = (!json).then(|| {
        tracing_subscriber::fmt::layer().event_format(Format::default().compact().with_target(false))
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(json_fmt)
        .with(console_fmt)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!(json, "Tracing initialized");
    Ok(())
}
