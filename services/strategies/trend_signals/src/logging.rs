//! Tracing subscriber setup

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level`; `json` switches to one JSON object per line.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("trend_signals={level},warn")))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Run `f` under a temporary warn-level stderr subscriber.
///
/// Configuration is loaded before the configured level is known; its fallback
/// warnings would otherwise go nowhere.
pub fn with_bootstrap_logging<T>(f: impl FnOnce() -> T) -> T {
    with_bootstrap_writer(std::io::stderr, f)
}

fn with_bootstrap_writer<W, T>(writer: W, f: impl FnOnce() -> T) -> T
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(writer)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, f)
}
