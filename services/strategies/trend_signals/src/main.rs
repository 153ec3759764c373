//! Trend Signal Service Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use trend_signals::logging::{init_logging, with_bootstrap_logging};
use trend_signals::{
    EvaluationWindow, FixedPortfolio, JsonFileCandleSource, SignalPoller, SignalService,
    StrategyConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candle file (`{"candles": [...]}`); overrides `market.candles_path`
    #[arg(long)]
    candles: Option<PathBuf>,

    /// Evaluate the full window once, print the decision as JSON and exit
    #[arg(long)]
    once: bool,

    /// Base currency balance for asset value tracking
    #[arg(long, requires = "quote_balance")]
    base_balance: Option<f64>,

    /// Quote currency balance for asset value tracking
    #[arg(long, requires = "base_balance")]
    quote_balance: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let service_config =
        with_bootstrap_logging(|| trend_config::load_config(args.config.as_deref()))
            .context("Failed to load trend signal configuration")?;

    init_logging(&service_config.global.log_level, service_config.global.json_logs)?;

    info!("Starting Trend Signal Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let candles_path = args
        .candles
        .or_else(|| service_config.market.candles_path.clone())
        .context("No candle file given: pass --candles or set market.candles_path")?;

    let config = StrategyConfig::from_service(&service_config)
        .context("Invalid strategy configuration")?;

    info!(
        "Configuration loaded: pair {}, webhook {}",
        config.trading_pair,
        if config.notifier.is_some() { "enabled" } else { "disabled" }
    );

    let source = Arc::new(JsonFileCandleSource::new(candles_path));
    let service = Arc::new(SignalService::new(config, source)?);

    if args.once {
        let (decision, delivery) = service
            .evaluate_at(EvaluationWindow::Full, chrono::Utc::now())
            .await
            .context("Signal evaluation failed")?;

        println!("{}", serde_json::to_string_pretty(&decision)?);

        // Let an emitted event reach the webhook before exiting
        if let Some(delivery) = delivery {
            let outcome = delivery.await.context("Webhook task failed")?;
            info!("Webhook delivery: {:?}", outcome);
        }
        return Ok(());
    }

    let mut poller = SignalPoller::new(Arc::clone(&service));
    if let (Some(base), Some(quote)) = (args.base_balance, args.quote_balance) {
        poller = poller.with_portfolio(Arc::new(FixedPortfolio { base, quote }));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    info!("Trend Signal Service running. Press Ctrl+C to stop.");

    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down Trend Signal Service");
    let _ = shutdown_tx.send(true);

    if let Err(e) = poller_handle.await {
        error!("Poller task failed: {:?}", e);
    }

    let metrics = service.metrics();
    info!(
        "Final metrics: {} evaluations, {} events, {} early exits, {} failed deliveries",
        metrics.evaluations, metrics.events_emitted, metrics.early_exits, metrics.deliveries_failed
    );

    Ok(())
}
