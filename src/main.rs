use clap::Parser;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use liquitrace::config::{Config, CHAIN_ID};
use liquitrace::error::Result;
use liquitrace::scanner::Scanner;

/// Top-gainer signal scanner for Base.
#[derive(Debug, Parser)]
#[command(name = "liquitrace", version)]
struct Cli {
    /// Run a single scan and exit instead of scanning on an interval.
    #[arg(long, conflicts_with = "check")]
    once: bool,

    /// Report how many signals the configured store holds, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cli, cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cfg: Config) -> Result<()> {
    info!(
        "LiquiTrace starting: top gainers on {CHAIN_ID} (min_liq=${:.0}, min_vol=${:.0}, top_n={}, every {}s)",
        cfg.min_liquidity_usd, cfg.min_volume_24h, cfg.top_n, cfg.scan_interval_secs,
    );

    let scanner = Scanner::from_config(cfg).await?;

    if cli.check {
        match scanner.store() {
            Some(store) => {
                let rows = store.count().await?;
                info!("Store '{}' reachable: {rows} signal(s) stored", store.name());
                for row in store.list().await? {
                    info!(
                        "  {} | 24h: {:+.1}% | Vol: ${:.0} | updated {}",
                        row.token_name, row.price_change_pct, row.volume_24h, row.updated_at,
                    );
                }
            }
            None => info!("No store configured; nothing to check."),
        }
        return Ok(());
    }

    if cli.once {
        if let Some(report) = scanner.scan_once().await {
            info!("Single scan finished: {report:?}");
        }
        return Ok(());
    }

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received; stopping after the current scan …");
                let _ = stop_tx.send(());
            }
            Err(e) => {
                // keep scanning; the process can still be killed
                error!("Cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    });

    info!("Scheduler started. Press Ctrl+C to stop.");
    scanner
        .run(async {
            let _ = stop_rx.await;
        })
        .await;
    Ok(())
}
