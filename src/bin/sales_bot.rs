use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use rkl_sales_bot::announcer::Announcer;
use rkl_sales_bot::config::{AppConfig, CONFIG_PATH};
use rkl_sales_bot::reporter;
use rkl_sales_bot::state::SeenSales;

#[derive(Parser)]
#[command(name = "sales-bot", about = "Announce Rumble Kong League sales to Discord and Twitter")]
struct Args {
    /// Settings file (optional; defaults apply when missing)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Build announcements and log them instead of sending
    #[arg(long)]
    dry_run: bool,

    /// Keep polling every `poll_interval_secs` instead of running one pass
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    info!("Loaded settings (file: {})", args.config.display());

    let announcer = Announcer::from_config(&config, args.dry_run)?;
    match announcer.verify().await? {
        Some(handle) => info!("Twitter credentials OK (@{handle})"),
        None => info!("Dry run: nothing will be sent"),
    }

    if !args.watch {
        let summary = announcer.run_once(chrono::Utc::now(), None).await?;
        reporter::report_run_summary(&summary);
        return Ok(());
    }

    // --- Polling loop ---
    let settings = &config.settings;
    let retention = chrono::Duration::seconds(i64::try_from(settings.dedup_retention_secs)?);
    if settings.dedup_retention_secs < settings.lookback_secs {
        warn!(
            "dedup_retention_secs ({}) is shorter than lookback_secs ({}); overlapping sales may repeat",
            settings.dedup_retention_secs, settings.lookback_secs
        );
    }
    let mut seen = SeenSales::new(retention);
    let poll_duration = Duration::from_secs(settings.poll_interval_secs);
    info!(
        "Entering polling loop (interval: {}s). Press Ctrl+C to stop.",
        settings.poll_interval_secs
    );

    loop {
        let now = chrono::Utc::now();
        let pruned = seen.prune(now);
        if pruned > 0 {
            info!("Pruned {pruned} expired sale(s) from the seen set");
        }
        match announcer.run_once(now, Some(&mut seen)).await {
            Ok(summary) => reporter::report_run_summary(&summary),
            Err(e) => warn!("Poll cycle error: {e:#}"),
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(poll_duration) => {}
        }
    }

    Ok(())
}
