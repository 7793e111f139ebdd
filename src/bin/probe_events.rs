//! Probe: OpenSea events + asset endpoints
//!
//! Hits the two endpoints the sales bot reads and documents:
//! - Events response shape and fields for the configured window
//! - Which sale records decode, and how buyer/seller names resolve
//! - Trait list of the first sold asset and the derived boosts
//!
//! Sends nothing. Needs `OPENSEA_API_KEY`.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;

use rkl_sales_bot::api::OpenSeaClient;
use rkl_sales_bot::boosts::boosts_from_traits;
use rkl_sales_bot::config::{AppConfig, CONFIG_PATH};
use rkl_sales_bot::counterparty::resolve;
use rkl_sales_bot::types::{SaleEvent, TradeSide};
use rkl_sales_bot::window;

#[derive(Parser)]
#[command(name = "probe_events", about = "Inspect OpenSea sale events without announcing")]
struct Args {
    /// Lookback in minutes (wider than the bot's window to find something to look at)
    #[arg(long, default_value_t = 60)]
    minutes: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(Path::new(CONFIG_PATH))?;
    let settings = &config.settings;
    let client = OpenSeaClient::new(
        &settings.opensea_api_base,
        &settings.contract_address,
        config.credentials.opensea_api_key()?,
        Duration::from_secs(settings.http_timeout_secs),
    )?;

    println!("=== Probe: OpenSea sale events ===");
    println!("Contract: {}", client.contract());
    println!();

    // 1. Raw events for the window
    let occurred_after = window::occurred_after(Utc::now(), chrono::Duration::minutes(args.minutes));
    println!("--- 1. Events after {occurred_after} ---");
    let start = Instant::now();
    let records = client
        .fetch_sale_records(&occurred_after, settings.event_limit)
        .await?;
    println!("Latency: {:?}", start.elapsed());
    println!("Event count: {}", records.len());
    if let Some(first) = records.first() {
        println!("\nSample event (first):");
        println!("{}", serde_json::to_string_pretty(first)?);
        println!("\nFields present:");
        if let Some(obj) = first.as_object() {
            for key in obj.keys() {
                println!("  - {key}");
            }
        }
    }
    println!();

    // 2. Decode + counterparty resolution
    println!("--- 2. Decoded sales ---");
    let mut decoded = Vec::new();
    for (idx, raw) in records.into_iter().enumerate() {
        let buyer = resolve(TradeSide::Buyer, &raw);
        let seller = resolve(TradeSide::Seller, &raw);
        match SaleEvent::from_record(raw) {
            Ok(ev) => {
                println!(
                    "  [{idx}] {} (token {}) total_price={} {} buyer={buyer:?} seller={seller:?}",
                    ev.asset.name,
                    ev.asset.token_id,
                    ev.total_price,
                    ev.payment_token.symbol,
                );
                decoded.push(ev);
            }
            Err(e) => println!("  [{idx}] does not decode: {e}"),
        }
    }
    println!();

    // 3. Traits of the first sold asset
    println!("--- 3. Traits ---");
    match decoded.first() {
        Some(ev) => {
            let start = Instant::now();
            let traits = client.fetch_traits(&ev.asset.token_id).await?;
            println!("Latency: {:?}", start.elapsed());
            for t in &traits {
                println!("  {} = {}", t.trait_type, t.value);
            }
            match boosts_from_traits(&traits) {
                Ok(b) => println!("Boosts: {b:?}"),
                Err(e) => println!("Boosts do not parse: {e:#}"),
            }
        }
        None => println!("  no decodable sale to inspect"),
    }
    println!();

    println!("=== Probe Complete ===");
    Ok(())
}
