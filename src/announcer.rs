use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::OPENSEA_WEB_BASE;
use crate::api::OpenSeaClient;
use crate::boosts::boosts_from_traits;
use crate::config::AppConfig;
use crate::counterparty::display_name;
use crate::discord::{DiscordWebhook, Embed};
use crate::price::PriceQuote;
use crate::reporter;
use crate::state::SeenSales;
use crate::twitter::TwitterClient;
use crate::types::{AnnouncementRecord, BoostSet, EnrichedSale, RunSummary, SaleEvent, TradeSide};
use crate::window;

/// Shown in place of a boost the asset doesn't carry.
const MISSING_BOOST: &str = "-";

/// `https://opensea.io/assets/{contract}/{token_id}`
pub fn asset_url(contract: &str, token_id: &str) -> String {
    format!("{OPENSEA_WEB_BASE}/assets/{contract}/{token_id}")
}

/// `https://opensea.io/{address}`
pub fn profile_url(address: &str) -> String {
    format!("{OPENSEA_WEB_BASE}/{address}")
}

fn boost_display(value: Option<i64>) -> String {
    value.map_or_else(|| MISSING_BOOST.to_string(), |v| v.to_string())
}

/// Combine a decoded sale with its boosts: price, and display names with fallbacks.
pub fn enrich(event: SaleEvent, boosts: BoostSet) -> Result<EnrichedSale> {
    let price = PriceQuote::compute(&event.total_price, &event.payment_token)
        .with_context(|| format!("cannot price sale of token {}", event.asset.token_id))?;
    let buyer = display_name(TradeSide::Buyer, &event.raw, &event.winner_account.address);
    let seller = display_name(TradeSide::Seller, &event.raw, &event.seller.address);
    Ok(EnrichedSale {
        event,
        boosts,
        price,
        buyer,
        seller,
    })
}

/// Rich card for the sales channel.
///
/// Field order is fixed: Boost Total, Defense, Finish, Shooting, Vision, Seller, Buyer.
pub fn build_embed(sale: &EnrichedSale, contract: &str) -> Embed {
    let asset = &sale.event.asset;
    let b = &sale.boosts;
    Embed::new(
        format!("{} Sold", asset.name),
        format!("Price: {}", sale.price.summary()),
        asset_url(contract, &asset.token_id),
    )
    .thumbnail(asset.image_url.as_deref())
    .field("Boost Total", b.cumulative, false)
    .field("Defense", boost_display(b.defense), true)
    .field("Finish", boost_display(b.finish), true)
    .field("Shooting", boost_display(b.shooting), true)
    .field("Vision", boost_display(b.vision), true)
    .field(
        "Seller",
        format!("[{}]({})", sale.seller, profile_url(sale.seller_address())),
        false,
    )
    .field(
        "Buyer",
        format!("[{}]({})", sale.buyer, profile_url(sale.buyer_address())),
        true,
    )
}

/// Short status text for the Twitter account.
pub fn build_status(sale: &EnrichedSale, contract: &str) -> String {
    let b = &sale.boosts;
    format!(
        "{} bought for {}\n{} overall\n👀 {} | 🎯 {}\n💪 {} | 🛡️ {} {}",
        sale.event.asset.name,
        sale.price.summary(),
        b.cumulative,
        boost_display(b.vision),
        boost_display(b.shooting),
        boost_display(b.finish),
        boost_display(b.defense),
        asset_url(contract, &sale.event.asset.token_id),
    )
}

/// Where announcements go.
pub enum Delivery {
    Live {
        webhook: DiscordWebhook,
        twitter: TwitterClient,
    },
    /// Build everything, send nothing.
    DryRun,
}

/// Runs polling passes: fetch recent sales, enrich each, announce in order.
pub struct Announcer {
    opensea: OpenSeaClient,
    delivery: Delivery,
    lookback: Duration,
    event_limit: u32,
}

impl Announcer {
    pub fn new(opensea: OpenSeaClient, delivery: Delivery, lookback: Duration, event_limit: u32) -> Self {
        Self {
            opensea,
            delivery,
            lookback,
            event_limit,
        }
    }

    /// Build the clients from config. Live mode needs the webhook and Twitter credentials.
    pub fn from_config(config: &AppConfig, dry_run: bool) -> Result<Self> {
        let settings = &config.settings;
        let creds = &config.credentials;
        let timeout = StdDuration::from_secs(settings.http_timeout_secs);

        let opensea = OpenSeaClient::new(
            &settings.opensea_api_base,
            &settings.contract_address,
            creds.opensea_api_key()?,
            timeout,
        )?;
        let delivery = if dry_run {
            Delivery::DryRun
        } else {
            Delivery::Live {
                webhook: DiscordWebhook::new(creds.channel_url()?, timeout)?,
                twitter: TwitterClient::from_credentials(&settings.twitter_api_base, creds, timeout)?,
            }
        };
        let lookback = Duration::seconds(
            i64::try_from(settings.lookback_secs).context("lookback_secs is too large")?,
        );
        Ok(Self::new(opensea, delivery, lookback, settings.event_limit))
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.delivery, Delivery::DryRun)
    }

    /// Check the Twitter credentials. Returns the account handle, or `None` in dry-run.
    pub async fn verify(&self) -> Result<Option<String>> {
        match &self.delivery {
            Delivery::Live { twitter, .. } => Ok(Some(twitter.verify_credentials().await?)),
            Delivery::DryRun => Ok(None),
        }
    }

    /// One pass over the window ending at `now`.
    ///
    /// With `seen`, sales already announced by this process are skipped and new
    /// ones are recorded after both sends succeed. Any error aborts the pass;
    /// sales announced before it stay announced.
    pub async fn run_once(
        &self,
        now: DateTime<Utc>,
        mut seen: Option<&mut SeenSales>,
    ) -> Result<RunSummary> {
        let occurred_after = window::occurred_after(now, self.lookback);
        let records = self
            .opensea
            .fetch_sale_records(&occurred_after, self.event_limit)
            .await?;

        let mut summary = RunSummary {
            occurred_after,
            fetched: records.len(),
            ..Default::default()
        };
        if records.is_empty() {
            info!("No new sales since {}", summary.occurred_after);
            return Ok(summary);
        }
        info!("Found {} sale(s) since {}", records.len(), summary.occurred_after);

        // Decoded one at a time so a bad record only stops the sales after it.
        for (idx, raw) in records.into_iter().enumerate() {
            let event = SaleEvent::from_record(raw)
                .with_context(|| format!("malformed sale record at index {idx}"))?;
            let key = event.dedup_key();
            if seen.as_deref().is_some_and(|s| s.contains(&key)) {
                summary.skipped_seen += 1;
                continue;
            }

            let traits = self.opensea.fetch_traits(&event.asset.token_id).await?;
            let boosts = boosts_from_traits(&traits)
                .with_context(|| format!("bad traits on token {}", event.asset.token_id))?;
            let sale = enrich(event, boosts)?;

            self.announce(&sale).await?;
            info!(
                "Announced {} for {} (boost {})",
                sale.event.asset.name,
                sale.price.summary(),
                sale.boosts.cumulative
            );
            reporter::report_announcement(&self.record(&sale));

            if let Some(seen) = seen.as_deref_mut() {
                seen.insert(key, now);
            }
            summary.announced += 1;
        }

        Ok(summary)
    }

    /// Webhook first, then the status; either failure propagates.
    async fn announce(&self, sale: &EnrichedSale) -> Result<()> {
        let contract = self.opensea.contract();
        let embed = build_embed(sale, contract);
        let status = build_status(sale, contract);

        match &self.delivery {
            Delivery::Live { webhook, twitter } => {
                webhook
                    .send(&embed)
                    .await
                    .with_context(|| format!("failed to post {} to the webhook", embed.title))?;
                twitter
                    .post_status(&status)
                    .await
                    .with_context(|| format!("failed to tweet {}", embed.title))?;
            }
            Delivery::DryRun => {
                info!("[dry-run] would post embed {:?}", embed.title);
                info!("[dry-run] would tweet:\n{status}");
            }
        }
        Ok(())
    }

    fn record(&self, sale: &EnrichedSale) -> AnnouncementRecord {
        AnnouncementRecord {
            timestamp: Utc::now().to_rfc3339(),
            token_id: sale.event.asset.token_id.clone(),
            name: sale.event.asset.name.clone(),
            transaction_hash: sale.event.transaction_hash().map(str::to_string),
            price: format!("{} {}", sale.price.amount_display(), sale.price.symbol),
            price_usd: sale.price.usd,
            boosts: sale.boosts,
            buyer: sale.buyer.clone(),
            seller: sale.seller.clone(),
            dry_run: self.is_dry_run(),
        }
    }
}
