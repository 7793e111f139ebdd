use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::price::PriceQuote;

/// One successful sale from the OpenSea events feed.
///
/// Only the fields the announcer reads are decoded; the full record is kept in
/// `raw` because counterparty resolution walks optional paths on it.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleEvent {
    pub asset: SaleAsset,
    pub winner_account: AccountRef,
    pub seller: AccountRef,
    /// Integer amount in the payment token's smallest unit.
    #[serde(deserialize_with = "string_or_number")]
    pub total_price: String,
    pub payment_token: PaymentToken,
    #[serde(default)]
    pub transaction: Option<TransactionRef>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleAsset {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub token_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentToken {
    pub symbol: String,
    pub decimals: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub usd_price: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRef {
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

impl SaleEvent {
    /// Decode a raw feed record, keeping the original JSON alongside.
    pub fn from_record(raw: Value) -> serde_json::Result<Self> {
        let mut event: SaleEvent = serde_json::from_value(raw.clone())?;
        event.raw = raw;
        Ok(event)
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction
            .as_ref()
            .and_then(|t| t.transaction_hash.as_deref())
    }

    /// Identity used by the watch-mode seen set.
    pub fn dedup_key(&self) -> String {
        match self.transaction_hash() {
            Some(hash) => hash.to_string(),
            None => format!("{}:{}", self.asset.token_id, self.total_price),
        }
    }
}

/// One entry of an asset's `traits` list.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetTrait {
    pub trait_type: String,
    pub value: Value,
}

/// Boost stats derived from a Kong's traits.
///
/// A boost missing from the traits stays `None`; `cumulative` sums whatever is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoostSet {
    pub vision: Option<i64>,
    pub defense: Option<i64>,
    pub shooting: Option<i64>,
    pub finish: Option<i64>,
    pub cumulative: i64,
}

/// Which side of a trade to resolve a counterparty for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buyer,
    Seller,
}

impl TradeSide {
    /// Key of the account object for this side in a sale record.
    pub fn account_key(self) -> &'static str {
        match self {
            TradeSide::Buyer => "winner_account",
            TradeSide::Seller => "seller",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buyer => f.write_str("buyer"),
            TradeSide::Seller => f.write_str("seller"),
        }
    }
}

impl FromStr for TradeSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(TradeSide::Buyer),
            "seller" => Ok(TradeSide::Seller),
            other => anyhow::bail!("invalid trade side: {other:?} (expected buyer or seller)"),
        }
    }
}

/// A sale with everything the notifiers need.
#[derive(Debug, Clone)]
pub struct EnrichedSale {
    pub event: SaleEvent,
    pub boosts: BoostSet,
    pub price: PriceQuote,
    /// Display names after the Anon / address-prefix fallback.
    pub buyer: String,
    pub seller: String,
}

impl EnrichedSale {
    pub fn buyer_address(&self) -> &str {
        &self.event.winner_account.address
    }

    pub fn seller_address(&self) -> &str {
        &self.event.seller.address
    }
}

/// Report line for one announced sale.
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementRecord {
    pub timestamp: String,
    pub token_id: String,
    pub name: String,
    pub transaction_hash: Option<String>,
    pub price: String,
    pub price_usd: f64,
    pub boosts: BoostSet,
    pub buyer: String,
    pub seller: String,
    pub dry_run: bool,
}

/// Report line emitted at the end of each pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub occurred_after: String,
    pub fetched: usize,
    pub skipped_seen: usize,
    pub announced: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accept `"123"` and `123` alike; OpenSea sends numeric amounts as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trade_side_parses_known_values() {
        assert_eq!("buyer".parse::<TradeSide>().unwrap(), TradeSide::Buyer);
        assert_eq!("Seller".parse::<TradeSide>().unwrap(), TradeSide::Seller);
    }

    #[test]
    fn trade_side_rejects_other_values() {
        let err = "maker".parse::<TradeSide>().unwrap_err();
        assert!(err.to_string().contains("invalid trade side"));
        assert!("".parse::<TradeSide>().is_err());
    }

    #[test]
    fn sale_event_accepts_numeric_strings_and_numbers() {
        let raw = json!({
            "asset": {"name": "Kong #1", "image_url": null, "token_id": 1},
            "winner_account": {"address": "0xb"},
            "seller": {"address": "0xs"},
            "total_price": "1000",
            "payment_token": {"symbol": "ETH", "decimals": 18, "usd_price": 4240.5},
        });
        let ev = SaleEvent::from_record(raw.clone()).unwrap();
        assert_eq!(ev.asset.token_id, "1");
        assert_eq!(ev.total_price, "1000");
        assert_eq!(ev.payment_token.usd_price, "4240.5");
        assert!(ev.asset.image_url.is_none());
        assert_eq!(ev.raw, raw);
    }

    #[test]
    fn dedup_key_prefers_transaction_hash() {
        let mut raw = json!({
            "asset": {"name": "Kong #7", "token_id": "7"},
            "winner_account": {"address": "0xb"},
            "seller": {"address": "0xs"},
            "total_price": "5",
            "payment_token": {"symbol": "ETH", "decimals": 18, "usd_price": "1"},
        });
        let ev = SaleEvent::from_record(raw.clone()).unwrap();
        assert_eq!(ev.dedup_key(), "7:5");

        raw["transaction"] = json!({"transaction_hash": "0xabc"});
        let ev = SaleEvent::from_record(raw).unwrap();
        assert_eq!(ev.dedup_key(), "0xabc");
    }

    #[test]
    fn sale_event_requires_addresses() {
        let raw = json!({
            "asset": {"name": "Kong #1", "token_id": "1"},
            "winner_account": {"user": null},
            "seller": {"address": "0xs"},
            "total_price": "1",
            "payment_token": {"symbol": "ETH", "decimals": 18, "usd_price": "1"},
        });
        assert!(SaleEvent::from_record(raw).is_err());
    }
}
