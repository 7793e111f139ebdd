pub mod announcer;
pub mod api;
pub mod boosts;
pub mod config;
pub mod counterparty;
pub mod discord;
pub mod oauth;
pub mod price;
pub mod reporter;
pub mod state;
pub mod twitter;
pub mod types;
pub mod window;

/// Rumble Kong League collection contract.
pub const RKL_CONTRACT_ADDRESS: &str = "0xef0182dc0574cd5874494a120750fd222fdb909a";

/// OpenSea REST API base URL (requires `X-API-KEY`)
pub const OPENSEA_API_BASE: &str = "https://api.opensea.io";

/// OpenSea web base, used for asset and profile links
pub const OPENSEA_WEB_BASE: &str = "https://opensea.io";

/// Twitter API base URL (OAuth 1.0a user context)
pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

/// Browser user agent sent to OpenSea; bare client agents get blocked.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.99 Safari/537.36";
