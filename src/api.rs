use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::types::AssetTrait;

/// Fixed query parameters of the events request.
const EVENT_TYPE: &str = "successful";
const ONLY_OPENSEA: &str = "false";

/// Thin client over the two OpenSea v1 endpoints the announcer reads.
pub struct OpenSeaClient {
    http: reqwest::Client,
    base: String,
    contract: String,
}

#[derive(Deserialize)]
struct EventsResponse {
    asset_events: Vec<Value>,
}

#[derive(Deserialize)]
struct AssetResponse {
    traits: Vec<AssetTrait>,
}

impl OpenSeaClient {
    /// Build a client that sends `X-API-KEY` and a browser user agent on every request.
    pub fn new(base: &str, contract: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).context("OPENSEA_API_KEY is not a valid header value")?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(crate::USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build OpenSea HTTP client")?;

        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            contract: contract.to_string(),
        })
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Raw `asset_events` records of successful sales after `occurred_after`, in API order.
    pub async fn fetch_sale_records(&self, occurred_after: &str, limit: u32) -> Result<Vec<Value>> {
        let url = format!("{}/api/v1/events", self.base);
        let limit = limit.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("asset_contract_address", self.contract.as_str()),
                ("event_type", EVENT_TYPE),
                ("only_opensea", ONLY_OPENSEA),
                ("occurred_after", occurred_after),
                ("offset", "0"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .context("events request failed")?
            .error_for_status()
            .context("events request returned an error status")?;

        let body: EventsResponse = resp
            .json()
            .await
            .context("events response has no asset_events list")?;
        debug!(
            "Fetched {} sale event(s) after {occurred_after}",
            body.asset_events.len()
        );
        Ok(body.asset_events)
    }

    /// Trait list of one asset of the collection.
    pub async fn fetch_traits(&self, token_id: &str) -> Result<Vec<AssetTrait>> {
        let url = format!("{}/api/v1/asset/{}/{}", self.base, self.contract, token_id);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("asset request for token {token_id} failed"))?
            .error_for_status()
            .with_context(|| format!("asset request for token {token_id} returned an error status"))?;

        let body: AssetResponse = resp
            .json()
            .await
            .with_context(|| format!("asset response for token {token_id} has no traits list"))?;
        debug!("Fetched {} trait(s) for token {token_id}", body.traits.len());
        Ok(body.traits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const CONTRACT: &str = "0xef0182dc0574cd5874494a120750fd222fdb909a";

    fn client(server: &MockServer) -> OpenSeaClient {
        OpenSeaClient::new(&server.base_url(), CONTRACT, "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn events_request_carries_filters_and_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/events")
                    .header("x-api-key", "test-key")
                    .header_exists("user-agent")
                    .query_param("asset_contract_address", CONTRACT)
                    .query_param("event_type", "successful")
                    .query_param("only_opensea", "false")
                    .query_param("occurred_after", "2024-01-01T12:00:00.000000")
                    .query_param("offset", "0")
                    .query_param("limit", "50");
                then.status(200)
                    .json_body(json!({"asset_events": [{"id": 1}, {"id": 2}]}));
            })
            .await;

        let records = client(&server)
            .fetch_sale_records("2024-01-01T12:00:00.000000", 50)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], 1);
    }

    #[tokio::test]
    async fn missing_asset_events_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/events");
                then.status(200).json_body(json!({"next": null}));
            })
            .await;
        let err = client(&server).fetch_sale_records("x", 50).await.unwrap_err();
        assert!(format!("{err:#}").contains("asset_events"));
    }

    #[tokio::test]
    async fn error_status_propagates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/events");
                then.status(500);
            })
            .await;
        assert!(client(&server).fetch_sale_records("x", 50).await.is_err());
    }

    #[tokio::test]
    async fn traits_are_read_from_asset_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("/api/v1/asset/{CONTRACT}/3044"))
                    .header("x-api-key", "test-key");
                then.status(200).json_body(json!({
                    "token_id": "3044",
                    "traits": [
                        {"trait_type": "Vision", "value": 70},
                        {"trait_type": "Fur", "value": "Gold"},
                    ],
                }));
            })
            .await;
        let traits = client(&server).fetch_traits("3044").await.unwrap();
        mock.assert_async().await;
        assert_eq!(traits.len(), 2);
        assert_eq!(traits[0].trait_type, "Vision");
    }

    #[tokio::test]
    async fn missing_traits_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/v1/asset/{CONTRACT}/1"));
                then.status(200).json_body(json!({"token_id": "1"}));
            })
            .await;
        let err = client(&server).fetch_traits("1").await.unwrap_err();
        assert!(format!("{err:#}").contains("no traits list"));
    }
}
