use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Rich card posted to the sales channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            thumbnail: None,
            fields: Vec::new(),
        }
    }

    pub fn thumbnail(mut self, url: Option<&str>) -> Self {
        self.thumbnail = url.map(|u| EmbedThumbnail { url: u.to_string() });
        self
    }

    pub fn field(mut self, name: &str, value: impl ToString, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.to_string(),
            value: value.to_string(),
            inline,
        });
        self
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    embeds: &'a [Embed],
}

/// Posts embeds to a single Discord channel webhook.
pub struct DiscordWebhook {
    http: reqwest::Client,
    url: Url,
}

impl DiscordWebhook {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).context("CHANNEL_URL is not a valid URL")?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self { http, url })
    }

    /// Send one embed. Any non-2xx response is an error.
    pub async fn send(&self, embed: &Embed) -> Result<()> {
        self.http
            .post(self.url.clone())
            .json(&WebhookPayload {
                embeds: std::slice::from_ref(embed),
            })
            .send()
            .await
            .context("webhook request failed")?
            .error_for_status()
            .context("webhook returned an error status")?;
        debug!("Webhook accepted embed {:?}", embed.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn sample() -> Embed {
        Embed::new("Kong #1 Sold", "Price: 1 ETH, ($1.00)", "https://opensea.io/assets/0x/1")
            .thumbnail(Some("https://img/1.png"))
            .field("Boost Total", 10, false)
            .field("Buyer", "[Anon](https://opensea.io/0xb)", true)
    }

    #[test]
    fn embed_serializes_in_field_order() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["thumbnail"]["url"], "https://img/1.png");
        assert_eq!(v["fields"][0], json!({"name": "Boost Total", "value": "10", "inline": false}));
        assert_eq!(v["fields"][1]["name"], "Buyer");
    }

    #[test]
    fn embed_without_thumbnail_omits_key() {
        let v = serde_json::to_value(Embed::new("t", "d", "u").thumbnail(None)).unwrap();
        assert!(v.get("thumbnail").is_none());
    }

    #[tokio::test]
    async fn send_posts_embeds_array() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/webhooks/1/abc")
                    .header("content-type", "application/json")
                    .body_contains(r#""embeds":[{"title":"Kong #1 Sold""#);
                then.status(204);
            })
            .await;
        let webhook =
            DiscordWebhook::new(&server.url("/api/webhooks/1/abc"), Duration::from_secs(5)).unwrap();
        webhook.send(&sample()).await.unwrap();
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn send_fails_on_rejection() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(400);
            })
            .await;
        let webhook = DiscordWebhook::new(&server.url("/hook"), Duration::from_secs(5)).unwrap();
        assert!(webhook.send(&sample()).await.is_err());
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(DiscordWebhook::new("not a url", Duration::from_secs(1)).is_err());
    }
}
