use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Credentials;
use crate::oauth::OAuthCredentials;

/// Wait used when a 429 carries no usable reset header (one rate-limit window).
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(15 * 60);

/// Slack added to the reset time so the retry lands in the new window.
const RESET_SLACK: Duration = Duration::from_secs(1);

/// Posts statuses on behalf of one account using OAuth 1.0a user context.
pub struct TwitterClient {
    http: reqwest::Client,
    base: String,
    creds: OAuthCredentials,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Me {
    username: String,
}

#[derive(Deserialize)]
struct CreatedTweet {
    id: String,
}

impl TwitterClient {
    pub fn new(base: &str, creds: OAuthCredentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Twitter HTTP client")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            creds,
        })
    }

    /// Build from the environment credentials; fails naming the first missing variable.
    pub fn from_credentials(base: &str, creds: &Credentials, timeout: Duration) -> Result<Self> {
        let oauth = OAuthCredentials {
            consumer_key: creds.twitter_api_key()?.to_string(),
            consumer_secret: creds.twitter_api_secret()?.to_string(),
            token: creds.twitter_access_token()?.to_string(),
            token_secret: creds.twitter_access_token_secret()?.to_string(),
        };
        Self::new(base, oauth, timeout)
    }

    /// Check the credentials and return the authenticated account's handle.
    pub async fn verify_credentials(&self) -> Result<String> {
        let url = format!("{}/2/users/me", self.base);
        let auth = self.creds.authorization_header("GET", &url, &[])?;
        let me: DataEnvelope<Me> = self
            .http
            .get(&url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .context("credential check request failed")?
            .error_for_status()
            .context("Twitter rejected the credentials")?
            .json()
            .await
            .context("unexpected credential check response")?;
        Ok(me.data.username)
    }

    /// Post a status, waiting out rate limits. Returns the new tweet id.
    pub async fn post_status(&self, text: &str) -> Result<String> {
        let url = format!("{}/2/tweets", self.base);
        loop {
            let auth = self.creds.authorization_header("POST", &url, &[])?;
            let resp = self
                .http
                .post(&url)
                .header(AUTHORIZATION, auth)
                .json(&json!({ "text": text }))
                .send()
                .await
                .context("status update request failed")?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = rate_limit_wait(resp.headers(), chrono::Utc::now().timestamp());
                warn!("Twitter rate limit hit, waiting {}s before retrying", wait.as_secs());
                tokio::time::sleep(wait).await;
                continue;
            }

            let created: DataEnvelope<CreatedTweet> = resp
                .error_for_status()
                .context("status update returned an error status")?
                .json()
                .await
                .context("unexpected status update response")?;
            debug!("Posted tweet {}", created.data.id);
            return Ok(created.data.id);
        }
    }
}

/// Time to sleep after a 429, from the `x-rate-limit-reset` epoch header.
pub fn rate_limit_wait(headers: &HeaderMap, now_epoch: i64) -> Duration {
    let reset = headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());
    match reset {
        Some(reset) => {
            let secs = u64::try_from(reset - now_epoch).unwrap_or(0);
            Duration::from_secs(secs) + RESET_SLACK
        }
        None => DEFAULT_RATE_LIMIT_WAIT,
    }
}
