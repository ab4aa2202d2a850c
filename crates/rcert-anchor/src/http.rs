//! # HTTP Anchor Adapter
//!
//! Talks to an external anchoring service over HTTPS:
//!
//! | Call     | Request                                   | Response |
//! |----------|-------------------------------------------|----------|
//! | `anchor` | `POST {base}/anchors` `{"fingerprint": h}` | `AnchorRecord` JSON |
//! | `lookup` | `GET {base}/anchors/{h}`                  | `AnchorRecord` JSON, or 404 |
//!
//! The service signs and submits ledger transactions itself; this adapter
//! holds no keys. The reqwest client carries its own timeout as a backstop
//! to the guard's.

use std::time::Duration;

use async_trait::async_trait;
use rcert_core::ContentDigest;

use crate::adapter::{AnchorAdapter, AnchorRecord};
use crate::error::AnchorError;

/// Configuration for [`HttpAnchorAdapter`].
#[derive(Debug, Clone)]
pub struct HttpAnchorConfig {
    /// Service base URL, without trailing slash.
    pub base_url: String,
    /// Network name reported in records and logs.
    pub network_name: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// reqwest-backed [`AnchorAdapter`].
#[derive(Debug)]
pub struct HttpAnchorAdapter {
    client: reqwest::Client,
    config: HttpAnchorConfig,
}

impl HttpAnchorAdapter {
    /// Build the client.
    pub fn new(mut config: HttpAnchorConfig) -> Result<Self, AnchorError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(AnchorError::Rejected(format!(
                "anchor URL must be http(s): {}",
                config.base_url
            )));
        }
        while config.base_url.ends_with('/') {
            config.base_url.pop();
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnchorError::Unavailable {
                network: config.network_name.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    fn transport_error(&self, e: reqwest::Error) -> AnchorError {
        if e.is_timeout() {
            AnchorError::Timeout {
                network: self.config.network_name.clone(),
                after_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            AnchorError::Unavailable {
                network: self.config.network_name.clone(),
                reason: e.to_string(),
            }
        }
    }

    async fn read_record(&self, resp: reqwest::Response) -> Result<AnchorRecord, AnchorError> {
        let status = resp.status();
        if status.is_server_error() {
            return Err(AnchorError::Unavailable {
                network: self.config.network_name.clone(),
                reason: format!("HTTP {status}"),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnchorError::Rejected(format!("HTTP {status}: {body}")));
        }
        resp.json::<AnchorRecord>()
            .await
            .map_err(|e| AnchorError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AnchorAdapter for HttpAnchorAdapter {
    async fn anchor(&self, fingerprint: &ContentDigest) -> Result<AnchorRecord, AnchorError> {
        let url = format!("{}/anchors", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "fingerprint": fingerprint.to_hex() }))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_record(resp).await
    }

    async fn lookup(&self, fingerprint: &ContentDigest) -> Result<Option<AnchorRecord>, AnchorError> {
        let url = format!("{}/anchors/{}", self.config.base_url, fingerprint.to_hex());
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.read_record(resp).await.map(Some)
    }

    fn network_name(&self) -> &str {
        &self.config.network_name
    }
}
