//! Client side of the transport boundary: where the viewer gets its groups.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::service::AuditService;
use crate::structures::{Envelope, Group};

#[derive(Debug, Error)]
pub enum FetchError {
    /// Could not reach the server or decode its reply
    #[error("Failed to connect to server: {0}")]
    Transport(String),
    /// Server answered with `success: false`
    #[error("{0}")]
    Rejected(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// Source of the grouped sequence for the browsing state machine.
#[async_trait]
pub trait GroupFeed: Send + Sync {
    async fn fetch_groups(&self) -> Result<Vec<Group>, FetchError>;
}

/// Calls `GET {base_url}/api/product-audit` and unwraps the envelope.
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpFeed {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_FETCH_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/product-audit", self.base_url)
    }
}

#[async_trait]
impl GroupFeed for HttpFeed {
    async fn fetch_groups(&self) -> Result<Vec<Group>, FetchError> {
        let endpoint = self.endpoint();
        debug!("GET {}", endpoint);

        let response = self.client.get(&endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        // Failure envelopes come with a 5xx status, so decode regardless of status.
        let envelope: Envelope<Vec<Group>> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        unwrap_envelope(envelope)
    }
}

pub fn unwrap_envelope(envelope: Envelope<Vec<Group>>) -> Result<Vec<Group>, FetchError> {
    if envelope.success {
        Ok(envelope.data.unwrap_or_default())
    } else {
        Err(FetchError::Rejected(
            envelope
                .error
                .unwrap_or_else(|| "Failed to fetch data".to_string()),
        ))
    }
}

/// In-process feed straight off the query service, skipping HTTP.
#[async_trait]
impl GroupFeed for AuditService {
    async fn fetch_groups(&self) -> Result<Vec<Group>, FetchError> {
        self.get_grouped_data()
            .await
            .map_err(|e| FetchError::Rejected(e.to_string()))
    }
}
