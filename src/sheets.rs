//! Data access facade over the spreadsheet values API.
//!
//! Fetches a whole sheet (or an A1 sub-range) and hands back normalized rows.
//! Every upstream problem collapses into [`SourceError::Unavailable`] with the
//! upstream message; nothing here retries.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::{SheetsConfig, SheetsCredentials};
use crate::normalization::{cell_to_string, normalize_rows};
use crate::structures::Row;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("{0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Anything that can produce the rows of a named sheet.
#[async_trait]
pub trait RowSource: Send + Sync + 'static {
    async fn fetch_rows(&self, sheet: &str, range: Option<&str>) -> Result<Vec<Row>, SourceError>;
}

/// `Sheet1` or `Sheet1!A1:D20`.
pub fn a1_range(sheet: &str, range: Option<&str>) -> String {
    match range.map(str::trim).filter(|r| !r.is_empty()) {
        Some(range) => format!("{}!{}", sheet, range),
        None => sheet.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Client for `GET {api_base}/{spreadsheet_id}/values/{range}`.
///
/// Owns its HTTP client and configuration; there is no process-wide handle.
pub struct GoogleSheetsSource {
    client: reqwest::Client,
    config: SheetsConfig,
}

impl GoogleSheetsSource {
    pub fn new(config: SheetsConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("product-audit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn values_url(&self, range: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| SourceError::unavailable(format!("Invalid sheets API base: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| SourceError::unavailable("Sheets API base cannot carry a path"))?
            .pop_if_empty()
            .push(&self.config.spreadsheet_id)
            .push("values")
            .push(range);

        if let SheetsCredentials::ApiKey(key) = &self.config.credentials {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }

    async fn fetch_values(&self, range: &str) -> Result<Vec<Vec<String>>, SourceError> {
        let url = self.values_url(range)?;

        let mut request = self.client.get(url);
        if let SheetsCredentials::AccessToken(token) = &self.config.credentials {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::unavailable(format!(
                    "Sheets request timed out after {}s",
                    self.config.timeout_secs
                ))
            } else {
                SourceError::unavailable(format!("Sheets request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::unavailable(format!("Failed to read sheets response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            return Err(SourceError::unavailable(format!(
                "Sheets API returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        let value_range: ValueRange = serde_json::from_str(&body)
            .map_err(|e| SourceError::unavailable(format!("Malformed sheets response: {}", e)))?;

        Ok(value_range
            .values
            .iter()
            .map(|line| line.iter().map(cell_to_string).collect())
            .collect())
    }
}

#[async_trait]
impl RowSource for GoogleSheetsSource {
    async fn fetch_rows(&self, sheet: &str, range: Option<&str>) -> Result<Vec<Row>, SourceError> {
        let range = a1_range(sheet, range);
        debug!("Fetching sheet range '{}'", range);

        match self.fetch_values(&range).await {
            Ok(values) => {
                let rows = normalize_rows(values);
                debug!("Fetched {} rows from '{}'", rows.len(), range);
                Ok(rows)
            }
            Err(e) => {
                error!("Error reading sheet '{}': {}", range, e);
                Err(e)
            }
        }
    }
}

/// Fixed in-process grid, used for local runs and tests.
///
/// The sub-range argument is ignored; every call returns the full grid.
pub struct MemorySource {
    values: Result<Vec<Vec<String>>, String>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(values: Vec<Vec<String>>) -> Self {
        Self {
            values: Ok(values),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            values: Err(message.to_string()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RowSource for MemorySource {
    async fn fetch_rows(&self, _sheet: &str, _range: Option<&str>) -> Result<Vec<Row>, SourceError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        match &self.values {
            Ok(values) => Ok(normalize_rows(values.clone())),
            Err(message) => Err(SourceError::unavailable(message.clone())),
        }
    }
}
