//! Service configuration: defaults, source column layout and its TOML override.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Placed between query and city when a group key is rendered as text. Not
// expected inside query/city values, but not guaranteed either; key equality
// is on the pair, never on this text.
pub const KEY_SEPARATOR: &str = "|||";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SHEET: &str = "Sheet1";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// Number of predicted attributes shown inline before the requirement modal
pub const ATTRIBUTE_PREVIEW_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read column map: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid column map: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing configuration: {0}")]
    Missing(String),
}

/// Source column names for every field of a group and its results.
///
/// Single-name fields hold the exact header text. Alias fields hold an ordered
/// list of candidate headers; the first one with a non-empty cell wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub query: String,
    pub city: String,

    pub query_agent_name: String,
    pub user_requirement: String,
    pub query_type: String,
    pub core_product: String,
    pub predicted_attributes: String,

    pub product_agent_name: String,
    pub result_number: String,
    pub display_id: String,
    pub title: String,
    pub specifications: String,
    pub image: String,
    pub search_page_url: String,
    pub relevance: String,
    pub critical_relevance: String,
    pub relevance_reasoning: Vec<String>,
    pub critical_relevance_reasoning: Vec<String>,
    pub super_audit_relevance: Vec<String>,

    pub date: String,
    pub workflow: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            query: "query".into(),
            city: "cityname".into(),

            query_agent_name: "agent1_name_V32".into(),
            user_requirement: "user_requirement_V32".into(),
            query_type: "query_type_V32".into(),
            core_product: "core_product_V32".into(),
            predicted_attributes: "predicted_attributes_V32".into(),

            product_agent_name: "agent2_name_V32".into(),
            result_number: "result_number".into(),
            display_id: "display_id".into(),
            title: "title".into(),
            specifications: "specifications".into(),
            image: "image".into(),
            search_page_url: "search_page_url".into(),
            relevance: "relevance_V32".into(),
            critical_relevance: "critical_relevance_V32".into(),
            relevance_reasoning: vec![
                "relevance reasoning_V32".into(),
                "relevance_reasoning_V32".into(),
            ],
            critical_relevance_reasoning: vec![
                "critical relevance reasoning_V32".into(),
                "critical_relevance_reasoning_V32".into(),
            ],
            super_audit_relevance: vec![
                "super_audit_relevance".into(),
                "superaudit_relevance".into(),
                "super audit relevance".into(),
            ],

            date: "date_V32".into(),
            workflow: "workflow_V32".into(),
        }
    }
}

impl ColumnMap {
    /// Parse a column map from TOML text. Keys left out keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Credential material for the spreadsheet API.
#[derive(Clone, Debug, PartialEq)]
pub enum SheetsCredentials {
    /// OAuth bearer token, sent as `Authorization: Bearer ...`
    AccessToken(String),
    /// API key, sent as the `key` query parameter (public sheets only)
    ApiKey(String),
    /// No credentials; only useful against local stand-ins
    Anonymous,
}

impl SheetsCredentials {
    /// Reads `GOOGLE_ACCESS_TOKEN`, then `GOOGLE_API_KEY`.
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = read("GOOGLE_ACCESS_TOKEN") {
            Self::AccessToken(token)
        } else if let Some(key) = read("GOOGLE_API_KEY") {
            Self::ApiKey(key)
        } else {
            Self::Anonymous
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::AccessToken(_) => "bearer token",
            Self::ApiKey(_) => "api key",
            Self::Anonymous => "none",
        }
    }
}

/// Everything the data access facade needs, built once at start-up.
#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub api_base: String,
    pub credentials: SheetsCredentials,
    pub timeout_secs: u64,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: &str, credentials: SheetsCredentials) -> Result<Self, ConfigError> {
        let spreadsheet_id = spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(ConfigError::Missing("spreadsheet id".to_string()));
        }

        Ok(Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            api_base: SHEETS_API_BASE.to_string(),
            credentials,
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
