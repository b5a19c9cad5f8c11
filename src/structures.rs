use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::KEY_SEPARATOR;

// =============================================================================
// Source rows
// =============================================================================

/// One physical line of the source sheet, keyed by trimmed header text.
///
/// Column order follows the header row. Lookups of unknown columns yield `""`,
/// so downstream code never has to re-check presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell. A repeated column keeps its first position and takes the later value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// First non-empty cell among `candidates`, in priority order.
    pub fn first_present<S: AsRef<str>>(&self, candidates: &[S]) -> &str {
        candidates
            .iter()
            .map(|c| self.get(c.as_ref()))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

// =============================================================================
// Grouped output
// =============================================================================

/// Run boundary key. Compared exactly: no trimming, no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub query: String,
    pub city: String,
}

impl GroupKey {
    pub fn new(query: &str, city: &str) -> Self {
        Self {
            query: query.to_string(),
            city: city.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.query, KEY_SEPARATOR, self.city)
    }
}

/// Predicted attribute name -> value, in source order.
pub type Attributes = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAgentResponse {
    pub agent_name: String,
    pub user_requirement: String,
    pub query_type: String,
    pub core_product: String,
    pub predicted_attributes: Attributes,
}

/// One product entry of a group, built from exactly one source row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResult {
    pub result_number: String,
    pub display_id: String,
    pub title: String,
    pub specifications: String,
    pub image: String,
    pub search_page_url: String,
    pub relevance: String,
    pub critical_relevance: String,
    pub relevance_reasoning: String,
    pub critical_relevance_reasoning: String,
    pub super_audit_relevance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductAgentResponse {
    pub agent_name: String,
    pub total_results: usize,
    pub results: Vec<ProductResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadata {
    pub date: String,
    pub workflow: String,
}

/// A contiguous run of rows sharing one `(query, city)` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub query: String,
    pub city: String,
    pub query_agent_response: QueryAgentResponse,
    pub product_agent_response: ProductAgentResponse,
    pub metadata: GroupMetadata,
}

impl Group {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.query, &self.city)
    }

    pub fn results(&self) -> &[ProductResult] {
        &self.product_agent_response.results
    }
}

// =============================================================================
// Transport envelope
// =============================================================================

/// Uniform `{ success, data?, error? }` body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
