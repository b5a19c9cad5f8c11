use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::ColumnMap;
use crate::grouping::group_rows;
use crate::sheets::{RowSource, SourceError};
use crate::structures::{Group, Row};

/// Orchestrates fetch -> normalize -> group for the configured sheet.
///
/// Stateless apart from configuration: every call re-fetches the whole sheet
/// and regroups it. Concurrent callers each pay for their own fetch.
#[derive(Clone)]
pub struct AuditService {
    source: Arc<dyn RowSource>,
    sheet: String,
    columns: Arc<ColumnMap>,
}

impl AuditService {
    pub fn new(source: Arc<dyn RowSource>, sheet: &str, columns: ColumnMap) -> Self {
        Self {
            source,
            sheet: sheet.to_string(),
            columns: Arc::new(columns),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// All groups of the configured sheet, in run order.
    pub async fn get_grouped_data(&self) -> Result<Vec<Group>, SourceError> {
        let start = Instant::now();
        let rows = self.source.fetch_rows(&self.sheet, None).await?;
        let groups = group_rows(&rows, &self.columns);

        info!(
            "Grouped {} rows into {} groups in {:.2}ms",
            rows.len(),
            groups.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(groups)
    }

    /// Rows as fetched, without grouping. `sheet` defaults to the configured one.
    pub async fn get_raw_rows(
        &self,
        sheet: Option<&str>,
        range: Option<&str>,
    ) -> Result<Vec<Row>, SourceError> {
        let sheet = sheet.filter(|s| !s.trim().is_empty()).unwrap_or(&self.sheet);
        self.source.fetch_rows(sheet, range).await
    }
}
