//! Sequential (contiguous) grouping of sheet rows into nested query groups.
//!
//! Rows are folded strictly in order. A group stays open while consecutive rows
//! share its `(query, city)` key and is sealed the moment the key changes. A key
//! that comes back after a break opens a new, independent group: this is a run
//! grouping, not a group-by, and the two must not be merged.

use tracing::debug;

use crate::attributes::parse_predicted_attributes;
use crate::config::ColumnMap;
use crate::structures::{
    Group, GroupKey, GroupMetadata, ProductAgentResponse, ProductResult, QueryAgentResponse, Row,
};

/// Incremental run grouper. Feed rows with [`push`](Self::push), then call
/// [`finish`](Self::finish) to seal the last run.
pub struct SequentialGrouper<'a> {
    columns: &'a ColumnMap,
    sealed: Vec<Group>,
    open: Option<(GroupKey, Group)>,
}

impl<'a> SequentialGrouper<'a> {
    pub fn new(columns: &'a ColumnMap) -> Self {
        Self {
            columns,
            sealed: Vec::new(),
            open: None,
        }
    }

    pub fn push(&mut self, row: &Row) {
        let key = self.key_of(row);

        let continues = matches!(&self.open, Some((open_key, _)) if *open_key == key);
        if !continues {
            self.seal_open();
            let group = self.open_group(row);
            self.open = Some((key, group));
        }

        if let Some((_, group)) = self.open.as_mut() {
            group
                .product_agent_response
                .results
                .push(build_result(row, self.columns));
        }
    }

    pub fn finish(mut self) -> Vec<Group> {
        self.seal_open();
        self.sealed
    }

    fn key_of(&self, row: &Row) -> GroupKey {
        GroupKey::new(row.get(&self.columns.query), row.get(&self.columns.city))
    }

    fn seal_open(&mut self) {
        if let Some((key, mut group)) = self.open.take() {
            group.product_agent_response.total_results = group.product_agent_response.results.len();
            debug!(
                "sealed group #{} key={} results={}",
                self.sealed.len(),
                key,
                group.product_agent_response.total_results
            );
            self.sealed.push(group);
        }
    }

    /// Query-level fields come from the row that opens the group and are
    /// never touched by later rows of the same run.
    fn open_group(&self, row: &Row) -> Group {
        let c = self.columns;
        let predicted = row.get(&c.predicted_attributes);

        Group {
            query: row.get(&c.query).to_string(),
            city: row.get(&c.city).to_string(),
            query_agent_response: QueryAgentResponse {
                agent_name: row.get(&c.query_agent_name).to_string(),
                user_requirement: row.get(&c.user_requirement).to_string(),
                query_type: row.get(&c.query_type).to_string(),
                core_product: row.get(&c.core_product).to_string(),
                predicted_attributes: parse_predicted_attributes(Some(predicted)),
            },
            product_agent_response: ProductAgentResponse {
                agent_name: row.get(&c.product_agent_name).to_string(),
                total_results: 0,
                results: Vec::new(),
            },
            metadata: GroupMetadata {
                date: row.get(&c.date).to_string(),
                workflow: row.get(&c.workflow).to_string(),
            },
        }
    }
}

/// Product-level entry for one row.
pub fn build_result(row: &Row, c: &ColumnMap) -> ProductResult {
    ProductResult {
        result_number: row.get(&c.result_number).to_string(),
        display_id: row.get(&c.display_id).to_string(),
        title: row.get(&c.title).to_string(),
        specifications: row.get(&c.specifications).to_string(),
        image: row.get(&c.image).to_string(),
        search_page_url: row.get(&c.search_page_url).to_string(),
        relevance: row.get(&c.relevance).to_string(),
        critical_relevance: row.get(&c.critical_relevance).to_string(),
        relevance_reasoning: row.first_present(&c.relevance_reasoning).to_string(),
        critical_relevance_reasoning: row.first_present(&c.critical_relevance_reasoning).to_string(),
        super_audit_relevance: row.first_present(&c.super_audit_relevance).to_string(),
    }
}

/// Groups `rows` into contiguous runs. Pure and deterministic; empty in, empty out.
pub fn group_rows(rows: &[Row], columns: &ColumnMap) -> Vec<Group> {
    let mut grouper = SequentialGrouper::new(columns);
    for row in rows {
        grouper.push(row);
    }
    grouper.finish()
}
