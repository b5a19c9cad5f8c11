//! Browsing state machine for the paginated group viewer.
//!
//! `Loading -> Ready | Failed`. Inside `Ready` the viewer tracks the filter
//! text, the filtered subsequence (as indices into the full sequence), the
//! current position and which modal, if any, is open. Out-of-range navigation
//! is a silent no-op, never an error.

use tracing::{debug, warn};

use crate::client::GroupFeed;
use crate::config::ATTRIBUTE_PREVIEW_LEN;
use crate::structures::{Group, ProductResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    RequirementDetail,
    SpecDetail(ProductResult),
}

/// Indices of the groups matching `filter`, in order.
///
/// Blank (whitespace-only) text matches everything. Otherwise a group matches
/// when its query, core product or user requirement contains the text,
/// ignoring case.
pub fn filter_groups(groups: &[Group], filter: &str) -> Vec<usize> {
    if filter.trim().is_empty() {
        return (0..groups.len()).collect();
    }

    let needle = filter.to_lowercase();
    let matches = |field: &str| field.to_lowercase().contains(&needle);

    groups
        .iter()
        .enumerate()
        .filter(|(_, g)| {
            matches(&g.query)
                || matches(&g.query_agent_response.core_product)
                || matches(&g.query_agent_response.user_requirement)
        })
        .map(|(i, _)| i)
        .collect()
}

/// The `Ready` sub-state.
#[derive(Debug, Clone)]
pub struct Browser {
    groups: Vec<Group>,
    filter: String,
    filtered: Vec<usize>,
    current: usize,
    modal: Modal,
}

impl Browser {
    pub fn new(groups: Vec<Group>) -> Self {
        let filtered = (0..groups.len()).collect();
        Self {
            groups,
            filter: String::new(),
            filtered,
            current: 0,
            modal: Modal::None,
        }
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
        self.filtered = filter_groups(&self.groups, text);
        self.current = 0;
        self.modal = Modal::None;
        debug!("filter '{}' matched {} groups", text, self.filtered.len());
    }

    pub fn clear_filter(&mut self) {
        self.set_filter("");
    }

    pub fn next(&mut self) {
        if self.current + 1 < self.filtered.len() {
            self.current += 1;
        }
        self.modal = Modal::None;
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
        self.modal = Modal::None;
    }

    /// 1-based jump. Anything outside `1..=len` leaves the state untouched.
    pub fn jump_to(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.filtered.len() {
            self.current = page - 1;
            self.modal = Modal::None;
            true
        } else {
            false
        }
    }

    /// Jump from raw text input; non-numeric input is ignored.
    pub fn jump_to_input(&mut self, input: &str) -> bool {
        match input.trim().parse::<usize>() {
            Ok(page) => self.jump_to(page),
            Err(_) => false,
        }
    }

    pub fn open_spec_modal(&mut self, result: ProductResult) {
        self.modal = Modal::SpecDetail(result);
    }

    /// Opens the spec modal for the `index`-th result of the current group.
    pub fn open_spec_at(&mut self, index: usize) -> bool {
        let result = self
            .current_group()
            .and_then(|g| g.results().get(index))
            .cloned();

        match result {
            Some(result) => {
                self.open_spec_modal(result);
                true
            }
            None => false,
        }
    }

    pub fn open_requirement_modal(&mut self) {
        self.modal = Modal::RequirementDetail;
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    pub fn current_group(&self) -> Option<&Group> {
        self.filtered
            .get(self.current)
            .and_then(|&i| self.groups.get(i))
    }

    /// Zero-based position, or `None` in the empty state.
    pub fn current_index(&self) -> Option<usize> {
        (!self.filtered.is_empty()).then_some(self.current)
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Group> {
        self.filtered.iter().map(|&i| &self.groups[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn can_previous(&self) -> bool {
        !self.filtered.is_empty() && self.current > 0
    }

    pub fn can_next(&self) -> bool {
        !self.filtered.is_empty() && self.current + 1 < self.filtered.len()
    }

    /// `"3 / 10"`, or `"0 / 0"` when nothing matches.
    pub fn position_label(&self) -> String {
        if self.filtered.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.filtered.len())
        }
    }

    /// First few predicted attributes of the current group, in source order.
    pub fn attribute_preview(&self) -> Vec<(&str, &str)> {
        self.current_group()
            .map(|g| {
                g.query_agent_response
                    .predicted_attributes
                    .iter()
                    .take(ATTRIBUTE_PREVIEW_LEN)
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum ViewerState {
    Loading,
    Ready(Browser),
    Failed(String),
}

/// Owner of the viewer state. Every transition takes `&mut self`, so no two
/// transitions can interleave; transitions that do not apply to the current
/// state are ignored.
#[derive(Debug, Clone)]
pub struct Viewer {
    state: ViewerState,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            state: ViewerState::Loading,
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewerState::Loading)
    }

    pub fn browser(&self) -> Option<&Browser> {
        match &self.state {
            ViewerState::Ready(b) => Some(b),
            _ => None,
        }
    }

    pub fn browser_mut(&mut self) -> Option<&mut Browser> {
        match &mut self.state {
            ViewerState::Ready(b) => Some(b),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewerState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Runs the one-shot load. Only acts while `Loading`; returns whether a
    /// fetch was made. There is no retry path out of `Failed`.
    pub async fn load<F: GroupFeed + ?Sized>(&mut self, feed: &F) -> bool {
        if !self.is_loading() {
            return false;
        }

        let outcome = feed.fetch_groups().await.map_err(|e| e.to_string());
        self.complete_load(outcome);
        true
    }

    /// Applies a finished fetch. Ignored unless `Loading`.
    pub fn complete_load(&mut self, outcome: Result<Vec<Group>, String>) {
        if !self.is_loading() {
            return;
        }

        self.state = match outcome {
            Ok(groups) => {
                debug!("viewer ready with {} groups", groups.len());
                ViewerState::Ready(Browser::new(groups))
            }
            Err(reason) => {
                warn!("viewer load failed: {}", reason);
                ViewerState::Failed(reason)
            }
        };
    }

    pub fn set_filter(&mut self, text: &str) {
        if let Some(b) = self.browser_mut() {
            b.set_filter(text);
        }
    }

    pub fn next(&mut self) {
        if let Some(b) = self.browser_mut() {
            b.next();
        }
    }

    pub fn previous(&mut self) {
        if let Some(b) = self.browser_mut() {
            b.previous();
        }
    }

    pub fn jump_to(&mut self, page: usize) -> bool {
        self.browser_mut().map(|b| b.jump_to(page)).unwrap_or(false)
    }

    pub fn open_spec_modal(&mut self, result: ProductResult) {
        if let Some(b) = self.browser_mut() {
            b.open_spec_modal(result);
        }
    }

    pub fn open_requirement_modal(&mut self) {
        if let Some(b) = self.browser_mut() {
            b.open_requirement_modal();
        }
    }

    pub fn close_modal(&mut self) {
        if let Some(b) = self.browser_mut() {
            b.close_modal();
        }
    }
}

/// Badge tier of a relevance label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceTier {
    Highly,
    Relevant,
    NotRelevant,
    Unknown,
}

impl RelevanceTier {
    /// Case-insensitive substring match. Negative labels are checked before
    /// the bare "relevant" match, since both of them contain it.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("highly relevant") {
            Self::Highly
        } else if lower.contains("not relevant") || lower.contains("irrelevant") {
            Self::NotRelevant
        } else if lower.contains("relevant") {
            Self::Relevant
        } else {
            Self::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Highly => "highly relevant",
            Self::Relevant => "relevant",
            Self::NotRelevant => "not relevant",
            Self::Unknown => "unrated",
        }
    }
}
