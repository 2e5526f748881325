//! Ordering and "load more" windowing over voting ids

use serde::{Deserialize, Serialize};

use crate::state::{SortOrder, StatusFilter, VotingSummary};

pub const DEFAULT_VISIBLE: usize = 8;
pub const LOAD_STEP: usize = 8;

/// The list of voting ids `0..total` as shown to a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingCatalog {
    total: u64,
    order: SortOrder,
    visible: usize,
}

impl VotingCatalog {
    pub fn new(total: u64, order: SortOrder) -> Self {
        Self {
            total,
            order,
            visible: DEFAULT_VISIBLE,
        }
    }

    /// Start with `visible` ids shown instead of the default.
    pub fn with_visible(mut self, visible: usize) -> Self {
        self.visible = visible.max(1);
        self
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    /// Changing the order collapses the list back to its initial size.
    pub fn set_order(&mut self, order: SortOrder) {
        if self.order != order {
            self.order = order;
            self.visible = DEFAULT_VISIBLE;
        }
    }

    pub fn visible_count(&self) -> usize {
        let total = usize::try_from(self.total).unwrap_or(usize::MAX);
        self.visible.min(total)
    }

    pub fn has_more(&self) -> bool {
        (self.visible_count() as u64) < self.total
    }

    pub fn load_more(&mut self) {
        if self.has_more() {
            self.visible = self.visible.saturating_add(LOAD_STEP);
        }
    }

    pub fn ordered_ids(&self) -> Box<dyn Iterator<Item = u64>> {
        match self.order {
            SortOrder::Newest => Box::new((0..self.total).rev()),
            SortOrder::Oldest => Box::new(0..self.total),
        }
    }

    pub fn visible_ids(&self) -> Vec<u64> {
        self.ordered_ids().take(self.visible_count()).collect()
    }
}

/// Per-card predicates applied after summaries are loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl CardFilter {
    pub fn matches(&self, summary: &VotingSummary, now: u64) -> bool {
        let title_ok = match self.search.as_deref().map(|q| q.trim().to_lowercase()) {
            Some(q) if !q.is_empty() => summary.title.to_lowercase().contains(&q),
            _ => true,
        };
        title_ok && self.status.matches(summary, now)
    }
}
