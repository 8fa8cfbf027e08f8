use serde::{Deserialize, Serialize};

/// Per-item report within a context build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub id: String,
    pub title: String,
    pub relevance_score: f64,
    pub raw_chars: usize,
    /// Characters of the rendered fragment actually packed (0 if skipped).
    pub injected_chars: usize,
    pub included: bool,
    pub truncated: bool,
}

/// Full report of a context build. Returned by `GET /api/agents/:id/context`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextReport {
    pub budget_chars: usize,
    /// Characters counted against the budget: preamble, packed fragments
    /// and closing instruction. Never exceeds `budget_chars`.
    pub total_chars: usize,
    /// Length of the returned context string. Equals `total_chars` plus the
    /// `...(truncated)` marker when an item was cut, so it stays within
    /// `budget_chars` plus that marker.
    pub context_chars: usize,
    pub documents: Vec<ItemReport>,
    pub urls: Vec<ItemReport>,
    pub truncated: bool,
}

impl ContextReport {
    pub fn documents_included(&self) -> usize {
        self.documents.iter().filter(|d| d.included).count()
    }

    pub fn urls_included(&self) -> usize {
        self.urls.iter().filter(|u| u.included).count()
    }
}
