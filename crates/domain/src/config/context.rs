use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Grounding context budgets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Character budgets for the two context-assembly call sites.
///
/// The chat route and the standalone agent-context builder deliberately
/// keep separate budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Budget used when grounding a chat request.
    #[serde(default = "d_100000")]
    pub chat_max_chars: usize,
    /// Budget used by the standalone agent-context builder.
    #[serde(default = "d_25000")]
    pub agent_context_max_chars: usize,
    /// Characters held back when the first item alone overflows the budget.
    #[serde(default = "d_200")]
    pub truncation_reserve_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            chat_max_chars: 100_000,
            agent_context_max_chars: 25_000,
            truncation_reserve_chars: 200,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_100000() -> usize {
    100_000
}
fn d_25000() -> usize {
    25_000
}
fn d_200() -> usize {
    200
}
