use serde::{Deserialize, Serialize};

/// Limits for fetching grounding URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFetchConfig {
    #[serde(default = "d_20")]
    pub timeout_secs: u64,
    #[serde(default = "d_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "d_250000")]
    pub max_text_chars: usize,
    #[serde(default = "d_user_agent")]
    pub user_agent: String,
}

impl Default for UrlFetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_bytes: d_max_bytes(),
            max_text_chars: 250_000,
            user_agent: d_user_agent(),
        }
    }
}

fn d_20() -> u64 {
    20
}
fn d_max_bytes() -> usize {
    5 * 1024 * 1024
}
fn d_250000() -> usize {
    250_000
}
fn d_user_agent() -> String {
    "Mozilla/5.0 (compatible; ytmind/0.1)".into()
}
