use chrono::{DateTime, Utc};
use ym_domain::grounding::Groundable;
use ym_domain::message::{latest_user_query, Message};

/// Query tokens of this many characters or fewer are ignored.
const MIN_TOKEN_CHARS: usize = 3;
const TITLE_WEIGHT: f64 = 3.0;
const CONTENT_WEIGHT: f64 = 1.0;
const MAX_RECENCY_BONUS: f64 = 5.0;
/// Recency bonus lost per day of age (the bonus hits 0 at 35 days).
const RECENCY_DECAY_PER_DAY: f64 = 1.0 / 7.0;

/// A grounding item annotated with its relevance to the current query.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub relevance_score: f64,
}

/// Scores one grounding item against the tokenized query.
///
/// [`LexicalScorer`] is the default and the reference behavior; other
/// scorers (e.g. embedding similarity) can be plugged into the assembler.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, item: &dyn Groundable, query_tokens: &[String], now: DateTime<Utc>) -> f64;
}

/// Weighted substring matching plus a linear recency bonus:
/// `title_matches * 3 + content_matches + max(0, 5 - age_days / 7)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl RelevanceScorer for LexicalScorer {
    fn score(&self, item: &dyn Groundable, query_tokens: &[String], now: DateTime<Utc>) -> f64 {
        let title = item.title().to_lowercase();
        let content = item.body().to_lowercase();

        let title_matches = query_tokens.iter().filter(|t| title.contains(t.as_str())).count();
        let content_matches = query_tokens.iter().filter(|t| content.contains(t.as_str())).count();

        title_matches as f64 * TITLE_WEIGHT
            + content_matches as f64 * CONTENT_WEIGHT
            + recency_bonus(item.created_at(), now)
    }
}

/// `max(0, 5 - age_days / 7)`. Items stamped in the future count as brand new.
pub fn recency_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_ms = (now - created_at).num_milliseconds().max(0) as f64;
    let age_days = age_ms / 86_400_000.0;
    (MAX_RECENCY_BONUS - age_days * RECENCY_DECAY_PER_DAY).max(0.0)
}

/// Lower-cased whitespace tokens longer than three characters, with
/// surrounding punctuation (`pricing?`, `"plan",`) stripped.
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Rank `items` against the most recent user message.
///
/// Sorted by descending score; ties keep their input order. Without any
/// user message the items come back in input order with a score of 0.
pub fn rank<T: Groundable>(
    items: Vec<T>,
    messages: &[Message],
    scorer: &dyn RelevanceScorer,
    now: DateTime<Utc>,
) -> Vec<Ranked<T>> {
    let Some(query) = latest_user_query(messages) else {
        return items
            .into_iter()
            .map(|item| Ranked {
                item,
                relevance_score: 0.0,
            })
            .collect();
    };

    let tokens = query_tokens(query);
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let relevance_score = scorer.score(&item, &tokens, now);
            Ranked {
                item,
                relevance_score,
            }
        })
        .collect();

    // Vec::sort_by is stable, so equal scores keep retrieval order.
    ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    ranked
}
