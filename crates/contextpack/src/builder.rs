use std::sync::Arc;

use chrono::{DateTime, Utc};
use ym_domain::grounding::{Groundable, GroundingDocument, GroundingUrl};
use ym_domain::message::Message;

use crate::injection::{self, FragmentKind};
use crate::ranker::{self, LexicalScorer, Ranked, RelevanceScorer};
use crate::report::{ContextReport, ItemReport};
use crate::truncation;

/// Deterministic context assembler.
///
/// Pure function over pre-fetched grounding items: ranks documents and URLs
/// separately, packs documents first and then URLs into one budget, and
/// returns the assembled block plus a machine-readable report.
///
/// Budget rules:
/// - the preamble, every packed fragment and the closing instruction count
///   against `max_chars`;
/// - an item that does not fit stops its section;
/// - if nothing has been packed yet, that first item is cut down to the
///   remaining budget minus `reserve_chars` and marked `...(truncated)`;
///   the marker itself is the only text allowed past `max_chars`;
/// - the closing instruction is emitted only when something was packed.
pub struct ContextAssembler {
    pub max_chars: usize,
    pub reserve_chars: usize,
    scorer: Arc<dyn RelevanceScorer>,
}

impl ContextAssembler {
    pub fn new(max_chars: usize, reserve_chars: usize) -> Self {
        Self {
            max_chars,
            reserve_chars,
            scorer: Arc::new(LexicalScorer),
        }
    }

    /// Swap the relevance scorer (the lexical scorer is the default).
    pub fn with_scorer(mut self, scorer: Arc<dyn RelevanceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Build the context block for `agent_id`.
    ///
    /// Items owned by another agent are dropped before ranking. Returns an
    /// empty string when nothing could be packed.
    pub fn build(
        &self,
        agent_id: &str,
        documents: Vec<GroundingDocument>,
        urls: Vec<GroundingUrl>,
        messages: &[Message],
        now: DateTime<Utc>,
    ) -> (String, ContextReport) {
        let documents = owned_by(agent_id, documents);
        let urls = owned_by(agent_id, urls);

        let ranked_docs = ranker::rank(documents, messages, self.scorer.as_ref(), now);
        let ranked_urls = ranker::rank(urls, messages, self.scorer.as_ref(), now);

        let mut packer = Packer::new(self.max_chars, self.reserve_chars);
        let doc_reports = packer.pack_section(FragmentKind::Document, ranked_docs);
        let url_reports = packer.pack_section(FragmentKind::Url, ranked_urls);

        let total_chars = if packer.added > 0 {
            packer.used + packer.closing
        } else {
            0
        };
        let context = packer.finish();

        tracing::debug!(
            agent_id,
            budget = self.max_chars,
            total_chars,
            context_chars = context.chars().count(),
            "context assembled"
        );

        let report = ContextReport {
            budget_chars: self.max_chars,
            total_chars,
            context_chars: context.chars().count(),
            truncated: doc_reports.iter().chain(&url_reports).any(|r| r.truncated),
            documents: doc_reports,
            urls: url_reports,
        };

        (context, report)
    }
}

fn owned_by<T: Groundable>(agent_id: &str, items: Vec<T>) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let owned = item.agent_id() == agent_id;
            if !owned {
                tracing::warn!(
                    agent_id,
                    item_id = item.id(),
                    owner = item.agent_id(),
                    "dropping grounding item owned by another agent"
                );
            }
            owned
        })
        .collect()
}

// ── packing ─────────────────────────────────────────────────────────

struct Packer {
    max: usize,
    reserve: usize,
    /// Characters counted so far, preamble included.
    used: usize,
    /// Held back for the closing instruction.
    closing: usize,
    added: usize,
    body: String,
}

impl Packer {
    fn new(max: usize, reserve: usize) -> Self {
        Self {
            max,
            reserve,
            used: injection::PREAMBLE.chars().count(),
            closing: injection::CLOSING.chars().count(),
            added: 0,
            body: String::new(),
        }
    }

    fn pack_section<T: Groundable>(
        &mut self,
        kind: FragmentKind,
        ranked: Vec<Ranked<T>>,
    ) -> Vec<ItemReport> {
        let mut reports = Vec::with_capacity(ranked.len());
        let mut stopped = false;

        for Ranked {
            item,
            relevance_score,
        } in ranked
        {
            let title = item.title();
            let content = item.body();
            let mut report = ItemReport {
                id: item.id().to_string(),
                title: title.to_string(),
                relevance_score,
                raw_chars: content.chars().count(),
                injected_chars: 0,
                included: false,
                truncated: false,
            };

            if stopped {
                reports.push(report);
                continue;
            }

            let fragment = injection::format_fragment(kind, title, content);
            let fragment_chars = fragment.chars().count();

            if self.used + fragment_chars + self.closing <= self.max {
                self.push(fragment, fragment_chars, &mut report);
            } else {
                stopped = true;
                if self.added == 0 {
                    self.push_truncated(kind, title, content, &mut report);
                }
            }
            reports.push(report);
        }

        reports
    }

    fn push_truncated(&mut self, kind: FragmentKind, title: &str, content: &str, report: &mut ItemReport) {
        let keep = truncation::truncated_content_len(
            self.max,
            self.used,
            self.closing,
            title.chars().count(),
            injection::wrapper_overhead(kind, title),
            self.reserve,
        );
        match keep {
            Some(keep) => {
                let cut = truncation::truncate_chars(content, keep);
                let fragment = injection::format_truncated_fragment(kind, title, cut);
                let fragment_chars = fragment.chars().count();
                self.push(fragment, fragment_chars, report);
                // The marker is not counted against the budget.
                self.used -= injection::TRUNCATED_SUFFIX.chars().count();
                report.truncated = true;
            }
            None => {
                tracing::warn!(
                    item_id = %report.id,
                    budget = self.max,
                    "context budget too small for even a truncated item; omitting it"
                );
            }
        }
    }

    fn push(&mut self, fragment: String, fragment_chars: usize, report: &mut ItemReport) {
        self.body.push_str(&fragment);
        self.used += fragment_chars;
        self.added += 1;
        report.included = true;
        report.injected_chars = fragment_chars;
    }

    fn finish(self) -> String {
        if self.added == 0 {
            return String::new();
        }
        let mut out = String::with_capacity(
            injection::PREAMBLE.len() + self.body.len() + injection::CLOSING.len(),
        );
        out.push_str(injection::PREAMBLE);
        out.push_str(&self.body);
        out.push_str(injection::CLOSING);
        out
    }
}
