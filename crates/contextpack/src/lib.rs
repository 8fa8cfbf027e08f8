//! Grounding context for chat requests.
//!
//! Ranks an agent's documents and URLs against the latest user query and
//! packs them into one system-style context block under a character budget.
//! Everything here is pure: callers fetch the grounding items and pass them
//! in, and get back the assembled text plus a machine-readable report.

pub mod builder;
pub mod injection;
pub mod ranker;
pub mod report;
pub mod truncation;

pub use builder::ContextAssembler;
pub use ranker::{rank, LexicalScorer, Ranked, RelevanceScorer};
pub use report::{ContextReport, ItemReport};
