//! Request-time grounding: fetch an agent's documents and URLs, assemble
//! the context block, and inject it as the leading system message.

use chrono::Utc;
use ym_contextpack::{ContextAssembler, ContextReport};
use ym_domain::message::Message;
use ym_domain::trace::TraceEvent;
use ym_store::Store;

/// Build the context block for `agent_id`.
///
/// The two fetches run concurrently. A failed fetch is logged and treated
/// as "no items of that kind"; grounding never fails the request.
pub async fn ground(
    store: &dyn Store,
    assembler: &ContextAssembler,
    agent_id: &str,
    messages: &[Message],
) -> (String, ContextReport) {
    let (documents, urls) = tokio::join!(store.list_documents(agent_id), store.list_urls(agent_id));

    let documents = documents.unwrap_or_else(|e| {
        fetch_failed(agent_id, "documents", &e);
        Vec::new()
    });
    let urls = urls.unwrap_or_else(|e| {
        fetch_failed(agent_id, "urls", &e);
        Vec::new()
    });

    let documents_considered = documents.len();
    let urls_considered = urls.len();
    let (context, report) = assembler.build(agent_id, documents, urls, messages, Utc::now());

    TraceEvent::ContextBuilt {
        agent_id: agent_id.to_string(),
        budget_chars: report.budget_chars,
        total_chars: report.total_chars,
        documents_included: report.documents_included(),
        documents_considered,
        urls_included: report.urls_included(),
        urls_considered,
        truncated: report.truncated,
    }
    .emit();

    (context, report)
}

fn fetch_failed(agent_id: &str, kind: &str, error: &ym_domain::error::Error) {
    tracing::warn!(agent_id, kind, error = %error, "grounding fetch failed; continuing without it");
    TraceEvent::GroundingFetchFailed {
        agent_id: agent_id.to_string(),
        kind: kind.to_string(),
        error: error.to_string(),
    }
    .emit();
}

/// Prepend the context block as a system message. Empty context leaves
/// the conversation untouched.
pub fn inject(messages: &mut Vec<Message>, context: String) {
    if !context.is_empty() {
        messages.insert(0, Message::system(context));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ym_domain::message::Role;

    #[test]
    fn empty_context_injects_nothing() {
        let mut msgs = vec![Message::user("hi")];
        inject(&mut msgs, String::new());
        assert_eq!(msgs.len(), 1);
    }

    #[test]
    fn context_goes_first() {
        let mut msgs = vec![Message::system("prompt"), Message::user("hi")];
        inject(&mut msgs, "ctx".into());
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[0].content, "ctx");
        assert_eq!(msgs[1].content, "prompt");
    }
}
