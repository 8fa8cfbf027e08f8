//! Standing system directives sent with every provider call.
//!
//! Each directive is skipped when a system message already contains its
//! marker, so stored conversations that carry them are not duplicated.
//! The UI strips the `<think>` block before display.

use ym_domain::message::{Message, Role};

pub struct Directive {
    pub marker: &'static str,
    pub text: &'static str,
}

pub const MARKDOWN: Directive = Directive {
    marker: "Markdown",
    text: "Format every response using Markdown: use headings, lists, tables, \
           bold text and fenced code blocks with a language tag wherever they \
           make the answer easier to read.",
};

pub const REASONING: Directive = Directive {
    marker: "<think>",
    text: "Before giving your final answer, you must always draft your reasoning \
           inside <think></think> tags. Work through the problem step by step \
           inside the tags, close them, and only then write the final answer for \
           the user outside of the tags.",
};

pub static STANDING: [Directive; 2] = [MARKDOWN, REASONING];

/// Directives whose marker is not already present in any system message.
pub fn missing(messages: &[Message]) -> Vec<&'static Directive> {
    STANDING
        .iter()
        .filter(|d| {
            !messages
                .iter()
                .any(|m| m.role == Role::System && m.content.contains(d.marker))
        })
        .collect()
}
