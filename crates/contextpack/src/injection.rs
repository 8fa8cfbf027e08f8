//! Literal text wrapped around grounding items.
//!
//! Prompts downstream depend on these exact tags, so they are emitted
//! verbatim and item text is never escaped.

/// Opening line of every non-empty context block.
pub const PREAMBLE: &str = "Use the following context information to answer the user's questions:\n\n";

/// Closing instruction, appended only when at least one item was packed.
pub const CLOSING: &str = "When answering questions, use this contextual information if it's relevant to the query. You are an assistant that uses this information as reference and context.";

/// Marker appended to the content of a cut-down item.
pub const TRUNCATED_SUFFIX: &str = "...(truncated)";

/// Which wrapper a grounding item is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Document,
    Url,
}

impl FragmentKind {
    fn tags(self) -> (&'static str, &'static str) {
        match self {
            FragmentKind::Document => ("document", "title"),
            FragmentKind::Url => ("url", "link"),
        }
    }
}

/// Render one item as an XML-like fragment.
///
/// `<document>\n<title>T</title>\n<content>C</content>\n</document>\n\n`
/// (or `<url>`/`<link>` for pages).
pub fn format_fragment(kind: FragmentKind, title: &str, content: &str) -> String {
    let (outer, head) = kind.tags();
    format!("<{outer}>\n<{head}>{title}</{head}>\n<content>{content}</content>\n</{outer}>\n\n")
}

/// Render a fragment whose content was cut down to fit the budget.
pub fn format_truncated_fragment(kind: FragmentKind, title: &str, content: &str) -> String {
    format_fragment(kind, title, &format!("{content}{TRUNCATED_SUFFIX}"))
}

/// Characters a fragment occupies on top of its content.
pub fn wrapper_overhead(kind: FragmentKind, title: &str) -> usize {
    format_fragment(kind, title, "").chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_fragment_shape() {
        let out = format_fragment(FragmentKind::Document, "Pricing", "Ten dollars");
        assert_eq!(
            out,
            "<document>\n<title>Pricing</title>\n<content>Ten dollars</content>\n</document>\n\n"
        );
    }

    #[test]
    fn url_fragment_shape() {
        let out = format_fragment(FragmentKind::Url, "https://a.test", "<b>raw</b>");
        assert_eq!(
            out,
            "<url>\n<link>https://a.test</link>\n<content><b>raw</b></content>\n</url>\n\n"
        );
    }

    #[test]
    fn overhead_matches_rendered_length() {
        let title = "Pricing";
        let over = wrapper_overhead(FragmentKind::Document, title);
        let rendered = format_truncated_fragment(FragmentKind::Document, title, "abcde");
        assert_eq!(rendered.chars().count(), over + 5 + TRUNCATED_SUFFIX.chars().count());
        assert!(rendered.contains("abcde...(truncated)</content>"));
    }
}
