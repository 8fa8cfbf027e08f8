//! Page-text extraction for grounding URLs.
//!
//! Limits:
//! - hard request timeout (`[url_fetch] timeout_secs`)
//! - response byte cap (`max_bytes`)
//! - extracted text cap (`max_text_chars`)
//! - 5 redirect hops
//!
//! Extraction never fails: restricted hosts get a descriptive placeholder,
//! and unreachable pages get a default text naming the URL and the reason.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use ym_domain::config::UrlFetchConfig;
use ym_domain::error::{Error, Result};

/// Blocks of at least this many characters count as the page's main text.
const MIN_MAIN_CHARS: usize = 100;

pub struct UrlExtractor {
    client: reqwest::Client,
    user_agent: String,
    max_bytes: usize,
    max_text_chars: usize,
}

impl UrlExtractor {
    pub fn from_config(cfg: &UrlFetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Http(format!("building url fetch client: {e}")))?;

        Ok(Self {
            client,
            user_agent: cfg.user_agent.clone(),
            max_bytes: cfg.max_bytes,
            max_text_chars: cfg.max_text_chars,
        })
    }

    /// Fetch `url` and return its readable text.
    pub async fn extract(&self, url: &str) -> String {
        if let Some(placeholder) = restricted_placeholder(url) {
            tracing::debug!(url, "restricted host; storing placeholder");
            return placeholder;
        }

        match self.fetch(url).await {
            Ok(text) => {
                tracing::debug!(url, chars = text.chars().count(), "url content extracted");
                text
            }
            Err(reason) => {
                tracing::warn!(url, reason = %reason, "url extraction failed; storing default content");
                default_content(url, &reason)
            }
        }
    }

    async fn fetch(&self, url: &str) -> std::result::Result<String, String> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "timeout".to_string()
                } else {
                    e.to_string()
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status.as_u16().to_string());
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let mut body = resp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            if buf.len() + chunk.len() > self.max_bytes {
                return Err(format!("response exceeded {} bytes", self.max_bytes));
            }
            buf.extend_from_slice(&chunk);
        }

        let raw = String::from_utf8_lossy(&buf);
        let text = if content_type.contains("html") || content_type.is_empty() {
            html_to_text(main_block(&raw), self.max_text_chars)
        } else if content_type.starts_with("text/") || content_type.contains("json") {
            raw.chars().take(self.max_text_chars).collect()
        } else {
            return Err(format!("unsupported content type {content_type}"));
        };

        if text.trim().is_empty() {
            return Err("no readable text".into());
        }
        Ok(text)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Restricted hosts and fallbacks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Placeholder text for hosts that block scraping, or `None`.
pub fn restricted_placeholder(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host == "twitter.com" || host == "x.com" {
        let mut parts = parsed.path_segments()?;
        let user = parts.next().filter(|s| !s.is_empty()).unwrap_or("unknown");
        let post_id = parts.nth(1).unwrap_or("unknown");
        return Some(format!(
            "This URL is a post on Twitter/X by @{user}.\n\n\
             Full URL: {url}\n\n\
             Twitter/X does not allow automatic extraction of post content. \
             The post may contain text, images, videos or shared links.\n\n\
             Post ID: {post_id}"
        ));
    }

    if ["facebook.com", "instagram.com", "threads.net"]
        .iter()
        .any(|h| host.ends_with(h))
    {
        return Some(format!(
            "This URL is on {host} and may contain a post, image or video.\n\n\
             Full URL: {url}\n\n\
             This platform does not allow automatic extraction of its content."
        ));
    }

    if host.ends_with("linkedin.com") {
        return Some(format!(
            "This URL is on LinkedIn and may contain a profile, post or article.\n\n\
             Full URL: {url}\n\n\
             LinkedIn does not allow automatic extraction of its content."
        ));
    }

    None
}

/// Content stored when a page could not be fetched.
pub fn default_content(url: &str, reason: &str) -> String {
    format!(
        "Could not extract the content of the URL: {url}\n\n\
         Error: {reason}\n\n\
         The page may require authentication, restrict access, or be unavailable. \
         The agent can still use the URL itself as context, but not the full page content."
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTML → text
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The inner HTML of the first `<main>` or `<article>` element when it holds
/// enough text, else the whole document.
fn main_block(html: &str) -> &str {
    let lower = html.to_ascii_lowercase();
    for tag in ["main", "article"] {
        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        let Some(start) = lower.find(&open) else {
            continue;
        };
        let Some(body_start) = lower[start..].find('>').map(|i| start + i + 1) else {
            continue;
        };
        let Some(end) = lower[body_start..].find(&close).map(|i| body_start + i) else {
            continue;
        };
        let inner = &html[body_start..end];
        if html_to_text(inner, MIN_MAIN_CHARS * 2).chars().count() >= MIN_MAIN_CHARS {
            return inner;
        }
    }
    html
}

/// Strip tags, drop script/style bodies, turn block ends into newlines,
/// decode common entities and collapse whitespace.
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let mut out = String::new();
    let mut out_chars = 0usize;
    let mut in_tag = false;
    let mut skip_body = false;
    let mut tag_buf = String::new();

    for ch in html.chars() {
        if out_chars >= max_chars {
            break;
        }
        match ch {
            '<' => {
                in_tag = true;
                tag_buf.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let tag = tag_buf.trim().to_ascii_lowercase();
                let name = tag
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .find(|s| !s.is_empty())
                    .unwrap_or("");

                if matches!(name, "script" | "style" | "noscript") {
                    skip_body = !tag.starts_with('/');
                }

                let block = matches!(
                    name,
                    "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "tr" | "br"
                        | "article" | "section" | "header" | "footer" | "blockquote" | "main"
                );
                if block && (tag.starts_with('/') || name == "br") && !out.ends_with('\n') {
                    out.push('\n');
                    out_chars += 1;
                }
            }
            _ if in_tag => tag_buf.push(ch),
            _ if skip_body => {}
            _ => {
                out.push(ch);
                out_chars += 1;
            }
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    let mut result = String::new();
    let mut blank = false;
    for line in decoded.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !blank && !result.is_empty() {
                result.push('\n');
                blank = true;
            }
        } else {
            result.push_str(&collapsed);
            result.push('\n');
            blank = false;
        }
    }

    result.trim().to_string()
}
