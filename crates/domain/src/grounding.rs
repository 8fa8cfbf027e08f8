use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNTITLED_DOCUMENT: &str = "Untitled Document";
pub const PLACEHOLDER_LINK: &str = "https://example.com";
pub const NO_CONTENT: &str = "No content";

/// Free text uploaded by a user, scoped to exactly one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingDocument {
    pub id: String,
    pub agent_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file_type: FileType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Text,
    Markdown,
    Pdf,
    Json,
}

/// A scraped web page (pre-extracted text), scoped to exactly one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingUrl {
    pub id: String,
    pub agent_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Common view over grounding items, used by ranking and context assembly.
///
/// Empty fields fall back to placeholder text so scoring and formatting
/// never have to special-case missing data.
pub trait Groundable {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn body(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn agent_id(&self) -> &str;
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'static str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

impl Groundable for GroundingDocument {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        or_placeholder(&self.name, UNTITLED_DOCUMENT)
    }
    fn body(&self) -> &str {
        or_placeholder(&self.content, NO_CONTENT)
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

impl Groundable for GroundingUrl {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        or_placeholder(&self.url, PLACEHOLDER_LINK)
    }
    fn body(&self) -> &str {
        or_placeholder(&self.content, NO_CONTENT)
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

/// Fields accepted when uploading a document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub file_type: FileType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, content: &str) -> GroundingDocument {
        let now = Utc::now();
        GroundingDocument {
            id: "d1".into(),
            agent_id: "a1".into(),
            name: name.into(),
            description: String::new(),
            content: content.into(),
            file_type: FileType::Text,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn placeholders_for_missing_fields() {
        let d = doc("", "");
        assert_eq!(d.title(), UNTITLED_DOCUMENT);
        assert_eq!(d.body(), NO_CONTENT);

        let now = Utc::now();
        let u = GroundingUrl {
            id: "u1".into(),
            agent_id: "a1".into(),
            url: String::new(),
            content: "page".into(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(u.title(), PLACEHOLDER_LINK);
        assert_eq!(u.body(), "page");
    }

    #[test]
    fn present_fields_pass_through() {
        let d = doc("Pricing", "Our plan costs $10/month");
        assert_eq!(d.title(), "Pricing");
        assert_eq!(d.body(), "Our plan costs $10/month");
    }
}
