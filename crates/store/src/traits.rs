use ym_domain::agent::{Agent, AgentCategory, AgentPatch, NewAgent};
use ym_domain::chat::{Chat, NewChat};
use ym_domain::error::Result;
use ym_domain::grounding::{GroundingDocument, GroundingUrl, NewDocument};
use ym_domain::message::Message;

/// Persistence operations the gateway relies on.
///
/// Lookups of a single entity return `Error::NotFound` when it is missing.
/// Grounding items always belong to exactly one agent: listing by agent
/// never returns another agent's items, and deleting through the wrong
/// agent is reported as not found.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ── agents ──────────────────────────────────────────────────────

    /// Newest first; optionally restricted to one category.
    async fn list_agents(&self, category: Option<AgentCategory>) -> Result<Vec<Agent>>;
    async fn find_agent(&self, id: &str) -> Result<Agent>;
    /// User-created agents are never default agents.
    async fn create_agent(&self, new: NewAgent) -> Result<Agent>;
    /// `Error::Forbidden` for default agents.
    async fn update_agent(&self, id: &str, patch: AgentPatch) -> Result<Agent>;
    /// `Error::Forbidden` for default agents. Cascades to the agent's
    /// documents and URLs.
    async fn delete_agent(&self, id: &str) -> Result<()>;

    // ── documents ───────────────────────────────────────────────────

    async fn list_documents(&self, agent_id: &str) -> Result<Vec<GroundingDocument>>;
    async fn find_document(&self, id: &str) -> Result<GroundingDocument>;
    async fn create_document(&self, agent_id: &str, new: NewDocument) -> Result<GroundingDocument>;
    async fn delete_document(&self, agent_id: &str, id: &str) -> Result<()>;

    // ── urls ────────────────────────────────────────────────────────

    async fn list_urls(&self, agent_id: &str) -> Result<Vec<GroundingUrl>>;
    async fn find_url(&self, id: &str) -> Result<GroundingUrl>;
    async fn create_url(&self, agent_id: &str, url: String, content: String) -> Result<GroundingUrl>;
    async fn delete_url(&self, agent_id: &str, id: &str) -> Result<()>;

    // ── chats ───────────────────────────────────────────────────────

    /// Most recently updated first.
    async fn list_chats(&self) -> Result<Vec<Chat>>;
    async fn find_chat(&self, id: &str) -> Result<Chat>;
    async fn create_chat(&self, new: NewChat) -> Result<Chat>;
    async fn append_message(&self, chat_id: &str, message: Message) -> Result<Chat>;
    async fn delete_chat(&self, id: &str) -> Result<()>;
}
