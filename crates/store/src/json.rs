//! JSON-file store: the whole state lives in memory behind a lock and is
//! written back to `<state_path>/store.json` after every mutation. A
//! mutation becomes visible only once it has been written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ym_domain::agent::{Agent, AgentCategory, AgentPatch, NewAgent};
use ym_domain::chat::{Chat, NewChat};
use ym_domain::error::{Error, Result};
use ym_domain::grounding::{GroundingDocument, GroundingUrl, NewDocument};
use ym_domain::message::Message;

use crate::traits::Store;

const STATE_FILE: &str = "store.json";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persisted state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct State {
    #[serde(default)]
    agents: BTreeMap<String, Agent>,
    #[serde(default)]
    documents: BTreeMap<String, GroundingDocument>,
    #[serde(default)]
    urls: BTreeMap<String, GroundingUrl>,
    #[serde(default)]
    chats: BTreeMap<String, Chat>,
}

impl State {
    fn agent(&self, id: &str) -> Result<&Agent> {
        self.agents.get(id).ok_or_else(|| Error::not_found("agent", id))
    }

    fn require_agent(&self, id: &str) -> Result<()> {
        self.agent(id).map(|_| ())
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JsonStore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct JsonStore {
    /// `None` keeps everything in memory (tests, `--ephemeral`).
    file: Option<PathBuf>,
    state: RwLock<State>,
}

impl JsonStore {
    /// Open (or create) the store under `state_path`.
    pub fn open(state_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_path)?;
        let file = state_path.join(STATE_FILE);

        let state = if file.exists() {
            let data = std::fs::read_to_string(&file)?;
            serde_json::from_str(&data).map_err(|e| {
                Error::Store(format!("corrupt state file {}: {e}", file.display()))
            })?
        } else {
            State::default()
        };

        tracing::info!(
            path = %file.display(),
            agents = state.agents.len(),
            documents = state.documents.len(),
            urls = state.urls.len(),
            chats = state.chats.len(),
            "store opened"
        );

        Ok(Self {
            file: Some(file),
            state: RwLock::new(state),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            file: None,
            state: RwLock::new(State::default()),
        }
    }

    /// Insert an agent as-is, including the default flag. Used to seed
    /// the built-in agents; skipped when an agent with the same name
    /// already exists.
    pub fn seed_agent(&self, new: NewAgent) -> Result<Option<Agent>> {
        self.mutate(|state| {
            if state.agents.values().any(|a| a.name == new.name) {
                return Ok(None);
            }
            let agent = Agent::from_new(new_id(), new, Utc::now());
            state.agents.insert(agent.id.clone(), agent.clone());
            Ok(Some(agent))
        })
    }

    /// Apply `f` to a copy of the state, persist the copy, then swap it in.
    /// If `f` or the write fails the live state is left untouched.
    fn mutate<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        let mut next = state.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }

    /// Write the state to disk via a sibling temp file, so a crash mid-write
    /// never leaves a truncated `store.json`. Called with the write lock held.
    fn persist(&self, state: &State) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(state)?;
        let tmp = file.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, file)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for JsonStore {
    // ── agents ──────────────────────────────────────────────────────

    async fn list_agents(&self, category: Option<AgentCategory>) -> Result<Vec<Agent>> {
        let state = self.state.read();
        let mut agents: Vec<Agent> = state
            .agents
            .values()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .cloned()
            .collect();
        agents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(agents)
    }

    async fn find_agent(&self, id: &str) -> Result<Agent> {
        self.state.read().agent(id).cloned()
    }

    async fn create_agent(&self, mut new: NewAgent) -> Result<Agent> {
        require_non_empty("name", &new.name)?;
        require_non_empty("description", &new.description)?;
        require_non_empty("systemPrompt", &new.system_prompt)?;
        new.is_default = false;

        let agent = Agent::from_new(new_id(), new, Utc::now());
        self.mutate(|state| {
            state.agents.insert(agent.id.clone(), agent.clone());
            Ok(())
        })?;
        tracing::debug!(agent_id = %agent.id, "agent created");
        Ok(agent)
    }

    async fn update_agent(&self, id: &str, patch: AgentPatch) -> Result<Agent> {
        if let Some(name) = &patch.name {
            require_non_empty("name", name)?;
        }
        self.mutate(|state| {
            let agent = state
                .agents
                .get_mut(id)
                .ok_or_else(|| Error::not_found("agent", id))?;
            if agent.is_default {
                return Err(Error::Forbidden("default agents cannot be modified".into()));
            }
            agent.apply(patch, Utc::now());
            Ok(agent.clone())
        })
    }

    async fn delete_agent(&self, id: &str) -> Result<()> {
        let (documents, urls) = self.mutate(|state| {
            if state.agent(id)?.is_default {
                return Err(Error::Forbidden("default agents cannot be deleted".into()));
            }
            state.agents.remove(id);
            let docs_before = state.documents.len();
            let urls_before = state.urls.len();
            state.documents.retain(|_, d| d.agent_id != id);
            state.urls.retain(|_, u| u.agent_id != id);
            Ok((
                docs_before - state.documents.len(),
                urls_before - state.urls.len(),
            ))
        })?;
        tracing::debug!(agent_id = id, documents, urls, "agent deleted with its grounding");
        Ok(())
    }

    // ── documents ───────────────────────────────────────────────────

    async fn list_documents(&self, agent_id: &str) -> Result<Vec<GroundingDocument>> {
        let state = self.state.read();
        state.require_agent(agent_id)?;
        let mut docs: Vec<GroundingDocument> = state
            .documents
            .values()
            .filter(|d| d.agent_id == agent_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn find_document(&self, id: &str) -> Result<GroundingDocument> {
        self.state
            .read()
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("document", id))
    }

    async fn create_document(&self, agent_id: &str, new: NewDocument) -> Result<GroundingDocument> {
        require_non_empty("name", &new.name)?;
        require_non_empty("content", &new.content)?;

        self.mutate(|state| {
            state.require_agent(agent_id)?;
            let now = Utc::now();
            let doc = GroundingDocument {
                id: new_id(),
                agent_id: agent_id.to_string(),
                name: new.name,
                description: new.description,
                content: new.content,
                file_type: new.file_type,
                created_at: now,
                updated_at: now,
            };
            state.documents.insert(doc.id.clone(), doc.clone());
            Ok(doc)
        })
    }

    async fn delete_document(&self, agent_id: &str, id: &str) -> Result<()> {
        self.mutate(|state| match state.documents.get(id) {
            Some(d) if d.agent_id == agent_id => {
                state.documents.remove(id);
                Ok(())
            }
            _ => Err(Error::not_found("document", id)),
        })
    }

    // ── urls ────────────────────────────────────────────────────────

    async fn list_urls(&self, agent_id: &str) -> Result<Vec<GroundingUrl>> {
        let state = self.state.read();
        state.require_agent(agent_id)?;
        let mut urls: Vec<GroundingUrl> = state
            .urls
            .values()
            .filter(|u| u.agent_id == agent_id)
            .cloned()
            .collect();
        urls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(urls)
    }

    async fn find_url(&self, id: &str) -> Result<GroundingUrl> {
        self.state
            .read()
            .urls
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("url", id))
    }

    async fn create_url(&self, agent_id: &str, url: String, content: String) -> Result<GroundingUrl> {
        require_non_empty("url", &url)?;

        self.mutate(|state| {
            state.require_agent(agent_id)?;
            let now = Utc::now();
            let item = GroundingUrl {
                id: new_id(),
                agent_id: agent_id.to_string(),
                url,
                content,
                created_at: now,
                updated_at: now,
            };
            state.urls.insert(item.id.clone(), item.clone());
            Ok(item)
        })
    }

    async fn delete_url(&self, agent_id: &str, id: &str) -> Result<()> {
        self.mutate(|state| match state.urls.get(id) {
            Some(u) if u.agent_id == agent_id => {
                state.urls.remove(id);
                Ok(())
            }
            _ => Err(Error::not_found("url", id)),
        })
    }

    // ── chats ───────────────────────────────────────────────────────

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        let state = self.state.read();
        let mut chats: Vec<Chat> = state.chats.values().cloned().collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn find_chat(&self, id: &str) -> Result<Chat> {
        self.state
            .read()
            .chats
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("chat", id))
    }

    async fn create_chat(&self, mut new: NewChat) -> Result<Chat> {
        require_non_empty("title", &new.title)?;

        self.mutate(|state| {
            if let Some(agent_id) = &new.agent_id {
                state.require_agent(agent_id)?;
            }
            let now = Utc::now();
            let messages = std::mem::take(&mut new.messages);
            let mut chat = Chat::from_new(new_id(), new, now);
            for m in messages {
                chat.push(m, now);
            }
            state.chats.insert(chat.id.clone(), chat.clone());
            Ok(chat)
        })
    }

    async fn append_message(&self, chat_id: &str, message: Message) -> Result<Chat> {
        self.mutate(|state| {
            let chat = state
                .chats
                .get_mut(chat_id)
                .ok_or_else(|| Error::not_found("chat", chat_id))?;
            chat.push(message, Utc::now());
            Ok(chat.clone())
        })
    }

    async fn delete_chat(&self, id: &str) -> Result<()> {
        self.mutate(|state| match state.chats.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found("chat", id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_agent(name: &str) -> NewAgent {
        NewAgent {
            name: name.into(),
            description: "d".into(),
            system_prompt: "p".into(),
            temperature: None,
            model: None,
            functions: vec![],
            icon: None,
            category: None,
            is_default: false,
        }
    }

    #[tokio::test]
    async fn user_created_agents_are_never_default() {
        let store = JsonStore::in_memory();
        let mut new = new_agent("Sneaky");
        new.is_default = true;
        let agent = store.create_agent(new).await.unwrap();
        assert!(!agent.is_default);
    }

    #[tokio::test]
    async fn seeding_is_idempotent_by_name() {
        let store = JsonStore::in_memory();
        let mut new = new_agent("Built-in");
        new.is_default = true;
        assert!(store.seed_agent(new.clone()).unwrap().is_some());
        assert!(store.seed_agent(new).unwrap().is_none());
        assert_eq!(store.list_agents(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = JsonStore::in_memory();
        let err = store.create_agent(new_agent("  ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn chat_messages_get_timestamps_on_create() {
        let store = JsonStore::in_memory();
        let chat = store
            .create_chat(NewChat {
                title: "t".into(),
                agent_id: None,
                messages: vec![Message::user("hi")],
                model: None,
            })
            .await
            .unwrap();
        assert_eq!(chat.messages.len(), 1);
        assert!(chat.messages[0].timestamp.is_some());
    }
}
