use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MODEL;
use crate::message::Message;

/// A persisted conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default = "default_model")]
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChat {
    pub title: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model: Option<String>,
}

impl Chat {
    pub fn from_new(id: String, new: NewChat, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            agent_id: new.agent_id,
            messages: new.messages,
            model: new.model.unwrap_or_else(default_model),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, stamping it if it carries no timestamp.
    pub fn push(&mut self, mut message: Message, now: DateTime<Utc>) {
        if message.timestamp.is_none() {
            message.timestamp = Some(now);
        }
        self.messages.push(message);
        self.updated_at = now;
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}
