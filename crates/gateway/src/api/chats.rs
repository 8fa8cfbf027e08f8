//! Persisted conversations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use ym_domain::chat::{Chat, NewChat};
use ym_domain::message::{Message, Role};

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

const LAST_MESSAGE_CHARS: usize = 50;

pub async fn list_chats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let chats = state.store.list_chats().await?;
    let chats: Vec<Value> = chats.iter().map(summary).collect();
    Ok(Json(json!({ "chats": chats })))
}

pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let chat = state.store.find_chat(&id).await?;
    Ok(Json(json!({ "chat": chat })))
}

pub async fn create_chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let new: NewChat = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("invalid chat: {e}")))?;
    let chat = state.store.create_chat(new).await?;
    tracing::info!(chat_id = %chat.id, agent_id = chat.agent_id.as_deref().unwrap_or(""), "chat created");
    Ok((StatusCode::CREATED, Json(json!({ "chat": chat }))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendMessageBody {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub used_agent_id: Option<String>,
}

pub async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AppendMessageBody>,
) -> ApiResult<impl IntoResponse> {
    let role: Role = body.role.parse()?;
    if body.content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }
    let mut message = Message::new(role, body.content);
    message.used_agent_id = body.used_agent_id.filter(|a| !a.is_empty());

    let chat = state.store.append_message(&id, message).await?;
    tracing::debug!(chat_id = %chat.id, messages = chat.messages.len(), "message appended");
    Ok(Json(json!({ "chat": chat })))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete_chat(&id).await?;
    tracing::info!(chat_id = %id, "chat deleted");
    Ok(Json(json!({ "message": "Chat deleted successfully" })))
}

/// Listing view: no message bodies, just the count and a snippet of the
/// latest one.
fn summary(chat: &Chat) -> Value {
    let last = chat.messages.last().map(|m| {
        let mut snippet: String = m.content.chars().take(LAST_MESSAGE_CHARS).collect();
        if m.content.chars().count() > LAST_MESSAGE_CHARS {
            snippet.push_str("...");
        }
        snippet
    });
    json!({
        "id": chat.id,
        "title": chat.title,
        "agentId": chat.agent_id,
        "model": chat.model,
        "messagesCount": chat.messages.len(),
        "lastMessage": last,
        "createdAt": chat.created_at,
        "updatedAt": chat.updated_at,
    })
}
