//! Grounding documents scoped to one agent.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use ym_domain::grounding::{GroundingDocument, NewDocument};

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

const PREVIEW_CHARS: usize = 100;

pub async fn list_documents(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let documents = state.store.list_documents(&agent_id).await?;
    let documents: Vec<Value> = documents.iter().map(summary).collect();
    Ok(Json(json!({ "documents": documents })))
}

pub async fn create_document(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let new: NewDocument = serde_json::from_value(body)
        .map_err(|e| ApiError::validation(format!("invalid document: {e}")))?;
    let document = state.store.create_document(&agent_id, new).await?;
    tracing::info!(
        agent_id = %agent_id,
        document_id = %document.id,
        chars = document.content.chars().count(),
        "document uploaded"
    );
    Ok((StatusCode::CREATED, Json(json!({ "document": summary(&document) }))))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path((agent_id, document_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete_document(&agent_id, &document_id).await?;
    tracing::info!(agent_id = %agent_id, document_id = %document_id, "document deleted");
    Ok(Json(json!({ "message": "Document deleted successfully" })))
}

/// Listing view: metadata plus a short content preview.
fn summary(doc: &GroundingDocument) -> Value {
    json!({
        "id": doc.id,
        "agentId": doc.agent_id,
        "name": doc.name,
        "description": doc.description,
        "fileType": doc.file_type,
        "contentPreview": preview(&doc.content),
        "createdAt": doc.created_at,
        "updatedAt": doc.updated_at,
    })
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_long_content() {
        let long = "é".repeat(150);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
