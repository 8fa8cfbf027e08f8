//! Grounding URLs scoped to one agent.
//!
//! On create the page text is extracted unless the caller supplies it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use ym_domain::grounding::GroundingUrl;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUrlBody {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
}

pub async fn list_urls(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let urls = state.store.list_urls(&agent_id).await?;
    let urls: Vec<Value> = urls.iter().map(summary).collect();
    Ok(Json(json!({ "urls": urls })))
}

pub async fn create_url(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<CreateUrlBody>,
) -> ApiResult<impl IntoResponse> {
    let url = body.url.trim().to_string();
    if reqwest::Url::parse(&url).is_err() {
        return Err(ApiError::validation(format!("invalid url {url:?}")));
    }
    // Unknown agent is a 404 before any fetch.
    state.store.find_agent(&agent_id).await?;

    let content = match body.content.filter(|c| !c.trim().is_empty()) {
        Some(content) => content,
        None => state.extractor.extract(&url).await,
    };

    let stored = state.store.create_url(&agent_id, url, content).await?;
    tracing::info!(
        agent_id = %agent_id,
        url_id = %stored.id,
        url = %stored.url,
        chars = stored.content.chars().count(),
        "url added"
    );
    Ok((StatusCode::CREATED, Json(json!({ "url": summary(&stored) }))))
}

pub async fn delete_url(
    State(state): State<AppState>,
    Path((agent_id, url_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    state.store.delete_url(&agent_id, &url_id).await?;
    tracing::info!(agent_id = %agent_id, url_id = %url_id, "url deleted");
    Ok(Json(json!({ "message": "URL deleted successfully" })))
}

/// Listing view: extracted content is omitted.
fn summary(url: &GroundingUrl) -> Value {
    json!({
        "id": url.id,
        "agentId": url.agent_id,
        "url": url.url,
        "createdAt": url.created_at,
        "updatedAt": url.updated_at,
    })
}
