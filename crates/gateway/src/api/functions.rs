//! Function registry endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use ym_domain::error::Error;
use ym_functions::FunctionExecutor;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/functions: every registered definition.
pub async fn list_functions(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "functions": state.functions.definitions() }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteBody {
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub parameters: Value,
}

/// POST /api/functions/execute: run one function directly.
pub async fn execute_function(
    State(state): State<AppState>,
    Json(body): Json<ExecuteBody>,
) -> ApiResult<Response> {
    let Some(name) = body.function_name.filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::validation("functionName is required"));
    };
    if !state.functions.contains(&name) {
        return Err(Error::not_found("function", name).into());
    }

    match state.functions.execute(&name, body.parameters).await {
        Ok(result) => {
            tracing::debug!(function = %name, "function executed");
            Ok(Json(json!({
                "success": true,
                "function": name,
                "result": result,
            }))
            .into_response())
        }
        Err(e) => {
            tracing::error!(function = %name, error = %e, "function execution failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": e.to_string(),
                    "function": name,
                })),
            )
                .into_response())
        }
    }
}
