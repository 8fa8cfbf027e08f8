pub mod agents;
pub mod chat;
pub mod chats;
pub mod documents;
pub mod error;
pub mod functions;
pub mod health;
pub mod urls;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub use error::{ApiError, ApiResult};

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Chat pipeline
        .route("/api/chat", post(chat::chat))
        // Agents
        .route("/api/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/api/agents/:id",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route(
            "/api/agents/:id/functions",
            get(agents::list_agent_functions)
                .post(agents::assign_agent_functions)
                .delete(agents::clear_agent_functions),
        )
        .route("/api/agents/:id/context", get(agents::agent_context))
        // Grounding
        .route(
            "/api/agents/:id/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/api/agents/:id/documents/:document_id",
            delete(documents::delete_document),
        )
        .route("/api/agents/:id/urls", get(urls::list_urls).post(urls::create_url))
        .route("/api/agents/:id/urls/:url_id", delete(urls::delete_url))
        // Chats
        .route("/api/chats", get(chats::list_chats).post(chats::create_chat))
        .route("/api/chats/:id", get(chats::get_chat).delete(chats::delete_chat))
        .route("/api/chats/:id/messages", post(chats::append_message))
        // Functions
        .route("/api/functions", get(functions::list_functions))
        .route("/api/functions/execute", post(functions::execute_function))
}
