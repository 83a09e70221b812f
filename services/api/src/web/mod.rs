pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    create_conversation_handler, delete_conversation_handler, get_session_handler,
    list_messages_handler, remove_upload_handler, select_conversation_handler,
    send_message_handler, upload_files_handler,
};
pub use ws_handler::ws_handler;

use state::AppState;

/// The REST and WebSocket routes, without CORS or the Swagger UI.
///
/// Upload bodies may be as large as the configured `max_upload_bytes`; every
/// other route keeps axum's default limit.
pub fn router(app_state: Arc<AppState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.config.max_upload_bytes);
    Router::new()
        .route("/session", get(get_session_handler))
        .route("/conversations", post(create_conversation_handler))
        .route("/conversations/{id}", delete(delete_conversation_handler))
        .route("/conversations/{id}/select", post(select_conversation_handler))
        .route("/conversations/{id}/messages", get(list_messages_handler))
        .route("/messages", post(send_message_handler))
        .route(
            "/uploads",
            post(upload_files_handler).layer(upload_limit),
        )
        .route("/uploads/{name}", delete(remove_upload_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
