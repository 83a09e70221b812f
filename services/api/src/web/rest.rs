//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::protocol::{
    CategoryDto, ClientMessage, ConversationDto, MessageDto, RoleDto, ServerMessage, SnapshotDto,
    SourceDto, UploadDto, UploadStatusDto,
};
use crate::web::state::AppState;
use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chat_core::{ConversationId, Intent, IntentOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_session_handler,
        create_conversation_handler,
        select_conversation_handler,
        delete_conversation_handler,
        list_messages_handler,
        send_message_handler,
        upload_files_handler,
        remove_upload_handler,
    ),
    components(
        schemas(
            SnapshotDto, ConversationDto, MessageDto, SourceDto, UploadDto,
            CategoryDto, RoleDto, UploadStatusDto,
            CreateConversationRequest, CreateConversationResponse,
            SendMessageRequest, SendMessageResponse, UploadFilesResponse,
            // WebSocket frames on `/ws`
            ClientMessage, ServerMessage,
        )
    ),
    tags(
        (name = "NYAN-BOT Chat API", description = "Simulated document-chat session: conversations, messages and uploads.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Payload Structs
//=========================================================================================

/// Send `{}` for the default "New Chat" title.
#[derive(Deserialize, Default, ToSchema)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateConversationResponse {
    pub conversation_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
}

/// `accepted` is false when the text was blank or a response is still outstanding.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SendMessageResponse {
    pub accepted: bool,
    /// The conversation the message was stored in. Absent when not accepted.
    pub conversation_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UploadFilesResponse {
    pub tracked: usize,
}

type HandlerError = (StatusCode, String);

fn internal(context: &str, e: ApiError) -> HandlerError {
    error!("{}: {:?}", context, e);
    e.into_response_parts()
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Read the current session snapshot.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session state", body = SnapshotDto)
    )
)]
pub async fn get_session_handler(State(app_state): State<Arc<AppState>>) -> Json<SnapshotDto> {
    Json(app_state.session.snapshot().into())
}

/// Create a new private conversation and make it active.
#[utoipa::path(
    post,
    path = "/conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 201, description = "Conversation created", body = CreateConversationResponse),
        (status = 503, description = "Session is not running")
    )
)]
pub async fn create_conversation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let title = req.title;
    let outcome = app_state
        .session
        .apply(Intent::CreateConversation { title })
        .await
        .map_err(|e| internal("Failed to create conversation", e))?;

    match outcome {
        IntentOutcome::Created(id) => Ok((
            StatusCode::CREATED,
            Json(CreateConversationResponse {
                conversation_id: id.as_uuid(),
            }),
        )),
        other => {
            error!("Unexpected outcome for create: {:?}", other);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create conversation".to_string(),
            ))
        }
    }
}

/// Make an existing conversation the active one.
#[utoipa::path(
    post,
    path = "/conversations/{id}/select",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation selected"),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn select_conversation_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    let outcome = app_state
        .session
        .apply(Intent::SelectConversation {
            id: ConversationId::from_uuid(id),
        })
        .await
        .map_err(|e| internal("Failed to select conversation", e))?;

    match outcome {
        IntentOutcome::Ignored => Err((
            StatusCode::NOT_FOUND,
            format!("Conversation {} not found", id),
        )),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// Delete a conversation and its history. Deleting an unknown id is a no-op.
#[utoipa::path(
    delete,
    path = "/conversations/{id}",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation removed, or was already absent")
    )
)]
pub async fn delete_conversation_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .session
        .apply(Intent::DeleteConversation {
            id: ConversationId::from_uuid(id),
        })
        .await
        .map_err(|e| internal("Failed to delete conversation", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read a conversation's full message history.
#[utoipa::path(
    get,
    path = "/conversations/{id}/messages",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages in insertion order", body = [MessageDto]),
        (status = 404, description = "No such conversation")
    )
)]
pub async fn list_messages_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageDto>>, HandlerError> {
    let history = app_state
        .session
        .history(ConversationId::from_uuid(id))
        .await
        .map_err(|e| internal("Failed to read messages", e))?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Conversation {} not found", id),
            )
        })?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Send a message to the active conversation, creating one if none is active.
#[utoipa::path(
    post,
    path = "/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 202, description = "Message stored; a reply is on its way", body = SendMessageResponse),
        (status = 200, description = "Message ignored (blank, or a reply is outstanding)", body = SendMessageResponse)
    )
)]
pub async fn send_message_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let outcome = app_state
        .session
        .apply(Intent::SendMessage { text: req.text })
        .await
        .map_err(|e| internal("Failed to send message", e))?;

    let (status, body) = match outcome {
        IntentOutcome::Sent(id) => (
            StatusCode::ACCEPTED,
            SendMessageResponse {
                accepted: true,
                conversation_id: Some(id.as_uuid()),
            },
        ),
        _ => (
            StatusCode::OK,
            SendMessageResponse {
                accepted: false,
                conversation_id: None,
            },
        ),
    };
    Ok((status, Json(body)))
}

/// Start tracking uploaded files.
///
/// Accepts a multipart/form-data request. Only the file name of each file part
/// is used; the bytes are discarded. Parts without a file name are skipped.
#[utoipa::path(
    post,
    path = "/uploads",
    request_body(content_type = "multipart/form-data", description = "One or more files."),
    responses(
        (status = 202, description = "Files are being processed", body = UploadFilesResponse),
        (status = 400, description = "Malformed multipart body or no files"),
        (status = 413, description = "Body exceeds the configured upload limit")
    )
)]
pub async fn upload_files_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut names = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            e.status(),
            format!("Failed to read multipart data: {}", e.body_text()),
        )
    })? {
        let name = field.file_name().map(str::to_string);
        let size = drain_field(field).await?;
        match name {
            Some(name) => names.push(name),
            None => debug!("Skipping multipart part without a file name ({} bytes).", size),
        }
    }

    if names.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        ));
    }

    let tracked = names.len();
    app_state
        .session
        .apply(Intent::UploadFiles { names })
        .await
        .map_err(|e| internal("Failed to track uploads", e))?;
    Ok((StatusCode::ACCEPTED, Json(UploadFilesResponse { tracked })))
}

/// Reads a part to the end without buffering it. Returns its size in bytes.
async fn drain_field(mut field: Field<'_>) -> Result<usize, HandlerError> {
    let mut size = 0;
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        (
            e.status(),
            format!("Failed to read file bytes: {}", e.body_text()),
        )
    })? {
        size += chunk.len();
    }
    Ok(size)
}

/// Stop tracking every upload with the given name.
#[utoipa::path(
    delete,
    path = "/uploads/{name}",
    params(("name" = String, Path, description = "File name")),
    responses(
        (status = 204, description = "Uploads removed, or none matched")
    )
)]
pub async fn remove_upload_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .session
        .apply(Intent::RemoveUpload { name })
        .await
        .map_err(|e| internal("Failed to remove upload", e))?;
    Ok(StatusCode::NO_CONTENT)
}
