//! services/api/src/web/protocol.rs
//!
//! Defines the wire shapes exchanged with the browser, over both the WebSocket
//! and the REST endpoints. The core domain stays free of serialization concerns;
//! everything here is converted from it.

use chat_core::{
    Conversation, ConversationCategory, ConversationId, Intent, Message, Role, SessionSnapshot,
    Source, UploadStatus, UploadedFile,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// The intents a client can send over the WebSocket.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SendMessage { text: String },
    /// Only the file names matter; content is never transferred.
    UploadFiles { names: Vec<String> },
    SelectConversation { conversation_id: Uuid },
    CreateConversation {
        #[serde(default)]
        title: Option<String>,
    },
    DeleteConversation { conversation_id: Uuid },
    RemoveUpload { name: String },
}

impl From<ClientMessage> for Intent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::SendMessage { text } => Intent::SendMessage { text },
            ClientMessage::UploadFiles { names } => Intent::UploadFiles { names },
            ClientMessage::SelectConversation { conversation_id } => Intent::SelectConversation {
                id: ConversationId::from_uuid(conversation_id),
            },
            ClientMessage::CreateConversation { title } => Intent::CreateConversation { title },
            ClientMessage::DeleteConversation { conversation_id } => Intent::DeleteConversation {
                id: ConversationId::from_uuid(conversation_id),
            },
            ClientMessage::RemoveUpload { name } => Intent::RemoveUpload { name },
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Everything the server pushes over the WebSocket.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full session state. Sent on connect and after every change.
    Snapshot(SnapshotDto),

    /// Confirms a `create_conversation` intent with the id it was given.
    ConversationCreated { conversation_id: Uuid },

    /// Reports a problem with the last client message.
    Error { message: String },
}

//=========================================================================================
// Snapshot Payloads
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryDto {
    Group,
    Private,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleDto {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatusDto {
    Uploading,
    Processing,
    Ready,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ConversationDto {
    pub id: Uuid,
    pub title: String,
    pub category: CategoryDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct SourceDto {
    pub document_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct MessageDto {
    pub id: u64,
    pub role: RoleDto,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceDto>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct UploadDto {
    pub name: String,
    pub status: UploadStatusDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// Everything the presentation layer needs to draw the page.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct SnapshotDto {
    pub conversations: Vec<ConversationDto>,
    pub active_conversation_id: Option<Uuid>,
    pub active_title: Option<String>,
    /// History of the active conversation only.
    pub messages: Vec<MessageDto>,
    pub awaiting_response: bool,
    pub uploads: Vec<UploadDto>,
}

impl From<ConversationCategory> for CategoryDto {
    fn from(category: ConversationCategory) -> Self {
        match category {
            ConversationCategory::Group => CategoryDto::Group,
            ConversationCategory::Private => CategoryDto::Private,
        }
    }
}

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        match role {
            Role::User => RoleDto::User,
            Role::Assistant => RoleDto::Assistant,
        }
    }
}

impl From<UploadStatus> for UploadStatusDto {
    fn from(status: UploadStatus) -> Self {
        match status {
            UploadStatus::Uploading => UploadStatusDto::Uploading,
            UploadStatus::Processing => UploadStatusDto::Processing,
            UploadStatus::Ready => UploadStatusDto::Ready,
        }
    }
}

impl From<Conversation> for ConversationDto {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id.as_uuid(),
            title: c.title,
            category: c.category.into(),
            unread_count: c.unread_count,
        }
    }
}

impl From<Source> for SourceDto {
    fn from(s: Source) -> Self {
        Self {
            document_name: s.document_name,
            page_number: s.page_number,
        }
    }
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            role: m.role.into(),
            content: m.content,
            sources: m.sources.into_iter().map(Into::into).collect(),
            timestamp: m.timestamp,
        }
    }
}

impl From<UploadedFile> for UploadDto {
    fn from(f: UploadedFile) -> Self {
        Self {
            name: f.name,
            status: f.status.into(),
            page_count: f.page_count,
        }
    }
}

impl From<SessionSnapshot> for SnapshotDto {
    fn from(s: SessionSnapshot) -> Self {
        Self {
            conversations: s.conversations.into_iter().map(Into::into).collect(),
            active_conversation_id: s.active_conversation_id.map(|id| id.as_uuid()),
            active_title: s.active_title,
            messages: s.messages.into_iter().map(Into::into).collect(),
            awaiting_response: s.awaiting_response,
            uploads: s.uploads.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let id = Uuid::new_v4();
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"send_message","text":"hi"}"#).unwrap();
        assert_eq!(
            Intent::from(parsed),
            Intent::SendMessage { text: "hi".into() }
        );

        let parsed: ClientMessage = serde_json::from_str(&format!(
            r#"{{"type":"delete_conversation","conversation_id":"{id}"}}"#
        ))
        .unwrap();
        assert_eq!(
            Intent::from(parsed),
            Intent::DeleteConversation {
                id: ConversationId::from_uuid(id)
            }
        );

        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"create_conversation"}"#).unwrap();
        assert_eq!(
            Intent::from(parsed),
            Intent::CreateConversation { title: None }
        );
    }

    #[test]
    fn unknown_client_message_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
    }

    #[test]
    fn snapshot_serializes_with_type_tag_and_snake_case() {
        let snapshot = SessionSnapshot {
            conversations: vec![Conversation {
                id: ConversationId::new(),
                title: "Team Discussion".into(),
                category: ConversationCategory::Group,
                unread_count: Some(3),
            }],
            active_conversation_id: None,
            active_title: None,
            messages: Vec::new(),
            awaiting_response: false,
            uploads: vec![UploadedFile {
                name: "a.pdf".into(),
                status: UploadStatus::Processing,
                page_count: None,
            }],
        };
        let json = serde_json::to_value(ServerMessage::Snapshot(snapshot.into())).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["conversations"][0]["category"], "group");
        assert_eq!(json["conversations"][0]["unread_count"], 3);
        assert_eq!(json["uploads"][0]["status"], "processing");
        assert!(json["uploads"][0].get("page_count").is_none());
    }
}
