//! crates/chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the chat session.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a conversation for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Message identifier, monotonic in creation order.
pub type MessageId = u64;

/// Sidebar grouping of a conversation. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationCategory {
    Group,
    Private,
}

/// A named thread of messages, as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub category: ConversationCategory,
    // Display-only counter, only ever set on seed data.
    pub unread_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A document citation attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub document_name: String,
    pub page_number: Option<u32>,
}

impl Source {
    pub fn page(document_name: &str, page_number: u32) -> Self {
        Self {
            document_name: document_name.to_string(),
            page_number: Some(page_number),
        }
    }
}

/// A single entry in a conversation's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    /// Rich text body; its markup is opaque to the core.
    pub content: String,
    pub sources: Vec<Source>,
    pub timestamp: DateTime<Utc>,
}

/// Processing stage of an uploaded file. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStatus {
    Uploading,
    Processing,
    Ready,
}

impl UploadStatus {
    /// The stage a file must be in to enter `self`.
    pub fn predecessor(self) -> Option<UploadStatus> {
        match self {
            UploadStatus::Uploading => None,
            UploadStatus::Processing => Some(UploadStatus::Uploading),
            UploadStatus::Ready => Some(UploadStatus::Processing),
        }
    }
}

/// A file tracked by the upload banner, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub status: UploadStatus,
    /// Assigned only on entering `Ready`.
    pub page_count: Option<u32>,
}

/// Read-only view of the whole session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<ConversationId>,
    pub active_title: Option<String>,
    pub messages: Vec<Message>,
    pub awaiting_response: bool,
    pub uploads: Vec<UploadedFile>,
}
