//! crates/chat_core/src/registry.rs
//!
//! The conversation registry: sidebar rows plus the active selection.

use crate::domain::{Conversation, ConversationCategory, ConversationId};
use crate::ports::{CoreError, CoreResult};

/// Title given to conversations created from the "new chat" button.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Header title shown when the active id has no matching row.
pub const FALLBACK_TITLE: &str = "Chat";

#[derive(Debug, Default)]
pub struct ConversationRegistry {
    conversations: Vec<Conversation>,
    active_id: Option<ConversationId>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pre-existing conversation without touching the selection.
    pub fn seed(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
    }

    /// Appends a fresh private conversation and makes it active.
    pub fn create(&mut self, title: Option<&str>) -> ConversationId {
        let id = ConversationId::new();
        self.conversations.push(Conversation {
            id,
            title: title.unwrap_or(DEFAULT_TITLE).to_string(),
            category: ConversationCategory::Private,
            unread_count: None,
        });
        self.active_id = Some(id);
        id
    }

    pub fn select(&mut self, id: ConversationId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::ConversationNotFound(id));
        }
        self.active_id = Some(id);
        Ok(())
    }

    /// Removes the conversation, clearing the selection if it pointed here.
    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: ConversationId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.active_id == Some(id) {
            self.active_id = None;
        }
        self.conversations.len() != before
    }

    pub fn contains(&self, id: ConversationId) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.active_id
    }

    pub fn active_title(&self) -> Option<String> {
        self.active_id.map(|id| {
            self.get(id)
                .map_or_else(|| FALLBACK_TITLE.to_string(), |c| c.title.clone())
        })
    }
}
