//! crates/chat_core/src/store.rs
//!
//! The message store. Sole owner of conversation id -> message history.

use crate::domain::{ConversationId, Message, MessageId, Role, Source};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MessageStore {
    histories: HashMap<ConversationId, Vec<Message>>,
    next_id: MessageId,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the end of the conversation's history, creating it if absent.
    pub fn append(
        &mut self,
        conversation_id: ConversationId,
        role: Role,
        content: String,
        sources: Vec<Source>,
        timestamp: DateTime<Utc>,
    ) -> MessageId {
        self.next_id += 1;
        let id = self.next_id;
        self.histories
            .entry(conversation_id)
            .or_default()
            .push(Message {
                id,
                role,
                content,
                sources,
                timestamp,
            });
        id
    }

    pub fn messages(&self, conversation_id: ConversationId) -> &[Message] {
        self.histories
            .get(&conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn delete_conversation(&mut self, conversation_id: ConversationId) {
        self.histories.remove(&conversation_id);
    }

    pub fn has_history(&self, conversation_id: ConversationId) -> bool {
        self.histories.contains_key(&conversation_id)
    }
}
