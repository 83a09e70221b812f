//! crates/chat_core/src/session.rs
//!
//! The session controller. It is the single owner of all mutable chat state and
//! the only place intents and simulator events are turned into mutations.

use crate::domain::{
    Conversation, ConversationCategory, ConversationId, Role, SessionSnapshot, UploadStatus,
};
use crate::ports::{CoreResult, RandomSource};
use crate::registry::ConversationRegistry;
use crate::simulator::{ResponseSimulator, ScheduledEvent, SimulatorEvent, UploadSimulator};
use crate::store::MessageStore;
use crate::uploads::UploadTracker;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Characters of the first message used to title an implicit conversation.
pub const IMPLICIT_TITLE_CHARS: usize = 30;

/// A user intent emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SendMessage { text: String },
    UploadFiles { names: Vec<String> },
    SelectConversation { id: ConversationId },
    CreateConversation { title: Option<String> },
    DeleteConversation { id: ConversationId },
    RemoveUpload { name: String },
}

/// What became of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    Accepted,
    /// A message was stored in the given conversation and a reply is scheduled.
    Sent(ConversationId),
    /// The intent was valid to send but changed nothing.
    Ignored,
    Created(ConversationId),
}

/// The result of handling an intent: its outcome and the events the runtime
/// must deliver back through [`SessionController::fire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub outcome: IntentOutcome,
    pub scheduled: Vec<ScheduledEvent>,
}

impl Dispatch {
    fn immediate(outcome: IntentOutcome) -> Self {
        Self {
            outcome,
            scheduled: Vec::new(),
        }
    }
}

/// The sidebar rows every fresh session starts with.
pub fn seed_conversations() -> Vec<Conversation> {
    let row = |title: &str, category, unread_count| Conversation {
        id: ConversationId::new(),
        title: title.to_string(),
        category,
        unread_count,
    };
    vec![
        row("Project Architecture", ConversationCategory::Private, None),
        row("Research Papers", ConversationCategory::Private, None),
        row("Team Discussion", ConversationCategory::Group, Some(3)),
    ]
}

pub struct SessionController {
    registry: ConversationRegistry,
    messages: MessageStore,
    uploads: UploadTracker,
    awaiting_response: bool,
    responder: ResponseSimulator,
    pipeline: UploadSimulator,
    rng: Box<dyn RandomSource>,
}

impl SessionController {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            registry: ConversationRegistry::new(),
            messages: MessageStore::new(),
            uploads: UploadTracker::new(),
            awaiting_response: false,
            responder: ResponseSimulator,
            pipeline: UploadSimulator,
            rng,
        }
    }

    /// Builds a controller pre-populated with the given sidebar rows.
    pub fn with_conversations(
        rng: Box<dyn RandomSource>,
        conversations: impl IntoIterator<Item = Conversation>,
    ) -> Self {
        let mut controller = Self::new(rng);
        for conversation in conversations {
            controller.registry.seed(conversation);
        }
        controller
    }

    pub fn handle(&mut self, intent: Intent) -> Dispatch {
        match intent {
            Intent::SendMessage { text } => self.send_message(&text),
            Intent::UploadFiles { names } => self.upload_files(&names),
            Intent::SelectConversation { id } => match self.select_conversation(id) {
                Ok(()) => Dispatch::immediate(IntentOutcome::Accepted),
                Err(e) => {
                    warn!("Ignoring selection: {}", e);
                    Dispatch::immediate(IntentOutcome::Ignored)
                }
            },
            Intent::CreateConversation { title } => {
                let id = self.create_conversation(title.as_deref());
                Dispatch::immediate(IntentOutcome::Created(id))
            }
            Intent::DeleteConversation { id } => {
                if self.delete_conversation(id) {
                    Dispatch::immediate(IntentOutcome::Accepted)
                } else {
                    Dispatch::immediate(IntentOutcome::Ignored)
                }
            }
            Intent::RemoveUpload { name } => {
                if self.remove_upload(&name) > 0 {
                    Dispatch::immediate(IntentOutcome::Accepted)
                } else {
                    Dispatch::immediate(IntentOutcome::Ignored)
                }
            }
        }
    }

    pub fn create_conversation(&mut self, title: Option<&str>) -> ConversationId {
        let id = self.registry.create(title);
        info!("Created conversation {}", id);
        id
    }

    pub fn select_conversation(&mut self, id: ConversationId) -> CoreResult<()> {
        self.registry.select(id)
    }

    /// Deletes the conversation and its history. Returns whether it existed.
    pub fn delete_conversation(&mut self, id: ConversationId) -> bool {
        let existed = self.registry.delete(id);
        self.messages.delete_conversation(id);
        if existed {
            info!("Deleted conversation {}", id);
        }
        existed
    }

    pub fn send_message(&mut self, text: &str) -> Dispatch {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty message.");
            return Dispatch::immediate(IntentOutcome::Ignored);
        }
        if self.awaiting_response {
            debug!("Ignoring message while a response is outstanding.");
            return Dispatch::immediate(IntentOutcome::Ignored);
        }

        let target = match self.registry.active_id() {
            Some(id) => id,
            None => {
                let title: String = text.chars().take(IMPLICIT_TITLE_CHARS).collect();
                self.create_conversation(Some(&title))
            }
        };

        self.messages
            .append(target, Role::User, text.to_string(), Vec::new(), Utc::now());
        self.awaiting_response = true;

        let scheduled = self.responder.schedule(target, self.rng.as_mut());
        debug!(
            "Response for conversation {} scheduled in {:?}",
            target, scheduled.delay
        );
        Dispatch {
            outcome: IntentOutcome::Sent(target),
            scheduled: vec![scheduled],
        }
    }

    pub fn upload_files(&mut self, names: &[String]) -> Dispatch {
        let mut scheduled = Vec::with_capacity(names.len() * 2);
        for name in names {
            self.uploads.add(name);
            scheduled.extend(self.pipeline.schedule(name));
        }
        info!("Tracking {} new upload(s).", names.len());
        let outcome = if names.is_empty() {
            IntentOutcome::Ignored
        } else {
            IntentOutcome::Accepted
        };
        Dispatch { outcome, scheduled }
    }

    /// Stops tracking every upload with this name. Returns how many were removed.
    pub fn remove_upload(&mut self, name: &str) -> usize {
        let removed = self.uploads.remove(name);
        if removed > 0 {
            info!("Removed {} upload(s) named {}.", removed, name);
        }
        removed
    }

    /// Applies a simulator event whose delay has elapsed.
    pub fn fire(&mut self, event: SimulatorEvent) {
        match event {
            SimulatorEvent::ResponseReady { conversation_id } => {
                self.awaiting_response = false;
                if !self.registry.contains(conversation_id) {
                    warn!(
                        "Dropping response for deleted conversation {}",
                        conversation_id
                    );
                    return;
                }
                let response = self.responder.respond(self.rng.as_mut());
                self.messages.append(
                    conversation_id,
                    Role::Assistant,
                    response.content,
                    response.sources,
                    Utc::now(),
                );
            }
            SimulatorEvent::UploadProcessing { name } => {
                self.uploads.advance(&name, UploadStatus::Processing, None);
            }
            SimulatorEvent::UploadReady { name } => {
                let pages = self.pipeline.page_count(self.rng.as_mut());
                if self.uploads.advance(&name, UploadStatus::Ready, Some(pages)) > 0 {
                    info!("Upload {} ready with {} pages.", name, pages);
                }
            }
        }
    }

    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    pub fn active_conversation_id(&self) -> Option<ConversationId> {
        self.registry.active_id()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let active = self.registry.active_id();
        SessionSnapshot {
            conversations: self.registry.list().to_vec(),
            active_conversation_id: active,
            active_title: self.registry.active_title(),
            messages: active
                .map(|id| self.messages.messages(id).to_vec())
                .unwrap_or_default(),
            awaiting_response: self.awaiting_response,
            uploads: self.uploads.list().to_vec(),
        }
    }
}
