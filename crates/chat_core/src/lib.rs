pub mod domain;
pub mod ports;
pub mod registry;
pub mod session;
pub mod simulator;
pub mod store;
pub mod uploads;

pub use domain::{
    Conversation, ConversationCategory, ConversationId, Message, MessageId, Role,
    SessionSnapshot, Source, UploadStatus, UploadedFile,
};
pub use ports::{CoreError, CoreResult, RandomSource};
pub use session::{seed_conversations, Dispatch, Intent, IntentOutcome, SessionController};
pub use simulator::{ScheduledEvent, SimulatorEvent};
