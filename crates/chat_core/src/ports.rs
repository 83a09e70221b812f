//! crates/chat_core/src/ports.rs
//!
//! Defines the contracts between the session core and the outside world.
//! The core never reaches for an ambient RNG or panics on bad references;
//! both concerns cross this boundary explicitly.

use crate::domain::ConversationId;

//=========================================================================================
// Core Error and Result Types
//=========================================================================================

/// Errors raised by core operations with a precondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

//=========================================================================================
// Randomness Port
//=========================================================================================

/// Source of the randomness used by the simulators.
///
/// Injected so tests can script delays, answer choices and page counts.
pub trait RandomSource: Send {
    /// Returns a uniformly distributed value in `[low, high)`.
    ///
    /// Callers always pass `low < high`.
    fn gen_range(&mut self, low: u64, high: u64) -> u64;
}
