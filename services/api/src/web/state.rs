//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every handler.

use crate::config::Config;
use crate::runtime::SessionHandle;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    /// Read by the router for per-route limits.
    pub config: Arc<Config>,
}
