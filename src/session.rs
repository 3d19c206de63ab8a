//! Session Store
//!
//! Holds the signed-in identity for the lifetime of the application state.
//! Only the explicit auth operations write to it.

use crate::models::Session;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    current: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Replace the active session; at most one is held
    pub fn set(&mut self, session: Session) {
        tracing::debug!(user_id = %session.user_id, "Session set");
        self.current = Some(session);
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("Session cleared");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    /// Owner id for new appointments
    pub fn owner_id(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.user_id.as_str())
    }
}
