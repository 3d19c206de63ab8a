//! Connection status indicator

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Disconnected,
    Connected,
    Error,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusState::Disconnected => "disconnected",
            StatusState::Connected => "connected",
            StatusState::Error => "error",
        }
    }
}

/// State plus the short label shown next to it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectionStatus {
    pub state: StatusState,
    pub label: String,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self {
            state: StatusState::Disconnected,
            label: "Not connected — running in demo mode".to_string(),
        }
    }

    pub fn connected() -> Self {
        Self {
            state: StatusState::Connected,
            label: "Connected ✓".to_string(),
        }
    }

    pub fn signed_in(email: &str) -> Self {
        Self {
            state: StatusState::Connected,
            label: format!("Connected — signed in as {}", email),
        }
    }

    pub fn error() -> Self {
        Self {
            state: StatusState::Error,
            label: "Connection failed — check your credentials".to_string(),
        }
    }

    /// CSS class list for the status dot
    pub fn dot_class(&self) -> String {
        format!("sb-status__dot {}", self.state.as_str())
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.state.as_str(), self.label)
    }
}
