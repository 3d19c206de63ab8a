//! What the workflow hands back to the view layer
//!
//! Operations never touch markup themselves; they return these values and
//! the renderer turns them into fragments.

use crate::models::{Appointment, Session};
use crate::status::ConnectionStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Inline form message or alert text
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Contents of an appointment list container
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ListView {
    /// The lookup could not run (missing input or no backend)
    Prompt { message: String },
    /// The query ran and matched nothing
    Empty { message: String },
    /// The query failed
    Error { message: String },
    /// Rows in the order the store returned them
    Rows {
        appointments: Vec<Appointment>,
        with_actions: bool,
    },
}

impl ListView {
    pub fn message(&self) -> Option<&str> {
        match self {
            ListView::Prompt { message }
            | ListView::Empty { message }
            | ListView::Error { message } => Some(message),
            ListView::Rows { .. } => None,
        }
    }

    pub fn appointments(&self) -> &[Appointment] {
        match self {
            ListView::Rows { appointments, .. } => appointments,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ListView::Error { .. })
    }
}

/// Signed-in user panel
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserPanel {
    pub name: String,
    pub initial: String,
    pub email: String,
    pub appointments: ListView,
}

impl UserPanel {
    pub fn new(session: &Session, appointments: ListView) -> Self {
        Self {
            name: session.display_name(),
            initial: session.avatar_initial(),
            email: session.email.clone(),
            appointments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    pub notice: Notice,
    /// Refreshed personal list when a session is active
    pub owner_appointments: Option<ListView>,
}

/// Result of a reschedule or cancellation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationOutcome {
    /// Absent when the user backed out
    pub notice: Option<Notice>,
    /// Re-run of the last lookup
    pub lookup: Option<ListView>,
    pub owner_appointments: Option<ListView>,
}

impl MutationOutcome {
    pub fn aborted() -> Self {
        Self::default()
    }

    pub fn with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub notice: Notice,
    /// Present once signed in; the anonymous auth view shows otherwise
    pub panel: Option<UserPanel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOutcome {
    pub status: ConnectionStatus,
    /// Alert for configuration problems
    pub notice: Option<Notice>,
    /// Recovered session
    pub panel: Option<UserPanel>,
}
