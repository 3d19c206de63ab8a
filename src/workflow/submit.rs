//! Booking submission state
//!
//! Idle -> Submitting -> {Confirmed, Failed}. The submit control is inert
//! only while Submitting.

use serde::Serialize;

pub const SUBMIT_LABEL: &str = "Confirm Appointment";
pub const SUBMITTING_LABEL: &str = "Booking…";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

impl SubmitState {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SubmitState::Submitting)
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            SubmitState::Submitting => SUBMITTING_LABEL,
            _ => SUBMIT_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_submitting_disables() {
        assert!(SubmitState::Idle.is_enabled());
        assert!(!SubmitState::Submitting.is_enabled());
        assert!(SubmitState::Confirmed.is_enabled());
        assert!(SubmitState::Failed.is_enabled());
        assert_eq!(SubmitState::Submitting.button_label(), "Booking…");
        assert_eq!(SubmitState::Failed.button_label(), "Confirm Appointment");
    }
}
