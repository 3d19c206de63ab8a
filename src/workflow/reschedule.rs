//! Reschedule dialog
//!
//! Collects the new date and time one answer at a time without blocking:
//! Closed -> AwaitingDate -> AwaitingTime -> Submitting -> Closed.
//! Dismissing or leaving an answer empty returns to Closed with no update.

use crate::models::{parse_time, parse_upcoming_date, ValidationError};
use chrono::NaiveDate;

pub const DATE_PROMPT: &str = "Enter new date (YYYY-MM-DD):";
pub const TIME_PROMPT: &str = "Enter new time (e.g. 10:00):";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RescheduleDialog {
    #[default]
    Closed,
    AwaitingDate {
        id: String,
    },
    AwaitingTime {
        id: String,
        date: String,
    },
    Submitting {
        id: String,
        date: String,
        time: String,
    },
}

/// What happened after an answer was entered
#[derive(Debug, Clone, PartialEq)]
pub enum DialogStep {
    /// Waiting for the next answer
    Prompt(&'static str),
    /// Both answers collected; the update may be sent
    Ready {
        id: String,
        date: String,
        time: String,
    },
    /// Empty answer or dismissal; nothing happens
    Aborted,
    /// Answer rejected; the same question stays open
    Invalid(ValidationError),
    /// The answer did not fit the dialog's current state
    Ignored,
}

fn answered(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

impl RescheduleDialog {
    /// Start collecting a new slot for appointment `id`
    pub fn open(&mut self, id: impl Into<String>) -> DialogStep {
        *self = RescheduleDialog::AwaitingDate { id: id.into() };
        DialogStep::Prompt(DATE_PROMPT)
    }

    /// Answer the date question; the new date may not fall before `today`
    pub fn enter_date(&mut self, input: Option<&str>, today: NaiveDate) -> DialogStep {
        let RescheduleDialog::AwaitingDate { id } = self else {
            return DialogStep::Ignored;
        };

        let Some(answer) = answered(input) else {
            self.dismiss();
            return DialogStep::Aborted;
        };

        match parse_upcoming_date(answer, today) {
            Ok(date) => {
                *self = RescheduleDialog::AwaitingTime {
                    id: std::mem::take(id),
                    date,
                };
                DialogStep::Prompt(TIME_PROMPT)
            }
            Err(e) => DialogStep::Invalid(e),
        }
    }

    pub fn enter_time(&mut self, input: Option<&str>) -> DialogStep {
        let RescheduleDialog::AwaitingTime { id, date } = self else {
            return DialogStep::Ignored;
        };

        let Some(answer) = answered(input) else {
            self.dismiss();
            return DialogStep::Aborted;
        };

        match parse_time(answer) {
            Ok(time) => {
                let id = std::mem::take(id);
                let date = std::mem::take(date);
                *self = RescheduleDialog::Submitting {
                    id: id.clone(),
                    date: date.clone(),
                    time: time.clone(),
                };
                DialogStep::Ready { id, date, time }
            }
            Err(e) => DialogStep::Invalid(e),
        }
    }

    /// Close after the update finished, whatever its outcome
    pub fn finish(&mut self) {
        *self = RescheduleDialog::Closed;
    }

    pub fn dismiss(&mut self) {
        *self = RescheduleDialog::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, RescheduleDialog::Closed)
    }

    /// Question currently shown, if any
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            RescheduleDialog::AwaitingDate { .. } => Some(DATE_PROMPT),
            RescheduleDialog::AwaitingTime { .. } => Some(TIME_PROMPT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    #[test]
    fn test_full_flow() {
        let mut dialog = RescheduleDialog::default();
        assert_eq!(dialog.open("7"), DialogStep::Prompt(DATE_PROMPT));
        assert_eq!(dialog.enter_date(Some("2030-01-05"), today()), DialogStep::Prompt(TIME_PROMPT));
        assert_eq!(
            dialog.enter_time(Some("9:30")),
            DialogStep::Ready {
                id: "7".to_string(),
                date: "2030-01-05".to_string(),
                time: "09:30".to_string(),
            }
        );
        assert!(matches!(dialog, RescheduleDialog::Submitting { .. }));

        dialog.finish();
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_empty_date_aborts() {
        let mut dialog = RescheduleDialog::default();
        dialog.open("7");
        assert_eq!(dialog.enter_date(Some("  "), today()), DialogStep::Aborted);
        assert_eq!(dialog, RescheduleDialog::Closed);
    }

    #[test]
    fn test_missing_time_aborts() {
        let mut dialog = RescheduleDialog::default();
        dialog.open("7");
        dialog.enter_date(Some("2030-01-05"), today());
        assert_eq!(dialog.enter_time(None), DialogStep::Aborted);
        assert_eq!(dialog, RescheduleDialog::Closed);
    }

    #[test]
    fn test_invalid_answer_keeps_question_open() {
        let mut dialog = RescheduleDialog::default();
        dialog.open("7");
        assert!(matches!(dialog.enter_date(Some("next tuesday"), today()), DialogStep::Invalid(_)));
        assert_eq!(dialog.prompt(), Some(DATE_PROMPT));
    }

    #[test]
    fn test_dismiss_mid_flow() {
        let mut dialog = RescheduleDialog::default();
        dialog.open("7");
        dialog.enter_date(Some("2030-01-05"), today());
        dialog.dismiss();
        assert_eq!(dialog.enter_time(Some("10:00")), DialogStep::Ignored);
    }

    #[test]
    fn test_past_date_rejected() {
        let mut dialog = RescheduleDialog::default();
        dialog.open("7");
        assert_eq!(
            dialog.enter_date(Some("2000-01-01"), today()),
            DialogStep::Invalid(ValidationError::DateInPast {
                date: "2000-01-01".to_string()
            })
        );
        assert_eq!(dialog.prompt(), Some(DATE_PROMPT));

        assert_eq!(dialog.enter_date(Some("2025-05-20"), today()), DialogStep::Prompt(TIME_PROMPT));
    }
}
