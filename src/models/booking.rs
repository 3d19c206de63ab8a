//! Booking form input and validation

use super::appointment::{AppointmentStatus, NewAppointment, Service, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw booking form fields, as typed by the patient
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
    #[serde(default)]
    pub notes: String,
}

/// Booking input that cannot be sent to the store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid date \"{0}\" (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid time \"{0}\" (expected HH:MM)")]
    InvalidTime(String),

    #[error("Appointment date {date} is in the past")]
    DateInPast { date: String },
}

/// Parse a calendar date and return it in the fixed wire format
pub fn parse_date(input: &str) -> Result<String, ValidationError> {
    parse_naive_date(input).map(|date| date.format(DATE_FORMAT).to_string())
}

/// Parse a calendar date that may not fall before `today`
pub fn parse_upcoming_date(input: &str, today: NaiveDate) -> Result<String, ValidationError> {
    let date = parse_naive_date(input)?;
    let formatted = date.format(DATE_FORMAT).to_string();
    if date < today {
        return Err(ValidationError::DateInPast { date: formatted });
    }
    Ok(formatted)
}

fn parse_naive_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Parse a wall-clock time and return it in the fixed wire format
///
/// Seconds are accepted on input and dropped.
pub fn parse_time(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(|time| time.format(TIME_FORMAT).to_string())
        .map_err(|_| ValidationError::InvalidTime(trimmed.to_string()))
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl BookingForm {
    /// Turn the form into an insert record
    ///
    /// `today` is the submission day; the appointment may not fall before it.
    pub fn validate(
        &self,
        owner: Option<&str>,
        today: NaiveDate,
    ) -> Result<NewAppointment, ValidationError> {
        let first_name = required(&self.first_name, "first name")?;
        let last_name = required(&self.last_name, "last name")?;
        let email = required(&self.email, "email")?;
        let service_slug = required(&self.service, "service")?;
        let date = required(&self.appointment_date, "appointment date")?;
        let time = required(&self.appointment_time, "appointment time")?;

        let service: Service = service_slug
            .parse()
            .map_err(|_| ValidationError::UnknownService(service_slug.to_string()))?;

        let appointment_date = parse_upcoming_date(date, today)?;
        let appointment_time = parse_time(time)?;

        Ok(NewAppointment {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: optional(&self.phone),
            service,
            appointment_date,
            appointment_time,
            notes: optional(&self.notes),
            user_id: owner.map(str::to_string),
            status: AppointmentStatus::Confirmed,
        })
    }

    /// Reset every field, as after a successful booking
    pub fn clear(&mut self) {
        *self = BookingForm::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == BookingForm::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn complete_form() -> BookingForm {
        BookingForm {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "".to_string(),
            service: "general-checkup".to_string(),
            appointment_date: "2025-06-01".to_string(),
            appointment_time: "10:00".to_string(),
            notes: "  ".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_form() {
        let record = complete_form().validate(Some("user-1"), today()).unwrap();

        assert_eq!(record.first_name, "Ada");
        assert_eq!(record.service, Service::GeneralCheckup);
        assert_eq!(record.phone, None);
        assert_eq!(record.notes, None);
        assert_eq!(record.user_id.as_deref(), Some("user-1"));
        assert_eq!(record.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_missing_email() {
        let mut form = complete_form();
        form.email = "   ".to_string();

        assert_eq!(
            form.validate(None, today()),
            Err(ValidationError::MissingField("email"))
        );
    }

    #[test]
    fn test_unknown_service() {
        let mut form = complete_form();
        form.service = "astrology".to_string();

        assert!(matches!(
            form.validate(None, today()),
            Err(ValidationError::UnknownService(_))
        ));
    }

    #[test]
    fn test_date_is_normalized() {
        let mut form = complete_form();
        form.appointment_date = "2025-6-1".to_string();
        form.appointment_time = "9:05:00".to_string();

        let record = form.validate(None, today()).unwrap();
        assert_eq!(record.appointment_date, "2025-06-01");
        assert_eq!(record.appointment_time, "09:05");
    }

    #[test]
    fn test_date_in_past_rejected() {
        let mut form = complete_form();
        form.appointment_date = "2025-05-19".to_string();

        assert!(matches!(
            form.validate(None, today()),
            Err(ValidationError::DateInPast { .. })
        ));
    }

    #[test]
    fn test_same_day_allowed() {
        let mut form = complete_form();
        form.appointment_date = "2025-05-20".to_string();

        assert!(form.validate(None, today()).is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_date("01/06/2025").is_err());
        assert!(parse_time("ten o'clock").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_clear() {
        let mut form = complete_form();
        form.clear();
        assert!(form.is_empty());
    }
}
