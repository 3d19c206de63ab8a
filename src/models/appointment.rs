//! Appointment records and their wire shapes
//!
//! Field names match the `appointments` table columns exactly so the same
//! structs serialize straight into PostgREST request bodies.

use serde::{Deserialize, Deserializer, Serialize};

/// Wire format for appointment dates (zero-padded ISO calendar date)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for appointment times (24-hour clock)
pub const TIME_FORMAT: &str = "%H:%M";

/// Lifecycle tag of an appointment
///
/// Moves forward only: confirmed on booking, rescheduled after a date/time
/// change, cancelled on cancellation. The client always sets the next value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Rescheduled,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Services offered by the clinic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    GeneralCheckup,
    Cardiology,
    Dermatology,
    Pediatrics,
    Orthopedics,
    MentalHealth,
    DentalCare,
    LabTests,
}

impl Service {
    /// Get all services in booking-form order
    pub fn all() -> &'static [Service] {
        &[
            Service::GeneralCheckup,
            Service::Cardiology,
            Service::Dermatology,
            Service::Pediatrics,
            Service::Orthopedics,
            Service::MentalHealth,
            Service::DentalCare,
            Service::LabTests,
        ]
    }

    /// Slug stored in the `service` column
    pub fn slug(&self) -> &'static str {
        match self {
            Service::GeneralCheckup => "general-checkup",
            Service::Cardiology => "cardiology",
            Service::Dermatology => "dermatology",
            Service::Pediatrics => "pediatrics",
            Service::Orthopedics => "orthopedics",
            Service::MentalHealth => "mental-health",
            Service::DentalCare => "dental-care",
            Service::LabTests => "lab-tests",
        }
    }

    pub fn display_name(&self) -> String {
        format_service(self.slug())
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::all()
            .iter()
            .copied()
            .find(|service| service.slug() == s)
            .ok_or_else(|| format!("unknown service: {}", s))
    }
}

/// Convert a service slug into a display name
///
/// Hyphens become spaces and every word starts upper-case:
/// `general-checkup` -> `General Checkup`. Works on any slug, including ones
/// this build does not know about.
pub fn format_service(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;

    for c in slug.chars() {
        let c = if c == '-' { ' ' } else { c };
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }

    out
}

/// An appointment as stored remotely
///
/// Date and time are kept exactly as the store returned them; the store owns
/// ordering and this client never re-sorts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub service: String,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn service_name(&self) -> String {
        format_service(&self.service)
    }
}

/// Accept both text and numeric primary keys
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unsupported appointment id: {}",
            other
        ))),
    }
}

/// Insert body for a new appointment
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAppointment {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Service,
    pub appointment_date: String,
    pub appointment_time: String,
    pub notes: Option<String>,
    pub user_id: Option<String>,
    pub status: AppointmentStatus,
}

/// Partial update body
///
/// Only the fields that are set are sent, so a cancellation touches nothing
/// but `status`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    pub status: AppointmentStatus,
}

impl AppointmentPatch {
    pub fn reschedule(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            appointment_date: Some(date.into()),
            appointment_time: Some(time.into()),
            status: AppointmentStatus::Rescheduled,
        }
    }

    pub fn cancel() -> Self {
        Self {
            appointment_date: None,
            appointment_time: None,
            status: AppointmentStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_service() {
        assert_eq!(format_service("general-checkup"), "General Checkup");
        assert_eq!(format_service("cardiology"), "Cardiology");
        assert_eq!(format_service("x-ray-imaging"), "X Ray Imaging");
        assert_eq!(format_service(""), "");
    }

    #[test]
    fn test_service_slug_roundtrip() {
        for service in Service::all() {
            assert_eq!(service.slug().parse::<Service>().unwrap(), *service);
        }
        assert!("astrology".parse::<Service>().is_err());
    }

    #[test]
    fn test_service_serializes_as_slug() {
        let json = serde_json::to_string(&Service::MentalHealth).unwrap();
        assert_eq!(json, "\"mental-health\"");
    }

    #[test]
    fn test_appointment_accepts_numeric_id() {
        let json = r#"{
            "id": 42,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone": null,
            "service": "general-checkup",
            "appointment_date": "2025-06-01",
            "appointment_time": "10:00:00",
            "notes": null,
            "user_id": null,
            "status": "confirmed",
            "created_at": "2025-05-20T08:00:00Z"
        }"#;

        let apt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(apt.id, "42");
        assert_eq!(apt.status, AppointmentStatus::Confirmed);
        assert_eq!(apt.service_name(), "General Checkup");
    }

    #[test]
    fn test_cancel_patch_only_sends_status() {
        let json = serde_json::to_value(AppointmentPatch::cancel()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "cancelled" }));
    }

    #[test]
    fn test_reschedule_patch() {
        let json = serde_json::to_value(AppointmentPatch::reschedule("2025-07-01", "14:30")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "appointment_date": "2025-07-01",
                "appointment_time": "14:30",
                "status": "rescheduled"
            })
        );
    }
}
