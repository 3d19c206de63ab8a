//! Domain types
//!
//! This module defines the records exchanged with the remote store and the
//! identity returned by the auth service:
//! - `Appointment`: a stored visit as read back from the backend
//! - `NewAppointment` / `AppointmentPatch`: the insert and update wire shapes
//! - `BookingForm`: raw form input and its validation
//! - `Session`: the signed-in identity

mod appointment;
mod booking;
mod session;

pub use appointment::{
    format_service, Appointment, AppointmentPatch, AppointmentStatus, NewAppointment, Service,
    DATE_FORMAT, TIME_FORMAT,
};
pub(crate) use appointment::deserialize_id;
pub use booking::{parse_date, parse_time, parse_upcoming_date, BookingForm, ValidationError};
pub use session::{Profile, Session};
