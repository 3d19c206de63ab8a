//! Remote Data Gateway
//!
//! The booking backend is an external service. This module defines the
//! boundary the workflow talks to and a Supabase implementation of it.
//!
//! ## Architecture
//!
//! - **Gateway**: trait covering appointment records and authentication
//! - **SupabaseGateway**: PostgREST + GoTrue over HTTP
//! - **SessionFile**: persisted auth tokens for session recovery

mod session_file;
mod supabase;

#[cfg(test)]
pub(crate) mod mock;

pub use session_file::{SessionFile, StoredTokens};
pub use supabase::{GatewayConfig, SupabaseGateway};

use crate::models::{Appointment, AppointmentPatch, NewAppointment, Profile, Session};
use async_trait::async_trait;
use thiserror::Error;

/// Operations the appointment workflow needs from the backend
///
/// Implementations are pure pass-through: no retries, no caching.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Recover a previously established session, if any
    async fn get_session(&self) -> GatewayResult<Option<Session>>;

    /// Register a new account
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &Profile,
    ) -> GatewayResult<SignUpOutcome>;

    /// Authenticate with email and password
    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Session>;

    /// End the current session
    async fn sign_out(&self) -> GatewayResult<()>;

    /// Store a new appointment and return its id
    async fn insert_appointment(&self, record: &NewAppointment) -> GatewayResult<String>;

    /// Appointments booked with `email`, ascending by date
    async fn query_appointments_by_email(&self, email: &str) -> GatewayResult<Vec<Appointment>>;

    /// Appointments owned by `owner_id`, ascending by date
    async fn query_appointments_by_owner(&self, owner_id: &str)
        -> GatewayResult<Vec<Appointment>>;

    /// Apply a partial update to one appointment
    async fn update_appointment(&self, id: &str, patch: &AppointmentPatch) -> GatewayResult<()>;
}

/// Result of a sign-up
///
/// `session` is absent when the backend requires email confirmation
/// before the account can sign in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub session: Option<Session>,
    pub user_id: String,
    pub email: String,
}

/// Errors surfaced by gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The client handle could not be built or the backend is unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// Sign-in or sign-up rejected
    #[error("{0}")]
    Auth(String),

    /// Insert, query or update rejected
    #[error("{0}")]
    Store(String),

    /// Response could not be decoded
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Message suitable for showing to the user verbatim
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
