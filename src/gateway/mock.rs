//! Recording gateway for workflow tests

use super::{Gateway, GatewayError, GatewayResult, SignUpOutcome};
use crate::models::{Appointment, AppointmentPatch, NewAppointment, Profile, Session};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetSession,
    SignUp(String),
    SignIn(String),
    SignOut,
    Insert(NewAppointment),
    QueryByEmail(String),
    QueryByOwner(String),
    Update(String, AppointmentPatch),
}

/// In-memory gateway that records every call
///
/// Queries return stored rows in insertion order so tests control the
/// ordering the "remote" side reports.
#[derive(Default)]
pub(crate) struct MockGateway {
    pub calls: Mutex<Vec<Call>>,
    pub rows: Mutex<Vec<Appointment>>,
    pub stored_session: Mutex<Option<Session>>,
    pub store_error: Mutex<Option<String>>,
    pub auth_error: Mutex<Option<String>>,
    /// Only sign-in is refused (unconfirmed email)
    pub sign_in_error: Mutex<Option<String>>,
    /// Sign-up hands back a session (auto-confirmed project)
    pub sign_up_returns_session: bool,
    /// Every call waits this long first
    pub delay: Option<Duration>,
    /// Every call waits for a notification first
    pub gate: Option<Arc<Notify>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: Vec<Appointment>) -> Self {
        *self.rows.lock().unwrap() = rows;
        self
    }

    pub fn with_session(self, session: Session) -> Self {
        *self.stored_session.lock().unwrap() = Some(session);
        self
    }

    pub fn failing_store(self, message: &str) -> Self {
        *self.store_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_auth(self, message: &str) -> Self {
        *self.auth_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn refusing_sign_in(self, message: &str) -> Self {
        *self.sign_in_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn updates(&self) -> usize {
        self.count(|c| matches!(c, Call::Update(..)))
    }

    async fn enter(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn store_result(&self) -> GatewayResult<()> {
        match self.store_error.lock().unwrap().clone() {
            Some(message) => Err(GatewayError::Store(message)),
            None => Ok(()),
        }
    }

    fn auth_result(&self) -> GatewayResult<()> {
        match self.auth_error.lock().unwrap().clone() {
            Some(message) => Err(GatewayError::Auth(message)),
            None => Ok(()),
        }
    }
}

pub(crate) fn appointment(id: &str, email: &str, date: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        phone: None,
        service: "general-checkup".to_string(),
        appointment_date: date.to_string(),
        appointment_time: "10:00".to_string(),
        notes: None,
        user_id: None,
        status: crate::models::AppointmentStatus::Confirmed,
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn get_session(&self) -> GatewayResult<Option<Session>> {
        self.enter(Call::GetSession).await;
        Ok(self.stored_session.lock().unwrap().clone())
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        profile: &Profile,
    ) -> GatewayResult<SignUpOutcome> {
        self.enter(Call::SignUp(email.to_string())).await;
        self.auth_result()?;

        let session = Session::new("new-user", email).with_profile(profile.clone());
        Ok(SignUpOutcome {
            user_id: session.user_id.clone(),
            email: email.to_string(),
            session: self.sign_up_returns_session.then_some(session),
        })
    }

    async fn sign_in(&self, email: &str, _password: &str) -> GatewayResult<Session> {
        self.enter(Call::SignIn(email.to_string())).await;
        self.auth_result()?;
        if let Some(message) = self.sign_in_error.lock().unwrap().clone() {
            return Err(GatewayError::Auth(message));
        }

        let session = Session::new("user-1", email);
        *self.stored_session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.enter(Call::SignOut).await;
        *self.stored_session.lock().unwrap() = None;
        Ok(())
    }

    async fn insert_appointment(&self, record: &NewAppointment) -> GatewayResult<String> {
        self.enter(Call::Insert(record.clone())).await;
        self.store_result()?;

        let mut rows = self.rows.lock().unwrap();
        let id = (rows.len() + 1).to_string();
        rows.push(Appointment {
            id: id.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            service: record.service.slug().to_string(),
            appointment_date: record.appointment_date.clone(),
            appointment_time: record.appointment_time.clone(),
            notes: record.notes.clone(),
            user_id: record.user_id.clone(),
            status: record.status,
        });
        Ok(id)
    }

    async fn query_appointments_by_email(&self, email: &str) -> GatewayResult<Vec<Appointment>> {
        self.enter(Call::QueryByEmail(email.to_string())).await;
        self.store_result()?;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.email == email)
            .cloned()
            .collect())
    }

    async fn query_appointments_by_owner(
        &self,
        owner_id: &str,
    ) -> GatewayResult<Vec<Appointment>> {
        self.enter(Call::QueryByOwner(owner_id.to_string())).await;
        self.store_result()?;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn update_appointment(&self, id: &str, patch: &AppointmentPatch) -> GatewayResult<()> {
        self.enter(Call::Update(id.to_string(), patch.clone())).await;
        self.store_result()?;

        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            if let Some(date) = &patch.appointment_date {
                row.appointment_date = date.clone();
            }
            if let Some(time) = &patch.appointment_time {
                row.appointment_time = time.clone();
            }
            row.status = patch.status;
        }
        Ok(())
    }
}
