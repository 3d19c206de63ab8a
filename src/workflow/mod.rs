//! Appointment Workflow
//!
//! The application-state object behind the booking page. It owns the
//! optional backend handle, the session store, the connection status and
//! the interaction state (submit button, reschedule dialog), and turns
//! form input plus gateway responses into view values.
//!
//! ## Modes
//!
//! - **Demo**: no backend configured. Bookings produce a confirmation
//!   message and nothing is stored.
//! - **Persisted**: every operation goes through the [`Gateway`], guarded by
//!   a timeout and a [`CancelToken`].
//!
//! Mutations never patch lists in memory; the affected lists are fetched
//! again from the store.

mod guard;
mod reschedule;
mod submit;
mod views;

pub use guard::{cancel_pair, CancelHandle, CancelToken};
pub use reschedule::{DialogStep, RescheduleDialog, DATE_PROMPT, TIME_PROMPT};
pub use submit::{SubmitState, SUBMITTING_LABEL, SUBMIT_LABEL};
pub use views::{
    AuthOutcome, BookingOutcome, ConnectOutcome, ListView, MutationOutcome, Notice, NoticeKind,
    UserPanel,
};

use crate::config::ConfigError;
use crate::gateway::{Gateway, GatewayConfig, GatewayResult, SupabaseGateway};
use crate::models::{AppointmentPatch, BookingForm, Profile, Session};
use crate::session::SessionStore;
use crate::status::ConnectionStatus;
use guard::guarded;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const CANCEL_CONFIRMATION: &str = "Are you sure you want to cancel this appointment?";

const NOT_CONNECTED: &str = "Please connect to the booking backend first.";
const LOOKUP_NEEDS_EMAIL: &str = "Please enter your email address.";
const LOOKUP_NOT_CONNECTED: &str = "Connect to the booking backend first to look up appointments.";
const LOOKUP_EMPTY: &str = "No appointments found for this email.";
const OWNER_EMPTY: &str = "No upcoming appointments.";
const OWNER_FAILED: &str = "Could not load appointments.";

/// Workflow tuning
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Upper bound for any single gateway call
    pub call_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(15),
        }
    }
}

/// Answer to the cancellation question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

pub struct AppointmentWorkflow {
    gateway: Option<Arc<dyn Gateway>>,
    session: SessionStore,
    status: ConnectionStatus,
    last_lookup: Option<String>,
    submit: watch::Sender<SubmitState>,
    dialog: RescheduleDialog,
    config: WorkflowConfig,
}

impl AppointmentWorkflow {
    /// Create a workflow in demo mode
    pub fn new(config: WorkflowConfig) -> Self {
        let (submit, _) = watch::channel(SubmitState::Idle);
        Self {
            gateway: None,
            session: SessionStore::new(),
            status: ConnectionStatus::disconnected(),
            last_lookup: None,
            submit,
            dialog: RescheduleDialog::Closed,
            config,
        }
    }

    /// Create a workflow bound to `gateway` without recovering a session
    pub fn with_gateway(gateway: Arc<dyn Gateway>, config: WorkflowConfig) -> Self {
        let mut workflow = Self::new(config);
        workflow.gateway = Some(gateway);
        workflow.status = ConnectionStatus::connected();
        workflow
    }

    pub fn is_demo_mode(&self) -> bool {
        self.gateway.is_none()
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Email of the most recent lookup, re-queried after mutations
    pub fn last_lookup(&self) -> Option<&str> {
        self.last_lookup.as_deref()
    }

    /// Subscribe to booking submit state changes
    pub fn submit_state(&self) -> watch::Receiver<SubmitState> {
        self.submit.subscribe()
    }

    pub fn current_submit_state(&self) -> SubmitState {
        *self.submit.borrow()
    }

    pub fn reschedule_dialog(&self) -> &RescheduleDialog {
        &self.dialog
    }

    async fn call<T, F>(&self, call: F, token: &CancelToken) -> GatewayResult<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        guarded(call, self.config.call_timeout, token).await
    }

    // ============================================
    // Connection and session
    // ============================================

    /// Build a Supabase handle and recover any stored session
    pub async fn connect(&mut self, config: GatewayConfig, token: &CancelToken) -> ConnectOutcome {
        if config.url.trim().is_empty() || config.anon_key.trim().is_empty() {
            return ConnectOutcome {
                status: self.status.clone(),
                notice: Some(Notice::error(ConfigError::MissingBackend.to_string())),
                panel: None,
            };
        }

        match SupabaseGateway::connect(config) {
            Ok(gateway) => self.attach_gateway(Arc::new(gateway), token).await,
            Err(e) => {
                tracing::error!(error = %e, "Backend connection failed");
                self.gateway = None;
                self.session.clear();
                self.status = ConnectionStatus::error();
                ConnectOutcome {
                    status: self.status.clone(),
                    notice: None,
                    panel: None,
                }
            }
        }
    }

    /// Switch to persisted mode and recover the session the gateway holds
    pub async fn attach_gateway(
        &mut self,
        gateway: Arc<dyn Gateway>,
        token: &CancelToken,
    ) -> ConnectOutcome {
        self.gateway = Some(Arc::clone(&gateway));
        self.session.clear();
        self.status = ConnectionStatus::connected();

        let panel = match self.call(gateway.get_session(), token).await {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.user_id, "Recovered existing session");
                self.status = ConnectionStatus::signed_in(&session.email);
                self.session.set(session);
                self.current_panel(token).await
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Session recovery failed");
                None
            }
        };

        ConnectOutcome {
            status: self.status.clone(),
            notice: None,
            panel,
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str, token: &CancelToken) -> AuthOutcome {
        let Some(gateway) = self.gateway.clone() else {
            return AuthOutcome {
                notice: Notice::error(NOT_CONNECTED),
                panel: None,
            };
        };

        match self.call(gateway.sign_in(email.trim(), password), token).await {
            Ok(session) => {
                let notice = Notice::success(format!("Welcome back! Signed in as {}", session.email));
                self.establish(session, notice, token).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-in rejected");
                AuthOutcome {
                    notice: Notice::error(e.message()),
                    panel: None,
                }
            }
        }
    }

    /// Register, then sign in straight away when the backend allows it
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        profile: Profile,
        token: &CancelToken,
    ) -> AuthOutcome {
        let Some(gateway) = self.gateway.clone() else {
            return AuthOutcome {
                notice: Notice::error(NOT_CONNECTED),
                panel: None,
            };
        };
        let email = email.trim();

        let outcome = match self.call(gateway.sign_up(email, password, &profile), token).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Sign-up rejected");
                return AuthOutcome {
                    notice: Notice::error(e.message()),
                    panel: None,
                };
            }
        };
        tracing::info!(
            user_id = %outcome.user_id,
            email = %outcome.email,
            confirmed = outcome.session.is_some(),
            "Account created"
        );

        if let Some(session) = outcome.session {
            let notice = Notice::success(format!(
                "Account created! You're now signed in as {}.",
                email
            ));
            return self.establish(session, notice, token).await;
        }

        // No session means the project wants email confirmation; signing in
        // still works when confirmation is switched off.
        match self.call(gateway.sign_in(email, password), token).await {
            Ok(session) => {
                let notice = Notice::success(format!("Account created and signed in as {}!", email));
                self.establish(session, notice, token).await
            }
            Err(e) => {
                tracing::debug!(error = %e, "Sign-in after sign-up not possible yet");
                AuthOutcome {
                    notice: Notice::success(
                        "Account created! If you receive a confirmation email, click the link then sign in. Otherwise, try signing in now.",
                    ),
                    panel: None,
                }
            }
        }
    }

    pub async fn sign_out(&mut self, token: &CancelToken) -> AuthOutcome {
        let Some(gateway) = self.gateway.clone() else {
            return AuthOutcome {
                notice: Notice::error(NOT_CONNECTED),
                panel: None,
            };
        };

        if let Err(e) = self.call(gateway.sign_out(), token).await {
            tracing::warn!(error = %e, "Sign-out failed remotely");
        }

        self.session.clear();
        self.status = ConnectionStatus::connected();

        AuthOutcome {
            notice: Notice::success("Signed out."),
            panel: None,
        }
    }

    async fn establish(&mut self, session: Session, notice: Notice, token: &CancelToken) -> AuthOutcome {
        tracing::info!(user_id = %session.user_id, "Session established");
        self.status = ConnectionStatus::signed_in(&session.email);
        self.session.set(session);

        AuthOutcome {
            notice,
            panel: self.current_panel(token).await,
        }
    }

    async fn current_panel(&self, token: &CancelToken) -> Option<UserPanel> {
        let session = self.session.current()?;
        let appointments = self.load_owner_appointments(session, token).await;
        Some(UserPanel::new(session, appointments))
    }

    // ============================================
    // Appointments
    // ============================================

    /// Submit the booking form
    ///
    /// On success the form is cleared and, when signed in, the personal list
    /// is reloaded once.
    pub async fn book(&mut self, form: &mut BookingForm, token: &CancelToken) -> BookingOutcome {
        let Some(gateway) = self.gateway.clone() else {
            tracing::info!("No backend configured, booking in demo mode");
            return BookingOutcome {
                notice: Notice::success(format!(
                    "✓ Demo mode — Appointment booked for {} on {} at {}. Connect a backend to save to database.",
                    form.first_name.trim(),
                    form.appointment_date.trim(),
                    form.appointment_time.trim()
                )),
                owner_appointments: None,
            };
        };

        let today = chrono::Local::now().date_naive();
        let record = match form.validate(self.session.owner_id(), today) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "Booking form rejected");
                return BookingOutcome {
                    notice: Notice::error(e.to_string()),
                    owner_appointments: None,
                };
            }
        };

        self.submit.send_replace(SubmitState::Submitting);
        let result = self.call(gateway.insert_appointment(&record), token).await;

        match result {
            Ok(id) => {
                self.submit.send_replace(SubmitState::Confirmed);
                tracing::info!(
                    appointment_id = %id,
                    service = %record.service,
                    date = %record.appointment_date,
                    "Appointment booked"
                );

                form.clear();
                let notice = Notice::success(format!(
                    "✓ Appointment confirmed for {} {} — {} on {} at {}.",
                    record.first_name,
                    record.last_name,
                    record.service.display_name(),
                    record.appointment_date,
                    record.appointment_time
                ));

                BookingOutcome {
                    notice,
                    owner_appointments: self.reload_owner(token).await,
                }
            }
            Err(e) => {
                self.submit.send_replace(SubmitState::Failed);
                tracing::warn!(error = %e, "Booking failed");
                BookingOutcome {
                    notice: Notice::error(format!("Booking failed: {}", e.message())),
                    owner_appointments: None,
                }
            }
        }
    }

    /// Find appointments booked with `email`
    pub async fn lookup(&mut self, email: &str, token: &CancelToken) -> ListView {
        let email = email.trim();
        if email.is_empty() {
            return ListView::Prompt {
                message: LOOKUP_NEEDS_EMAIL.to_string(),
            };
        }

        let Some(gateway) = self.gateway.clone() else {
            return ListView::Prompt {
                message: LOOKUP_NOT_CONNECTED.to_string(),
            };
        };

        self.last_lookup = Some(email.to_string());

        match self.call(gateway.query_appointments_by_email(email), token).await {
            Ok(appointments) if appointments.is_empty() => ListView::Empty {
                message: LOOKUP_EMPTY.to_string(),
            },
            Ok(appointments) => ListView::Rows {
                appointments,
                with_actions: true,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Appointment lookup failed");
                ListView::Error {
                    message: format!("Error: {}", e.message()),
                }
            }
        }
    }

    /// Personal list for a signed-in user; rows carry no actions
    pub async fn load_owner_appointments(&self, session: &Session, token: &CancelToken) -> ListView {
        let Some(gateway) = self.gateway.clone() else {
            return ListView::Prompt {
                message: LOOKUP_NOT_CONNECTED.to_string(),
            };
        };

        match self
            .call(gateway.query_appointments_by_owner(&session.user_id), token)
            .await
        {
            Ok(appointments) if appointments.is_empty() => ListView::Empty {
                message: OWNER_EMPTY.to_string(),
            },
            Ok(appointments) => ListView::Rows {
                appointments,
                with_actions: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, user_id = %session.user_id, "Loading owner appointments failed");
                ListView::Error {
                    message: OWNER_FAILED.to_string(),
                }
            }
        }
    }

    async fn reload_owner(&self, token: &CancelToken) -> Option<ListView> {
        let session = self.session.current()?;
        Some(self.load_owner_appointments(session, token).await)
    }

    /// Open the reschedule dialog for appointment `id`
    pub fn begin_reschedule(&mut self, id: &str) -> DialogStep {
        self.dialog.open(id)
    }

    /// Answer the date question; dates before today are rejected
    pub fn enter_reschedule_date(&mut self, input: Option<&str>) -> DialogStep {
        let today = chrono::Local::now().date_naive();
        self.dialog.enter_date(input, today)
    }

    /// Answer the time question; a complete answer sends the update
    pub async fn enter_reschedule_time(
        &mut self,
        input: Option<&str>,
        token: &CancelToken,
    ) -> MutationOutcome {
        match self.dialog.enter_time(input) {
            DialogStep::Ready { id, date, time } => {
                let outcome = self.apply_reschedule(&id, date, time, token).await;
                self.dialog.finish();
                outcome
            }
            DialogStep::Invalid(e) => MutationOutcome::with_notice(Notice::error(e.to_string())),
            _ => MutationOutcome::aborted(),
        }
    }

    pub fn dismiss_reschedule(&mut self) {
        self.dialog.dismiss();
    }

    /// Run the whole reschedule dialog with the given answers
    pub async fn reschedule(
        &mut self,
        id: &str,
        date: Option<&str>,
        time: Option<&str>,
        token: &CancelToken,
    ) -> MutationOutcome {
        self.begin_reschedule(id);

        match self.enter_reschedule_date(date) {
            DialogStep::Prompt(_) => {}
            DialogStep::Invalid(e) => {
                self.dialog.dismiss();
                return MutationOutcome::with_notice(Notice::error(e.to_string()));
            }
            _ => return MutationOutcome::aborted(),
        }

        let outcome = self.enter_reschedule_time(time, token).await;
        self.dialog.dismiss();
        outcome
    }

    async fn apply_reschedule(
        &mut self,
        id: &str,
        date: String,
        time: String,
        token: &CancelToken,
    ) -> MutationOutcome {
        let Some(gateway) = self.gateway.clone() else {
            return MutationOutcome::with_notice(Notice::error(NOT_CONNECTED));
        };

        let patch = AppointmentPatch::reschedule(date, time);
        match self.call(gateway.update_appointment(id, &patch), token).await {
            Ok(()) => {
                tracing::info!(appointment_id = %id, "Appointment rescheduled");
                self.after_mutation(Notice::success("Appointment rescheduled successfully."), token)
                    .await
            }
            Err(e) => {
                tracing::warn!(error = %e, appointment_id = %id, "Reschedule failed");
                MutationOutcome::with_notice(Notice::error(format!(
                    "Reschedule failed: {}",
                    e.message()
                )))
            }
        }
    }

    /// Cancel appointment `id` once the user has confirmed
    pub async fn cancel(
        &mut self,
        id: &str,
        confirmation: Confirmation,
        token: &CancelToken,
    ) -> MutationOutcome {
        if confirmation != Confirmation::Yes {
            return MutationOutcome::aborted();
        }

        let Some(gateway) = self.gateway.clone() else {
            return MutationOutcome::with_notice(Notice::error(NOT_CONNECTED));
        };

        match self
            .call(gateway.update_appointment(id, &AppointmentPatch::cancel()), token)
            .await
        {
            Ok(()) => {
                tracing::info!(appointment_id = %id, "Appointment cancelled");
                self.after_mutation(Notice::success("Appointment cancelled."), token)
                    .await
            }
            Err(e) => {
                tracing::warn!(error = %e, appointment_id = %id, "Cancellation failed");
                MutationOutcome::with_notice(Notice::error(format!(
                    "Cancellation failed: {}",
                    e.message()
                )))
            }
        }
    }

    /// Re-fetch every list the mutation may have changed
    async fn after_mutation(&mut self, notice: Notice, token: &CancelToken) -> MutationOutcome {
        let lookup = match self.last_lookup.clone() {
            Some(email) => Some(self.lookup(&email, token).await),
            None => None,
        };

        MutationOutcome {
            notice: Some(notice),
            lookup,
            owner_appointments: self.reload_owner(token).await,
        }
    }
}
