//! # MediHealth
//!
//! Appointment booking for a medical clinic: book a visit, find bookings by
//! email, reschedule or cancel them, and manage an optional patient account.
//!
//! ## Features
//!
//! - **Demo mode**: without a backend, bookings are confirmed but not stored
//! - **Persisted mode**: appointments and accounts live in a Supabase project
//! - **Guarded calls**: every backend call has a deadline and can be cancelled
//! - **Health tips**: a bundled, filterable catalogue
//!
//! ## Modules
//!
//! - [`workflow`]: the appointment lifecycle state object
//! - [`gateway`]: the backend boundary and its Supabase binding
//! - [`models`]: appointment records and the booking form
//! - [`render`]: HTML fragments for each page container
//! - [`tips`]: the health tips catalogue
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medihealth::{AppointmentWorkflow, BookingForm, CancelToken, WorkflowConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     // No backend: demo mode
//!     let mut workflow = AppointmentWorkflow::new(WorkflowConfig::default());
//!
//!     let mut form = BookingForm {
//!         first_name: "Ada".to_string(),
//!         service: "general-checkup".to_string(),
//!         appointment_date: "2025-06-01".to_string(),
//!         appointment_time: "10:00".to_string(),
//!         ..BookingForm::default()
//!     };
//!
//!     let outcome = workflow.book(&mut form, &CancelToken::never()).await;
//!     println!("{}", outcome.notice);
//! }
//! ```

pub mod config;
pub mod gateway;
pub mod models;
pub mod render;
pub mod session;
pub mod status;
pub mod tips;
pub mod workflow;

// Re-export top-level types for convenience
pub use config::{BackendConfig, Config, ConfigError, LoggingConfig, WorkflowSettings};

pub use gateway::{
    Gateway, GatewayConfig, GatewayError, GatewayResult, SessionFile, SignUpOutcome,
    SupabaseGateway,
};

pub use models::{
    Appointment, AppointmentPatch, AppointmentStatus, BookingForm, NewAppointment, Profile,
    Service, Session, ValidationError,
};

pub use session::SessionStore;
pub use status::{ConnectionStatus, StatusState};
pub use tips::{HealthTip, TipCategory, TipFilter};

pub use workflow::{
    cancel_pair, AppointmentWorkflow, AuthOutcome, BookingOutcome, CancelHandle, CancelToken,
    Confirmation, ConnectOutcome, DialogStep, ListView, MutationOutcome, Notice, NoticeKind,
    RescheduleDialog, SubmitState, UserPanel, WorkflowConfig,
};
