//! MediHealth CLI
//!
//! Command-line front end for the clinic booking workflow:
//! - Browse health tips
//! - Book, look up, reschedule and cancel appointments
//! - Manage a patient account

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use medihealth::config::{generate_default_config, Config, LoggingConfig};
use medihealth::render;
use medihealth::workflow::{
    AppointmentWorkflow, CancelToken, Confirmation, DialogStep, ListView, MutationOutcome, Notice,
    UserPanel, CANCEL_CONFIRMATION,
};
use medihealth::{BookingForm, ConnectionStatus, Profile, TipFilter};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medihealth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Book and manage clinic appointments")]
#[command(long_about = "MediHealth books clinic appointments.\nWithout a backend it runs in demo mode and nothing is stored.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Supabase project URL (overrides config and environment)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Supabase anon key (overrides config and environment)
    #[arg(long, global = true)]
    pub backend_key: Option<String>,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show health tips
    Tips {
        /// Category (nutrition, fitness, sleep, mental-health, hydration, prevention) or "all"
        #[arg(short, long, default_value = "all")]
        category: String,
    },

    /// Book an appointment
    Book {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Service slug (e.g. general-checkup, cardiology)
        #[arg(long, default_value = "")]
        service: String,
        /// Date as YYYY-MM-DD
        #[arg(long, default_value = "")]
        date: String,
        /// Time as HH:MM
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Find appointments booked with an email address
    Lookup {
        email: String,
    },

    /// Move an appointment to a new date and time
    Reschedule {
        /// Appointment id
        id: String,
        /// New date (prompted when omitted)
        #[arg(long)]
        date: Option<String>,
        /// New time (prompted when omitted)
        #[arg(long)]
        time: Option<String>,
        /// Show the bookings for this email afterwards
        #[arg(long)]
        email: Option<String>,
    },

    /// Cancel an appointment
    Cancel {
        /// Appointment id
        id: String,
        /// Skip the confirmation question
        #[arg(short, long)]
        yes: bool,
        /// Show the bookings for this email afterwards
        #[arg(long)]
        email: Option<String>,
    },

    /// Create a patient account
    Signup {
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in to a patient account
    Signin {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out
    Signout,

    /// Show connection and session status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.backend_url.clone() {
        config.backend.url = url;
    }
    if let Some(key) = cli.backend_key.clone() {
        config.backend.anon_key = key;
    }

    init_tracing(&config.logging);
    let out = Printer { format: cli.format };

    // Commands that never touch the backend
    match &cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
            return Ok(());
        }
        Commands::Tips { category } => {
            let filter: TipFilter = category.parse().map_err(anyhow::Error::msg)?;
            out.tips(filter);
            return Ok(());
        }
        _ => {}
    }

    let token = cancel_on_ctrl_c();
    let mut workflow = AppointmentWorkflow::new(config.workflow.workflow_config());
    let mut panel = None;

    if config.backend.is_configured() {
        let outcome = workflow.connect(config.backend.gateway_config(), &token).await;
        if let Some(notice) = &outcome.notice {
            out.notice(notice);
            std::process::exit(1);
        }
        panel = outcome.panel;
    }

    match cli.command {
        Commands::Book {
            first_name,
            last_name,
            email,
            phone,
            service,
            date,
            time,
            notes,
        } => {
            let mut form = BookingForm {
                first_name,
                last_name,
                email,
                phone,
                service,
                appointment_date: date,
                appointment_time: time,
                notes,
            };

            let mut submit = workflow.submit_state();
            tokio::spawn(async move {
                while submit.changed().await.is_ok() {
                    let state = *submit.borrow_and_update();
                    tracing::debug!(state = ?state, label = state.button_label(), "Submit state changed");
                }
            });

            let outcome = workflow.book(&mut form, &token).await;
            out.notice(&outcome.notice);
            if let Some(view) = &outcome.owner_appointments {
                out.heading("My appointments");
                out.list(view);
            }
            exit_on_error(&outcome.notice);
        }

        Commands::Lookup { email } => {
            let view = workflow.lookup(&email, &token).await;
            out.list(&view);
            if view.is_error() {
                std::process::exit(1);
            }
        }

        Commands::Reschedule {
            id,
            date,
            time,
            email,
        } => {
            if let Some(email) = email {
                workflow.lookup(&email, &token).await;
            }

            workflow.begin_reschedule(&id);
            let date = match (date, workflow.reschedule_dialog().prompt()) {
                (Some(date), _) => Some(date),
                (None, Some(question)) => prompt(question)?,
                (None, None) => None,
            };

            let outcome = match workflow.enter_reschedule_date(date.as_deref()) {
                DialogStep::Prompt(_) => {
                    let time = match (time, workflow.reschedule_dialog().prompt()) {
                        (Some(time), _) => Some(time),
                        (None, Some(question)) => prompt(question)?,
                        (None, None) => None,
                    };
                    workflow.enter_reschedule_time(time.as_deref(), &token).await
                }
                DialogStep::Invalid(e) => MutationOutcome::with_notice(Notice::error(e.to_string())),
                _ => MutationOutcome::aborted(),
            };
            workflow.dismiss_reschedule();
            out.mutation(&outcome);
        }

        Commands::Cancel { id, yes, email } => {
            if let Some(email) = email {
                workflow.lookup(&email, &token).await;
            }

            let confirmation = if yes || confirm(CANCEL_CONFIRMATION)? {
                Confirmation::Yes
            } else {
                Confirmation::No
            };
            let outcome = workflow.cancel(&id, confirmation, &token).await;
            out.mutation(&outcome);
        }

        Commands::Signup {
            email,
            first_name,
            last_name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let outcome = workflow
                .sign_up(&email, &password, Profile::new(first_name, last_name), &token)
                .await;
            out.notice(&outcome.notice);
            if let Some(panel) = &outcome.panel {
                out.panel(panel);
            }
            exit_on_error(&outcome.notice);
        }

        Commands::Signin { email, password } => {
            let password = password_or_prompt(password)?;
            let outcome = workflow.sign_in(&email, &password, &token).await;
            out.notice(&outcome.notice);
            if let Some(panel) = &outcome.panel {
                out.panel(panel);
            }
            exit_on_error(&outcome.notice);
        }

        Commands::Signout => {
            let outcome = workflow.sign_out(&token).await;
            out.notice(&outcome.notice);
            exit_on_error(&outcome.notice);
        }

        Commands::Status => {
            let text = cli.format == OutputFormat::Text;
            if text {
                println!("MediHealth v{}", env!("CARGO_PKG_VERSION"));
                println!();
            }
            out.status(workflow.status());
            if text && workflow.is_demo_mode() {
                println!();
                println!("Set a backend to store appointments:");
                println!("  medihealth --backend-url <URL> --backend-key <KEY> status");
                println!("  or [backend] in {}", config_hint(&cli.config));
            }
            if let Some(panel) = &panel {
                if text {
                    println!();
                }
                out.panel(panel);
            }
        }

        Commands::Config { .. } | Commands::Tips { .. } => {}
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("medihealth={}", logging.level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Token cancelled when the user presses Ctrl-C
fn cancel_on_ctrl_c() -> CancelToken {
    let (handle, token) = medihealth::cancel_pair();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupted, abandoning pending request");
                handle.cancel();
            }
            Err(e) => {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                // Keep the handle alive so the token stays valid
                std::future::pending::<()>().await;
            }
        }
    });
    token
}

fn config_hint(explicit: &Option<PathBuf>) -> String {
    explicit
        .clone()
        .or_else(|| Config::search_paths().into_iter().next())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "config.toml".to_string())
}

fn exit_on_error(notice: &Notice) {
    if notice.is_error() {
        std::process::exit(1);
    }
}

/// Ask a question on stdin; end of input or a blank line means no answer
fn prompt(question: &str) -> anyhow::Result<Option<String>> {
    eprint!("{} ", question);
    std::io::stderr().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();

    if read == 0 || answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer.to_string()))
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question))?;
    Ok(matches!(
        answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y") | Some("yes")
    ))
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt("Password:")?.context("a password is required"),
    }
}

struct Printer {
    format: OutputFormat,
}

impl Printer {
    fn tips(&self, filter: TipFilter) {
        match self.format {
            OutputFormat::Html => println!("{}", render::render_tips(filter)),
            OutputFormat::Text => {
                for tip in medihealth::tips::filter_tips(filter) {
                    println!("{} {} [{}]", tip.glyph, tip.title, tip.category.label());
                    println!("   {}", tip.body);
                    println!();
                }
            }
        }
    }

    fn notice(&self, notice: &Notice) {
        match self.format {
            OutputFormat::Html => println!("{}", render::render_notice(notice)),
            OutputFormat::Text if notice.is_error() => eprintln!("{}", notice),
            OutputFormat::Text => println!("{}", notice),
        }
    }

    fn heading(&self, title: &str) {
        if self.format == OutputFormat::Text {
            println!();
            println!("{}:", title);
        }
    }

    fn list(&self, view: &ListView) {
        match self.format {
            OutputFormat::Html => println!("{}", render::render_list_view(view)),
            OutputFormat::Text => match view.message() {
                Some(message) => println!("{}", message),
                None => {
                    for apt in view.appointments() {
                        println!(
                            "  {:<6} {:<16} {} at {} — {}",
                            apt.id,
                            apt.service_name(),
                            apt.appointment_date,
                            apt.appointment_time,
                            apt.status
                        );
                    }
                }
            },
        }
    }

    fn mutation(&self, outcome: &MutationOutcome) {
        let Some(notice) = &outcome.notice else {
            println!("Nothing changed.");
            return;
        };

        self.notice(notice);
        if let Some(view) = &outcome.lookup {
            self.heading("Appointments for this email");
            self.list(view);
        }
        if let Some(view) = &outcome.owner_appointments {
            self.heading("My appointments");
            self.list(view);
        }
        exit_on_error(notice);
    }

    fn panel(&self, panel: &UserPanel) {
        match self.format {
            OutputFormat::Html => println!("{}", render::render_user_panel(panel)),
            OutputFormat::Text => {
                println!("Signed in as {} <{}>", panel.name, panel.email);
                self.heading("My appointments");
                self.list(&panel.appointments);
            }
        }
    }

    fn status(&self, status: &ConnectionStatus) {
        match self.format {
            OutputFormat::Html => println!("{}", render::render_status(status)),
            OutputFormat::Text => println!("Backend: {}", status.label),
        }
    }
}
