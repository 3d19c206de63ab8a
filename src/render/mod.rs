//! HTML fragments for the booking page
//!
//! Each function takes plain data and returns a markup fragment for one
//! page container. Templates live in `templates/` and auto-escape every
//! interpolated value.

use crate::models::Appointment;
use crate::status::ConnectionStatus;
use crate::tips::{filter_tips, HealthTip, TipFilter};
use crate::workflow::{ListView, Notice, NoticeKind, UserPanel};
use askama::Template;

#[derive(Template)]
#[template(path = "tips.html")]
struct TipsTemplate {
    tips: Vec<&'static HealthTip>,
}

#[derive(Template)]
#[template(path = "appointment_list.html")]
struct AppointmentListTemplate<'a> {
    appointments: &'a [Appointment],
    with_actions: bool,
}

#[derive(Template)]
#[template(path = "message.html")]
struct MessageTemplate<'a> {
    message: &'a str,
}

#[derive(Template)]
#[template(path = "notice.html")]
struct NoticeTemplate<'a> {
    kind: &'static str,
    text: &'a str,
}

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate<'a> {
    dot_class: String,
    label: &'a str,
}

#[derive(Template)]
#[template(path = "user_panel.html")]
struct UserPanelTemplate<'a> {
    name: &'a str,
    initial: &'a str,
    email: &'a str,
    appointments_html: String,
}

/// Render a template, logging failures and degrading to an empty fragment
fn render<T: Template>(template: T) -> String {
    match template.render() {
        Ok(body) => body,
        Err(err) => {
            tracing::error!("Template render error: {err}");
            String::new()
        }
    }
}

/// Tip cards matching `filter`, in catalogue order
pub fn render_tips(filter: TipFilter) -> String {
    render(TipsTemplate {
        tips: filter_tips(filter),
    })
}

/// One row per appointment, in the order given
pub fn render_appointment_list(appointments: &[Appointment], with_actions: bool) -> String {
    render(AppointmentListTemplate {
        appointments,
        with_actions,
    })
}

pub fn render_list_view(view: &ListView) -> String {
    match view {
        ListView::Rows {
            appointments,
            with_actions,
        } => render_appointment_list(appointments, *with_actions),
        ListView::Prompt { message } | ListView::Empty { message } | ListView::Error { message } => {
            render(MessageTemplate { message })
        }
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let kind = match notice.kind {
        NoticeKind::Success => "success",
        NoticeKind::Error => "error",
    };

    render(NoticeTemplate {
        kind,
        text: &notice.text,
    })
}

pub fn render_status(status: &ConnectionStatus) -> String {
    render(StatusTemplate {
        dot_class: status.dot_class(),
        label: &status.label,
    })
}

pub fn render_user_panel(panel: &UserPanel) -> String {
    render(UserPanelTemplate {
        name: &panel.name,
        initial: &panel.initial,
        email: &panel.email,
        appointments_html: render_list_view(&panel.appointments),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, Profile, Session};
    use crate::tips::TipCategory;

    fn row(id: &str, service: &str, date: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            service: service.to_string(),
            appointment_date: date.to_string(),
            appointment_time: "10:00".to_string(),
            notes: None,
            user_id: None,
            status: AppointmentStatus::Confirmed,
        }
    }

    #[test]
    fn test_render_all_tips() {
        let html = render_tips(TipFilter::All);
        assert_eq!(html.matches("class=\"tip-card\"").count(), 10);
        assert!(html.contains("Mindfulness &amp; Meditation"));
    }

    #[test]
    fn test_render_tips_by_category() {
        let filter = TipFilter::Category(TipCategory::MentalHealth);
        let html = render_tips(filter);
        let expected = filter_tips(filter);

        assert!(!expected.is_empty());
        assert_eq!(html.matches("class=\"tip-card\"").count(), expected.len());
        assert!(html.contains("<div class=\"tip-card__cat\">mental health</div>"));
        assert!(!html.contains("data-category=\"nutrition\""));

        let mut last = 0;
        for tip in expected {
            let title = tip.title.replace('&', "&amp;");
            let position = html.find(&title).unwrap();
            assert!(position >= last);
            last = position;
        }
    }

    #[test]
    fn test_render_list_keeps_order() {
        let rows = vec![
            row("1", "dermatology", "2025-05-01"),
            row("2", "dermatology", "2025-04-01"),
        ];
        let html = render_appointment_list(&rows, false);

        let first = html.find("2025-05-01").unwrap();
        let second = html.find("2025-04-01").unwrap();
        assert!(first < second);
        assert!(html.contains("<strong>Dermatology</strong>"));
        assert!(html.contains("2025-05-01 at 10:00 — confirmed"));
        assert!(!html.contains("apt-row__actions"));
    }

    #[test]
    fn test_render_list_actions() {
        let rows = vec![row("42", "mental-health", "2025-05-01")];
        let html = render_appointment_list(&rows, true);

        assert!(html.contains("<strong>Mental Health</strong>"));
        assert!(html.contains("data-action=\"reschedule\" data-id=\"42\""));
        assert!(html.contains("data-action=\"cancel\" data-id=\"42\""));
    }

    #[test]
    fn test_render_escapes_values() {
        let mut rows = vec![row("1", "general-checkup", "2025-05-01")];
        rows[0].appointment_time = "<script>".to_string();
        let html = render_appointment_list(&rows, false);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_list_view_messages() {
        let view = ListView::Empty {
            message: "No appointments found for this email.".to_string(),
        };
        assert_eq!(
            render_list_view(&view).trim(),
            "<p class=\"muted\">No appointments found for this email.</p>"
        );
    }

    #[test]
    fn test_render_notice() {
        let html = render_notice(&Notice::error("Booking failed: denied"));
        assert!(html.contains("form-msg--error"));
        assert!(html.contains("Booking failed: denied"));
    }

    #[test]
    fn test_render_status() {
        let html = render_status(&ConnectionStatus::connected());
        assert!(html.contains("sb-status__dot connected"));
        assert!(html.contains("Connected ✓"));
    }

    #[test]
    fn test_render_user_panel() {
        let session =
            Session::new("u1", "ada@example.com").with_profile(Profile::new("Ada", "Lovelace"));
        let panel = UserPanel::new(
            &session,
            ListView::Rows {
                appointments: vec![row("1", "cardiology", "2025-05-01")],
                with_actions: false,
            },
        );
        let html = render_user_panel(&panel);

        assert!(html.contains("<div class=\"user-panel__avatar\">A</div>"));
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("<strong>Cardiology</strong>"));
    }
}
