//! Page rendering.
//!
//! A single pure function derives everything visible from [`PortalState`].
//! Hosts present the resulting [`RenderedPage`]; they never toggle panels
//! themselves.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::application::{Application, FileSlot};
use crate::state::{PortalState, SubmissionPhase, ViewState};

/// Message shown on the dashboard when nothing has been submitted.
pub const EMPTY_DASHBOARD_MESSAGE: &str = "No applications submitted yet.";

/// State of the applicant form's submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub enabled: bool,
    pub busy: bool,
}

/// A link offering a stored attachment as a save-as download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub slot: FileSlot,
    /// Link text: the original file name.
    pub label: String,
    /// Link target: the stored `data:` URL.
    pub href: String,
    /// Name the file is saved under.
    pub download_name: String,
}

/// One application as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCard {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Human-readable local submission time.
    pub submitted: String,
    pub downloads: Vec<DownloadLink>,
}

/// Read-only listing of all applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Dashboard {
    /// Nothing submitted yet.
    Empty { message: String },
    /// One card per application, in list order.
    Listing(Vec<ApplicationCard>),
}

/// Everything a host needs to present the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    /// The one visible panel.
    pub panel: ViewState,
    /// Link to the login view; only on the applicant view.
    pub show_admin_login_link: bool,
    /// Link back to the applicant view; on every other view.
    pub show_applicant_link: bool,
    pub submit_control: SubmitControl,
    pub success_notice: bool,
    pub login_error: bool,
    pub alert: Option<String>,
    /// Present only on the admin view with an active login.
    pub dashboard: Option<Dashboard>,
}

/// Derives the visible page from `state` at time `now`.
///
/// An admin view without a login renders as the login view, so no admin
/// content can leak even if the caller skipped the navigation guard.
pub fn render(state: &PortalState, now: Instant) -> RenderedPage {
    let panel = match state.view {
        ViewState::Admin if !state.is_logged_in => ViewState::Login,
        view => view,
    };

    let busy = state.submission == SubmissionPhase::Submitting;

    RenderedPage {
        panel,
        show_admin_login_link: panel == ViewState::Applicant,
        show_applicant_link: panel != ViewState::Applicant,
        submit_control: SubmitControl {
            enabled: !busy,
            busy,
        },
        success_notice: state.success_notice_visible(now),
        login_error: panel == ViewState::Login && state.login_error,
        alert: state.alert.clone(),
        dashboard: (panel == ViewState::Admin).then(|| render_dashboard(&state.applications)),
    }
}

/// Projects the application list into the dashboard listing.
pub fn render_dashboard(applications: &[Application]) -> Dashboard {
    render_dashboard_in(applications, &Local)
}

/// Same as [`render_dashboard`], formatting timestamps in `tz`.
pub fn render_dashboard_in<Tz>(applications: &[Application], tz: &Tz) -> Dashboard
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if applications.is_empty() {
        return Dashboard::Empty {
            message: EMPTY_DASHBOARD_MESSAGE.to_string(),
        };
    }

    Dashboard::Listing(
        applications
            .iter()
            .map(|app| ApplicationCard {
                id: app.id.value(),
                full_name: app.full_name.clone(),
                email: app.email.clone(),
                phone: app.phone.clone(),
                submitted: format_timestamp(&app.submitted_at, tz),
                downloads: app
                    .files
                    .attached()
                    .map(|(slot, file)| DownloadLink {
                        slot,
                        label: file.name.clone(),
                        href: file.data_url.as_str().to_string(),
                        download_name: file.name.clone(),
                    })
                    .collect(),
            })
            .collect(),
    )
}

/// Formats a timestamp like `1/15/2025, 10:30:00 AM` in `tz`.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
