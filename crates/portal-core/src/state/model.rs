//! Portal state domain models.
//!
//! Contains the single owned state record of the portal. Only the
//! application list is durable; everything else lives for one session.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::application::{Application, ApplicationForm, ApplicationId, LoginForm};
use crate::error::{PortalError, Result};

/// How long the submission success notice stays visible.
pub const SUCCESS_NOTICE_DURATION: Duration = Duration::from_secs(5);

/// Generic message shown when a submission fails.
pub const SUBMISSION_FAILED_ALERT: &str =
    "There was an error submitting your application. Please try again.";

/// One of the three mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    /// The application form.
    #[default]
    Applicant,
    /// The admin login form.
    Login,
    /// The admin dashboard. Requires an active login.
    Admin,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewState::Applicant => "applicant",
            ViewState::Login => "login",
            ViewState::Admin => "admin",
        })
    }
}

impl FromStr for ViewState {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "applicant" => Ok(ViewState::Applicant),
            "login" => Ok(ViewState::Login),
            "admin" => Ok(ViewState::Admin),
            other => Err(PortalError::validation(format!(
                "unknown view '{}' (expected applicant, login or admin)",
                other
            ))),
        }
    }
}

/// Progress of the applicant form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    /// Waiting for input; the submit control is enabled.
    #[default]
    Idle,
    /// Attachments are being read; the submit control is disabled.
    Submitting,
}

/// The whole in-memory state of the portal.
#[derive(Debug, Clone, Default)]
pub struct PortalState {
    /// Currently requested screen.
    pub view: ViewState,
    /// Mirror of the session login flag.
    pub is_logged_in: bool,
    /// All submitted applications, oldest first.
    pub applications: Vec<Application>,
    /// Applicant form draft.
    pub applicant_form: ApplicationForm,
    /// Login form draft.
    pub login_form: LoginForm,
    /// Submission progress.
    pub submission: SubmissionPhase,
    /// Deadline after which the success notice is hidden.
    pub success_notice_until: Option<Instant>,
    /// Whether the inline login error is shown.
    pub login_error: bool,
    /// Pending alert message for the user, if any.
    pub alert: Option<String>,
}

impl PortalState {
    /// Creates a state holding the given application list.
    pub fn with_applications(applications: Vec<Application>) -> Self {
        Self {
            applications,
            ..Self::default()
        }
    }

    /// Shows the success notice for [`SUCCESS_NOTICE_DURATION`] from `now`.
    pub fn show_success_notice(&mut self, now: Instant) {
        self.success_notice_until = Some(now + SUCCESS_NOTICE_DURATION);
    }

    /// Returns `true` while the success notice is within its window.
    pub fn success_notice_visible(&self, now: Instant) -> bool {
        self.success_notice_until
            .is_some_and(|deadline| now < deadline)
    }

    /// Drops the notice deadline once it has passed.
    ///
    /// Returns `true` if a notice was hidden.
    pub fn expire_success_notice(&mut self, now: Instant) -> bool {
        match self.success_notice_until {
            Some(deadline) if now >= deadline => {
                self.success_notice_until = None;
                true
            }
            _ => false,
        }
    }

    /// Finds an application by id.
    pub fn find_application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let state = PortalState::default();
        assert_eq!(state.view, ViewState::Applicant);
        assert!(!state.is_logged_in);
        assert!(state.applications.is_empty());
        assert_eq!(state.submission, SubmissionPhase::Idle);
        assert!(state.success_notice_until.is_none());
        assert!(!state.login_error);
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_view_parse_and_display() {
        for view in [ViewState::Applicant, ViewState::Login, ViewState::Admin] {
            assert_eq!(view.to_string().parse::<ViewState>().unwrap(), view);
        }
        assert!("dashboard".parse::<ViewState>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_notice_window() {
        let mut state = PortalState::default();
        let start = Instant::now();
        state.show_success_notice(start);

        assert!(state.success_notice_visible(start));
        assert!(state.success_notice_visible(start + Duration::from_millis(4_999)));
        assert!(!state.expire_success_notice(start + Duration::from_millis(4_999)));

        let later = start + SUCCESS_NOTICE_DURATION;
        assert!(!state.success_notice_visible(later));
        assert!(state.expire_success_notice(later));
        assert!(state.success_notice_until.is_none());
    }
}
