//! Portal use case.
//!
//! `Portal` owns the whole [`PortalState`] and is the only place that mutates
//! it. Every handler ends with a render pass: the login flag is re-read from
//! the session store, the admin guard is applied, and the resulting
//! [`RenderedPage`] is handed to the host's [`PageSink`].

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use portal_core::application::{
    Application, ApplicationFiles, ApplicationForm, ApplicationId, ApplicationRepository,
    FileReader, FileSlot, LoginForm, LoginSessionRepository, read_file_as_data_url,
};
use portal_core::auth::CredentialVerifier;
use portal_core::error::{PortalError, Result};
use portal_core::render::{RenderedPage, render};
use portal_core::state::{PortalState, SUBMISSION_FAILED_ALERT, SubmissionPhase, ViewState};
use tokio::time::Instant;

/// Receives every page produced by a render pass.
pub trait PageSink: Send {
    fn present(&mut self, page: &RenderedPage);
}

impl<F> PageSink for F
where
    F: FnMut(&RenderedPage) + Send,
{
    fn present(&mut self, page: &RenderedPage) {
        self(page)
    }
}

/// A stored attachment decoded for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Original file name to save under.
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The job portal: applicant form, admin login and dashboard.
pub struct Portal {
    state: PortalState,
    applications: Arc<dyn ApplicationRepository>,
    session: Arc<dyn LoginSessionRepository>,
    verifier: Arc<dyn CredentialVerifier>,
    file_reader: Arc<dyn FileReader>,
    sink: Box<dyn PageSink>,
}

impl Portal {
    /// Creates a portal with an empty state.
    ///
    /// Call [`Portal::initialize`] before handling any user action.
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        session: Arc<dyn LoginSessionRepository>,
        verifier: Arc<dyn CredentialVerifier>,
        file_reader: Arc<dyn FileReader>,
        sink: Box<dyn PageSink>,
    ) -> Self {
        Self {
            state: PortalState::default(),
            applications,
            session,
            verifier,
            file_reader,
            sink,
        }
    }

    /// Loads stored applications and shows the start view.
    ///
    /// An active login starts on the dashboard, otherwise on the applicant
    /// form. A corrupt store starts with an empty list.
    pub async fn initialize(&mut self) {
        self.state.applications = self.applications.load_applications().await;
        self.state.is_logged_in = self.session.check_login_status().await;

        tracing::info!(
            "Portal initialized with {} application(s)",
            self.state.applications.len()
        );

        let view = if self.state.is_logged_in {
            ViewState::Admin
        } else {
            ViewState::Applicant
        };
        self.navigate_to(view).await;
    }

    /// Returns the current state.
    pub fn state(&self) -> &PortalState {
        &self.state
    }

    /// Renders the current state without presenting it.
    pub fn page(&self) -> RenderedPage {
        render(&self.state, Instant::now())
    }

    /// Switches to `view` and re-renders.
    pub async fn navigate_to(&mut self, view: ViewState) {
        tracing::debug!("Navigating to {} view", view);
        self.state.view = view;
        self.refresh().await;
    }

    /// Runs a render pass and presents the result.
    ///
    /// The login flag is re-read on every pass, so a session cleared outside
    /// the portal redirects the admin view on the next refresh.
    pub async fn refresh(&mut self) {
        self.state.is_logged_in = self.session.check_login_status().await;

        if self.state.view == ViewState::Admin && !self.state.is_logged_in {
            tracing::warn!("Admin view requested without an active login, showing login");
            self.state.view = ViewState::Login;
        }

        let now = Instant::now();
        self.state.expire_success_notice(now);
        let page = render(&self.state, now);
        self.sink.present(&page);
    }

    /// Replaces the applicant form draft.
    pub fn fill_application_form(&mut self, form: ApplicationForm) {
        self.state.applicant_form = form;
    }

    /// Replaces the login form draft.
    pub fn fill_login_form(&mut self, form: LoginForm) {
        self.state.login_form = form;
    }

    /// Submits the applicant form draft.
    ///
    /// The three attachments are read concurrently; if any read fails
    /// nothing is recorded and the generic alert is shown. A record that
    /// cannot be persisted is still kept in memory.
    ///
    /// # Returns
    ///
    /// - `Ok(ApplicationId)`: The id of the new record
    /// - `Err(PortalError::Validation)`: A required field is empty; nothing changed
    /// - `Err(PortalError::FileRead)`: An attachment could not be read
    /// - `Err(PortalError::Internal)`: No unused id is left
    pub async fn submit_application(&mut self) -> Result<ApplicationId> {
        self.state.applicant_form.validate()?;

        self.state.alert = None;
        self.state.submission = SubmissionPhase::Submitting;
        self.refresh().await;

        let result = match self.read_attachments().await {
            Ok(files) => self.record_application(files).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::error!("Application submission failed: {}", e);
            self.state.alert = Some(SUBMISSION_FAILED_ALERT.to_string());
        }

        self.state.submission = SubmissionPhase::Idle;
        self.refresh().await;
        result
    }

    async fn read_attachments(&self) -> Result<ApplicationFiles> {
        let reader = self.file_reader.as_ref();
        let form = &self.state.applicant_form;

        let (resume, cover_letter, transcripts) = tokio::try_join!(
            read_file_as_data_url(reader, form.resume.as_ref()),
            read_file_as_data_url(reader, form.cover_letter.as_ref()),
            read_file_as_data_url(reader, form.transcripts.as_ref()),
        )?;

        Ok(ApplicationFiles {
            resume,
            cover_letter,
            transcripts,
        })
    }

    async fn record_application(&mut self, files: ApplicationFiles) -> Result<ApplicationId> {
        // Stored timestamps carry millisecond precision.
        let submitted_at = Utc::now().trunc_subsecs(3);
        let id = self.next_id(submitted_at.timestamp_millis())?;
        let form = std::mem::take(&mut self.state.applicant_form);

        let application = Application {
            id,
            submitted_at,
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            files,
        };
        tracing::info!(
            "Application {} submitted by {} with {} attachment(s)",
            id,
            application.full_name,
            application.files.count()
        );
        self.state.applications.push(application);

        // Already logged by the repository; memory stays authoritative.
        let _ = self
            .applications
            .save_applications(&self.state.applications)
            .await;

        self.state.show_success_notice(Instant::now());
        Ok(id)
    }

    /// Millisecond timestamp, bumped past the newest id when the clock
    /// has not moved on.
    fn next_id(&self, now_ms: i64) -> Result<ApplicationId> {
        let newest = self
            .state
            .applications
            .iter()
            .map(|app| app.id.value())
            .max();
        match newest {
            Some(newest) if newest >= now_ms => newest
                .checked_add(1)
                .map(ApplicationId)
                .ok_or_else(|| PortalError::internal("application id space exhausted")),
            _ => Ok(ApplicationId(now_ms)),
        }
    }

    /// Submits the login form draft.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: Logged in; the dashboard is shown
    /// - `Ok(false)`: Credentials rejected; the inline error is shown
    /// - `Err(_)`: The session flag could not be written
    pub async fn submit_login(&mut self) -> Result<bool> {
        self.state.login_error = false;

        let username = self.state.login_form.username.clone();
        let accepted = self
            .verifier
            .verify(&username, &self.state.login_form.password)
            .await;

        if !accepted {
            tracing::warn!("Rejected admin login for user '{}'", username);
            self.state.login_error = true;
            self.refresh().await;
            return Ok(false);
        }

        if let Err(e) = self.session.set_logged_in().await {
            tracing::error!("Failed to store login flag: {}", e);
            self.refresh().await;
            return Err(e);
        }

        tracing::info!("Admin '{}' logged in", username);
        self.state.is_logged_in = true;
        self.state.login_form = LoginForm::default();
        self.navigate_to(ViewState::Admin).await;
        Ok(true)
    }

    /// Ends the admin session and shows the login view.
    ///
    /// The login view is shown even if the session flag cannot be cleared.
    /// In that case the session stays logged in, the error is returned, and
    /// a later `logout` can try again.
    pub async fn logout(&mut self) -> Result<()> {
        let cleared = self.session.clear_login().await;
        match &cleared {
            Ok(()) => {
                tracing::info!("Admin logged out");
                self.state.is_logged_in = false;
            }
            Err(e) => tracing::error!("Failed to clear login flag, still logged in: {}", e),
        }
        self.navigate_to(ViewState::Login).await;
        cleared
    }

    /// Hides the pending alert.
    pub async fn dismiss_alert(&mut self) {
        if self.state.alert.take().is_some() {
            self.refresh().await;
        }
    }

    /// Waits until the success notice window has passed, then re-renders.
    ///
    /// Returns `false` immediately when no notice is showing.
    pub async fn notice_expired(&mut self) -> bool {
        let Some(deadline) = self.state.success_notice_until else {
            return false;
        };
        tokio::time::sleep_until(deadline).await;
        self.refresh().await;
        true
    }

    /// Decodes a stored attachment for saving. Requires an active login.
    pub async fn download(&self, id: ApplicationId, slot: FileSlot) -> Result<Download> {
        if !self.session.check_login_status().await {
            tracing::warn!("Download of application {} refused without login", id);
            return Err(PortalError::Unauthorized(
                "admin login required to download attachments".to_string(),
            ));
        }

        let application = self
            .state
            .find_application(id)
            .ok_or_else(|| PortalError::not_found("Application", id.to_string()))?;
        let file = application.files.get(slot).ok_or_else(|| {
            PortalError::not_found("Attachment", format!("{}/{}", id, slot.field_name()))
        })?;

        Ok(Download {
            file_name: file.name.clone(),
            mime_type: file.data_url.mime_type().to_string(),
            bytes: file.data_url.decode()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portal_core::application::{FileContents, SelectedFile};
    use portal_core::auth::DemoCredentialVerifier;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct InMemoryApplications {
        saved: Mutex<Vec<Vec<Application>>>,
    }

    #[async_trait]
    impl ApplicationRepository for InMemoryApplications {
        async fn load_applications(&self) -> Vec<Application> {
            self.saved.lock().unwrap().last().cloned().unwrap_or_default()
        }

        async fn save_applications(&self, applications: &[Application]) -> Result<()> {
            self.saved.lock().unwrap().push(applications.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct InMemorySession {
        logged_in: AtomicBool,
    }

    #[async_trait]
    impl LoginSessionRepository for InMemorySession {
        async fn check_login_status(&self) -> bool {
            self.logged_in.load(Ordering::SeqCst)
        }

        async fn set_logged_in(&self) -> Result<()> {
            self.logged_in.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn clear_login(&self) -> Result<()> {
            self.logged_in.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Session whose flag can be set but never cleared.
    #[derive(Default)]
    struct StuckSession {
        logged_in: AtomicBool,
    }

    #[async_trait]
    impl LoginSessionRepository for StuckSession {
        async fn check_login_status(&self) -> bool {
            self.logged_in.load(Ordering::SeqCst)
        }

        async fn set_logged_in(&self) -> Result<()> {
            self.logged_in.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn clear_login(&self) -> Result<()> {
            Err(PortalError::storage("session store is read-only"))
        }
    }

    struct TextReader;

    #[async_trait]
    impl FileReader for TextReader {
        async fn read(&self, file: &SelectedFile) -> Result<FileContents> {
            Ok(FileContents {
                mime_type: "text/plain".to_string(),
                bytes: file.name.as_bytes().to_vec(),
            })
        }
    }

    fn portal() -> (Portal, Arc<InMemoryApplications>, Arc<InMemorySession>) {
        let applications = Arc::new(InMemoryApplications::default());
        let session = Arc::new(InMemorySession::default());
        let portal = Portal::new(
            applications.clone(),
            session.clone(),
            Arc::new(DemoCredentialVerifier),
            Arc::new(TextReader),
            Box::new(|_: &RenderedPage| {}),
        );
        (portal, applications, session)
    }

    #[tokio::test]
    async fn test_initialize_starts_on_applicant_view() {
        let (mut portal, _, _) = portal();
        portal.initialize().await;

        assert_eq!(portal.state().view, ViewState::Applicant);
        assert!(!portal.state().is_logged_in);
        assert!(portal.state().applications.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_with_login_starts_on_dashboard() {
        let (mut portal, _, session) = portal();
        session.set_logged_in().await.unwrap();
        portal.initialize().await;

        assert_eq!(portal.state().view, ViewState::Admin);
        assert!(portal.page().dashboard.is_some());
    }

    #[tokio::test]
    async fn test_next_id_is_strictly_increasing() {
        let (mut portal, _, _) = portal();
        portal.initialize().await;

        portal.fill_application_form(ApplicationForm::new("A", "a@example.com", "1"));
        let first = portal.submit_application().await.unwrap();
        portal.fill_application_form(ApplicationForm::new("B", "b@example.com", "2"));
        let second = portal.submit_application().await.unwrap();

        assert!(second > first);
        assert_eq!(
            portal.next_id(first.value() - 10).unwrap(),
            ApplicationId(second.value() + 1)
        );
    }

    #[tokio::test]
    async fn test_next_id_overflow_is_an_error() {
        let (mut portal, _, _) = portal();
        portal.initialize().await;
        portal.state.applications.push(Application {
            id: ApplicationId(i64::MAX),
            submitted_at: Utc::now(),
            full_name: "Last".to_string(),
            email: "last@example.com".to_string(),
            phone: "0".to_string(),
            files: ApplicationFiles::default(),
        });

        let err = portal.next_id(1_736_980_205_000).unwrap_err();
        assert!(matches!(err, PortalError::Internal(_)));

        portal.fill_application_form(ApplicationForm::new("Jane Doe", "jane@example.com", "555-1234"));
        assert!(portal.submit_application().await.is_err());
        assert_eq!(portal.state().applications.len(), 1);
        assert_eq!(portal.state().alert.as_deref(), Some(SUBMISSION_FAILED_ALERT));
        assert_eq!(portal.state().applicant_form.full_name, "Jane Doe");
        assert_eq!(portal.state().submission, SubmissionPhase::Idle);
    }

    #[tokio::test]
    async fn test_logout_failure_keeps_session() {
        let applications = Arc::new(InMemoryApplications::default());
        let session = Arc::new(StuckSession::default());
        let mut portal = Portal::new(
            applications,
            session.clone(),
            Arc::new(DemoCredentialVerifier),
            Arc::new(TextReader),
            Box::new(|_: &RenderedPage| {}),
        );
        portal.initialize().await;
        portal.fill_login_form(LoginForm::new("admin", "password123"));
        assert!(portal.submit_login().await.unwrap());

        let err = portal.logout().await.unwrap_err();
        assert!(matches!(err, PortalError::Storage(_)));
        assert!(portal.state().is_logged_in);
        assert_eq!(portal.state().view, ViewState::Login);
        assert!(portal.page().dashboard.is_none());
    }

    #[tokio::test]
    async fn test_empty_required_field_changes_nothing() {
        let (mut portal, applications, _) = portal();
        portal.initialize().await;

        portal.fill_application_form(ApplicationForm::new("Jane Doe", "", "555-1234"));
        let err = portal.submit_application().await.unwrap_err();

        assert!(matches!(err, PortalError::Validation(_)));
        assert!(portal.state().applications.is_empty());
        assert!(applications.saved.lock().unwrap().is_empty());
        assert_eq!(portal.state().applicant_form.full_name, "Jane Doe");
        assert_eq!(portal.state().submission, SubmissionPhase::Idle);
    }

    #[tokio::test]
    async fn test_submission_persists_full_list_and_clears_draft() {
        let (mut portal, applications, _) = portal();
        portal.initialize().await;

        portal.fill_application_form(
            ApplicationForm::new("Jane Doe", "jane@example.com", "555-1234")
                .with_file(FileSlot::CoverLetter, SelectedFile::from_path("/tmp/letter.txt")),
        );
        let id = portal.submit_application().await.unwrap();

        let saved = applications.saved.lock().unwrap().last().cloned().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
        assert!(saved[0].files.resume.is_none());
        assert_eq!(saved[0].files.cover_letter.as_ref().unwrap().name, "letter.txt");
        assert!(saved[0].files.transcripts.is_none());

        assert_eq!(portal.state().applicant_form, ApplicationForm::default());
        assert!(portal.page().success_notice);
    }

    #[tokio::test]
    async fn test_download_requires_login() {
        let (mut portal, _, _) = portal();
        portal.initialize().await;
        portal.fill_application_form(
            ApplicationForm::new("Jane Doe", "jane@example.com", "555-1234")
                .with_file(FileSlot::Resume, SelectedFile::from_path("/tmp/resume.txt")),
        );
        let id = portal.submit_application().await.unwrap();

        let err = portal.download(id, FileSlot::Resume).await.unwrap_err();
        assert!(matches!(err, PortalError::Unauthorized(_)));

        portal.fill_login_form(LoginForm::new("admin", "password123"));
        assert!(portal.submit_login().await.unwrap());

        let download = portal.download(id, FileSlot::Resume).await.unwrap();
        assert_eq!(download.file_name, "resume.txt");
        assert_eq!(download.mime_type, "text/plain");
        assert_eq!(download.bytes, b"resume.txt");

        let err = portal.download(id, FileSlot::Transcripts).await.unwrap_err();
        assert!(err.is_not_found());
        let err = portal
            .download(ApplicationId(id.value() + 1), FileSlot::Resume)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_draft() {
        let (mut portal, _, session) = portal();
        portal.initialize().await;
        portal.navigate_to(ViewState::Login).await;

        portal.fill_login_form(LoginForm::new("Admin", "password123"));
        assert!(!portal.submit_login().await.unwrap());

        assert!(portal.state().login_error);
        assert_eq!(portal.state().login_form.username, "Admin");
        assert_eq!(portal.state().view, ViewState::Login);
        assert!(!session.check_login_status().await);

        portal.fill_login_form(LoginForm::new("admin", "password123"));
        assert!(portal.submit_login().await.unwrap());
        assert!(!portal.state().login_error);
        assert_eq!(portal.state().login_form, LoginForm::default());
    }

    #[tokio::test]
    async fn test_dismiss_alert() {
        let (mut portal, _, _) = portal();
        portal.initialize().await;
        portal.state.alert = Some(SUBMISSION_FAILED_ALERT.to_string());

        portal.dismiss_alert().await;
        assert!(portal.state().alert.is_none());
        assert!(portal.page().alert.is_none());
    }
}
