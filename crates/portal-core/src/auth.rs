//! Admin credential verification.
//!
//! Authentication is an external collaborator: the portal only asks a
//! [`CredentialVerifier`] whether a username/password pair is accepted.

/// Decides whether submitted admin credentials are accepted.
///
/// Implementations backed by a real identity provider can be plugged in
/// without touching the login flow.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns `true` if the pair is accepted.
    async fn verify(&self, username: &str, password: &str) -> bool;
}

/// Demo username accepted by [`DemoCredentialVerifier`].
pub const DEMO_USERNAME: &str = "admin";

/// Demo password accepted by [`DemoCredentialVerifier`].
pub const DEMO_PASSWORD: &str = "password123";

/// Accepts exactly one hardcoded credential pair.
///
/// # Security Note
///
/// This is NOT secure and exists for demonstration only. The pair is
/// compiled into the binary and compared in plain text. There is no lockout
/// and no rate limiting.
///
/// # Example
///
/// ```
/// use portal_core::auth::{CredentialVerifier, DemoCredentialVerifier};
///
/// # tokio_test_block(async {
/// let verifier = DemoCredentialVerifier;
/// assert!(verifier.verify("admin", "password123").await);
/// assert!(!verifier.verify("Admin", "password123").await);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCredentialVerifier;

#[async_trait::async_trait]
impl CredentialVerifier for DemoCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> bool {
        // Exact comparison: case-sensitive, no trimming.
        username == DEMO_USERNAME && password == DEMO_PASSWORD
    }
}
