//! The authenticator capability (spec §1, §6.1).
//!
//! This trait is the abstract boundary to the WebAuthn PRF request/response
//! path; the core never speaks to a real authenticator, it only consumes
//! this interface. `support::fake_authenticator` provides a deterministic
//! stand-in used by tests, doctests, and the demo CLI.

use thiserror::Error;

use crate::credential::Credential;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("user cancelled the authenticator prompt")]
    Cancelled,
    #[error("authenticator operation timed out")]
    Timeout,
    #[error("authenticator does not support PRF")]
    PrfNotSupported,
    #[error("authenticator response did not include a PRF result")]
    PrfNotEnabled,
}

/// PRF output is always exactly 32 bytes (spec §1, §6.1).
pub type PrfOutput = [u8; 32];

pub trait AuthenticatorClient {
    /// Register a new passkey with the PRF extension enabled, and
    /// immediately perform a PRF evaluation so the caller can derive a KEK
    /// from it. Fails with `PrfNotSupported` if the authenticator has no
    /// PRF extension.
    fn create_credential(
        &self,
        user_name: &str,
        passkey_name: &str,
    ) -> impl std::future::Future<Output = Result<(Credential, PrfOutput), AuthError>> + Send;

    /// Ask the authenticator to perform one assertion allowing any of
    /// `credentials`, evaluating PRF with each candidate's stored
    /// `prf_salt`. Returns which credential was used and that credential's
    /// PRF output.
    fn authenticate_any(
        &self,
        credentials: &[Credential],
    ) -> impl std::future::Future<Output = Result<(String, PrfOutput), AuthError>> + Send;
}
