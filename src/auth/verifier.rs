// src/auth/verifier.rs
//! Login callback verification
//!
//! The four-point sequence that authenticates a login callback: state
//! nonce, code exchange, subject binding, audience binding. Skipping any
//! step admits a forged login, and the order is load-bearing: the nonce
//! comparison happens before any provider call so a forged request costs
//! no network I/O and leaves no side effects.

use tracing::{debug, warn};

use super::provider::{AuthError, IdentityProvider};

/// Identity claims established by a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    pub email: String,
    pub name: String,
    pub picture_url: Option<String>,
}

/// Outcome of verifying a login callback.
#[derive(Debug)]
pub enum Verification {
    /// A new identity was verified for this session.
    Connected {
        identity: VerifiedIdentity,
        access_token: String,
    },
    /// The session already holds a credential for this subject. Not an
    /// error; the caller responds as an idempotent success.
    AlreadyConnected,
}

/// Verify a login callback against the session's pending nonce.
///
/// `session_nonce` is the nonce previously issued for this session (None
/// when the login page was never rendered), `bound_subject` the subject of
/// any credential already bound to the session.
pub async fn verify(
    provider: &dyn IdentityProvider,
    client_id: &str,
    redirect_uri: &str,
    presented_state: &str,
    session_nonce: Option<&str>,
    bound_subject: Option<&str>,
    code: &str,
) -> Result<Verification, AuthError> {
    // 1. Anti-forgery check, before any network call.
    match session_nonce {
        Some(nonce) if nonce == presented_state => {}
        _ => {
            warn!("Login callback state nonce mismatch");
            return Err(AuthError::InvalidState);
        }
    }

    // 2. Exchange the authorization code for an access credential.
    let token = provider.exchange_code(code, redirect_uri).await?;

    // 3. Introspect the credential; provider-reported errors surface verbatim.
    let info = provider.token_info(&token.access_token).await?;
    if let Some(message) = info.error {
        warn!(error = %message, "Token introspection reported an error");
        return Err(AuthError::ProviderError(message));
    }

    // 4a. The introspected token must belong to the identity that logged in.
    if info.user_id.as_deref() != Some(token.subject.as_str()) {
        warn!("Introspected token subject does not match id_token sub claim");
        return Err(AuthError::SubjectMismatch);
    }

    // 4b. The token must have been issued to this application.
    if info.issued_to.as_deref() != Some(client_id) {
        warn!("Introspected token audience does not match our client id");
        return Err(AuthError::AudienceMismatch);
    }

    // 4c. Re-login of the already-bound subject is an idempotent success.
    if bound_subject == Some(token.subject.as_str()) {
        debug!(subject = %token.subject, "Subject already connected to this session");
        return Ok(Verification::AlreadyConnected);
    }

    // 5. Fetch profile fields for the local user record.
    let profile = provider.user_info(&token.access_token).await?;
    let email = profile
        .email
        .ok_or_else(|| AuthError::ProviderError("userinfo response missing email".to_string()))?;

    Ok(Verification::Connected {
        identity: VerifiedIdentity {
            subject_id: token.subject,
            email,
            name: profile.name.unwrap_or_default(),
            picture_url: profile.picture,
        },
        access_token: token.access_token,
    })
}
