//! Auth Controller
//!
//! Validates login/register forms, exchanges credentials for a session
//! and hands it to the session store. Logout clears the store. A session
//! that cannot be persisted degrades to memory-only with a warning — the
//! user stays signed in for this run.

use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiError, BankApi};
use crate::models::Session;
use crate::session::SessionStore;
use crate::validators::{validate_form, Check, FormReport};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Why a login/register attempt failed
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form did not validate; fields are annotated in the report
    #[error("form validation failed")]
    Invalid(FormReport),
    /// The server rejected the credentials or never answered
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Validate the login form
pub fn validate_login(email: &str, password: &str) -> FormReport {
    validate_form(&[
        ("email", email, &[Check::Required, Check::Email]),
        ("password", password, &[Check::Required]),
    ])
}

/// Validate the register form
pub fn validate_register(name: &str, email: &str, password: &str) -> FormReport {
    validate_form(&[
        ("name", name, &[Check::Required]),
        ("email", email, &[Check::Required, Check::Email]),
        (
            "password",
            password,
            &[Check::Required, Check::MinLength(MIN_PASSWORD_LEN)],
        ),
    ])
}

/// Controller for sign-in, sign-up and sign-out
pub struct AuthController {
    api: Arc<dyn BankApi>,
    session: SessionStore,
}

impl AuthController {
    /// Wire a controller to its backend and session store
    pub fn new(api: Arc<dyn BankApi>, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Validate credentials, sign in and store the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let report = validate_login(email, password);
        if !report.is_ok() {
            return Err(AuthError::Invalid(report));
        }

        let response = self.api.login(email.trim(), password).await?;
        let session = Session {
            token: response.access_token,
            user_id: response.user_id,
            profile: response.user,
        };
        if let Err(err) = self.session.store(session.clone()) {
            tracing::warn!(error = %err, "session not persisted, continuing in memory");
        }
        tracing::info!(user_id = session.user_id, "signed in");
        Ok(session)
    }

    /// Validate the form, create an account and store the session
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let report = validate_register(name, email, password);
        if !report.is_ok() {
            return Err(AuthError::Invalid(report));
        }

        let response = self
            .api
            .register(name.trim(), email.trim(), password)
            .await?;
        let session = Session {
            token: response.access_token,
            user_id: response.user_id,
            profile: response.user,
        };
        if let Err(err) = self.session.store(session.clone()) {
            tracing::warn!(error = %err, "session not persisted, continuing in memory");
        }
        tracing::info!(user_id = session.user_id, "account created");
        Ok(session)
    }

    /// Drop the session; the store clears token, user id and profile
    /// together
    pub fn logout(&self) {
        if let Err(err) = self.session.clear() {
            tracing::warn!(error = %err, "session file not removed");
        }
        tracing::info!("signed out");
    }
}
