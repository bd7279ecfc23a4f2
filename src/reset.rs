//! Password-reset request and password re-confirmation.
//!
//! Both are single request/response exchanges tracked by [`RequestStatus`].

use crate::{
    auth::{AuthProvider, Profile, ProfileStore},
    error::{FlowError, Notice},
    routing::{absolute_url, email_from_query, Route, RESET_PASSWORD_PATH},
    signup::{normalize_email, parse_email},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Pending,
    Success,
    Error(String),
}

impl RequestStatus {
    fn from_error(err: &FlowError) -> Self {
        RequestStatus::Error(err.to_string())
    }
}

/// Sends the password-reset email. The link in it points at
/// `<site>/auth/reset-password`.
pub struct PasswordResetRequest {
    provider: Arc<dyn AuthProvider>,
    redirect_to: String,
    status: RequestStatus,
    notice: Option<Notice>,
}

impl PasswordResetRequest {
    pub fn new(provider: Arc<dyn AuthProvider>, site_url: &str) -> Self {
        Self {
            provider,
            redirect_to: absolute_url(site_url, RESET_PASSWORD_PATH),
            status: RequestStatus::Idle,
            notice: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    #[must_use]
    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// # Errors
    /// Validation errors for the email, remote errors from the provider.
    #[instrument(skip_all)]
    pub async fn submit(&mut self, input: &str) -> Result<(), FlowError> {
        if self.status == RequestStatus::Pending {
            return Err(FlowError::Busy);
        }

        let email = match parse_email(input) {
            Ok(email) => email,
            Err(err) => {
                self.status = RequestStatus::from_error(&err);
                return Err(err);
            }
        };

        self.status = RequestStatus::Pending;
        let sent = self
            .provider
            .reset_password_for_email(&email, &self.redirect_to)
            .await;

        match sent {
            Ok(()) => {
                info!("password reset email requested");
                self.status = RequestStatus::Success;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "password reset request failed");
                let err = FlowError::remote("Reset failed", err);
                self.status = RequestStatus::from_error(&err);
                self.notice = err.notice();
                Err(err)
            }
        }
    }
}

/// Re-authenticates an already known user against the profile store and
/// stores the fresh JWT. Mounted from `/auth/confirm-password?email=...`.
pub struct PasswordConfirmation {
    email: Option<String>,
    store: Arc<dyn ProfileStore>,
    status: RequestStatus,
    notice: Option<Notice>,
}

impl PasswordConfirmation {
    pub fn mount(query: &str, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            email: email_from_query(query).map(|email| normalize_email(&email)),
            store,
            status: RequestStatus::Idle,
            notice: None,
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// [`Route::EmailEntry`] when the page was opened without an email.
    #[must_use]
    pub fn missing_email_route(&self) -> Option<Route> {
        self.email.is_none().then_some(Route::EmailEntry)
    }

    #[must_use]
    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// # Errors
    /// [`FlowError::MissingEmail`] without an email, a validation error for an
    /// empty password, or the store's rejection.
    #[instrument(skip_all)]
    pub async fn confirm(&mut self, password: &SecretString) -> Result<Profile, FlowError> {
        let Some(email) = self.email.clone() else {
            return Err(FlowError::MissingEmail);
        };
        if self.status == RequestStatus::Pending {
            return Err(FlowError::Busy);
        }
        if password.expose_secret().is_empty() {
            let err = FlowError::validation("Please enter your password.");
            self.status = RequestStatus::from_error(&err);
            return Err(err);
        }

        self.status = RequestStatus::Pending;
        let login = self.store.login(&email, password).await;

        match login {
            Ok(auth) => {
                self.store.store_access_token(auth.jwt).await;
                info!("password confirmed");
                self.status = RequestStatus::Success;
                Ok(auth.user)
            }
            Err(err) => {
                warn!(error = %err, "password confirmation failed");
                let err = FlowError::remote("Sign in failed", err);
                self.status = RequestStatus::from_error(&err);
                self.notice = err.notice();
                Err(err)
            }
        }
    }
}
