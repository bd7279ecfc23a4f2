//! OTP verification page: accepts the 6-digit code, verifies it with the auth
//! provider, waits for the session to become visible, then hands the email to
//! account completion.
//!
//! The provider may confirm the code before its session is readable, so
//! discovery is bounded: one immediate check, [`SESSION_POLL_ATTEMPTS`] polls
//! [`SESSION_POLL_INTERVAL`] apart, then a single subscription to auth changes
//! limited to [`SESSION_WAIT_TIMEOUT`]. These values are tuned against the
//! provider's replication lag.

use super::{code::OtpCode, cooldown::ResendCooldown};
use crate::{
    auth::{AuthProvider, OtpOptions, OtpType, Session, SessionContext},
    error::{FlowError, Notice},
    routing::{absolute_url, email_from_query, Navigator, Route, OTP_PATH},
    signup::normalize_email,
};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, instrument, warn};

pub const SESSION_POLL_ATTEMPTS: u32 = 3;
pub const SESSION_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const SESSION_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyStatus {
    /// No `email` query parameter; the user must go back to email entry.
    MissingEmail,
    Idle,
    Verifying,
    Verified,
}

pub struct OtpVerificationPage {
    email: Option<String>,
    status: VerifyStatus,
    error: Option<FlowError>,
    redirect_to: String,
    cooldown: ResendCooldown,
    provider: Arc<dyn AuthProvider>,
    context: Arc<SessionContext>,
    navigator: Arc<dyn Navigator>,
}

impl OtpVerificationPage {
    /// Mounts the page from its query string. With a usable email the resend
    /// cooldown starts immediately; without one the page stays in
    /// [`VerifyStatus::MissingEmail`]. Outside a tokio runtime the countdown
    /// holds until the first verify or resend.
    pub fn mount(
        query: &str,
        site_url: &str,
        provider: Arc<dyn AuthProvider>,
        context: Arc<SessionContext>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let email = email_from_query(query).map(|email| normalize_email(&email));
        let mut cooldown = ResendCooldown::new();

        let status = if email.is_some() {
            cooldown.start();
            VerifyStatus::Idle
        } else {
            warn!("otp page mounted without email");
            VerifyStatus::MissingEmail
        };

        Self {
            email,
            status,
            error: None,
            redirect_to: absolute_url(site_url, OTP_PATH),
            cooldown,
            provider,
            context,
            navigator,
        }
    }

    #[must_use]
    pub fn status(&self) -> VerifyStatus {
        self.status
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Inline error for the last failed action.
    #[must_use]
    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    /// Modal notice for the last remote failure.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.error.as_ref().and_then(FlowError::notice)
    }

    /// Acknowledges the modal and clears the inline error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Where the "back to signup" action leads when the page has no email.
    #[must_use]
    pub fn missing_email_route(&self) -> Option<Route> {
        self.email.is_none().then_some(Route::EmailEntry)
    }

    #[must_use]
    pub fn cooldown(&self) -> &ResendCooldown {
        &self.cooldown
    }

    /// Verifies `input` and, once a session is visible, navigates to account
    /// completion exactly once.
    ///
    /// # Errors
    /// Returns a local error for a missing email or malformed code, and a remote
    /// error when the provider rejects the code or no session appears.
    #[instrument(skip_all)]
    pub async fn verify(&mut self, input: &str) -> Result<Route, FlowError> {
        let email = self.require_email()?;
        match self.status {
            VerifyStatus::Verified => {
                return Err(FlowError::InvalidStep("This code was already verified."));
            }
            VerifyStatus::Verifying => return Err(FlowError::Busy),
            VerifyStatus::Idle | VerifyStatus::MissingEmail => {}
        }
        self.error = None;

        let code = match OtpCode::parse(input) {
            Ok(code) => code,
            Err(err) => return Err(self.fail(err)),
        };

        self.status = VerifyStatus::Verifying;
        info!("verifying otp");

        let verified = self
            .provider
            .verify_otp(&email, &code, OtpType::Email)
            .await;
        if let Err(err) = verified {
            warn!(error = %err, "otp verification rejected");
            return Err(self.fail(FlowError::remote("Verification failed", err)));
        }

        let session = await_session(self.provider.as_ref()).await;
        if session.is_none() {
            warn!("no session after otp verification");
            return Err(self.fail(FlowError::SessionNotFound));
        }

        self.context.remember_email(&email).await;
        self.cooldown.stop();
        self.status = VerifyStatus::Verified;

        let route = Route::SignupComplete { email };
        info!(route = %route, "otp verified");
        self.navigator.navigate(&route);
        Ok(route)
    }

    /// Requests a new code and restarts the cooldown.
    ///
    /// # Errors
    /// Returns a local error while the cooldown is running or the email is
    /// missing, and a remote error when the provider call fails.
    #[instrument(skip_all)]
    pub async fn resend(&mut self) -> Result<(), FlowError> {
        let email = self.require_email()?;
        if !self.cooldown.is_ready() {
            return Err(FlowError::validation(format!(
                "Please wait {}s before requesting a new code.",
                self.cooldown.remaining()
            )));
        }
        self.error = None;

        let options = OtpOptions {
            should_create_user: true,
            email_redirect_to: Some(self.redirect_to.clone()),
        };
        let result = self.provider.sign_in_with_otp(&email, &options).await;
        match result {
            Ok(()) => {
                debug!("otp resent");
                self.cooldown.start();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "otp resend failed");
                Err(self.fail(FlowError::remote("Could not resend code", err)))
            }
        }
    }

    /// Sends the user back to email entry when there is nothing to verify.
    fn require_email(&mut self) -> Result<String, FlowError> {
        self.cooldown.resume();
        match self.email.clone() {
            Some(email) => Ok(email),
            None => {
                self.navigator.navigate(&Route::EmailEntry);
                Err(FlowError::MissingEmail)
            }
        }
    }

    fn fail(&mut self, err: FlowError) -> FlowError {
        self.status = VerifyStatus::Idle;
        self.error = Some(err.clone());
        err
    }
}

/// Reads the session, treating provider errors as "not yet".
async fn check_session(provider: &dyn AuthProvider) -> Option<Session> {
    match provider.get_session().await {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "session check failed");
            None
        }
    }
}

/// Bounded session discovery after a successful OTP verification. A timeout
/// resolves to `None`; it never escapes as an unhandled failure.
pub async fn await_session(provider: &dyn AuthProvider) -> Option<Session> {
    if let Some(session) = check_session(provider).await {
        return Some(session);
    }

    for attempt in 1..=SESSION_POLL_ATTEMPTS {
        sleep(SESSION_POLL_INTERVAL).await;
        if let Some(session) = check_session(provider).await {
            debug!(attempt, "session found by polling");
            return Some(session);
        }
    }

    let mut subscription = provider.on_auth_state_change();
    // A session published between the last poll and the subscription is only
    // visible through a direct read.
    if let Some(session) = check_session(provider).await {
        return Some(session);
    }

    let waited = timeout(SESSION_WAIT_TIMEOUT, async {
        while let Some(event) = subscription.next().await {
            if let Some(session) = event.session() {
                return Some(session.clone());
            }
        }
        None
    })
    .await;
    subscription.unsubscribe();

    match waited {
        Ok(Some(session)) => {
            debug!("session found by subscription");
            Some(session)
        }
        Ok(None) => None,
        Err(_) => {
            debug!("session subscription timed out");
            None
        }
    }
}
