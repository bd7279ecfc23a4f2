//! Signup wizard.
//!
//! Steps run `Email → Otp → Credentials → Role → Confirmation → Completed`.
//! Every transition is a method that checks the current step first, so an
//! out-of-order call is an error instead of a silent jump. The wizard owns the
//! [`SignupDraft`]; it is dropped on successful completion (or with the wizard).

use super::{
    credentials::CredentialsStep,
    draft::{Credentials, Role, SignupDraft},
    email::{parse_email, request_otp},
};
use crate::{
    auth::{AuthProvider, NewProfile, Profile, ProfileStore},
    error::{FlowError, Notice},
    routing::Route,
};
use secrecy::SecretString;
use tracing::{info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignupStep {
    Email,
    /// OTP requested; waiting for the verification page to confirm it.
    Otp,
    Credentials,
    Role,
    Confirmation,
    Completed,
}

#[derive(Debug)]
pub struct SignupWizard {
    step: SignupStep,
    draft: Option<SignupDraft>,
    is_loading: bool,
    error: Option<FlowError>,
    external_error: Option<String>,
    notice: Option<Notice>,
    profile: Option<Profile>,
}

impl Default for SignupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SignupWizard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: SignupStep::Email,
            draft: Some(SignupDraft::new()),
            is_loading: false,
            error: None,
            external_error: None,
            notice: None,
            profile: None,
        }
    }

    /// Resumes at the credentials step for an email the OTP page already
    /// verified (`/signup/complete?email=...`).
    ///
    /// # Errors
    /// Returns a validation error when the email is blank or malformed.
    pub fn from_verified_email(email: &str) -> Result<Self, FlowError> {
        let email = parse_email(email)?;
        let mut wizard = Self::new();
        if let Some(draft) = wizard.draft.as_mut() {
            draft.lock_email(email);
            draft.otp_verified = true;
        }
        wizard.step = SignupStep::Credentials;
        Ok(wizard)
    }

    #[must_use]
    pub fn step(&self) -> SignupStep {
        self.step
    }

    /// `None` once the signup completed.
    #[must_use]
    pub fn draft(&self) -> Option<&SignupDraft> {
        self.draft.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Marks an outside request in flight (e.g. the OTP page verifying).
    /// While set, submissions answer [`FlowError::Busy`] before any rule runs.
    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Last local error, cleared by the next successful transition.
    #[must_use]
    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn external_error(&self) -> Option<&str> {
        self.external_error.as_deref()
    }

    /// Pending modal notice; taking it acknowledges it.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Profile registered by [`SignupWizard::complete`].
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    fn expect_step(&self, step: SignupStep, reason: &'static str) -> Result<(), FlowError> {
        if self.step == step {
            Ok(())
        } else {
            Err(FlowError::InvalidStep(reason))
        }
    }

    fn draft_mut(&mut self) -> Result<&mut SignupDraft, FlowError> {
        self.draft
            .as_mut()
            .ok_or(FlowError::InvalidStep("Signup already completed."))
    }

    fn record<T>(&mut self, result: Result<T, FlowError>) -> Result<T, FlowError> {
        match &result {
            Ok(_) => self.error = None,
            Err(err) => {
                if let Some(notice) = err.notice() {
                    self.notice = Some(notice);
                }
                self.error = Some(err.clone());
            }
        }
        result
    }

    /// Step 1: validates the email, requests an OTP and locks the email.
    ///
    /// # Errors
    /// Validation errors for bad input, remote errors when the OTP request fails.
    #[instrument(skip_all)]
    pub async fn submit_email(
        &mut self,
        input: &str,
        provider: &dyn AuthProvider,
        site_url: &str,
    ) -> Result<Route, FlowError> {
        self.expect_step(SignupStep::Email, "Email was already submitted.")?;
        if self.is_loading {
            return Err(FlowError::Busy);
        }
        let email = match parse_email(input) {
            Ok(email) => email,
            Err(err) => return self.record(Err(err)),
        };

        self.is_loading = true;
        let requested = request_otp(provider, &email, site_url).await;
        self.is_loading = false;

        let route = self.record(requested)?;
        self.draft_mut()?.lock_email(email);
        self.step = SignupStep::Otp;
        Ok(route)
    }

    /// Step 2 completes once the OTP page discovered a session.
    ///
    /// # Errors
    /// [`FlowError::InvalidStep`] unless the wizard is waiting for the OTP.
    pub fn mark_otp_verified(&mut self) -> Result<(), FlowError> {
        self.expect_step(SignupStep::Otp, "No code is pending verification.")?;
        self.draft_mut()?.otp_verified = true;
        self.step = SignupStep::Credentials;
        Ok(())
    }

    fn credentials_mut(&mut self) -> Result<&mut Credentials, FlowError> {
        self.expect_step(SignupStep::Credentials, "Credentials can only be edited on their step.")?;
        Ok(&mut self.draft_mut()?.credentials)
    }

    /// # Errors
    /// [`FlowError::InvalidStep`] outside the credentials step.
    pub fn set_username(&mut self, username: impl Into<String>) -> Result<(), FlowError> {
        self.credentials_mut()?.username = username.into();
        Ok(())
    }

    /// # Errors
    /// [`FlowError::InvalidStep`] outside the credentials step.
    pub fn set_password(&mut self, password: impl Into<String>) -> Result<(), FlowError> {
        self.credentials_mut()?.password = SecretString::from(password.into());
        Ok(())
    }

    /// # Errors
    /// [`FlowError::InvalidStep`] outside the credentials step.
    pub fn set_confirm_password(&mut self, password: impl Into<String>) -> Result<(), FlowError> {
        self.credentials_mut()?.confirm_password = SecretString::from(password.into());
        Ok(())
    }

    /// Current credentials view, available on the credentials step.
    #[must_use]
    pub fn credentials_step(&self) -> Option<CredentialsStep<'_>> {
        if self.step != SignupStep::Credentials {
            return None;
        }
        self.draft.as_ref().map(|draft| CredentialsStep {
            email: draft.email(),
            credentials: &draft.credentials,
            is_loading: self.is_loading,
            external_error: self.external_error.as_deref(),
        })
    }

    /// Step 3: fail-fast validation, then on to role selection.
    ///
    /// # Errors
    /// The first failing credential rule, or [`FlowError::Busy`].
    pub fn submit_credentials(&mut self) -> Result<(), FlowError> {
        let checked = self
            .credentials_step()
            .ok_or(FlowError::InvalidStep(
                "Credentials can only be submitted on their step.",
            ))?
            .check();
        self.record(checked)?;
        self.step = SignupStep::Role;
        Ok(())
    }

    /// Step 4.
    ///
    /// # Errors
    /// [`FlowError::InvalidStep`] outside the role step.
    pub fn select_role(&mut self, role: Role) -> Result<(), FlowError> {
        self.expect_step(SignupStep::Role, "Role can only be chosen after credentials.")?;
        self.draft_mut()?.role = Some(role);
        self.step = SignupStep::Confirmation;
        Ok(())
    }

    /// Goes one step back, keeping everything entered so far. The email and
    /// OTP steps cannot be revisited because the email is locked.
    ///
    /// # Errors
    /// [`FlowError::InvalidStep`] when there is no earlier editable step.
    pub fn back(&mut self) -> Result<SignupStep, FlowError> {
        self.step = match self.step {
            SignupStep::Role => SignupStep::Credentials,
            SignupStep::Confirmation => SignupStep::Role,
            SignupStep::Email | SignupStep::Otp | SignupStep::Credentials => {
                return Err(FlowError::InvalidStep("The email step cannot be revisited."));
            }
            SignupStep::Completed => {
                return Err(FlowError::InvalidStep("Signup already completed."));
            }
        };
        Ok(self.step)
    }

    /// Step 5: registers the profile, stores its JWT and drops the draft.
    ///
    /// A rejected registration keeps the wizard on confirmation with the
    /// server message in [`SignupWizard::external_error`].
    ///
    /// # Errors
    /// Local errors for an incomplete draft, remote errors from the store.
    #[instrument(skip_all)]
    pub async fn complete(&mut self, store: &dyn ProfileStore) -> Result<Route, FlowError> {
        self.expect_step(SignupStep::Confirmation, "Nothing to confirm yet.")?;
        if self.is_loading {
            return Err(FlowError::Busy);
        }

        let profile = {
            let draft = self.draft_mut()?;
            if !draft.otp_verified {
                return Err(FlowError::InvalidStep("Email must be verified before signing up."));
            }
            NewProfile {
                username: draft.credentials.username.trim().to_string(),
                email: draft.email().to_string(),
                password: draft.credentials.password.clone(),
                role: draft.role.unwrap_or_default(),
            }
        };

        self.is_loading = true;
        let registered = store.register(&profile).await;
        self.is_loading = false;

        let auth = match registered {
            Ok(auth) => auth,
            Err(err) => {
                warn!(error = %err, "profile registration failed");
                self.external_error = Some(err.user_message());
                return self.record(Err(FlowError::remote("Signup failed", err)));
            }
        };

        store.store_access_token(auth.jwt).await;
        info!(role = %profile.role, "signup completed");

        self.draft = None;
        self.external_error = None;
        self.error = None;
        self.profile = Some(auth.user);
        self.step = SignupStep::Completed;
        Ok(Route::Dashboard)
    }
}
