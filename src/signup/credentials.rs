//! Credentials step: username and password entry.

use super::{
    draft::Credentials,
    policy::{evaluate, validate_credentials, CredentialError, PasswordPolicyResult, PolicyInput},
};
use crate::error::FlowError;
use secrecy::ExposeSecret;

/// Read-only view of the credentials step as the wizard currently holds it.
#[derive(Debug)]
pub struct CredentialsStep<'a> {
    pub email: &'a str,
    pub credentials: &'a Credentials,
    pub is_loading: bool,
    pub external_error: Option<&'a str>,
}

impl CredentialsStep<'_> {
    fn policy_input(&self) -> PolicyInput<'_> {
        PolicyInput {
            email: self.email,
            username: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
            confirm_password: self.credentials.confirm_password.expose_secret(),
        }
    }

    /// Live strength meter for the current password.
    #[must_use]
    pub fn strength(&self) -> PasswordPolicyResult {
        evaluate(
            self.credentials.password.expose_secret(),
            &self.credentials.username,
            self.email,
        )
    }

    /// Submit gate. Checks the in-flight flag, then the credential rules.
    ///
    /// # Errors
    /// [`FlowError::Busy`] while loading, otherwise the first failing rule.
    pub fn check(&self) -> Result<(), FlowError> {
        if self.is_loading {
            return Err(FlowError::Busy);
        }
        validate_credentials(&self.policy_input()).map_err(FlowError::from)
    }

    /// Rule check without the loading gate.
    ///
    /// # Errors
    /// Returns the first failing credential rule.
    pub fn validate(&self) -> Result<(), CredentialError> {
        validate_credentials(&self.policy_input())
    }
}
