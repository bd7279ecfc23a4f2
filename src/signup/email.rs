//! Email entry: normalize, check shape, request the OTP email.

use crate::{
    auth::{AuthProvider, OtpOptions},
    error::FlowError,
    routing::{absolute_url, Route, OTP_PATH},
};
use regex::Regex;
use tracing::{info, warn};

/// Normalize an email for lookups and provider calls.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Normalizes and validates user input.
///
/// # Errors
/// Returns a validation error for blank or malformed input.
pub fn parse_email(input: &str) -> Result<String, FlowError> {
    let email = normalize_email(input);
    if email.is_empty() {
        return Err(FlowError::validation("Email is required."));
    }
    if !valid_email(&email) {
        return Err(FlowError::validation("Email address looks invalid."));
    }
    Ok(email)
}

/// Sends the OTP email and returns the OTP page route for `email`.
///
/// # Errors
/// Returns a remote error when the provider rejects the request.
pub async fn request_otp(
    provider: &dyn AuthProvider,
    email: &str,
    site_url: &str,
) -> Result<Route, FlowError> {
    let options = OtpOptions {
        should_create_user: true,
        email_redirect_to: Some(absolute_url(site_url, OTP_PATH)),
    };

    provider
        .sign_in_with_otp(email, &options)
        .await
        .map_err(|err| {
            warn!(error = %err, "otp request failed");
            FlowError::remote("Could not send code", err)
        })?;

    info!("otp requested");
    Ok(Route::Otp {
        email: email.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
        assert!(!valid_email("two@@example.com"));
    }

    #[test]
    fn parse_email_reports_blank_and_malformed() {
        assert_eq!(
            parse_email("   "),
            Err(FlowError::validation("Email is required."))
        );
        assert_eq!(
            parse_email("nope"),
            Err(FlowError::validation("Email address looks invalid."))
        );
        assert_eq!(parse_email(" Jane@CamEdu.dev"), Ok("jane@camedu.dev".to_string()));
    }
}
