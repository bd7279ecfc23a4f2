//! Routes between flow steps. The `email` query parameter is the only hand-off
//! between pages; its absence is a user-visible state, never a silent default.

use std::fmt;
use url::form_urlencoded;

pub const EMAIL_ENTRY_PATH: &str = "/auth/signup";
pub const OTP_PATH: &str = "/auth/otp";
pub const SIGNUP_COMPLETE_PATH: &str = "/signup/complete";
pub const PASSWORD_CONFIRM_PATH: &str = "/auth/confirm-password";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Destinations the flows navigate to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    EmailEntry,
    Otp { email: String },
    SignupComplete { email: String },
    PasswordConfirm { email: String },
    ResetPassword,
    Dashboard,
}

impl Route {
    /// Path with the email query-encoded where the route carries one.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Route::EmailEntry => EMAIL_ENTRY_PATH.to_string(),
            Route::Otp { email } => with_email(OTP_PATH, email),
            Route::SignupComplete { email } => with_email(SIGNUP_COMPLETE_PATH, email),
            Route::PasswordConfirm { email } => with_email(PASSWORD_CONFIRM_PATH, email),
            Route::ResetPassword => RESET_PASSWORD_PATH.to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_path())
    }
}

/// Moves the user to another page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// `email=<encoded>` query string, as read back by [`email_from_query`].
#[must_use]
pub fn email_query(email: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("email", email)
        .finish()
}

fn with_email(path: &str, email: &str) -> String {
    format!("{path}?{}", email_query(email))
}

/// Reads the `email` parameter from a query string (with or without the
/// leading `?`). Blank values count as missing.
#[must_use]
pub fn email_from_query(query: &str) -> Option<String> {
    let query = query.trim().trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "email")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Builds an absolute redirect URL for provider emails, e.g. the OTP magic link.
#[must_use]
pub fn absolute_url(site_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        site_url.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
