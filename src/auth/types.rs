use crate::signup::Role;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User as reported by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued by the auth provider after OTP verification.
#[derive(Clone, Debug, Deserialize)]
pub struct Session {
    pub access_token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Clone, Debug)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

impl AuthEvent {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Kind of one-time token being verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    Email,
    Signup,
    Recovery,
    Magiclink,
}

/// Options for requesting an OTP email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpOptions {
    pub should_create_user: bool,
    pub email_redirect_to: Option<String>,
}

/// Profile held by the profile store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub confirmed: bool,
}

/// JWT and profile returned by profile-store login and registration.
#[derive(Clone, Deserialize)]
pub struct ProfileAuth {
    pub jwt: SecretString,
    pub user: Profile,
}

impl fmt::Debug for ProfileAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileAuth")
            .field("jwt", &"***")
            .field("user", &self.user)
            .finish()
    }
}

/// Final signup submission.
#[derive(Clone)]
pub struct NewProfile {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
}

impl fmt::Debug for NewProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewProfile")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_session(email: &str) -> Session {
    Session {
        access_token: SecretString::from("access-token"),
        refresh_token: Some(SecretString::from("refresh-token")),
        expires_in: 3600,
        token_type: "bearer".to_string(),
        user: AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        },
    }
}
