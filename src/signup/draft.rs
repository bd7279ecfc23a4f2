use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role chosen after the credentials step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Username/password/confirmation as typed on the credentials step.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            confirm_password: SecretString::from(confirm_password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .finish()
    }
}

/// In-progress signup. Lives only in memory until the final submission.
#[derive(Clone, Default)]
pub struct SignupDraft {
    email: String,
    pub credentials: Credentials,
    pub role: Option<Role>,
    pub otp_verified: bool,
}

impl SignupDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The email can be set once; later calls are ignored and return `false`.
    pub fn lock_email(&mut self, email: String) -> bool {
        if !self.email.is_empty() {
            return false;
        }
        self.email = email;
        true
    }

    #[must_use]
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.credentials.password.expose_secret()
    }

    #[must_use]
    pub fn confirm_password(&self) -> &str {
        self.credentials.confirm_password.expose_secret()
    }
}

impl fmt::Debug for SignupDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupDraft")
            .field("email", &self.email)
            .field("credentials", &self.credentials)
            .field("role", &self.role)
            .field("otp_verified", &self.otp_verified)
            .finish()
    }
}
