//! Error types shared by the flows. Two tiers exist: local validation errors,
//! which never touch the network and are fixed by editing input, and remote
//! errors caught from provider calls, which carry a [`Notice`] for a blocking
//! modal in addition to the inline message.

use std::fmt;

/// Maximum number of error body characters surfaced to the user.
pub const MAX_ERROR_CHARS: usize = 200;

/// Transport failures from the auth provider or the profile store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
}

impl ApiError {
    /// Message safe to show in the UI. HTTP failures surface the sanitized
    /// server message as-is; everything else uses the display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(message) => write!(formatter, "Config error: {message}"),
            ApiError::Network(message) => write!(formatter, "Network error: {message}"),
            ApiError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            ApiError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            ApiError::Parse(message) => write!(formatter, "Response error: {message}"),
            ApiError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Title/message pair shown in a modal that the user must acknowledge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Errors returned by the signup, OTP and reset flows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowError {
    /// Local validation failure; the message is shown verbatim.
    Validation(String),
    /// The `email` query parameter was absent.
    MissingEmail,
    /// A sibling request is in flight; submission is disabled.
    Busy,
    /// The operation is not valid for the current step.
    InvalidStep(&'static str),
    /// OTP was accepted but no session showed up in time.
    SessionNotFound,
    /// A provider call failed.
    Remote { title: &'static str, source: ApiError },
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        FlowError::Validation(message.into())
    }

    pub fn remote(title: &'static str, source: ApiError) -> Self {
        FlowError::Remote { title, source }
    }

    /// Local errors never reached the network.
    #[must_use]
    pub fn is_local(&self) -> bool {
        !matches!(self, FlowError::Remote { .. } | FlowError::SessionNotFound)
    }

    /// Modal notice for remote failures. Local errors are shown inline only.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            FlowError::Remote { title, source } => Some(Notice::new(*title, source.user_message())),
            FlowError::SessionNotFound => Some(Notice::new("Verification failed", self.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::Validation(message) => write!(formatter, "{message}"),
            FlowError::MissingEmail => write!(
                formatter,
                "Missing email address. Please start again from the email step."
            ),
            FlowError::Busy => write!(formatter, "Please wait for the current request to finish."),
            FlowError::InvalidStep(reason) => write!(formatter, "{reason}"),
            FlowError::SessionNotFound => write!(
                formatter,
                "Session not found after OTP verification. Please try again."
            ),
            FlowError::Remote { source, .. } => write!(formatter, "{}", source.user_message()),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Sanitizes error bodies for user-facing messages by trimming and truncating.
#[must_use]
pub fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
