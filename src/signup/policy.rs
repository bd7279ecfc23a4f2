//! Password policy for the credentials step.
//!
//! Two views over the same rules: [`validate_credentials`] runs at submit time
//! and stops at the first failing rule; [`evaluate`] runs on every edit and
//! scores the four strength checks for the live meter.

use crate::error::FlowError;
use std::fmt;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const MSG_MISMATCH: &str = "Passwords do not match.";
pub const MSG_TOO_SHORT: &str = "Password must be at least 8 characters long.";
pub const MSG_LETTERS_AND_NUMBERS: &str = "Password must contain both letters and numbers.";
pub const MSG_CONTAINS_USERNAME: &str = "Password cannot contain your username.";
pub const MSG_CONTAINS_EMAIL: &str = "Password cannot contain parts of your email.";
pub const MSG_REQUIRED_FIELDS: &str = "Please fill in all required fields.";

/// Submit-time rule violations, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialError {
    Mismatch,
    TooShort,
    LettersAndNumbers,
    ContainsUsername,
    ContainsEmail,
    RequiredFields,
}

impl CredentialError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            CredentialError::Mismatch => MSG_MISMATCH,
            CredentialError::TooShort => MSG_TOO_SHORT,
            CredentialError::LettersAndNumbers => MSG_LETTERS_AND_NUMBERS,
            CredentialError::ContainsUsername => MSG_CONTAINS_USERNAME,
            CredentialError::ContainsEmail => MSG_CONTAINS_EMAIL,
            CredentialError::RequiredFields => MSG_REQUIRED_FIELDS,
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CredentialError {}

impl From<CredentialError> for FlowError {
    fn from(err: CredentialError) -> Self {
        FlowError::validation(err.message())
    }
}

/// Borrowed view of everything the rules look at.
#[derive(Clone, Copy, Debug)]
pub struct PolicyInput<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Substring of the email before `@`; the whole string when there is no `@`.
#[must_use]
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or_default()
}

fn has_min_length(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn has_letters_and_numbers(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_alphabetic()) && password.chars().any(|c| c.is_ascii_digit())
}

/// Case-insensitive containment. An empty needle never matches, so a blank
/// username or email is reported by the required-fields rule instead.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Fail-fast submit validation.
///
/// # Errors
/// Returns the first rule the input violates.
pub fn validate_credentials(input: &PolicyInput<'_>) -> Result<(), CredentialError> {
    if input.password != input.confirm_password {
        return Err(CredentialError::Mismatch);
    }
    if !has_min_length(input.password) {
        return Err(CredentialError::TooShort);
    }
    if !has_letters_and_numbers(input.password) {
        return Err(CredentialError::LettersAndNumbers);
    }
    if contains_ignore_case(input.password, input.username) {
        return Err(CredentialError::ContainsUsername);
    }
    if contains_ignore_case(input.password, email_local_part(input.email)) {
        return Err(CredentialError::ContainsEmail);
    }
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(CredentialError::RequiredFields);
    }
    Ok(())
}

/// Meter label derived from the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrengthLabel {
    StartTyping,
    NeedsImprovement,
    GettingThere,
    Strong,
    Excellent,
}

impl StrengthLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StrengthLabel::StartTyping => "Start typing",
            StrengthLabel::NeedsImprovement => "Needs improvement",
            StrengthLabel::GettingThere => "Getting there",
            StrengthLabel::Strong => "Strong",
            StrengthLabel::Excellent => "Excellent",
        }
    }

    fn from_score(password_empty: bool, score: u8) -> Self {
        if password_empty {
            StrengthLabel::StartTyping
        } else if score >= 100 {
            StrengthLabel::Excellent
        } else if score >= 75 {
            StrengthLabel::Strong
        } else if score >= 50 {
            StrengthLabel::GettingThere
        } else {
            StrengthLabel::NeedsImprovement
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyCheck {
    pub label: &'static str,
    pub passed: bool,
}

/// Live strength report for the current input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordPolicyResult {
    pub checks: Vec<PolicyCheck>,
    pub satisfied_count: usize,
    /// 0, 25, 50, 75 or 100.
    pub score: u8,
    pub strength_label: StrengthLabel,
}

impl PasswordPolicyResult {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.satisfied_count == self.checks.len()
    }
}

/// Scores the four strength checks. Independent of the confirmation field.
#[must_use]
pub fn evaluate(password: &str, username: &str, email: &str) -> PasswordPolicyResult {
    let checks = vec![
        PolicyCheck {
            label: "At least 8 characters",
            passed: has_min_length(password),
        },
        PolicyCheck {
            label: "Contains letters and numbers",
            passed: has_letters_and_numbers(password),
        },
        PolicyCheck {
            label: "Does not contain your username",
            passed: !contains_ignore_case(password, username),
        },
        PolicyCheck {
            label: "Does not contain your email",
            passed: !contains_ignore_case(password, email_local_part(email)),
        },
    ];

    let satisfied_count = checks.iter().filter(|check| check.passed).count();
    let score = u8::try_from(satisfied_count * 100 / checks.len()).unwrap_or(100);
    let strength_label = StrengthLabel::from_score(password.is_empty(), score);

    PasswordPolicyResult {
        checks,
        satisfied_count,
        score,
        strength_label,
    }
}
