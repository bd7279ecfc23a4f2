use crate::error::FlowError;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// OTP codes are 6 ASCII digits.
pub const OTP_LENGTH: usize = 6;

/// A syntactically valid one-time code. The digits are held as a secret and
/// never appear in `Debug` output.
#[derive(Clone)]
pub struct OtpCode(SecretString);

impl OtpCode {
    /// Parses user input, ignoring surrounding whitespace.
    ///
    /// # Errors
    /// Returns a validation error unless the input is exactly six ASCII digits.
    pub fn parse(input: &str) -> Result<Self, FlowError> {
        let trimmed = input.trim();
        if trimmed.len() != OTP_LENGTH || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(FlowError::validation(format!(
                "Please enter the {OTP_LENGTH}-digit code from your email."
            )));
        }
        Ok(Self(SecretString::from(trimmed)))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(***)")
    }
}
