pub mod confirm_password;
pub mod otp;
pub mod password_check;
pub mod reset_password;
pub mod signup;

mod prompt;

// Internal "interpreter" for `Action`; the match lives in `run.rs`.
mod run;

#[derive(Debug)]
pub enum Action {
    PasswordCheck(password_check::Args),
    OtpRequest(otp::RequestArgs),
    OtpVerify(otp::VerifyArgs),
    ResetPassword(reset_password::Args),
    ConfirmPassword(confirm_password::Args),
    Signup(signup::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
