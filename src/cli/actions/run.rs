use crate::cli::actions::{
    confirm_password, otp, password_check, reset_password, signup, Action,
};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::PasswordCheck(args) => password_check::execute(args).await,
        Action::OtpRequest(args) => otp::request(args).await,
        Action::OtpVerify(args) => otp::verify(args).await,
        Action::ResetPassword(args) => reset_password::execute(args).await,
        Action::ConfirmPassword(args) => confirm_password::execute(args).await,
        Action::Signup(args) => signup::execute(args).await,
    }
}
