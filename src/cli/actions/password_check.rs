use super::prompt::Prompt;
use crate::signup::{evaluate, validate_credentials, PolicyInput};
use anyhow::Result;
use secrecy::ExposeSecret;

#[derive(Debug)]
pub struct Args {
    pub username: String,
    pub email: String,
}

/// Scores the password and applies the submit rules, without any network call.
///
/// # Errors
/// Returns the first failing rule.
pub async fn execute(args: Args) -> Result<()> {
    let password = Prompt::stdin().password("Password").await?;
    let password = password.expose_secret();

    let result = evaluate(password, &args.username, &args.email);
    for check in &result.checks {
        let mark = if check.passed { "x" } else { " " };
        println!("[{mark}] {}", check.label);
    }
    println!("Strength: {} ({}%)", result.strength_label, result.score);

    validate_credentials(&PolicyInput {
        email: &args.email,
        username: &args.username,
        password,
        confirm_password: password,
    })?;

    println!("Password accepted");
    Ok(())
}
