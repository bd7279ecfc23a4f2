use super::{otp::StdoutNavigator, prompt::Prompt};
use crate::{
    auth::SessionContext,
    cli::globals::GlobalArgs,
    otp::OtpVerificationPage,
    routing::email_query,
    signup::{Role, SignupWizard},
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// Drives the whole wizard from the terminal.
///
/// # Errors
/// Returns the first error of any step.
pub async fn execute(args: Args) -> Result<()> {
    let context = Arc::new(SessionContext::new());
    let provider = Arc::new(args.globals.auth_client(Arc::clone(&context))?);
    let store = args.globals.profile_client()?;
    let mut prompt = Prompt::stdin();
    let mut wizard = SignupWizard::new();

    // 1. Email entry
    wizard
        .submit_email(&args.email, provider.as_ref(), &args.globals.site_url)
        .await?;
    let email = wizard
        .draft()
        .map(|draft| draft.email().to_string())
        .context("signup draft missing after email step")?;
    eprintln!("A 6-digit code was sent to {email}");

    // 2. OTP verification
    let mut page = OtpVerificationPage::mount(
        &email_query(&email),
        &args.globals.site_url,
        provider,
        context,
        Arc::new(StdoutNavigator),
    );
    let code = prompt.code("Code").await?;
    wizard.set_loading(true);
    let verified = page.verify(code.expose_secret()).await;
    wizard.set_loading(false);
    verified?;
    wizard.mark_otp_verified()?;

    // 3. Credentials
    let password = prompt.password("Password").await?;
    let confirm = if std::env::var(super::prompt::PASSWORD_ENV).is_ok() {
        password.clone()
    } else {
        prompt.password("Confirm password").await?
    };
    wizard.set_username(args.username)?;
    wizard.set_password(password.expose_secret())?;
    wizard.set_confirm_password(confirm.expose_secret())?;
    if let Some(step) = wizard.credentials_step() {
        let strength = step.strength();
        eprintln!("Strength: {} ({}%)", strength.strength_label, strength.score);
    }
    wizard.submit_credentials()?;

    // 4. Role and confirmation
    wizard.select_role(args.role)?;
    let route = wizard.complete(&store).await?;

    if let Some(profile) = wizard.profile() {
        info!(id = profile.id, "profile registered");
        println!("Registered {} as {}", profile.username, args.role);
    }
    println!("{route}");
    Ok(())
}
