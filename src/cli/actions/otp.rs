use super::prompt::Prompt;
use crate::{
    auth::SessionContext,
    cli::globals::GlobalArgs,
    otp::OtpVerificationPage,
    routing::{email_query, Navigator, Route},
    signup::{parse_email, request_otp},
};
use anyhow::{bail, Result};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;

/// Prints every navigation target on stdout.
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, route: &Route) {
        println!("{route}");
    }
}

#[derive(Debug)]
pub struct RequestArgs {
    pub globals: GlobalArgs,
    pub email: String,
}

/// The code itself is read by [`verify`] from `CAMEDU_OTP_CODE` or stdin.
#[derive(Debug)]
pub struct VerifyArgs {
    pub globals: GlobalArgs,
    pub email: String,
}

/// # Errors
/// Returns an error if the email is invalid or the provider rejects the request.
pub async fn request(args: RequestArgs) -> Result<()> {
    let email = parse_email(&args.email)?;
    let provider = args
        .globals
        .auth_client(Arc::new(SessionContext::new()))?;

    let route = request_otp(&provider, &email, &args.globals.site_url).await?;
    info!("code sent");
    println!("{route}");
    Ok(())
}

/// # Errors
/// Returns an error if the code is rejected or no session shows up.
pub async fn verify(args: VerifyArgs) -> Result<()> {
    let email = parse_email(&args.email)?;
    let context = Arc::new(SessionContext::new());
    let provider = Arc::new(args.globals.auth_client(Arc::clone(&context))?);
    let query = email_query(&email);

    let mut page = OtpVerificationPage::mount(
        &query,
        &args.globals.site_url,
        provider,
        context,
        Arc::new(StdoutNavigator),
    );
    if let Some(route) = page.missing_email_route() {
        bail!("no email to verify, start again at {route}");
    }

    let code = Prompt::stdin().code("Code").await?;
    page.verify(code.expose_secret()).await?;
    Ok(())
}
