use crate::{auth::SessionContext, cli::globals::GlobalArgs, reset::PasswordResetRequest};
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
}

/// # Errors
/// Returns an error if the email is invalid or the provider rejects the request.
pub async fn execute(args: Args) -> Result<()> {
    let provider = args
        .globals
        .auth_client(Arc::new(SessionContext::new()))?;
    let mut request = PasswordResetRequest::new(Arc::new(provider), &args.globals.site_url);

    request.submit(&args.email).await?;
    println!("Password reset email sent (link: {})", request.redirect_to());
    Ok(())
}
