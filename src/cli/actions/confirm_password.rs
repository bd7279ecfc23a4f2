use super::prompt::Prompt;
use crate::{cli::globals::GlobalArgs, reset::PasswordConfirmation, routing::email_query};
use anyhow::{bail, Result};
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
}

/// # Errors
/// Returns an error if the profile store rejects the credentials.
pub async fn execute(args: Args) -> Result<()> {
    let store = args.globals.profile_client()?;
    let query = email_query(&args.email);
    let mut page = PasswordConfirmation::mount(&query, Arc::new(store));

    if let Some(route) = page.missing_email_route() {
        bail!("no email to confirm, start again at {route}");
    }

    let password = Prompt::stdin().password("Password").await?;
    let profile = page.confirm(&password).await?;
    println!("Signed in as {} <{}>", profile.username, profile.email);
    Ok(())
}
