use crate::auth::{GoTrueClient, SessionContext, StrapiClient};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Backend connection settings shared by every subcommand.
#[derive(Clone)]
pub struct GlobalArgs {
    pub auth_url: Option<String>,
    pub auth_key: SecretString,
    pub profile_url: Option<String>,
    pub site_url: String,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL.to_string())
    }
}

impl GlobalArgs {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        Self {
            auth_url: None,
            auth_key: SecretString::default(),
            profile_url: None,
            site_url,
        }
    }

    pub fn set_auth_key(&mut self, key: SecretString) {
        self.auth_key = key;
    }

    /// # Errors
    /// Returns an error if `--auth-url` is missing or the client cannot be built.
    pub fn auth_client(&self, context: Arc<SessionContext>) -> Result<GoTrueClient> {
        let url = self
            .auth_url
            .as_deref()
            .context("missing required argument: --auth-url")?;
        Ok(GoTrueClient::new(url, self.auth_key.clone(), context)?)
    }

    /// # Errors
    /// Returns an error if `--profile-url` is missing or the client cannot be built.
    pub fn profile_client(&self) -> Result<StrapiClient> {
        let url = self
            .profile_url
            .as_deref()
            .context("missing required argument: --profile-url")?;
        Ok(StrapiClient::new(url)?)
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("auth_url", &self.auth_url)
            .field("auth_key", &"***")
            .field("profile_url", &self.profile_url)
            .field("site_url", &self.site_url)
            .finish()
    }
}
