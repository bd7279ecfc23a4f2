//! Client for the auth provider's `GoTrue` REST API. Requests carry the public
//! anon key in the `apikey` header; the session returned by OTP verification
//! is written into the shared [`SessionContext`], which is also what
//! `get_session` reads.

use super::{
    session::{AuthSubscription, SessionContext},
    types::{OtpOptions, OtpType, Session},
    AuthProvider,
};
use crate::{error::ApiError, http::JsonClient, otp::OtpCode};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::form_urlencoded;

const RECOVER_PATH: &str = "/auth/v1/recover";
const OTP_PATH: &str = "/auth/v1/otp";
const VERIFY_PATH: &str = "/auth/v1/verify";

#[derive(Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    token: &'a str,
    #[serde(rename = "type")]
    otp_type: OtpType,
}

pub struct GoTrueClient {
    api: JsonClient,
    anon_key: SecretString,
    context: Arc<SessionContext>,
}

impl GoTrueClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        anon_key: SecretString,
        context: Arc<SessionContext>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            api: JsonClient::new(base_url)?,
            anon_key,
            context,
        })
    }

    #[must_use]
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    fn headers(&self) -> Vec<(String, String)> {
        let key = self.anon_key.expose_secret();
        vec![
            ("apikey".to_string(), key.to_string()),
            ("Authorization".to_string(), format!("Bearer {key}")),
        ]
    }
}

/// Appends `redirect_to` to a path when present.
fn with_redirect(path: &str, redirect_to: Option<&str>) -> String {
    match redirect_to.map(str::trim).filter(|value| !value.is_empty()) {
        Some(redirect) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("redirect_to", redirect)
                .finish();
            format!("{path}?{query}")
        }
        None => path.to_string(),
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    #[instrument(skip_all)]
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), ApiError> {
        let path = with_redirect(RECOVER_PATH, Some(redirect_to));
        self.api
            .post_json(&path, &EmailRequest { email }, &self.headers())
            .await
    }

    #[instrument(skip_all, fields(otp_type = ?otp_type))]
    async fn verify_otp(
        &self,
        email: &str,
        token: &OtpCode,
        otp_type: OtpType,
    ) -> Result<(), ApiError> {
        let request = VerifyRequest {
            email,
            token: token.expose(),
            otp_type,
        };
        let session: Session = self
            .api
            .post_json_response(VERIFY_PATH, &request, &self.headers())
            .await?;
        debug!("otp verified, storing session");
        self.context.set_session(session).await;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.context.current().await)
    }

    #[instrument(skip_all, fields(create_user = options.should_create_user))]
    async fn sign_in_with_otp(&self, email: &str, options: &OtpOptions) -> Result<(), ApiError> {
        let path = with_redirect(OTP_PATH, options.email_redirect_to.as_deref());
        let request = OtpRequest {
            email,
            create_user: options.should_create_user,
        };
        self.api.post_json(&path, &request, &self.headers()).await
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.context.subscribe()
    }
}
