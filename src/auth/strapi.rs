//! Client for the profile store's users-permissions API.

use super::{
    types::{NewProfile, Profile, ProfileAuth},
    ProfileStore,
};
use crate::{error::ApiError, http::JsonClient};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::instrument;

const LOGIN_PATH: &str = "/api/auth/local";
const REGISTER_PATH: &str = "/api/auth/local/register";
const USERS_PATH: &str = "/api/users";

#[derive(Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    role_type: &'a str,
}

pub struct StrapiClient {
    api: JsonClient,
    access_token: RwLock<Option<SecretString>>,
}

impl StrapiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            api: JsonClient::new(base_url)?,
            access_token: RwLock::new(None),
        })
    }

    pub async fn has_access_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    async fn auth_headers(&self) -> Vec<(String, String)> {
        self.access_token
            .read()
            .await
            .as_ref()
            .map(|token| {
                vec![(
                    "Authorization".to_string(),
                    format!("Bearer {}", token.expose_secret()),
                )]
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProfileStore for StrapiClient {
    #[instrument(skip_all)]
    async fn login(&self, email: &str, password: &SecretString) -> Result<ProfileAuth, ApiError> {
        let request = LoginRequest {
            identifier: email,
            password: password.expose_secret(),
        };
        self.api.post_json_response(LOGIN_PATH, &request, &[]).await
    }

    #[instrument(skip_all, fields(role = %profile.role))]
    async fn register(&self, profile: &NewProfile) -> Result<ProfileAuth, ApiError> {
        let request = RegisterRequest {
            username: &profile.username,
            email: &profile.email,
            password: profile.password.expose_secret(),
            role_type: profile.role.as_str(),
        };
        self.api
            .post_json_response(REGISTER_PATH, &request, &[])
            .await
    }

    #[instrument(skip_all)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<Profile>, ApiError> {
        let headers = self.auth_headers().await;
        let users: Vec<Profile> = self
            .api
            .get_json(USERS_PATH, &[("filters[email][$eq]", email)], &headers)
            .await?;
        Ok(users.into_iter().next())
    }

    async fn store_access_token(&self, jwt: SecretString) {
        *self.access_token.write().await = Some(jwt);
    }
}
