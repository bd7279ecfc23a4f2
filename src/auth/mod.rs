//! Backends consumed by the flows. The auth provider owns OTP delivery and
//! sessions; the profile store owns user profiles and issues JWTs. Flows only
//! see the traits below, so they run unchanged against the HTTP clients or
//! in-process fakes.
//!
//! Implementations must never log passwords, OTP codes, or token material.

pub mod gotrue;
pub mod session;
pub mod strapi;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use gotrue::GoTrueClient;
pub use session::{AuthSubscription, SessionContext};
pub use strapi::StrapiClient;
pub use types::{
    AuthEvent, AuthUser, NewProfile, OtpOptions, OtpType, Profile, ProfileAuth, Session,
};

use crate::{error::ApiError, otp::OtpCode};
use async_trait::async_trait;
use secrecy::SecretString;

/// Session and OTP surface of the auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sends a password-reset email whose link points at `redirect_to`.
    async fn reset_password_for_email(&self, email: &str, redirect_to: &str)
        -> Result<(), ApiError>;

    /// Verifies a one-time code. A successful call does not guarantee that a
    /// session is immediately visible through [`AuthProvider::get_session`].
    async fn verify_otp(&self, email: &str, token: &OtpCode, otp_type: OtpType)
        -> Result<(), ApiError>;

    /// Returns the active session, if any. Idempotent and side-effect free.
    async fn get_session(&self) -> Result<Option<Session>, ApiError>;

    /// Requests an OTP email.
    async fn sign_in_with_otp(&self, email: &str, options: &OtpOptions) -> Result<(), ApiError>;

    /// Subscribes to session changes.
    fn on_auth_state_change(&self) -> AuthSubscription;
}

/// Profile surface of the profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn login(&self, email: &str, password: &SecretString) -> Result<ProfileAuth, ApiError>;

    async fn register(&self, profile: &NewProfile) -> Result<ProfileAuth, ApiError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<Profile>, ApiError>;

    /// Keeps the JWT for later authenticated calls.
    async fn store_access_token(&self, jwt: SecretString);
}
