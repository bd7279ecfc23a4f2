//! # CamEdu (signup & credential flows)
//!
//! `camedu` holds the account-creation core of the CamEdu platform: the
//! multi-step signup wizard, the password policy, and the OTP verification
//! flow that waits for an eventually-consistent session from the auth provider.
//!
//! ## Flow
//!
//! 1. **Email entry:** the email is normalized and an OTP is requested.
//! 2. **OTP verification:** the 6-digit code is verified, then the session is
//!    discovered (immediate check, three polls one second apart, then a single
//!    five-second subscription). The email is handed to the next step through
//!    the `email` query parameter.
//! 3. **Credentials:** username, password and confirmation are validated
//!    locally, fail-fast, before the wizard may advance.
//! 4. **Role & confirmation:** the profile is registered with the profile store
//!    and the draft is discarded.
//!
//! ## Backends
//!
//! The auth provider (Supabase `GoTrue`) owns sessions and OTP delivery; the
//! profile store (Strapi) owns user profiles and issues JWTs. Both are consumed
//! through traits in [`auth`], so flows can run against in-process fakes.
//!
//! Secrets (passwords, OTP codes, tokens) are held in `SecretString` and are
//! never logged.

pub mod auth;
pub mod cli;
pub mod error;
pub mod http;
pub mod otp;
pub mod reset;
pub mod routing;
pub mod signup;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
