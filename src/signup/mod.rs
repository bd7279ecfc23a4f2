//! Multi-step signup: email entry, credentials, role, final registration.

pub mod credentials;
pub mod draft;
pub mod email;
pub mod policy;
pub mod wizard;

pub use credentials::CredentialsStep;
pub use draft::{Credentials, Role, SignupDraft};
pub use email::{normalize_email, parse_email, request_otp, valid_email};
pub use policy::{
    evaluate, validate_credentials, CredentialError, PasswordPolicyResult, PolicyCheck,
    PolicyInput, StrengthLabel,
};
pub use wizard::{SignupStep, SignupWizard};
