pub mod code;
pub mod cooldown;
pub mod verification;

pub use code::{OtpCode, OTP_LENGTH};
pub use cooldown::{ResendCooldown, RESEND_COOLDOWN_SECONDS};
pub use verification::{
    await_session, OtpVerificationPage, VerifyStatus, SESSION_POLL_ATTEMPTS,
    SESSION_POLL_INTERVAL, SESSION_WAIT_TIMEOUT,
};
