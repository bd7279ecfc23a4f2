use crate::cli::{
    actions::{confirm_password, otp, password_check, reset_password, signup, Action},
    commands::{
        backend::{ARG_AUTH_KEY, ARG_AUTH_URL, ARG_PROFILE_URL, ARG_SITE_URL},
        ARG_EMAIL, ARG_ROLE, ARG_USERNAME, CMD_CONFIRM_PASSWORD, CMD_OTP_REQUEST,
        CMD_OTP_VERIFY, CMD_PASSWORD_CHECK, CMD_RESET_PASSWORD, CMD_SIGNUP,
    },
    globals::{GlobalArgs, DEFAULT_SITE_URL},
};
use crate::signup::Role;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn globals(matches: &ArgMatches) -> GlobalArgs {
    let site_url = matches
        .get_one::<String>(ARG_SITE_URL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

    let mut globals = GlobalArgs::new(site_url);
    globals.auth_url = matches.get_one::<String>(ARG_AUTH_URL).cloned();
    globals.profile_url = matches.get_one::<String>(ARG_PROFILE_URL).cloned();
    if let Some(key) = matches.get_one::<String>(ARG_AUTH_KEY) {
        globals.set_auth_key(SecretString::from(key.clone()));
    }
    globals
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = globals(matches);

    match matches.subcommand() {
        Some((CMD_PASSWORD_CHECK, sub)) => Ok(Action::PasswordCheck(password_check::Args {
            username: sub.get_one::<String>(ARG_USERNAME).cloned().unwrap_or_default(),
            email: sub.get_one::<String>(ARG_EMAIL).cloned().unwrap_or_default(),
        })),
        Some((CMD_OTP_REQUEST, sub)) => Ok(Action::OtpRequest(otp::RequestArgs {
            globals,
            email: required(sub, ARG_EMAIL)?,
        })),
        Some((CMD_OTP_VERIFY, sub)) => Ok(Action::OtpVerify(otp::VerifyArgs {
            globals,
            email: required(sub, ARG_EMAIL)?,
        })),
        Some((CMD_RESET_PASSWORD, sub)) => Ok(Action::ResetPassword(reset_password::Args {
            globals,
            email: required(sub, ARG_EMAIL)?,
        })),
        Some((CMD_CONFIRM_PASSWORD, sub)) => {
            Ok(Action::ConfirmPassword(confirm_password::Args {
                globals,
                email: required(sub, ARG_EMAIL)?,
            }))
        }
        Some((CMD_SIGNUP, sub)) => {
            let role = sub
                .get_one::<String>(ARG_ROLE)
                .map(|role| role.parse::<Role>())
                .transpose()
                .map_err(|err| anyhow!(err))?
                .unwrap_or_default();
            Ok(Action::Signup(signup::Args {
                globals,
                email: required(sub, ARG_EMAIL)?,
                username: required(sub, ARG_USERNAME)?,
                role,
            }))
        }
        Some((name, _)) => Err(anyhow!("unknown subcommand: {name}")),
        None => Err(anyhow!("missing subcommand")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> Result<Action> {
        let matches = commands::new().get_matches_from(args);
        handler(&matches)
    }

    #[test]
    fn signup_action_carries_globals_and_role() {
        let action = parse(&[
            "camedu",
            "--auth-url",
            "https://auth.camedu.dev",
            "--auth-key",
            "anon",
            "--profile-url",
            "https://cms.camedu.dev",
            "--site-url",
            "https://camedu.dev",
            "signup",
            "-e",
            "jane@camedu.dev",
            "-u",
            "janed",
            "-r",
            "instructor",
        ])
        .unwrap();

        let Action::Signup(args) = action else {
            panic!("expected signup action");
        };
        assert_eq!(args.email, "jane@camedu.dev");
        assert_eq!(args.username, "janed");
        assert_eq!(args.role, Role::Instructor);
        assert_eq!(args.globals.auth_url.as_deref(), Some("https://auth.camedu.dev"));
        assert_eq!(args.globals.auth_key.expose_secret(), "anon");
        assert_eq!(args.globals.site_url, "https://camedu.dev");
    }

    #[test]
    fn otp_verify_carries_only_the_email() {
        let action = parse(&["camedu", "otp-verify", "--email", "jane@camedu.dev"]).unwrap();

        let Action::OtpVerify(args) = action else {
            panic!("expected otp-verify action");
        };
        assert_eq!(args.email, "jane@camedu.dev");
    }

    #[test]
    fn password_check_needs_no_backend() {
        let action = parse(&["camedu", "password-check", "-u", "janed"]).unwrap();
        let Action::PasswordCheck(args) = action else {
            panic!("expected password-check action");
        };
        assert_eq!(args.username, "janed");
        assert_eq!(args.email, "");
    }
}
