pub mod backend;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_PASSWORD_CHECK: &str = "password-check";
pub const CMD_OTP_REQUEST: &str = "otp-request";
pub const CMD_OTP_VERIFY: &str = "otp-verify";
pub const CMD_RESET_PASSWORD: &str = "reset-password";
pub const CMD_CONFIRM_PASSWORD: &str = "confirm-password";
pub const CMD_SIGNUP: &str = "signup";

pub const ARG_EMAIL: &str = "email";
pub const ARG_USERNAME: &str = "username";
pub const ARG_ROLE: &str = "role";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email address")
        .required(true)
}

fn username_arg() -> Arg {
    Arg::new(ARG_USERNAME)
        .short('u')
        .long(ARG_USERNAME)
        .help("Account username")
}

fn subcommands() -> [Command; 6] {
    [
        Command::new(CMD_PASSWORD_CHECK)
            .about("Check a password against the signup policy (reads the password from stdin or CAMEDU_PASSWORD)")
            .arg(username_arg())
            .arg(
                Arg::new(ARG_EMAIL)
                    .short('e')
                    .long(ARG_EMAIL)
                    .help("Account email address"),
            ),
        Command::new(CMD_OTP_REQUEST)
            .about("Send a one-time signup code")
            .arg(email_arg()),
        Command::new(CMD_OTP_VERIFY)
            .about("Verify a one-time code and wait for the session (reads the code from stdin or CAMEDU_OTP_CODE)")
            .arg(email_arg()),
        Command::new(CMD_RESET_PASSWORD)
            .about("Send a password-reset email")
            .arg(email_arg()),
        Command::new(CMD_CONFIRM_PASSWORD)
            .about("Re-authenticate against the profile store (reads the password from stdin or CAMEDU_PASSWORD)")
            .arg(email_arg()),
        Command::new(CMD_SIGNUP)
            .about("Run the full signup: code and password are read from stdin")
            .arg(email_arg())
            .arg(username_arg().required(true))
            .arg(
                Arg::new(ARG_ROLE)
                    .short('r')
                    .long(ARG_ROLE)
                    .help("Account role")
                    .value_parser(["student", "instructor"])
                    .default_value("student"),
            ),
    ]
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("camedu")
        .about("CamEdu signup and credential flows")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(subcommands());

    let command = backend::with_args(command);
    logging::with_args(command)
}
