use crate::cli::globals::DEFAULT_SITE_URL;
use clap::{Arg, Command};

pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_AUTH_KEY: &str = "auth-key";
pub const ARG_PROFILE_URL: &str = "profile-url";
pub const ARG_SITE_URL: &str = "site-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Auth provider base URL, e.g. https://<project>.supabase.co")
                .env("CAMEDU_AUTH_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_AUTH_KEY)
                .long(ARG_AUTH_KEY)
                .help("Auth provider anon key")
                .env("CAMEDU_AUTH_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_PROFILE_URL)
                .long(ARG_PROFILE_URL)
                .help("Profile store base URL")
                .env("CAMEDU_PROFILE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Public site URL used for email redirect links")
                .env("CAMEDU_SITE_URL")
                .default_value(DEFAULT_SITE_URL)
                .global(true),
        )
}
