//! Line input for secrets. Passwords and one-time codes never come from argv.

use anyhow::{Context, Result};
use secrecy::SecretString;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

pub const PASSWORD_ENV: &str = "CAMEDU_PASSWORD";
pub const OTP_CODE_ENV: &str = "CAMEDU_OTP_CODE";

pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

fn secret_from_env(name: &str) -> Option<SecretString> {
    std::env::var(name).ok().map(SecretString::from)
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Reads one line; the label goes to stderr so stdout stays clean.
    pub async fn line(&mut self, label: &str) -> Result<String> {
        eprint!("{label}: ");
        self.lines
            .next_line()
            .await
            .context("failed to read from stdin")?
            .with_context(|| format!("stdin closed before {label}"))
    }

    /// `CAMEDU_PASSWORD` when set, otherwise one line from stdin.
    pub async fn password(&mut self, label: &str) -> Result<SecretString> {
        self.secret(PASSWORD_ENV, label).await
    }

    /// `CAMEDU_OTP_CODE` when set, otherwise one line from stdin.
    pub async fn code(&mut self, label: &str) -> Result<SecretString> {
        self.secret(OTP_CODE_ENV, label).await
    }

    async fn secret(&mut self, env: &str, label: &str) -> Result<SecretString> {
        if let Some(secret) = secret_from_env(env) {
            return Ok(secret);
        }
        self.line(label).await.map(SecretString::from)
    }
}
