//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod movies;
pub mod profile;
pub mod ratings;
pub mod watchlist;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use marquee_core::config::Config;
use marquee_core::recall::CredentialRecall;
use marquee_core::services::{AuthClient, Services};
use marquee_core::store::FileStore;
use marquee_core::types::Session;

/// Env var that supplies the password without a prompt.
pub const PASSWORD_ENV: &str = "MARQUEE_PASSWORD";

/// Collaborator clients plus the remembered-login front end.
pub struct Clients {
    pub services: Services,
    pub recall: CredentialRecall<AuthClient, FileStore>,
}

impl Clients {
    pub fn from_config(config: &Config) -> Result<Self> {
        let services = Services::from_config(config).context("configure services")?;
        let recall = CredentialRecall::new(services.auth.clone(), FileStore::open_default());
        Ok(Self { services, recall })
    }

    /// Resumes the remembered login, the same way the interactive app does
    /// at startup.
    pub async fn require_session(&self) -> Result<Session> {
        match self.recall.recall().await.into_session() {
            Some(session) => Ok(session),
            None => bail!("Not signed in. Run `marquee login --email <EMAIL> --remember` first."),
        }
    }
}

/// Reads a password from `MARQUEE_PASSWORD`, else one line of stdin.
pub fn read_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    read_secret_line(prompt)
}

/// Reads a password and its confirmation. With `MARQUEE_PASSWORD` set the
/// confirmation is the same value.
pub fn read_password_with_confirmation() -> Result<(String, String)> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok((password.clone(), password));
    }
    let password = read_secret_line("Password: ")?;
    let confirm = read_secret_line("Confirm password: ")?;
    Ok((password, confirm))
}

fn read_secret_line(prompt: &str) -> Result<String> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut line = String::new();
        stdin.lock().read_line(&mut line).context("read password")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;
    let result = {
        let _raw = RawModeGuard::enable()?;
        read_hidden()
    };
    writeln!(stderr)?;
    result
}

/// Raw mode (no echo) until dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SecretInput {
    Pending,
    Done,
    Cancelled,
}

fn read_hidden() -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read().context("read password")? else {
            continue;
        };
        match apply_secret_key(&mut secret, key) {
            SecretInput::Pending => {}
            SecretInput::Done => return Ok(secret),
            SecretInput::Cancelled => bail!("Cancelled"),
        }
    }
}

fn apply_secret_key(secret: &mut String, key: KeyEvent) -> SecretInput {
    if key.kind == KeyEventKind::Release {
        return SecretInput::Pending;
    }
    match key.code {
        KeyCode::Enter => SecretInput::Done,
        KeyCode::Esc => SecretInput::Cancelled,
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretInput::Cancelled
        }
        KeyCode::Char(c) => {
            secret.push(c);
            SecretInput::Pending
        }
        KeyCode::Backspace => {
            secret.pop();
            SecretInput::Pending
        }
        _ => SecretInput::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(secret: &mut String, code: KeyCode) -> SecretInput {
        apply_secret_key(secret, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_hidden_input_edits_and_submits() {
        let mut secret = String::new();
        for c in "hunter2x".chars() {
            assert_eq!(press(&mut secret, KeyCode::Char(c)), SecretInput::Pending);
        }
        press(&mut secret, KeyCode::Backspace);

        assert_eq!(press(&mut secret, KeyCode::Enter), SecretInput::Done);
        assert_eq!(secret, "hunter2");
    }

    #[test]
    fn test_hidden_input_ctrl_c_cancels() {
        let mut secret = String::from("abc");
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(apply_secret_key(&mut secret, key), SecretInput::Cancelled);
        assert_eq!(secret, "abc");
    }
}
