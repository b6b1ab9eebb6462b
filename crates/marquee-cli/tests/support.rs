//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use wiremock::MockServer;

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// `marquee` with an isolated home and both services pointed at `server`.
pub fn marquee(home: &Path, server: &MockServer) -> Command {
    let mut cmd = cargo_bin_cmd!("marquee");
    cmd.env("MARQUEE_HOME", home)
        .env("MARQUEE_BACKEND_URL", server.uri())
        .env("MARQUEE_ANON_KEY", "anon-key")
        .env("TMDB_BASE_URL", server.uri())
        .env("TMDB_API_KEY", "tmdb-key")
        .env_remove("MARQUEE_PASSWORD")
        .env_remove("MARQUEE_LOG");
    cmd
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh,
        "user": {
            "id": "u-1",
            "email": "ada@example.com",
            "user_metadata": {"username": "ada"}
        }
    })
}

/// Writes a remembered login the way a `--remember` sign-in leaves it.
pub fn remember(home: &Path, email: &str, refresh_token: &str) {
    let record = json!({"email": email, "refresh_token": refresh_token}).to_string();
    let entries = json!({"remember_login": record});
    fs::write(home.join("storage.json"), entries.to_string()).unwrap();
}

/// The remembered login currently on disk, if any.
pub fn remembered(home: &Path) -> Option<Value> {
    let contents = fs::read_to_string(home.join("storage.json")).ok()?;
    let entries: Value = serde_json::from_str(&contents).ok()?;
    let raw = entries.get("remember_login")?.as_str()?;
    serde_json::from_str(raw).ok()
}
