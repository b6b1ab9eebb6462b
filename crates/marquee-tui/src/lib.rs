//! Full-screen TUI for Marquee.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::Result;
use marquee_core::config::Config;
use marquee_core::services::Services;
use marquee_core::store::FileStore;
use marquee_core::toast::ToastCenter;
pub use runtime::TuiRuntime;

/// Runs the interactive app until the user quits. Must be called from
/// inside a multi-threaded Tokio runtime.
///
/// # Errors
/// Returns an error if there is no terminal, the services are not
/// configured, or the terminal fails mid-session.
pub fn run_tui(config: &Config) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The interactive app requires a terminal.\n\
             Use `marquee movies popular` or `marquee watchlist list` for plain output."
        );
    }

    let services = Services::from_config(config)?;
    let toasts = ToastCenter::from_config(&config.toasts);
    let mut runtime = TuiRuntime::new(
        services,
        FileStore::open_default(),
        toasts,
        config.auth.min_password_len,
    )?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
