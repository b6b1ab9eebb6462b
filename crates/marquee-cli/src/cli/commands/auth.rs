//! Account command handlers.

use anyhow::{Context, Result};
use marquee_core::config::Config;
use marquee_core::services::SignUpOutcome;
use marquee_core::validate;
use tracing::info;

use super::{Clients, read_password, read_password_with_confirmation};

pub async fn login(config: &Config, email: &str, remember: bool) -> Result<()> {
    let email = email.trim();
    let password = read_password("Password: ")?;
    validate::sign_in(email, &password)?;

    let clients = Clients::from_config(config)?;
    let session = clients
        .recall
        .sign_in(email, &password, remember)
        .await
        .context("sign in")?;

    info!(remember, "signed in from the command line");
    println!("Signed in as {}", session.user.display_name());
    if !remember {
        println!("Login not remembered; pass --remember to stay signed in for other commands.");
    }
    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    let clients = Clients::from_config(config)?;
    // Resume first so the server session can be revoked too.
    let session = clients.recall.recall().await.into_session();
    let had_session = session.is_some();
    clients
        .recall
        .sign_out(session.as_ref())
        .await
        .context("sign out")?;

    if had_session {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;
    let user = &session.user;
    println!("{}", user.display_name());
    if let Some(email) = &user.email {
        println!("email:  {email}");
    }
    if let Some(avatar) = &user.user_metadata.avatar_url {
        println!("avatar: {avatar}");
    }
    Ok(())
}

pub async fn signup(config: &Config, email: &str) -> Result<()> {
    let email = email.trim();
    let (password, confirm) = read_password_with_confirmation()?;
    validate::sign_up(email, &password, &confirm, config.auth.min_password_len)?;

    let clients = Clients::from_config(config)?;
    let outcome = clients
        .services
        .auth
        .sign_up(email, &password)
        .await
        .context("sign up")?;

    match outcome {
        SignUpOutcome::SignedIn(session) => {
            println!(
                "Account created. Signed in as {}",
                session.user.display_name()
            );
            println!("Run `marquee login --email {email} --remember` to stay signed in.");
        }
        SignUpOutcome::ConfirmationRequired { email } => {
            println!("Account created. Check {email} for a confirmation link, then sign in.");
        }
    }
    Ok(())
}

