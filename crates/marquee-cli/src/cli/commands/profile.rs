//! Profile command handlers.

use anyhow::{Context, Result, bail};
use marquee_core::config::Config;
use marquee_core::services::CatalogClient;
use marquee_core::types::{MovieId, Rating};
use marquee_core::validate;
use tracing::debug;

use super::{Clients, read_password_with_confirmation};

/// Lists a user's ratings, newest first, with catalog titles.
pub async fn show(config: &Config, user_id: Option<&str>) -> Result<()> {
    let clients = Clients::from_config(config)?;

    let (heading, user_id, session) = if let Some(id) = user_id {
        // Optional: a session only widens what the row API returns.
        let session = clients.recall.recall().await.into_session();
        (id.to_string(), id.to_string(), session)
    } else {
        let session = clients.require_session().await?;
        let user = clients
            .services
            .auth
            .current_user(&session.access_token)
            .await
            .context("load current user")?
            .context("Not signed in. The remembered session is no longer valid.")?;
        let heading = user.email.clone().unwrap_or_else(|| user.id.clone());
        (heading, user.id, Some(session))
    };

    let ratings = clients
        .services
        .rows
        .ratings_for_user(session.as_ref(), &user_id)
        .await
        .with_context(|| format!("load ratings for {user_id}"))?;

    println!("Profile: {heading}");
    println!("Ratings submitted: {}", ratings.len());
    if ratings.is_empty() {
        println!("No ratings yet.");
        return Ok(());
    }

    println!();
    for rating in &ratings {
        let title = movie_title(&clients.services.catalog, rating.movie_id).await;
        println!("{}", profile_line(rating, &title));
    }
    Ok(())
}

/// Catalog title, or the bare id when the lookup fails.
async fn movie_title(catalog: &CatalogClient, movie_id: MovieId) -> String {
    match catalog.details(movie_id).await {
        Ok(details) => details.title,
        Err(err) => {
            debug!(movie_id, "title lookup failed: {err}");
            movie_id.to_string()
        }
    }
}

fn profile_line(rating: &Rating, title: &str) -> String {
    let mut line = format!("{:>2}/10  {title}", rating.rating);
    if let Some(at) = rating.created_at {
        line.push_str(&format!("  {}", at.format("%Y-%m-%d")));
    }
    let review = rating.review.trim();
    if !review.is_empty() {
        line.push_str(&format!("\n       {review}"));
    }
    line
}

pub async fn set(config: &Config, username: Option<&str>, avatar_url: Option<&str>) -> Result<()> {
    let username = username.map(str::trim).filter(|u| !u.is_empty());
    let avatar_url = avatar_url.map(str::trim).filter(|a| !a.is_empty());
    if username.is_none() && avatar_url.is_none() {
        bail!("Nothing to update. Pass --username and/or --avatar-url.");
    }

    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;

    let user = clients
        .services
        .auth
        .update_profile(&session.access_token, username, avatar_url)
        .await
        .context("update account metadata")?;
    clients
        .services
        .rows
        .upsert_profile(&session, username, avatar_url)
        .await
        .context("update profile row")?;

    println!("Profile updated for {}", user.display_name());
    Ok(())
}

pub async fn password(config: &Config) -> Result<()> {
    let (password, confirm) = read_password_with_confirmation()?;
    validate::new_password(&password, &confirm, config.auth.min_password_len)?;

    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;
    clients
        .services
        .auth
        .update_password(&session.access_token, &password)
        .await
        .context("change password")?;

    println!("Password changed.");
    Ok(())
}
