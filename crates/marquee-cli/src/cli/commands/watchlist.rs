//! Watchlist command handlers.

use anyhow::{Context, Result};
use marquee_core::config::Config;
use marquee_core::types::MovieId;

use super::Clients;

/// Poster size stored with watchlist rows.
const POSTER_SIZE: &str = "w500";

/// Row API status for a unique-constraint violation.
const CONFLICT: u16 = 409;

pub async fn list(config: &Config) -> Result<()> {
    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;
    let entries = clients
        .services
        .rows
        .list_watchlist(&session)
        .await
        .context("load watchlist")?;

    if entries.is_empty() {
        println!("Your watchlist is empty.");
        return Ok(());
    }
    for entry in entries {
        let added = entry
            .added_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{:>8}  {:<10}  {}", entry.movie_id, added, entry.movie_title);
    }
    Ok(())
}

pub async fn add(config: &Config, movie_id: MovieId) -> Result<()> {
    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;
    let services = &clients.services;

    let details = services
        .catalog
        .details(movie_id)
        .await
        .with_context(|| format!("look up movie {movie_id}"))?;
    let poster = services
        .catalog
        .image_url(details.poster_path.as_deref(), POSTER_SIZE);

    match services
        .rows
        .add_watchlist_entry(&session, movie_id, &details.title, Some(&poster))
        .await
    {
        Ok(()) => println!("Added \"{}\" to your watchlist", details.title),
        Err(err) if err.status == Some(CONFLICT) => {
            println!("\"{}\" is already in your watchlist", details.title);
        }
        Err(err) => return Err(err).context("add to watchlist"),
    }
    Ok(())
}

pub async fn remove(config: &Config, movie_id: MovieId) -> Result<()> {
    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;
    clients
        .services
        .rows
        .remove_watchlist_entry(&session, movie_id)
        .await
        .context("remove from watchlist")?;
    println!("Removed movie {movie_id} from your watchlist");
    Ok(())
}
