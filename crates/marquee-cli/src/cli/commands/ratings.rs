//! Rating command handlers.

use anyhow::{Context, Result};
use marquee_core::config::Config;
use marquee_core::services::average_score;
use marquee_core::types::{MovieId, Rating};
use marquee_core::validate;

use super::Clients;

pub async fn rate(config: &Config, movie_id: MovieId, score: u8, review: Option<&str>) -> Result<()> {
    let score = validate::rating(score)?;
    let clients = Clients::from_config(config)?;
    let session = clients.require_session().await?;
    clients
        .services
        .rows
        .upsert_rating(&session, movie_id, score, review.map_or("", str::trim))
        .await
        .context("save rating")?;
    println!("Rated movie {movie_id} {score}/10");
    Ok(())
}

pub async fn list(config: &Config, movie_id: MovieId) -> Result<()> {
    let clients = Clients::from_config(config)?;
    // Signed-in users may see rows that anonymous reads cannot.
    let session = clients.recall.recall().await.into_session();
    let ratings = clients
        .services
        .rows
        .ratings_for_movie(session.as_ref(), movie_id)
        .await
        .with_context(|| format!("load ratings for movie {movie_id}"))?;

    let Some(avg) = average_score(&ratings) else {
        println!("No ratings yet for movie {movie_id}.");
        return Ok(());
    };
    println!("Average {avg:.1}/10 from {} rating(s)", ratings.len());
    for rating in &ratings {
        println!("{}", rating_line(rating));
    }
    Ok(())
}

fn rating_line(rating: &Rating) -> String {
    let date = rating
        .created_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let review = rating.review.trim();
    if review.is_empty() {
        format!("{:>2}/10  {date}", rating.rating)
    } else {
        format!("{:>2}/10  {date}  {review}", rating.rating)
    }
}
