//! Catalog command handlers.

use anyhow::{Context, Result};
use marquee_core::config::Config;
use marquee_core::services::{Services, average_score};
use marquee_core::types::{CatalogMovie, MovieId};

pub async fn popular(config: &Config) -> Result<()> {
    let services = Services::from_config(config).context("configure services")?;
    let movies = services
        .catalog
        .popular()
        .await
        .context("load popular movies")?;
    print_movies(&movies, "No popular movies right now.");
    Ok(())
}

pub async fn search(config: &Config, query: &str) -> Result<()> {
    let query = query.trim();
    let services = Services::from_config(config).context("configure services")?;
    let movies = services
        .catalog
        .search(query)
        .await
        .with_context(|| format!("search for '{query}'"))?;
    print_movies(&movies, &format!("No movies match '{query}'."));
    Ok(())
}

pub async fn show(config: &Config, id: MovieId) -> Result<()> {
    let services = Services::from_config(config).context("configure services")?;
    let (details, ratings) = tokio::join!(
        services.catalog.details(id),
        services.rows.ratings_for_movie(None, id),
    );
    let details = details.with_context(|| format!("load movie {id}"))?;

    match details.release_date.as_deref().and_then(|d| d.get(..4)) {
        Some(year) => println!("{} ({year})", details.title),
        None => println!("{}", details.title),
    }
    if !details.genres.is_empty() {
        println!("{}", details.genres.join(", "));
    }
    println!();
    if !details.synopsis.is_empty() {
        println!("{}", details.synopsis);
        println!();
    }
    if !details.cast.is_empty() {
        println!("Cast:    {}", details.cast.join(", "));
    }
    if let Some(trailer) = details.trailer_url() {
        println!("Trailer: {trailer}");
    }
    println!(
        "Poster:  {}",
        services
            .catalog
            .image_url(details.poster_path.as_deref(), "w500")
    );

    // Ratings are optional; the details above are still useful without them.
    match ratings {
        Ok(ratings) => match average_score(&ratings) {
            Some(avg) => println!("Rating:  {avg:.1}/10 from {} review(s)", ratings.len()),
            None => println!("Rating:  no reviews yet"),
        },
        Err(err) => println!("Rating:  unavailable ({err})"),
    }
    Ok(())
}

fn print_movies(movies: &[CatalogMovie], empty: &str) {
    if movies.is_empty() {
        println!("{empty}");
        return;
    }
    for movie in movies {
        println!("{}", movie_line(movie));
    }
}

fn movie_line(movie: &CatalogMovie) -> String {
    let mut line = format!("{:>8}  {}", movie.id, movie.title);
    if let Some(year) = movie.year() {
        line.push_str(&format!(" ({year})"));
    }
    if let Some(vote) = movie.vote_average.filter(|v| *v > 0.0) {
        line.push_str(&format!("  ★ {vote:.1}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(vote: Option<f32>, release: Option<&str>) -> CatalogMovie {
        CatalogMovie {
            id: 603,
            title: "The Matrix".to_string(),
            poster_path: None,
            overview: String::new(),
            release_date: release.map(str::to_string),
            vote_average: vote,
        }
    }

    #[test]
    fn test_movie_line_includes_year_and_score() {
        let line = movie_line(&movie(Some(8.2), Some("1999-03-30")));
        assert_eq!(line, "     603  The Matrix (1999)  ★ 8.2");
    }

    #[test]
    fn test_movie_line_skips_unknown_fields() {
        let line = movie_line(&movie(Some(0.0), None));
        assert_eq!(line, "     603  The Matrix");
    }
}
