//! Effect handlers for the TUI runtime.
//!
//! Handlers are pure async functions that return `UiEvent`. The runtime
//! spawns them and sends the result to the inbox; they never touch state.

use std::sync::Arc;

use marquee_core::services::Services;
use marquee_core::types::{CatalogMovie, MovieId, Session};
use tracing::{debug, warn};

use super::Recall;
use crate::events::{AuthUiEvent, CatalogUiEvent, MovieBundle, UiEvent, WatchlistUiEvent};

/// Poster size stored with watchlist rows.
const POSTER_SIZE: &str = "w500";

pub async fn recall(recall: Arc<Recall>) -> UiEvent {
    let outcome = recall
        .recall_observed(|state| debug!(?state, "recall"))
        .await;
    UiEvent::Auth(AuthUiEvent::Recalled(outcome))
}

pub async fn sign_in(recall: Arc<Recall>, email: String, password: String, remember: bool) -> UiEvent {
    let result = recall.sign_in(&email, &password, remember).await;
    UiEvent::Auth(AuthUiEvent::SignedIn(result))
}

pub async fn sign_up(services: Arc<Services>, email: String, password: String) -> UiEvent {
    let result = services.auth.sign_up(&email, &password).await;
    UiEvent::Auth(AuthUiEvent::SignedUp { email, result })
}

pub async fn sign_out(recall: Arc<Recall>, session: Option<Session>) -> UiEvent {
    let result = recall.sign_out(session.as_ref()).await;
    if let Err(err) = &result {
        warn!("server sign-out failed: {err}");
    }
    UiEvent::Auth(AuthUiEvent::SignedOut(result))
}

pub async fn load_watchlist(services: Arc<Services>, session: Session) -> UiEvent {
    let result = services.rows.list_watchlist(&session).await;
    UiEvent::Watchlist(WatchlistUiEvent::Loaded(result))
}

pub async fn add_to_watchlist(services: Arc<Services>, session: Session, movie: CatalogMovie) -> UiEvent {
    let poster = services
        .catalog
        .image_url(movie.poster_path.as_deref(), POSTER_SIZE);
    let result = services
        .rows
        .add_watchlist_entry(&session, movie.id, &movie.title, Some(&poster))
        .await;
    UiEvent::Watchlist(WatchlistUiEvent::Added {
        title: movie.title,
        result,
    })
}

pub async fn remove_from_watchlist(
    services: Arc<Services>,
    session: Session,
    movie_id: MovieId,
    title: String,
) -> UiEvent {
    let result = services
        .rows
        .remove_watchlist_entry(&session, movie_id)
        .await;
    UiEvent::Watchlist(WatchlistUiEvent::Removed {
        movie_id,
        title,
        result,
    })
}

pub async fn load_catalog(services: Arc<Services>, query: Option<String>) -> UiEvent {
    let result = match query.as_deref() {
        Some(q) => services.catalog.search(q).await,
        None => services.catalog.popular().await,
    };
    UiEvent::Catalog(CatalogUiEvent::Loaded { query, result })
}

/// Details are required; ratings degrade to empty so the view still opens.
pub async fn load_details(services: Arc<Services>, movie_id: MovieId, session: Option<Session>) -> UiEvent {
    let (details, ratings) = tokio::join!(
        services.catalog.details(movie_id),
        services.rows.ratings_for_movie(session.as_ref(), movie_id),
    );
    let ratings = ratings.unwrap_or_else(|err| {
        warn!(movie_id, "ratings unavailable: {err}");
        Vec::new()
    });
    let mine = match &session {
        Some(session) => services
            .rows
            .my_rating(session, movie_id)
            .await
            .unwrap_or_else(|err| {
                warn!(movie_id, "own rating unavailable: {err}");
                None
            }),
        None => None,
    };

    let result = details.map(|details| MovieBundle {
        details,
        ratings,
        mine,
    });
    UiEvent::Catalog(CatalogUiEvent::DetailsLoaded { movie_id, result })
}

pub async fn save_rating(
    services: Arc<Services>,
    session: Session,
    movie_id: MovieId,
    title: String,
    score: u8,
    review: String,
) -> UiEvent {
    let result = services
        .rows
        .upsert_rating(&session, movie_id, score, &review)
        .await;
    UiEvent::Catalog(CatalogUiEvent::RatingSaved {
        movie_id,
        title,
        score,
        result,
    })
}
