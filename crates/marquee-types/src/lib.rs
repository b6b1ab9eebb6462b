//! Shared domain types for Marquee.
//!
//! These mirror the rows and payloads exchanged with the backend service and
//! the movie catalog. They carry no behavior beyond small display helpers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog movie identifier (TMDB numeric id).
pub type MovieId = u64;

/// Profile metadata attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl User {
    /// Name to show in the UI: username, then email, then the raw id.
    pub fn display_name(&self) -> &str {
        self.user_metadata
            .username
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A signed-in session returned by the auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as unix seconds, when the service reports it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// A row in the user's watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: String,
    pub movie_id: MovieId,
    pub movie_title: String,
    #[serde(default)]
    pub movie_poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

/// A star rating (1-10) with an optional review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub user_id: Option<String>,
    pub movie_id: MovieId,
    pub rating: u8,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A movie as listed by the catalog (search results, popular list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
}

impl CatalogMovie {
    /// Release year parsed from the `YYYY-MM-DD` release date.
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Full movie details for the detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    /// YouTube video key of the first trailer, if any.
    pub trailer: Option<String>,
    pub release_date: Option<String>,
}

impl MovieDetails {
    pub fn trailer_url(&self) -> Option<String> {
        self.trailer
            .as_ref()
            .map(|key| format!("https://www.youtube.com/watch?v={key}"))
    }
}
