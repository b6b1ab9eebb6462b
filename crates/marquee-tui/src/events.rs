//! UI event types.
//!
//! Everything the reducer reacts to arrives as a `UiEvent`: terminal input,
//! frame ticks, task lifecycle notifications, and results sent to the inbox
//! by effect handlers.

use crossterm::event::Event;
use marquee_core::error::ServiceError;
use marquee_core::recall::RecallOutcome;
use marquee_core::services::SignUpOutcome;
use marquee_core::toast::Toast;
use marquee_core::types::{CatalogMovie, MovieDetails, MovieId, Rating, Session, WatchlistEntry};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Render cadence tick.
    Tick,
    /// Current terminal size, sent before each batch of events.
    Frame { width: u16, height: u16 },
    Terminal(Event),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    /// New snapshot from the notification center.
    ToastsChanged(Vec<Toast>),
    Auth(AuthUiEvent),
    Watchlist(WatchlistUiEvent),
    Catalog(CatalogUiEvent),
}

#[derive(Debug)]
pub enum AuthUiEvent {
    Recalled(RecallOutcome),
    SignedIn(Result<Session, ServiceError>),
    SignedUp {
        email: String,
        result: Result<SignUpOutcome, ServiceError>,
    },
    SignedOut(Result<(), ServiceError>),
}

#[derive(Debug)]
pub enum WatchlistUiEvent {
    Loaded(Result<Vec<WatchlistEntry>, ServiceError>),
    Added {
        title: String,
        result: Result<(), ServiceError>,
    },
    Removed {
        movie_id: MovieId,
        title: String,
        result: Result<(), ServiceError>,
    },
}

#[derive(Debug)]
pub enum CatalogUiEvent {
    Loaded {
        query: Option<String>,
        result: Result<Vec<CatalogMovie>, ServiceError>,
    },
    DetailsLoaded {
        movie_id: MovieId,
        result: Result<MovieBundle, ServiceError>,
    },
    RatingSaved {
        movie_id: MovieId,
        title: String,
        score: u8,
        result: Result<(), ServiceError>,
    },
}

/// Everything the detail view shows for one movie.
#[derive(Debug, Clone)]
pub struct MovieBundle {
    pub details: MovieDetails,
    pub ratings: Vec<Rating>,
    pub mine: Option<Rating>,
}
