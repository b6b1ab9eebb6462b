//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! Effects that spawn a task carry `task: Option<TaskId>`. Overlays emit
//! them with `None` because they only see `&TuiState`; the reducer fills in
//! fresh ids before handing effects to the runtime.

use marquee_core::toast::{ToastId, ToastOptions};
use marquee_core::types::{CatalogMovie, MovieId, Session};

use crate::common::{TaskId, TaskSeq};

#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Try the remembered login.
    Recall { task: Option<TaskId> },

    SignIn {
        task: Option<TaskId>,
        email: String,
        password: String,
        remember: bool,
    },

    SignUp {
        task: Option<TaskId>,
        email: String,
        password: String,
    },

    /// Forget the remembered login and end the server session.
    SignOut {
        task: Option<TaskId>,
        session: Option<Session>,
    },

    LoadWatchlist {
        task: Option<TaskId>,
        session: Session,
    },

    AddToWatchlist {
        task: Option<TaskId>,
        session: Session,
        movie: CatalogMovie,
    },

    RemoveFromWatchlist {
        task: Option<TaskId>,
        session: Session,
        movie_id: MovieId,
        title: String,
    },

    /// Popular list when `query` is `None`, search results otherwise.
    LoadCatalog {
        task: Option<TaskId>,
        query: Option<String>,
    },

    LoadDetails {
        task: Option<TaskId>,
        movie_id: MovieId,
        session: Option<Session>,
    },

    SaveRating {
        task: Option<TaskId>,
        session: Session,
        movie_id: MovieId,
        title: String,
        score: u8,
        review: String,
    },

    /// Enqueue a notification.
    ShowToast {
        message: String,
        options: ToastOptions,
    },

    DismissToast { id: ToastId },
}

impl UiEffect {
    pub fn toast(message: impl Into<String>, options: ToastOptions) -> Self {
        UiEffect::ShowToast {
            message: message.into(),
            options,
        }
    }

    fn task_slot(&mut self) -> Option<&mut Option<TaskId>> {
        match self {
            UiEffect::Recall { task }
            | UiEffect::SignIn { task, .. }
            | UiEffect::SignUp { task, .. }
            | UiEffect::SignOut { task, .. }
            | UiEffect::LoadWatchlist { task, .. }
            | UiEffect::AddToWatchlist { task, .. }
            | UiEffect::RemoveFromWatchlist { task, .. }
            | UiEffect::LoadCatalog { task, .. }
            | UiEffect::LoadDetails { task, .. }
            | UiEffect::SaveRating { task, .. } => Some(task),
            UiEffect::Quit | UiEffect::ShowToast { .. } | UiEffect::DismissToast { .. } => None,
        }
    }
}

/// Gives every task-spawning effect without an id a fresh one.
pub fn assign_task_ids(seq: &mut TaskSeq, effects: &mut [UiEffect]) {
    for effect in effects {
        if let Some(slot) = effect.task_slot()
            && slot.is_none()
        {
            *slot = Some(seq.next_id());
        }
    }
}
