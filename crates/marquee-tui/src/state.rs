//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── session: Option<Session>   (signed-in user)
//! │   ├── view: View                 (active tab)
//! │   ├── watchlist: WatchlistState
//! │   ├── catalog: CatalogState
//! │   ├── detail: Option<DetailState>
//! │   ├── toasts: Vec<Toast>         (latest notification snapshot)
//! │   ├── task_seq / tasks           (async task lifecycle)
//! └── overlay: Option<Overlay>       (modal overlays)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so overlay
//! handlers can get `&mut Overlay` and `&TuiState` at the same time.

use marquee_core::toast::Toast;
use marquee_core::types::Session;
use ratatui::layout::Rect;

use crate::common::{TaskSeq, Tasks};
use crate::features::catalog::CatalogState;
use crate::features::detail::DetailState;
use crate::features::watchlist::WatchlistState;
use crate::overlays::Overlay;

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(min_password_len: usize) -> Self {
        Self {
            tui: TuiState::new(min_password_len),
            overlay: None,
        }
    }
}

/// Top-level tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Watchlist,
    Movies,
}

pub struct TuiState {
    pub should_quit: bool,
    pub session: Option<Session>,
    pub view: View,
    pub watchlist: WatchlistState,
    pub catalog: CatalogState,
    /// Detail view, drawn over the active tab when open.
    pub detail: Option<DetailState>,
    /// Latest snapshot from the notification center, most recent first.
    pub toasts: Vec<Toast>,
    /// Terminal area from the last `Frame` event (toast hit-testing).
    pub screen: Rect,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub min_password_len: usize,
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(min_password_len: usize) -> Self {
        Self {
            should_quit: false,
            session: None,
            view: View::default(),
            watchlist: WatchlistState::default(),
            catalog: CatalogState::default(),
            detail: None,
            toasts: Vec::new(),
            screen: Rect::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            min_password_len,
            spinner_frame: 0,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}
