//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render function.
//!
//! - `login.rs`: email/password sign-in with the "remember me" checkbox
//! - `signup.rs`: account creation
//! - `rate.rs`: star rating and review for a movie
//! - `form.rs`: text field shared by the forms
//! - `render_utils.rs`: shared rendering helpers

pub mod form;
pub mod login;
pub mod rate;
pub mod render_utils;
pub mod signup;

use crossterm::event::KeyEvent;
pub use login::LoginState;
use marquee_core::types::{MovieId, Rating};
pub use rate::RateState;
use ratatui::Frame;
use ratatui::layout::Rect;
pub use signup::SignUpState;

use crate::common::Tasks;
use crate::effects::UiEffect;
use crate::state::TuiState;

/// Requests to open a new overlay.
#[derive(Debug)]
pub enum OverlayRequest {
    Login { email: Option<String> },
    SignUp,
    Rate {
        movie_id: MovieId,
        title: String,
        current: Option<Rating>,
    },
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    Login(LoginState),
    SignUp(SignUpState),
    Rate(RateState),
}

impl Overlay {
    pub fn from_request(request: OverlayRequest) -> Self {
        match request {
            OverlayRequest::Login { email } => Overlay::Login(LoginState::open(email)),
            OverlayRequest::SignUp => Overlay::SignUp(SignUpState::open()),
            OverlayRequest::Rate {
                movie_id,
                title,
                current,
            } => Overlay::Rate(RateState::open(movie_id, title, current.as_ref())),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tasks: &Tasks) {
        match self {
            Overlay::Login(l) => l.render(frame, area, tasks),
            Overlay::SignUp(s) => s.render(frame, area, tasks),
            Overlay::Rate(r) => r.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Login(l) => l.handle_key(tui, key),
            Overlay::SignUp(s) => s.handle_key(tui, key),
            Overlay::Rate(r) => r.handle_key(tui, key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            Overlay::Login(l) => l.handle_paste(text),
            Overlay::SignUp(s) => s.handle_paste(text),
            Overlay::Rate(r) => r.handle_paste(text),
        }
    }
}

/// Routes a key to the active overlay, if any.
pub fn handle_overlay_key(
    tui: &TuiState,
    overlay: &mut Option<Overlay>,
    key: KeyEvent,
) -> Option<OverlayUpdate> {
    overlay.as_mut().map(|o| o.handle_key(tui, key))
}

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    fn render(&self, frame: &mut Frame, area: Rect, tasks: &Tasks);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, tasks: &Tasks) {
        if let Some(overlay) = self {
            overlay.render(frame, area, tasks);
        }
    }
}
