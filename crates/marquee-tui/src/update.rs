//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! This is the single source of truth for how events modify state.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::effects::{self, UiEffect};
use crate::events::UiEvent;
use crate::features::{auth, catalog, detail, toasts, watchlist};
use crate::overlays::{self, Overlay, OverlayRequest, OverlayTransition, OverlayUpdate};
use crate::state::{AppState, TuiState, View};

/// Effects to run once, before the first frame.
///
/// The login form opens right away with the silent attempt running behind
/// it; the popular list needs no account.
pub fn init(app: &mut AppState) -> Vec<UiEffect> {
    app.overlay = Some(Overlay::Login(overlays::LoginState::open(None)));
    let mut effects = vec![UiEffect::Recall { task: None }, catalog::load_popular()];
    effects::assign_task_ids(&mut app.tui.task_seq, &mut effects);
    effects
}

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute. Task-spawning effects leave here with ids.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let mut effects = reduce(app, event);
    effects::assign_task_ids(&mut app.tui.task_seq, &mut effects);
    effects
}

fn reduce(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.tui.screen = ratatui::layout::Rect::new(0, 0, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let active = app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            if !active && kind.is_latest_only() {
                return vec![];
            }
            reduce(app, *completed.result)
        }
        UiEvent::ToastsChanged(toasts) => {
            app.tui.toasts = toasts;
            vec![]
        }
        UiEvent::Auth(event) => auth::handle_event(&mut app.tui, &mut app.overlay, event),
        UiEvent::Watchlist(event) => watchlist::handle_event(&mut app.tui, event),
        UiEvent::Catalog(event) => catalog::handle_event(&mut app.tui, event),
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => {
            if let MouseEventKind::Down(MouseButton::Left) = mouse.kind
                && let Some(id) =
                    toasts::hit_test(app.tui.screen, &app.tui.toasts, mouse.column, mouse.row)
            {
                return vec![UiEffect::DismissToast { id }];
            }
            vec![]
        }
        Event::Paste(text) => {
            if let Some(overlay) = app.overlay.as_mut() {
                overlay.handle_paste(&text);
            } else {
                catalog::handle_paste(&mut app.tui, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(update) = overlays::handle_overlay_key(&app.tui, &mut app.overlay, key) {
        return apply_overlay_update(app, update);
    }

    if app.tui.catalog.is_editing() {
        return catalog::handle_search_key(&mut app.tui, key);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => return vec![UiEffect::Quit],
        KeyCode::Char('c') if ctrl => return vec![UiEffect::Quit],
        KeyCode::Char('x') => {
            return app
                .tui
                .toasts
                .iter()
                .find(|t| !t.is_exiting())
                .map(|t| UiEffect::DismissToast { id: t.id })
                .into_iter()
                .collect();
        }
        KeyCode::Char('l') if app.tui.session.is_none() => {
            open_overlay(app, OverlayRequest::Login { email: None });
            return vec![];
        }
        KeyCode::Char('L') if app.tui.session.is_some() => {
            return vec![auth::sign_out(&app.tui)];
        }
        KeyCode::Tab => {
            let next = match app.tui.view {
                View::Watchlist => View::Movies,
                View::Movies => View::Watchlist,
            };
            switch_view(&mut app.tui, next);
            return vec![];
        }
        KeyCode::Char('1') => {
            switch_view(&mut app.tui, View::Watchlist);
            return vec![];
        }
        KeyCode::Char('2') => {
            switch_view(&mut app.tui, View::Movies);
            return vec![];
        }
        _ => {}
    }

    if app.tui.detail.is_some() {
        let (effects, request) = detail::handle_key(&mut app.tui, key);
        if let Some(request) = request {
            open_overlay(app, request);
        }
        return effects;
    }

    match app.tui.view {
        View::Watchlist => watchlist::handle_key(&mut app.tui, key),
        View::Movies => catalog::handle_key(&mut app.tui, key),
    }
}

fn switch_view(tui: &mut TuiState, view: View) {
    tui.view = view;
    tui.detail = None;
}

fn open_overlay(app: &mut AppState, request: OverlayRequest) {
    app.overlay = Some(Overlay::from_request(request));
}

fn apply_overlay_update(app: &mut AppState, update: OverlayUpdate) -> Vec<UiEffect> {
    match update.transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => app.overlay = None,
        OverlayTransition::Open(request) => open_overlay(app, request),
    }
    update.effects
}
