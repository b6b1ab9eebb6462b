//! Watchlist tab: the signed-in user's saved movies.

use crossterm::event::{KeyCode, KeyEvent};
use marquee_core::toast::ToastOptions;
use marquee_core::types::{CatalogMovie, MovieId, WatchlistEntry};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::detail;
use crate::common::{ListCursor, truncate_with_ellipsis};
use crate::effects::UiEffect;
use crate::events::WatchlistUiEvent;
use crate::state::TuiState;

/// Conflict status returned when the movie is already listed.
const ALREADY_LISTED: u16 = 409;

#[derive(Debug, Default)]
pub struct WatchlistState {
    pub entries: Vec<WatchlistEntry>,
    pub cursor: ListCursor,
    /// At least one load has completed.
    pub loaded: bool,
}

impl WatchlistState {
    pub fn selected(&self) -> Option<&WatchlistEntry> {
        self.entries.get(self.cursor.index())
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.entries.iter().any(|e| e.movie_id == movie_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor.reset();
        self.loaded = false;
    }
}

fn as_catalog_movie(entry: &WatchlistEntry) -> CatalogMovie {
    CatalogMovie {
        id: entry.movie_id,
        title: entry.movie_title.clone(),
        poster_path: entry.movie_poster.clone(),
        overview: String::new(),
        release_date: None,
        vote_average: None,
    }
}

/// Reloads the list for the current session, if any.
pub fn reload(tui: &TuiState) -> Vec<UiEffect> {
    tui.session
        .clone()
        .map(|session| UiEffect::LoadWatchlist {
            task: None,
            session,
        })
        .into_iter()
        .collect()
}

/// Effect adding `movie`, or a hint toast when signed out.
pub fn add(tui: &TuiState, movie: CatalogMovie) -> UiEffect {
    match tui.session.clone() {
        Some(session) => UiEffect::AddToWatchlist {
            task: None,
            session,
            movie,
        },
        None => UiEffect::toast("Sign in to manage your watchlist", ToastOptions::info()),
    }
}

/// Effect removing `movie_id`, or a hint toast when signed out.
pub fn remove(tui: &TuiState, movie_id: MovieId, title: String) -> UiEffect {
    match tui.session.clone() {
        Some(session) => UiEffect::RemoveFromWatchlist {
            task: None,
            session,
            movie_id,
            title,
        },
        None => UiEffect::toast("Sign in to manage your watchlist", ToastOptions::info()),
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let len = tui.watchlist.entries.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => tui.watchlist.cursor.up(),
        KeyCode::Down | KeyCode::Char('j') => tui.watchlist.cursor.down(len),
        KeyCode::Char('r') => return reload(tui),
        KeyCode::Enter => {
            if let Some(entry) = tui.watchlist.selected() {
                let movie = as_catalog_movie(entry);
                return detail::open(tui, movie);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(entry) = tui.watchlist.selected() {
                let (movie_id, title) = (entry.movie_id, entry.movie_title.clone());
                return vec![remove(tui, movie_id, title)];
            }
        }
        _ => {}
    }
    vec![]
}

pub fn handle_event(tui: &mut TuiState, event: WatchlistUiEvent) -> Vec<UiEffect> {
    match event {
        WatchlistUiEvent::Loaded(Ok(entries)) => {
            tui.watchlist.entries = entries;
            tui.watchlist.cursor.clamp(tui.watchlist.entries.len());
            tui.watchlist.loaded = true;
            vec![]
        }
        WatchlistUiEvent::Loaded(Err(err)) => {
            tui.watchlist.loaded = true;
            vec![UiEffect::toast(
                format!("Could not load watchlist: {err}"),
                ToastOptions::error(),
            )]
        }
        WatchlistUiEvent::Added { title, result } => match result {
            Ok(()) => {
                let mut effects = vec![UiEffect::toast(
                    format!("Added \"{title}\" to your watchlist"),
                    ToastOptions::success(),
                )];
                effects.extend(reload(tui));
                effects
            }
            Err(err) if err.status == Some(ALREADY_LISTED) => vec![UiEffect::toast(
                format!("\"{title}\" is already in your watchlist"),
                ToastOptions::info(),
            )],
            Err(err) => vec![UiEffect::toast(
                format!("Could not add \"{title}\": {err}"),
                ToastOptions::error(),
            )],
        },
        WatchlistUiEvent::Removed {
            movie_id,
            title,
            result,
        } => match result {
            Ok(()) => {
                tui.watchlist.entries.retain(|e| e.movie_id != movie_id);
                tui.watchlist.cursor.clamp(tui.watchlist.entries.len());
                vec![UiEffect::toast(
                    format!("Removed \"{title}\" from your watchlist"),
                    ToastOptions::success(),
                )]
            }
            Err(err) => vec![UiEffect::toast(
                format!("Could not remove \"{title}\": {err}"),
                ToastOptions::error(),
            )],
        },
    }
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" My Watchlist ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let hint = |text: &str| {
        Paragraph::new(Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(Color::DarkGray),
        )))
    };
    if tui.session.is_none() {
        frame.render_widget(hint("Sign in to see your watchlist (press l)"), inner);
        return;
    }
    if tui.tasks.watchlist.is_running() && !tui.watchlist.loaded {
        frame.render_widget(hint("Loading watchlist…"), inner);
        return;
    }
    if tui.watchlist.entries.is_empty() {
        frame.render_widget(
            hint("Your watchlist is empty. Browse Movies (Tab) and press a to add one."),
            inner,
        );
        return;
    }

    let height = usize::from(inner.height);
    let offset = tui.watchlist.cursor.scroll_offset(height);
    let width = usize::from(inner.width);
    let lines: Vec<Line<'static>> = tui
        .watchlist
        .entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, entry)| {
            let selected = i == tui.watchlist.cursor.index();
            let added = entry
                .added_at
                .map(|at| at.format("  %Y-%m-%d").to_string())
                .unwrap_or_default();
            let marker = if selected { "> " } else { "  " };
            let title = truncate_with_ellipsis(
                &entry.movie_title,
                width.saturating_sub(marker.len() + added.len()),
            );
            let style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(title, style),
                Span::styled(added, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
