//! Movie detail view, drawn over the active tab.

use crossterm::event::{KeyCode, KeyEvent};
use marquee_core::services::average_score;
use marquee_core::toast::ToastOptions;
use marquee_core::types::CatalogMovie;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::watchlist;
use crate::common::text::wrap;
use crate::effects::UiEffect;
use crate::events::{CatalogUiEvent, MovieBundle};
use crate::overlays::OverlayRequest;
use crate::state::TuiState;

/// Reviews listed under the synopsis.
const REVIEW_LIMIT: usize = 5;

#[derive(Debug)]
pub struct DetailState {
    /// What the opening list knew about the movie.
    pub movie: CatalogMovie,
    pub bundle: Option<MovieBundle>,
    pub error: Option<String>,
    pub scroll: u16,
}

impl DetailState {
    pub fn new(movie: CatalogMovie) -> Self {
        Self {
            movie,
            bundle: None,
            error: None,
            scroll: 0,
        }
    }

    fn title(&self) -> &str {
        self.bundle
            .as_ref()
            .map_or(self.movie.title.as_str(), |b| b.details.title.as_str())
    }
}

/// Opens the detail view for `movie` and starts loading it.
pub fn open(tui: &mut TuiState, movie: CatalogMovie) -> Vec<UiEffect> {
    let movie_id = movie.id;
    tui.detail = Some(DetailState::new(movie));
    vec![load(tui, movie_id)]
}

fn load(tui: &TuiState, movie_id: u64) -> UiEffect {
    UiEffect::LoadDetails {
        task: None,
        movie_id,
        session: tui.session.clone(),
    }
}

/// Keys while the detail view is open. May ask for the rating overlay.
pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    let Some(detail) = tui.detail.as_mut() else {
        return (vec![], None);
    };
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => {
            tui.detail = None;
        }
        KeyCode::Up | KeyCode::Char('k') => detail.scroll = detail.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => detail.scroll = detail.scroll.saturating_add(1),
        KeyCode::Char('a') => {
            let mut movie = detail.movie.clone();
            if let Some(bundle) = &detail.bundle {
                movie.title.clone_from(&bundle.details.title);
                movie.poster_path.clone_from(&bundle.details.poster_path);
            }
            return (vec![watchlist::add(tui, movie)], None);
        }
        KeyCode::Char('d') => {
            let (movie_id, title) = (detail.movie.id, detail.title().to_string());
            return (vec![watchlist::remove(tui, movie_id, title)], None);
        }
        KeyCode::Char('r') => {
            if tui.session.is_none() {
                return (
                    vec![UiEffect::toast("Sign in to rate movies", ToastOptions::info())],
                    None,
                );
            }
            let request = OverlayRequest::Rate {
                movie_id: detail.movie.id,
                title: detail.title().to_string(),
                current: detail.bundle.as_ref().and_then(|b| b.mine.clone()),
            };
            return (vec![], Some(request));
        }
        _ => {}
    }
    (vec![], None)
}

pub fn handle_event(tui: &mut TuiState, event: CatalogUiEvent) -> Vec<UiEffect> {
    match event {
        CatalogUiEvent::DetailsLoaded { movie_id, result } => {
            // The view may have moved on to another movie.
            let Some(detail) = tui.detail.as_mut().filter(|d| d.movie.id == movie_id) else {
                return vec![];
            };
            match result {
                Ok(bundle) => {
                    detail.bundle = Some(bundle);
                    detail.error = None;
                    vec![]
                }
                Err(err) => {
                    detail.error = Some(err.message.clone());
                    vec![UiEffect::toast(
                        format!("Could not load movie: {err}"),
                        ToastOptions::error(),
                    )]
                }
            }
        }
        CatalogUiEvent::RatingSaved {
            movie_id,
            title,
            score,
            result,
        } => match result {
            Ok(()) => {
                let mut effects = vec![UiEffect::toast(
                    format!("Rated \"{title}\" {score}/10"),
                    ToastOptions::success(),
                )];
                if tui.detail.as_ref().is_some_and(|d| d.movie.id == movie_id) {
                    effects.push(load(tui, movie_id));
                }
                effects
            }
            Err(err) => vec![UiEffect::toast(
                format!("Could not save rating: {err}"),
                ToastOptions::error(),
            )],
        },
        CatalogUiEvent::Loaded { .. } => vec![],
    }
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn detail_lines(tui: &TuiState, detail: &DetailState, width: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    let Some(bundle) = &detail.bundle else {
        let text = match &detail.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
            None => Span::styled("Loading…", dim),
        };
        lines.push(Line::from(text));
        return lines;
    };
    let details = &bundle.details;

    let mut meta = Vec::new();
    if let Some(date) = details.release_date.as_deref().filter(|d| !d.is_empty()) {
        meta.push(date.to_string());
    }
    if !details.genres.is_empty() {
        meta.push(details.genres.join(", "));
    }
    if !meta.is_empty() {
        lines.push(Line::styled(meta.join("  ·  "), dim));
    }
    if tui.watchlist.contains(details.id) {
        lines.push(Line::styled("✓ On your watchlist", Style::default().fg(Color::Green)));
    }
    lines.push(Line::default());

    lines.push(section("Synopsis"));
    if details.synopsis.is_empty() {
        lines.push(Line::styled("No synopsis available.", dim));
    } else {
        lines.extend(wrap(&details.synopsis, width).into_iter().map(Line::from));
    }
    lines.push(Line::default());

    if !details.cast.is_empty() {
        lines.push(section("Cast"));
        lines.extend(
            wrap(&details.cast.join(", "), width)
                .into_iter()
                .map(Line::from),
        );
        lines.push(Line::default());
    }

    if let Some(url) = details.trailer_url() {
        lines.push(section("Trailer"));
        lines.push(Line::styled(url, Style::default().fg(Color::Blue)));
        lines.push(Line::default());
    }

    lines.push(section("Ratings"));
    let average = match average_score(&bundle.ratings) {
        Some(avg) => format!(
            "{avg:.1}/10 from {} rating{}",
            bundle.ratings.len(),
            if bundle.ratings.len() == 1 { "" } else { "s" }
        ),
        None => "No ratings yet".to_string(),
    };
    lines.push(Line::from(average));
    if let Some(mine) = &bundle.mine {
        lines.push(Line::styled(
            format!("Your rating: {}/10", mine.rating),
            Style::default().fg(Color::Yellow),
        ));
    }
    for rating in bundle
        .ratings
        .iter()
        .filter(|r| !r.review.trim().is_empty())
        .take(REVIEW_LIMIT)
    {
        lines.push(Line::default());
        lines.push(Line::styled(format!("★ {}/10", rating.rating), dim));
        lines.extend(wrap(&rating.review, width).into_iter().map(Line::from));
    }
    lines
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let Some(detail) = &tui.detail else {
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::styled(
            format!(" {} ", detail.title()),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::styled(
            " Esc back · a add · d remove · r rate ",
            Style::default().fg(Color::DarkGray),
        ));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let lines = detail_lines(tui, detail, usize::from(inner.width.saturating_sub(1)));
    frame.render_widget(Paragraph::new(lines).scroll((detail.scroll, 0)), inner);
}
