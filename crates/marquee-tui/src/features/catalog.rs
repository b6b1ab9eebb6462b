//! Movies tab: popular titles and catalog search.

use crossterm::event::{KeyCode, KeyEvent};
use marquee_core::toast::ToastOptions;
use marquee_core::types::CatalogMovie;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{detail, watchlist};
use crate::common::{ListCursor, truncate_with_ellipsis};
use crate::effects::UiEffect;
use crate::events::CatalogUiEvent;
use crate::overlays::form::TextField;
use crate::state::TuiState;

#[derive(Debug, Default)]
pub struct CatalogState {
    pub movies: Vec<CatalogMovie>,
    pub cursor: ListCursor,
    /// Query behind the current list; `None` for the popular list.
    pub query: Option<String>,
    /// Search box while it has focus.
    pub search: Option<TextField>,
}

impl CatalogState {
    pub fn selected(&self) -> Option<&CatalogMovie> {
        self.movies.get(self.cursor.index())
    }

    pub fn is_editing(&self) -> bool {
        self.search.is_some()
    }
}

pub fn load_popular() -> UiEffect {
    UiEffect::LoadCatalog {
        task: None,
        query: None,
    }
}

/// Keys while the search box has focus.
pub fn handle_search_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let Some(search) = tui.catalog.search.as_mut() else {
        return vec![];
    };
    match key.code {
        KeyCode::Esc => {
            tui.catalog.search = None;
            vec![]
        }
        KeyCode::Enter => {
            let query = search.value().trim().to_string();
            tui.catalog.search = None;
            // An empty search goes back to the popular list.
            vec![UiEffect::LoadCatalog {
                task: None,
                query: (!query.is_empty()).then_some(query),
            }]
        }
        _ => {
            search.handle_key(key);
            vec![]
        }
    }
}

pub fn handle_paste(tui: &mut TuiState, text: &str) {
    if let Some(search) = tui.catalog.search.as_mut() {
        search.paste(text);
    }
}

pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let len = tui.catalog.movies.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => tui.catalog.cursor.up(),
        KeyCode::Down | KeyCode::Char('j') => tui.catalog.cursor.down(len),
        KeyCode::Char('/' | 's') => {
            let current = tui.catalog.query.clone().unwrap_or_default();
            tui.catalog.search = Some(TextField::with_value(current));
        }
        KeyCode::Char('p') => return vec![load_popular()],
        KeyCode::Enter => {
            if let Some(movie) = tui.catalog.selected().cloned() {
                return detail::open(tui, movie);
            }
        }
        KeyCode::Char('a') => {
            if let Some(movie) = tui.catalog.selected().cloned() {
                return vec![watchlist::add(tui, movie)];
            }
        }
        _ => {}
    }
    vec![]
}

pub fn handle_event(tui: &mut TuiState, event: CatalogUiEvent) -> Vec<UiEffect> {
    match event {
        CatalogUiEvent::Loaded { query, result } => {
            tui.catalog.query = query;
            tui.catalog.cursor.reset();
            match result {
                Ok(movies) => {
                    tui.catalog.movies = movies;
                    vec![]
                }
                Err(err) => {
                    tui.catalog.movies.clear();
                    vec![UiEffect::toast(
                        format!("Could not load movies: {err}"),
                        ToastOptions::error(),
                    )]
                }
            }
        }
        CatalogUiEvent::DetailsLoaded { .. } | CatalogUiEvent::RatingSaved { .. } => {
            detail::handle_event(tui, event)
        }
    }
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

    let (search_text, search_style) = match (&tui.catalog.search, &tui.catalog.query) {
        (Some(field), _) => (
            format!("{}▏", field.display()),
            Style::default().fg(Color::Cyan),
        ),
        (None, Some(query)) => (query.clone(), Style::default()),
        (None, None) => (
            "Popular right now (/ to search)".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let search = Paragraph::new(Line::styled(search_text, search_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if tui.catalog.is_editing() {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            })
            .title(" Search "),
    );
    frame.render_widget(search, search_area);

    let title = match &tui.catalog.query {
        Some(query) => format!(" Results for \"{query}\" "),
        None => " Popular ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let inner = block.inner(list_area);
    frame.render_widget(block, list_area);

    if tui.catalog.movies.is_empty() {
        let text = if tui.tasks.catalog.is_running() {
            "Loading movies…"
        } else {
            "No movies found"
        };
        frame.render_widget(
            Paragraph::new(Line::styled(text, Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let height = usize::from(inner.height);
    let width = usize::from(inner.width);
    let offset = tui.catalog.cursor.scroll_offset(height);
    let lines: Vec<Line<'static>> = tui
        .catalog
        .movies
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, movie)| movie_line(tui, movie, i == tui.catalog.cursor.index(), width))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn movie_line(tui: &TuiState, movie: &CatalogMovie, selected: bool, width: usize) -> Line<'static> {
    let marker = if selected { "> " } else { "  " };
    let year = movie.year().map(|y| format!(" ({y})")).unwrap_or_default();
    let listed = if tui.watchlist.contains(movie.id) {
        "  ✓"
    } else {
        ""
    };
    let score = movie
        .vote_average
        .map(|v| format!("  {v:.1}"))
        .unwrap_or_default();
    let budget = width.saturating_sub(marker.len() + year.len() + score.len() + 3);
    let style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(truncate_with_ellipsis(&movie.title, budget), style),
        Span::styled(year, Style::default().fg(Color::DarkGray)),
        Span::styled(score, Style::default().fg(Color::Yellow)),
        Span::styled(listed, Style::default().fg(Color::Green)),
    ])
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn movie(id: u64, title: &str) -> CatalogMovie {
        CatalogMovie {
            id,
            title: title.to_string(),
            poster_path: None,
            overview: String::new(),
            release_date: None,
            vote_average: None,
        }
    }

    #[test]
    fn test_search_submits_trimmed_query() {
        let mut tui = TuiState::new(6);
        handle_key(&mut tui, key(KeyCode::Char('/')));
        for c in " heat ".chars() {
            handle_search_key(&mut tui, key(KeyCode::Char(c)));
        }

        let effects = handle_search_key(&mut tui, key(KeyCode::Enter));

        assert!(!tui.catalog.is_editing());
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadCatalog { query: Some(q), .. }] if q == "heat"
        ));
    }

    #[test]
    fn test_blank_search_returns_to_popular() {
        let mut tui = TuiState::new(6);
        handle_key(&mut tui, key(KeyCode::Char('/')));

        let effects = handle_search_key(&mut tui, key(KeyCode::Enter));

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadCatalog { query: None, .. }]
        ));
    }

    #[test]
    fn test_add_requires_session() {
        let mut tui = TuiState::new(6);
        tui.catalog.movies = vec![movie(1, "Alien")];

        let effects = handle_key(&mut tui, key(KeyCode::Char('a')));

        assert!(matches!(effects.as_slice(), [UiEffect::ShowToast { .. }]));
    }

    #[test]
    fn test_loaded_results_replace_list() {
        let mut tui = TuiState::new(6);
        tui.catalog.cursor.down(5);

        handle_event(
            &mut tui,
            CatalogUiEvent::Loaded {
                query: Some("alien".to_string()),
                result: Ok(vec![movie(1, "Alien"), movie(2, "Aliens")]),
            },
        );

        assert_eq!(tui.catalog.movies.len(), 2);
        assert_eq!(tui.catalog.cursor.index(), 0);
        assert_eq!(tui.catalog.query.as_deref(), Some("alien"));
    }
}
