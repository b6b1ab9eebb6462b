//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::features::{catalog, detail, statusline, toasts, watchlist};
use crate::overlays::OverlayExt;
use crate::state::{AppState, TuiState, View};

/// Height of the tab bar.
const TABS_HEIGHT: u16 = 1;

/// Height of status line at the bottom.
const STATUS_HEIGHT: u16 = 1;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let [tabs_area, body, status_area] = Layout::vertical([
        Constraint::Length(TABS_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area);

    render_tabs(state, frame, tabs_area);
    match state.view {
        View::Watchlist => watchlist::render(state, frame, body),
        View::Movies => catalog::render(state, frame, body),
    }
    if state.detail.is_some() {
        detail::render(state, frame, body);
    }
    statusline::render(state, frame, status_area);

    // Overlay, then toasts, so notifications stay visible above forms.
    app.overlay.render(frame, area, &state.tasks);
    toasts::render(frame, area, &state.toasts);
}

fn render_tabs(state: &TuiState, frame: &mut Frame, area: Rect) {
    let tab = |label: &'static str, view: View| {
        if state.view == view {
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(Color::Gray))
        }
    };
    let line = Line::from(vec![
        Span::styled(
            " Marquee ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        tab("1 Watchlist", View::Watchlist),
        Span::raw(" "),
        tab("2 Movies", View::Movies),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::overlays::{LoginState, Overlay};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_signed_out_watchlist_shows_hint() {
        let app = AppState::new(6);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|frame| render(&app, frame)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Sign in to see your watchlist"));
        assert!(text.contains("Not signed in"));
    }

    #[test]
    fn test_login_overlay_is_drawn() {
        let mut app = AppState::new(6);
        app.overlay = Some(Overlay::Login(LoginState::open(None)));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|frame| render(&app, frame)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Sign In"));
        assert!(text.contains("Remember me"));
    }
}
