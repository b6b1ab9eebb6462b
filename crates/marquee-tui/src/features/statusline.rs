//! Bottom status line: background activity on the left, account on the right.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::TaskKind;
use crate::overlays::login::RESTORING_SESSION;
use crate::state::TuiState;

/// Spinner frames for status line animation.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Ticks per spinner frame.
const SPINNER_SPEED_DIVISOR: usize = 6;

/// Label for the most relevant running task, if any.
pub fn activity(tui: &TuiState) -> Option<&'static str> {
    let labels = [
        (TaskKind::Recall, RESTORING_SESSION),
        (TaskKind::SignIn, "Signing in…"),
        (TaskKind::SignUp, "Creating account…"),
        (TaskKind::SignOut, "Signing out…"),
        (TaskKind::Rate, "Saving rating…"),
        (TaskKind::WatchlistEdit, "Updating watchlist…"),
        (TaskKind::Details, "Loading movie…"),
        (TaskKind::Catalog, "Loading movies…"),
        (TaskKind::Watchlist, "Loading watchlist…"),
    ];
    labels
        .into_iter()
        .find(|(kind, _)| tui.tasks.state(*kind).is_running())
        .map(|(_, label)| label)
}

pub fn render(tui: &TuiState, frame: &mut Frame, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(40)]).areas(area);
    let dim = Style::default().fg(Color::DarkGray);

    let spans = match activity(tui) {
        Some(label) => {
            let idx = (tui.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len();
            vec![
                Span::styled(SPINNER_FRAMES[idx], Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled(label, Style::default().fg(Color::Yellow)),
            ]
        }
        None => vec![
            Span::styled("Tab", dim),
            Span::raw(" switch  "),
            Span::styled("x", dim),
            Span::raw(" dismiss  "),
            Span::styled("q", dim),
            Span::raw(" quit"),
        ],
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), left);

    let account = match &tui.session {
        Some(session) => Line::from(vec![
            Span::styled(session.user.display_name().to_string(), Style::default().fg(Color::Cyan)),
            Span::styled("  L sign out", dim),
        ]),
        None => Line::from(vec![
            Span::styled("Not signed in", dim),
            Span::styled("  l sign in", dim),
        ]),
    };
    frame.render_widget(Paragraph::new(account).alignment(Alignment::Right), right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{TaskId, TaskStarted};

    #[test]
    fn test_recall_takes_priority() {
        let mut tui = TuiState::new(6);
        assert_eq!(activity(&tui), None);

        let started = |id| TaskStarted {
            id: TaskId(id),
            cancel: None,
        };
        tui.tasks.catalog.on_started(&started(1));
        tui.tasks.recall.on_started(&started(2));

        assert_eq!(activity(&tui), Some(RESTORING_SESSION));
    }
}
