//! Rating overlay: pick a 1-10 score and an optional review.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use marquee_core::types::{MovieId, Rating};
use marquee_core::validate::{self, RATING_RANGE};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use super::form::TextField;
use super::render_utils::{FieldLine, InputHint, OverlayConfig, field_line, render_overlay};
use crate::common::truncate_with_ellipsis;
use crate::effects::UiEffect;
use crate::state::TuiState;

#[derive(Debug, Clone)]
pub struct RateState {
    pub movie_id: MovieId,
    pub title: String,
    /// 0 until a score is picked.
    pub score: u8,
    pub review: TextField,
    pub editing_review: bool,
    pub error: Option<String>,
}

impl RateState {
    pub fn open(movie_id: MovieId, title: String, current: Option<&Rating>) -> Self {
        Self {
            movie_id,
            title,
            score: current.map_or(0, |r| r.rating),
            review: current
                .map(|r| TextField::with_value(r.review.clone()))
                .unwrap_or_default(),
            editing_review: false,
            error: None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        render_rate_overlay(frame, self, area);
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.editing_review {
            self.review.paste(text);
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => return OverlayUpdate::close(),
            KeyCode::Enter => return self.submit(tui),
            KeyCode::Tab | KeyCode::BackTab => {
                self.editing_review = !self.editing_review;
                return OverlayUpdate::stay();
            }
            _ => {}
        }

        if self.editing_review {
            self.review.handle_key(key);
            return OverlayUpdate::stay();
        }

        let max = *RATING_RANGE.end();
        let min = *RATING_RANGE.start();
        match key.code {
            KeyCode::Left | KeyCode::Char('h' | '-') => {
                self.score = self.score.saturating_sub(1).max(min);
            }
            KeyCode::Right | KeyCode::Char('l' | '+') => {
                self.score = (self.score + 1).min(max);
            }
            // '0' stands for 10.
            KeyCode::Char(c @ '0'..='9') => {
                self.score = match c.to_digit(10) {
                    Some(0) => max,
                    Some(d) => d as u8,
                    None => self.score,
                };
            }
            _ => return OverlayUpdate::stay(),
        }
        self.error = None;
        OverlayUpdate::stay()
    }

    fn submit(&mut self, tui: &TuiState) -> OverlayUpdate {
        let Some(session) = tui.session.clone() else {
            self.error = Some("Sign in to rate movies".to_string());
            return OverlayUpdate::stay();
        };
        let score = match validate::rating(self.score) {
            Ok(score) => score,
            Err(err) => {
                self.error = Some(err.to_string());
                return OverlayUpdate::stay();
            }
        };

        OverlayUpdate::close().with_ui_effects(vec![UiEffect::SaveRating {
            task: None,
            session,
            movie_id: self.movie_id,
            title: self.title.clone(),
            score,
            review: self.review.value().trim().to_string(),
        }])
    }
}

fn stars(score: u8) -> Line<'static> {
    let max = *RATING_RANGE.end();
    let filled = "★".repeat(score as usize);
    let empty = "☆".repeat(max.saturating_sub(score) as usize);
    let label = if score == 0 {
        "  -/10".to_string()
    } else {
        format!("  {score}/10")
    };
    Line::from(vec![
        Span::styled(filled, Style::default().fg(Color::Yellow)),
        Span::styled(empty, Style::default().fg(Color::DarkGray)),
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn render_rate_overlay(frame: &mut Frame, state: &RateState, area: Rect) {
    let accent = Color::Yellow;
    let hints = [
        InputHint::new("←/→ 1-0", "score"),
        InputHint::new("Tab", "review"),
        InputHint::new("Enter", "save"),
        InputHint::new("Esc", "cancel"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Rate",
            border_color: accent,
            width: 64,
            height: 10,
            hints: &hints,
        },
    );

    let width = layout.body.width;
    let review = state.review.display();
    let title = truncate_with_ellipsis(&state.title, width as usize);
    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        stars(state.score),
        field_line(
            &FieldLine {
                label: "Review",
                value: &review,
                focused: state.editing_review,
                accent,
            },
            width,
        ),
        Line::default(),
    ];
    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines), layout.body);
}
