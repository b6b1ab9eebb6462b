use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use marquee_core::validate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::form::TextField;
use super::render_utils::{FieldLine, InputHint, OverlayConfig, field_line, render_overlay};
use super::{OverlayRequest, OverlayUpdate};
use crate::common::Tasks;
use crate::effects::UiEffect;
use crate::state::TuiState;

const FIELD_COUNT: usize = 3;

#[derive(Debug, Clone)]
pub struct SignUpState {
    pub email: TextField,
    pub password: TextField,
    pub confirm: TextField,
    /// Index into email, password, confirm.
    pub focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

impl SignUpState {
    pub fn open() -> Self {
        Self {
            email: TextField::new(),
            password: TextField::masked(),
            confirm: TextField::masked(),
            focus: 0,
            error: None,
            submitting: false,
        }
    }

    pub fn on_failed(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.email,
            1 => &mut self.password,
            _ => &mut self.confirm,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tasks: &Tasks) {
        render_signup_overlay(frame, self, area, tasks);
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.focused_mut().paste(text);
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Char('n') if ctrl => OverlayUpdate::open(OverlayRequest::Login { email: None }),
            KeyCode::Enter => self.submit(tui),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FIELD_COUNT;
                OverlayUpdate::stay()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FIELD_COUNT - 1) % FIELD_COUNT;
                OverlayUpdate::stay()
            }
            _ => {
                if !self.submitting && self.focused_mut().handle_key(key) {
                    self.error = None;
                }
                OverlayUpdate::stay()
            }
        }
    }

    fn submit(&mut self, tui: &TuiState) -> OverlayUpdate {
        if tui.tasks.is_authenticating() || self.submitting {
            return OverlayUpdate::stay();
        }

        let email = self.email.value().trim().to_string();
        let password = self.password.value().to_string();
        if let Err(err) = validate::sign_up(
            &email,
            &password,
            self.confirm.value(),
            tui.min_password_len,
        ) {
            self.error = Some(err.to_string());
            return OverlayUpdate::stay();
        }

        self.error = None;
        self.submitting = true;
        OverlayUpdate::stay().with_ui_effects(vec![UiEffect::SignUp {
            task: None,
            email,
            password,
        }])
    }
}

fn render_signup_overlay(frame: &mut Frame, state: &SignUpState, area: Rect, tasks: &Tasks) {
    let accent = Color::Magenta;
    let hints = [
        InputHint::new("Enter", "create"),
        InputHint::new("Tab", "next"),
        InputHint::new("^N", "sign in instead"),
        InputHint::new("Esc", "close"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Create Account",
            border_color: accent,
            width: 64,
            height: 10,
            hints: &hints,
        },
    );

    let status = if state.submitting || tasks.sign_up.is_running() {
        Line::from(Span::styled(
            "Creating account…",
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = &state.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::default()
    };

    let values = [
        ("Email", state.email.display()),
        ("Password", state.password.display()),
        ("Confirm", state.confirm.display()),
    ];
    let mut lines: Vec<Line<'static>> = values
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            field_line(
                &FieldLine {
                    label,
                    value,
                    focused: state.focus == i,
                    accent,
                },
                layout.body.width,
            )
        })
        .collect();
    lines.push(Line::default());
    lines.push(status);
    frame.render_widget(Paragraph::new(lines), layout.body);
}
