use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use marquee_core::validate;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::form::TextField;
use super::render_utils::{
    FieldLine, InputHint, OverlayConfig, checkbox_line, field_line, render_overlay,
};
use super::{OverlayRequest, OverlayUpdate};
use crate::common::Tasks;
use crate::effects::UiEffect;
use crate::state::TuiState;

/// Shown while the remembered login is being tried.
pub const RESTORING_SESSION: &str = "Restoring session…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    Remember,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Remember,
            LoginField::Remember => LoginField::Email,
        }
    }

    fn prev(self) -> Self {
        match self {
            LoginField::Email => LoginField::Remember,
            LoginField::Password => LoginField::Email,
            LoginField::Remember => LoginField::Password,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginState {
    pub email: TextField,
    pub password: TextField,
    pub remember: bool,
    pub focus: LoginField,
    pub error: Option<String>,
    /// A manual sign-in from this form is in flight.
    pub submitting: bool,
}

impl LoginState {
    pub fn open(email: Option<String>) -> Self {
        let focus = if email.is_some() {
            LoginField::Password
        } else {
            LoginField::Email
        };
        Self {
            email: email.map(TextField::with_value).unwrap_or_default(),
            password: TextField::masked(),
            remember: false,
            focus,
            error: None,
            submitting: false,
        }
    }

    /// Re-enables the form after a rejected sign-in.
    pub fn on_failed(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
        self.password = TextField::masked();
        self.focus = LoginField::Password;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tasks: &Tasks) {
        render_login_overlay(frame, self, area, tasks);
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self.focus {
            LoginField::Email => self.email.paste(text),
            LoginField::Password => self.password.paste(text),
            LoginField::Remember => {}
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => return OverlayUpdate::close(),
            KeyCode::Char('n') if ctrl => return OverlayUpdate::open(OverlayRequest::SignUp),
            KeyCode::Enter => return self.submit(tui),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                return OverlayUpdate::stay();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                return OverlayUpdate::stay();
            }
            _ => {}
        }

        if self.submitting {
            return OverlayUpdate::stay();
        }

        let edited = match self.focus {
            LoginField::Email => self.email.handle_key(key),
            LoginField::Password => self.password.handle_key(key),
            LoginField::Remember => {
                if key.code == KeyCode::Char(' ') {
                    self.remember = !self.remember;
                    true
                } else {
                    false
                }
            }
        };
        if edited {
            self.error = None;
        }
        OverlayUpdate::stay()
    }

    fn submit(&mut self, tui: &TuiState) -> OverlayUpdate {
        // The silent attempt owns the session until it settles.
        if tui.tasks.recall.is_running() || self.submitting {
            return OverlayUpdate::stay();
        }

        let email = self.email.value().trim().to_string();
        let password = self.password.value().to_string();
        if let Err(err) = validate::sign_in(&email, &password) {
            self.error = Some(err.to_string());
            return OverlayUpdate::stay();
        }

        self.error = None;
        self.submitting = true;
        OverlayUpdate::stay().with_ui_effects(vec![UiEffect::SignIn {
            task: None,
            email,
            password,
            remember: self.remember,
        }])
    }
}

fn render_login_overlay(frame: &mut Frame, state: &LoginState, area: Rect, tasks: &Tasks) {
    let accent = Color::Cyan;
    let hints = [
        InputHint::new("Enter", "sign in"),
        InputHint::new("Tab", "next"),
        InputHint::new("Space", "toggle"),
        InputHint::new("^N", "create account"),
        InputHint::new("Esc", "close"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Sign In",
            border_color: accent,
            width: 64,
            height: 10,
            hints: &hints,
        },
    );

    let width = layout.body.width;
    let status = if tasks.recall.is_running() {
        Line::from(Span::styled(
            RESTORING_SESSION,
            Style::default().fg(Color::Yellow),
        ))
    } else if state.submitting {
        Line::from(Span::styled(
            "Signing in…",
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(error) = &state.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::default()
    };

    let email = state.email.display();
    let password = state.password.display();
    let lines = vec![
        field_line(
            &FieldLine {
                label: "Email",
                value: &email,
                focused: state.focus == LoginField::Email,
                accent,
            },
            width,
        ),
        field_line(
            &FieldLine {
                label: "Password",
                value: &password,
                focused: state.focus == LoginField::Password,
                accent,
            },
            width,
        ),
        checkbox_line(
            "Remember me",
            state.remember,
            state.focus == LoginField::Remember,
            accent,
        ),
        Line::default(),
        status,
    ];
    frame.render_widget(Paragraph::new(lines), layout.body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{TaskId, TaskStarted};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut LoginState, tui: &TuiState, text: &str) {
        for c in text.chars() {
            state.handle_key(tui, key(KeyCode::Char(c)));
        }
    }

    fn filled(tui: &TuiState) -> LoginState {
        let mut state = LoginState::open(None);
        type_text(&mut state, tui, "a@b.com");
        state.handle_key(tui, key(KeyCode::Tab));
        type_text(&mut state, tui, "secret1");
        state
    }

    #[test]
    fn test_submit_emits_sign_in_with_remember() {
        let tui = TuiState::new(6);
        let mut state = filled(&tui);
        state.handle_key(&tui, key(KeyCode::Tab));
        state.handle_key(&tui, key(KeyCode::Char(' ')));

        let update = state.handle_key(&tui, key(KeyCode::Enter));

        assert!(state.submitting);
        match update.effects.as_slice() {
            [UiEffect::SignIn {
                email,
                password,
                remember,
                ..
            }] => {
                assert_eq!(email, "a@b.com");
                assert_eq!(password, "secret1");
                assert!(*remember);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_missing_password_is_rejected_locally() {
        let tui = TuiState::new(6);
        let mut state = LoginState::open(Some("a@b.com".to_string()));

        let update = state.handle_key(&tui, key(KeyCode::Enter));

        assert!(update.effects.is_empty());
        assert_eq!(state.error.as_deref(), Some("Provide email and password"));
    }

    #[test]
    fn test_submit_refused_while_restoring_session() {
        let mut tui = TuiState::new(6);
        tui.tasks.recall.on_started(&TaskStarted {
            id: TaskId(0),
            cancel: None,
        });
        let mut state = filled(&tui);

        let update = state.handle_key(&tui, key(KeyCode::Enter));

        assert!(update.effects.is_empty());
        assert!(!state.submitting);
    }

    #[test]
    fn test_failure_reenables_form() {
        let tui = TuiState::new(6);
        let mut state = filled(&tui);
        state.handle_key(&tui, key(KeyCode::Enter));

        state.on_failed("Invalid login credentials".to_string());

        assert!(!state.submitting);
        assert_eq!(state.password.value(), "");
        assert_eq!(state.email.value(), "a@b.com");
    }
}
