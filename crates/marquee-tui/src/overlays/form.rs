//! Single-line text input shared by the form overlays.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::common::text::mask;

#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    masked: bool,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field whose contents render as bullets.
    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn display(&self) -> String {
        if self.masked {
            mask(&self.value)
        } else {
            self.value.clone()
        }
    }

    /// Applies an editing key. Returns false for keys the field ignores.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                self.value.clear();
                true
            }
            KeyCode::Char(c) if !ctrl => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }

    /// Inserts pasted text, dropping line breaks.
    pub fn paste(&mut self, text: &str) {
        self.value
            .extend(text.chars().filter(|c| !matches!(c, '\n' | '\r')));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_clearing() {
        let mut field = TextField::new();
        for c in "abc".chars() {
            assert!(field.handle_key(key(KeyCode::Char(c))));
        }
        field.handle_key(key(KeyCode::Backspace));
        assert_eq!(field.value(), "ab");

        field.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(field.value(), "");
        assert!(!field.handle_key(key(KeyCode::Enter)));
    }

    #[test]
    fn test_masked_display_and_paste() {
        let mut field = TextField::masked();
        field.paste("se\ncret\r\n");
        assert_eq!(field.value(), "secret");
        assert_eq!(field.display(), "••••••");
    }
}
