//! Toast stack: layout, rendering, and click hit-testing.
//!
//! Toasts are stacked from the top-right corner, most recent first. The
//! same layout function feeds both rendering and mouse hit-testing so a
//! click always lands on what is drawn.

use marquee_core::toast::{Toast, ToastId, ToastKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::common::text::wrap;

const MAX_WIDTH: u16 = 42;
const MARGIN: u16 = 1;
/// Longest message shown in full; the rest is cut.
const MAX_BODY_LINES: usize = 4;

/// Screen rectangles for each toast, in stacking order.
pub fn layout(screen: Rect, toasts: &[Toast]) -> Vec<(ToastId, Rect)> {
    let width = MAX_WIDTH.min(screen.width.saturating_sub(MARGIN * 2));
    if width < 8 {
        return Vec::new();
    }
    let text_width = usize::from(width.saturating_sub(4));
    let x = screen.x + screen.width.saturating_sub(width + MARGIN);
    let bottom = screen.y + screen.height;

    let mut y = screen.y + MARGIN;
    let mut placed = Vec::with_capacity(toasts.len());
    for toast in toasts {
        let lines = wrap(&toast.message, text_width).len().clamp(1, MAX_BODY_LINES);
        let height = lines as u16 + 2;
        if y + height > bottom {
            break;
        }
        placed.push((toast.id, Rect::new(x, y, width, height)));
        y += height;
    }
    placed
}

/// Toast under the given cell, if any.
pub fn hit_test(screen: Rect, toasts: &[Toast], column: u16, row: u16) -> Option<ToastId> {
    layout(screen, toasts)
        .into_iter()
        .find(|(_, rect)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
        .map(|(id, _)| id)
}

fn accent(kind: ToastKind) -> (Color, &'static str) {
    match kind {
        ToastKind::Info => (Color::Cyan, "info"),
        ToastKind::Success => (Color::Green, "ok"),
        ToastKind::Error => (Color::Red, "error"),
    }
}

pub fn render(frame: &mut Frame, screen: Rect, toasts: &[Toast]) {
    for (toast, (_, rect)) in toasts.iter().zip(layout(screen, toasts)) {
        let (color, label) = accent(toast.kind);
        let mut border = Style::default().fg(color);
        let mut text = Style::default().fg(Color::White);
        if toast.is_exiting() {
            border = border.add_modifier(Modifier::DIM);
            text = text.fg(Color::DarkGray);
        }

        let body: Vec<Line<'static>> = wrap(&toast.message, usize::from(rect.width.saturating_sub(4)))
            .into_iter()
            .take(MAX_BODY_LINES)
            .map(|line| Line::styled(line, text))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Line::styled(format!(" {label} "), border));
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(body).block(block).style(text), rect);
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::toast::{ToastCenter, ToastOptions};

    use super::*;

    fn toasts(messages: &[&str]) -> Vec<Toast> {
        let center = ToastCenter::new();
        for message in messages {
            center.show(*message, ToastOptions::info().sticky());
        }
        center.snapshot()
    }

    #[tokio::test]
    async fn test_layout_stacks_from_top_right() {
        let toasts = toasts(&["first", "second"]);
        let placed = layout(Rect::new(0, 0, 100, 30), &toasts);

        assert_eq!(placed.len(), 2);
        let (_, top) = placed[0];
        let (_, below) = placed[1];
        assert_eq!(top.x + top.width, 99);
        assert_eq!(top.y, 1);
        assert_eq!(below.y, top.y + top.height);
    }

    #[tokio::test]
    async fn test_layout_drops_toasts_that_do_not_fit() {
        let toasts = toasts(&["a", "b", "c", "d"]);
        let placed = layout(Rect::new(0, 0, 80, 8), &toasts);

        assert_eq!(placed.len(), 2);
    }

    #[tokio::test]
    async fn test_hit_test_finds_clicked_toast() {
        let toasts = toasts(&["first", "second"]);
        let screen = Rect::new(0, 0, 100, 30);
        let placed = layout(screen, &toasts);
        let (second, rect) = placed[1];

        assert_eq!(hit_test(screen, &toasts, rect.x + 1, rect.y + 1), Some(second));
        assert_eq!(hit_test(screen, &toasts, 0, 0), None);
    }
}
