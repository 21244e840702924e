//! UI Helpers
//!
//! Toast notifications with expiry and the confirm modal the chat
//! controller awaits.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::oneshot;

use crate::theme;

/// How long a toast stays visible
const TOAST_TTL: Duration = Duration::from_secs(4);

/// Severity of a toast
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    /// Neutral information
    Info,
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

impl ToastLevel {
    fn color(self) -> Color {
        match self {
            Self::Info => theme::PRIMARY,
            Self::Success => theme::SUCCESS,
            Self::Error => theme::ERROR,
        }
    }
}

/// One transient notification
#[derive(Clone, Debug)]
pub struct Toast {
    /// Severity
    pub level: ToastLevel,
    /// Message text
    pub text: String,
    created: Instant,
}

/// Stack of live toasts, newest last
#[derive(Default)]
pub struct ToastStack {
    toasts: Vec<Toast>,
}

impl ToastStack {
    /// Add a toast
    pub fn push(&mut self, level: ToastLevel, text: impl Into<String>) {
        self.toasts.push(Toast {
            level,
            text: text.into(),
            created: Instant::now(),
        });
    }

    /// Drop expired toasts
    pub fn tick(&mut self) {
        self.toasts.retain(|t| t.created.elapsed() < TOAST_TTL);
    }

    /// Live toasts, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    /// Whether anything is visible
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Number of live toasts
    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}

/// Render the toast stack in the bottom-right corner
pub fn render_toasts(frame: &mut Frame, area: Rect, stack: &ToastStack) {
    let width = 44.min(area.width);
    let count = stack.len() as u16;
    if count == 0 || area.height < 4 {
        return;
    }

    for (i, toast) in stack.iter().enumerate() {
        let y = area
            .bottom()
            .saturating_sub(2 + (count - 1 - i as u16) * 3);
        let rect = Rect::new(area.right().saturating_sub(width + 1), y.saturating_sub(1), width, 3);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(toast.level.color()));
        let body = Paragraph::new(toast.text.as_str())
            .style(Style::default().fg(toast.level.color()))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(Clear, rect);
        frame.render_widget(body, rect);
    }
}

/// A confirm request raised by a background chat turn
#[derive(Debug)]
pub struct ModalRequest {
    /// Dialog title
    pub title: String,
    /// Dialog body
    pub description: String,
    /// Resolves the awaiting controller with the user's choice
    pub respond: oneshot::Sender<bool>,
}

/// The modal currently on screen
pub struct ActiveModal {
    /// Dialog title
    pub title: String,
    /// Dialog body
    pub description: String,
    respond: Option<oneshot::Sender<bool>>,
}

impl From<ModalRequest> for ActiveModal {
    fn from(request: ModalRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            respond: Some(request.respond),
        }
    }
}

impl ActiveModal {
    /// Resolve the dialog; the sender can only fire once
    pub fn resolve(&mut self, confirmed: bool) {
        if let Some(respond) = self.respond.take() {
            let _ = respond.send(confirmed);
        }
    }
}

impl Drop for ActiveModal {
    fn drop(&mut self) {
        // A dismissed dialog counts as declined
        self.resolve(false);
    }
}

/// Render the confirm modal centered over everything
pub fn render_modal(frame: &mut Frame, area: Rect, modal: &ActiveModal) {
    let width = 52.min(area.width.saturating_sub(4));
    let height = 8.min(area.height.saturating_sub(2));
    let rect = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(Span::styled(
            format!(" {} ", modal.title),
            Style::default().fg(theme::ACCENT),
        ));

    let lines = vec![
        Line::raw(""),
        Line::raw(modal.description.as_str()),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[Y]", Style::default().fg(theme::SUCCESS)),
            Span::raw(" Подтвердить   "),
            Span::styled("[N]", Style::default().fg(theme::ERROR)),
            Span::raw(" Отменить"),
        ]),
    ];
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);

    frame.render_widget(Clear, rect);
    frame.render_widget(body, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_stack_push_and_len() {
        let mut stack = ToastStack::default();
        assert!(stack.is_empty());

        stack.push(ToastLevel::Info, "загрузка завершена");
        stack.push(ToastLevel::Error, "ошибка сети");
        assert_eq!(stack.len(), 2);

        // Fresh toasts survive a tick
        stack.tick();
        assert_eq!(stack.len(), 2);
    }

    #[tokio::test]
    async fn test_modal_resolves_once() {
        let (tx, rx) = oneshot::channel();
        let mut modal = ActiveModal::from(ModalRequest {
            title: "Подтвердите действие".to_string(),
            description: "Перевод 20,000 ₸".to_string(),
            respond: tx,
        });

        modal.resolve(true);
        // A second resolve is a no-op
        modal.resolve(false);

        assert!(rx.await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_modal_counts_as_declined() {
        let (tx, rx) = oneshot::channel();
        let modal = ActiveModal::from(ModalRequest {
            title: "t".to_string(),
            description: "d".to_string(),
            respond: tx,
        });
        drop(modal);

        assert!(!rx.await.unwrap());
    }
}
