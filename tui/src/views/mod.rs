//! Render Functions
//!
//! Pure rendering over controller snapshots. No view mutates state; the
//! App feeds every screen what it needs and the widgets layer draws the
//! overlays (chat panel, modal, toasts) on top.

mod admin;
mod auth;
mod chat;
mod dashboard;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Screen};
use crate::theme;
use crate::widgets;

/// Render one frame
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.screen {
        Screen::Login | Screen::Register => auth::render(frame, area, app),
        Screen::Dashboard => dashboard::render(frame, area, app),
        Screen::Admin => admin::render(frame, area, app),
    }

    if app.chat_open {
        chat::render(frame, area, app);
    }

    widgets::render_toasts(frame, area, &app.toasts);

    if let Some(modal) = &app.modal {
        widgets::render_modal(frame, area, modal);
    }
}

/// One form input line with a focus marker
pub(crate) fn input_line<'a>(label: &str, value: &'a str, focused: bool) -> Line<'a> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default().fg(theme::ACCENT)
    } else {
        Style::default().fg(theme::DIM)
    };
    Line::from(vec![
        Span::styled(format!("{marker}{label}: "), label_style),
        Span::raw(value),
        Span::styled(if focused { "▏" } else { "" }, Style::default().fg(theme::ACCENT)),
    ])
}

/// Inline field error line under an input
pub(crate) fn error_line(message: Option<&str>) -> Line<'static> {
    match message {
        Some(message) => Line::from(Span::styled(
            format!("    {message}"),
            Style::default().fg(theme::ERROR),
        )),
        None => Line::raw(""),
    }
}

/// Bottom status bar with key hints
pub(crate) fn render_status_bar(frame: &mut Frame, area: Rect, hints: &str) {
    if area.height == 0 {
        return;
    }
    let rect = Rect::new(area.x, area.bottom() - 1, area.width, 1);
    let bar = Paragraph::new(Line::from(Span::styled(
        format!(" {hints}"),
        Style::default().fg(theme::DIM),
    )));
    frame.render_widget(bar, rect);
}
