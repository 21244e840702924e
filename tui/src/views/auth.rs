//! Login and Register Screens

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, Screen};
use crate::theme;

use super::{error_line, input_line, render_status_bar};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let width = 54.min(area.width.saturating_sub(2));
    let height = 16.min(area.height.saturating_sub(2));
    let rect = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    let (title, mut lines) = if app.screen == Screen::Login {
        login_lines(app)
    } else {
        register_lines(app)
    };

    if app.auth_busy {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("  {} Подождите…", theme::spinner_frame(app.frame)),
            Style::default().fg(theme::DIM),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PRIMARY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(theme::PRIMARY),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), rect);

    let hints = if app.screen == Screen::Login {
        "Tab — поля · Enter — войти · F2 — регистрация · Ctrl+Q — выход"
    } else {
        "Tab — поля · Enter — создать аккаунт · F2 — вход · Ctrl+Q — выход"
    };
    render_status_bar(frame, area, hints);
}

fn login_lines(app: &App) -> (&'static str, Vec<Line<'_>>) {
    let form = &app.login_form;
    let masked = "•".repeat(form.password.chars().count());
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            "  TELLER — ваш банковский ассистент",
            Style::default().fg(theme::ACCENT),
        )),
        Line::raw(""),
        input_line("Email", &form.email, form.focus == 0),
        error_line(form.report.error_for("email")),
        input_line_owned("Пароль", masked, form.focus == 1),
        error_line(form.report.error_for("password")),
    ];
    ("Вход", lines)
}

fn register_lines(app: &App) -> (&'static str, Vec<Line<'_>>) {
    let form = &app.register_form;
    let masked = "•".repeat(form.password.chars().count());
    let lines = vec![
        Line::raw(""),
        input_line("Имя", &form.name, form.focus == 0),
        error_line(form.report.error_for("name")),
        input_line("Email", &form.email, form.focus == 1),
        error_line(form.report.error_for("email")),
        input_line_owned("Пароль", masked, form.focus == 2),
        error_line(form.report.error_for("password")),
    ];
    ("Регистрация", lines)
}

fn input_line_owned(label: &str, value: String, focused: bool) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default().fg(theme::ACCENT)
    } else {
        Style::default().fg(theme::DIM)
    };
    Line::from(vec![
        Span::styled(format!("{marker}{label}: "), label_style),
        Span::raw(value),
        Span::styled(
            if focused { "▏" } else { "" },
            Style::default().fg(theme::ACCENT),
        ),
    ])
}
