//! Dashboard Screen
//!
//! Goal cards on the left, the transaction table on the right, the
//! create-goal form as a centered overlay.

use chrono::Utc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use ratatui::Frame;

use teller_core::{goal_card, transaction_row, ApiMode};

use crate::app::App;
use crate::theme;

use super::{error_line, input_line, render_status_bar};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_goals(frame, body[0], app);
    render_transactions(frame, body[1], app);

    if let Some(state) = &app.goal_form {
        render_goal_form(frame, area, state, app);
    }

    render_status_bar(
        frame,
        area,
        "R — обновить · N — новая цель · F3 — журнал · F4 — ассистент · F10 — выход",
    );
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let name = app.profile_name().unwrap_or_else(|| "клиент".to_string());
    let mode = match app.api_mode() {
        ApiMode::Live => "",
        ApiMode::Simulated => " · демо-режим",
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " TELLER ",
            Style::default()
                .fg(theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("· {name}{mode}"), Style::default().fg(theme::DIM)),
    ]));
    frame.render_widget(header, area);
}

fn render_goals(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.dashboard.state();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PRIMARY_DIM))
        .title(Span::styled(" Цели ", Style::default().fg(theme::PRIMARY)));
    let inner_width = area.width.saturating_sub(4) as usize;

    let mut lines: Vec<Line> = Vec::new();
    if app.dashboard_loading && state.goals.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!(" {} Загрузка…", theme::spinner_frame(app.frame)),
            Style::default().fg(theme::DIM),
        )));
    } else if state.goals.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            " Целей пока нет — нажмите N, чтобы создать первую.",
            Style::default().fg(theme::DIM),
        )));
    } else {
        let now = Utc::now();
        for goal in &state.goals {
            let card = goal_card(goal, now);
            let days = if card.days_remaining < 0 {
                format!("просрочено на {} дн.", -card.days_remaining)
            } else {
                format!("осталось {} дн.", card.days_remaining)
            };

            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {}", card.title),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  ({days})"), Style::default().fg(theme::DIM)),
            ]));
            lines.push(Line::from(Span::styled(
                format!(" {} {}%", progress_bar(card.progress, inner_width.saturating_sub(6)), card.progress),
                Style::default().fg(theme::PRIMARY),
            )));
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {}", card.amount_label),
                    Style::default().fg(theme::ACCENT),
                ),
                Span::styled(
                    format!("  до {}", card.deadline_label),
                    Style::default().fg(theme::DIM),
                ),
            ]));
            lines.push(Line::raw(""));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn progress_bar(percent: u8, width: usize) -> String {
    let width = width.max(10);
    let filled = width * percent as usize / 100;
    let mut bar = String::with_capacity(width * 3);
    for i in 0..width {
        bar.push(if i < filled { '█' } else { '░' });
    }
    bar
}

fn render_transactions(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.dashboard.state();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PRIMARY_DIM))
        .title(Span::styled(
            " Операции ",
            Style::default().fg(theme::PRIMARY),
        ));

    if state.transactions.is_empty() {
        let placeholder = if app.dashboard_loading {
            format!(" {} Загрузка…", theme::spinner_frame(app.frame))
        } else {
            " Операций пока нет.".to_string()
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::raw(""),
                Line::from(Span::styled(placeholder, Style::default().fg(theme::DIM))),
            ])
            .block(block),
            area,
        );
        return;
    }

    let rows: Vec<Row> = state
        .transactions
        .iter()
        .map(|tx| {
            let row = transaction_row(tx);
            let amount_color = if row.credit {
                theme::CREDIT
            } else {
                theme::DEBIT
            };
            Row::new(vec![
                Cell::from(row.date_label),
                Cell::from(row.description),
                Cell::from(row.amount_label).style(Style::default().fg(amount_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(vec!["Дата", "Описание", "Сумма"])
            .style(Style::default().fg(theme::DIM).add_modifier(Modifier::BOLD)),
    )
    .block(block);

    frame.render_widget(table, area);
}

fn render_goal_form(
    frame: &mut Frame,
    area: Rect,
    state: &crate::app::GoalFormState,
    _app: &App,
) {
    let width = 52.min(area.width.saturating_sub(2));
    let height = 12.min(area.height.saturating_sub(2));
    let rect = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    let lines = vec![
        Line::raw(""),
        input_line("Название", &state.form.title, state.focus == 0),
        error_line(state.report.error_for("title")),
        input_line("Сумма, ₸", &state.form.target_amount, state.focus == 1),
        error_line(state.report.error_for("target_amount")),
        input_line("Срок (ГГГГ-ММ-ДД)", &state.form.deadline, state.focus == 2),
        error_line(state.report.error_for("deadline")),
        Line::raw(""),
        Line::from(Span::styled(
            "  Enter — создать · Esc — отмена",
            Style::default().fg(theme::DIM),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(Span::styled(
            " Новая цель ",
            Style::default().fg(theme::ACCENT),
        ));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
