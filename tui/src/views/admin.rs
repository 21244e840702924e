//! Admin Log Screen
//!
//! Filter row on top, the operation log below. Enter re-fetches with the
//! filters as query parameters; Ctrl+F re-filters the already-loaded set
//! client-side without touching the server.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use teller_core::{format_timestamp, LogStatus};

use crate::app::App;
use crate::theme;

use super::render_status_bar;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_filter_row(frame, chunks[0], app);
    render_table(frame, chunks[1], app);
    render_status_bar(
        frame,
        area,
        "Tab — поля · Enter — запрос · Ctrl+F — фильтр на месте · Ctrl+X — сброс · F2 — кабинет",
    );
}

fn render_filter_row(frame: &mut Frame, area: Rect, app: &App) {
    let filter = &app.admin_filter;

    let field = |label: &str, value: &str, focused: bool| -> Vec<Span<'static>> {
        let style = if focused {
            Style::default().fg(theme::ACCENT)
        } else {
            Style::default().fg(theme::DIM)
        };
        vec![
            Span::styled(format!("{label}: "), style),
            Span::raw(format!("[{value:<12}]  ")),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(field("Пользователь", &filter.user_id, filter.focus == 0));
    spans.extend(field("Действие", &filter.action_type, filter.focus == 1));
    spans.extend(field("Статус", &filter.status, filter.focus == 2));

    let mut lines = vec![Line::from(spans)];
    if let Some(error) = &filter.error {
        lines.push(Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(theme::ERROR),
        )));
    } else if app.admin_view.is_some() {
        lines.push(Line::from(Span::styled(
            " Фильтр применён к загруженным записям",
            Style::default().fg(theme::DIM),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PRIMARY_DIM))
        .title(Span::styled(
            " Журнал операций ",
            Style::default().fg(theme::PRIMARY),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn status_style(status: LogStatus) -> Style {
    let color = match status {
        LogStatus::Completed => theme::SUCCESS,
        LogStatus::Pending => theme::WARNING,
        LogStatus::Failed => theme::ERROR,
        LogStatus::Cancelled => theme::DIM,
    };
    Style::default().fg(color)
}

fn render_table(frame: &mut Frame, area: Rect, app: &App) {
    let loaded = app.admin.entries();
    let entries = app.admin_view.as_ref().unwrap_or(&loaded);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PRIMARY_DIM));

    if entries.is_empty() {
        let placeholder = if app.admin_loading {
            format!(" {} Загрузка…", theme::spinner_frame(app.frame))
        } else {
            " Записей не найдено.".to_string()
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

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.id.to_string()),
                Cell::from(entry.user_id.to_string()),
                Cell::from(entry.action_type.clone()),
                Cell::from(format_timestamp(entry.timestamp)),
                Cell::from(entry.status.as_str()).style(status_style(entry.status)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Min(12),
            Constraint::Length(17),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["ID", "Пользователь", "Действие", "Время", "Статус"])
            .style(Style::default().fg(theme::DIM).add_modifier(Modifier::BOLD)),
    )
    .block(block);

    frame.render_widget(table, area);
}
