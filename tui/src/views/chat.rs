//! Chat Panel
//!
//! The assistant overlays the right side of whichever screen is active,
//! like a side drawer. Messages wrap to the panel width and the view
//! sticks to the newest lines.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use teller_core::models::MessageRole;

use crate::app::App;
use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let width = 46.min(area.width);
    let rect = Rect::new(
        area.right().saturating_sub(width),
        area.y,
        width,
        area.height.saturating_sub(1),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::PRIMARY))
        .title(Span::styled(
            " Ассистент ",
            Style::default().fg(theme::PRIMARY),
        ));
    let inner = block.inner(rect);

    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    if inner.height < 3 {
        return;
    }

    // Transcript above, input + hint line below
    let transcript_height = inner.height.saturating_sub(2) as usize;
    let wrap_width = inner.width.saturating_sub(1).max(10) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for message in app.chat.messages() {
        if message.pending {
            lines.push(Line::from(Span::styled(
                format!("{} печатает…", theme::spinner_frame(app.frame)),
                Style::default().fg(theme::DIM),
            )));
            continue;
        }
        let (who, style) = match message.role {
            MessageRole::User => ("Вы", Style::default().fg(theme::ACCENT)),
            MessageRole::Assistant => ("Ассистент", Style::default().fg(theme::PRIMARY)),
        };
        lines.push(Line::from(Span::styled(format!("{who}:"), style)));
        for wrapped in textwrap::wrap(&message.text, wrap_width) {
            lines.push(Line::raw(wrapped.into_owned()));
        }
        lines.push(Line::raw(""));
    }

    // Stick to the newest lines
    let skip = lines.len().saturating_sub(transcript_height);
    let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
    let transcript_rect = Rect::new(inner.x, inner.y, inner.width, transcript_height as u16);
    frame.render_widget(Paragraph::new(visible), transcript_rect);

    // Input line; long input shows its tail so the cursor stays visible
    let input_rect = Rect::new(
        inner.x,
        inner.y + transcript_height as u16,
        inner.width,
        1,
    );
    let visible_input = tail_fitting(&app.chat_input, inner.width.saturating_sub(4) as usize);
    let input = Paragraph::new(Line::from(vec![
        Span::styled("› ", Style::default().fg(theme::ACCENT)),
        Span::raw(visible_input),
        Span::styled("▏", Style::default().fg(theme::ACCENT)),
    ]));
    frame.render_widget(input, input_rect);

    // Hint line with the speech toggle state
    let speech = if app.chat.voice().speech_enabled() {
        "озвучка вкл"
    } else {
        "озвучка выкл"
    };
    let voice_hint = if app.chat.voice().recognition_available() {
        " · Ctrl+V — голос"
    } else {
        ""
    };
    let hint_rect = Rect::new(
        inner.x,
        inner.y + transcript_height as u16 + 1,
        inner.width,
        1,
    );
    let hints = Paragraph::new(Line::from(Span::styled(
        format!("Enter — отправить · Ctrl+S — {speech}{voice_hint} · Esc"),
        Style::default().fg(theme::DIM),
    )));
    frame.render_widget(hints, hint_rect);
}

fn tail_fitting(input: &str, max_width: usize) -> String {
    if input.width() <= max_width {
        return input.to_string();
    }
    let mut taken = 0;
    let mut chars: Vec<char> = Vec::new();
    for c in input.chars().rev() {
        let w = c.width().unwrap_or(0);
        if taken + w > max_width {
            break;
        }
        taken += w;
        chars.push(c);
    }
    chars.into_iter().rev().collect()
}
