//! Teller terminal entry point
//!
//! Sets up file-backed logging (the terminal belongs to the UI), enters
//! the alternate screen and runs the app event loop. The terminal is
//! restored on exit and on panic.

use std::io;
use std::panic;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use teller_tui::App;

fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("teller")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("teller.log")) else {
        return;
    };

    let filter = EnvFilter::try_from_env("TELLER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;

    // Restore the terminal even when a draw panics
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = app.run(&mut terminal).await;

    restore_terminal();
    result
}
